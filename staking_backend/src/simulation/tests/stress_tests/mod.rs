mod model;
mod generators;

pub use model::SimulationModel;
pub use operations::{Operation, OpResult};
