//! Pure staking simulation: no IC system calls, so everything here runs
//! natively under `cargo test`.

pub mod accrual;
pub mod audit;
pub mod clock;
pub mod command;
pub mod config;
pub mod connector;
pub mod engine;
pub mod fixed_point;
pub mod ledger;
pub mod scheduler;
pub mod session;
pub mod statistics;

#[cfg(test)]
mod tests;

pub use audit::AuditEntry;
pub use command::{Command, Event};
pub use config::StakingConfig;
pub use engine::{PoolTotals, StakingEngine};
pub use statistics::{ApyInfo, DaySnapshot};
