//! Per-tick statistics for the pool dashboard graphs.
//!
//! One `DaySnapshot` is appended after every tick. History is bounded to one
//! staking period; older snapshots are dropped first.
//!
//! ## APY
//!
//! - **Realized APY**: yield actually minted over the window, annualized
//!   against the pooled tokens at the start of the window
//! - **Advertised APY**: the configured display figure

mod types;
mod history;

pub use types::{ApyInfo, DaySnapshot};
pub use history::{SnapshotHistory, MAX_APY_DAYS};
