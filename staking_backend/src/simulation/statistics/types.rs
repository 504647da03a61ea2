use candid::{CandidType, Deserialize, Nat};
use serde::Serialize;

/// Pool state right after one tick
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct DaySnapshot {
    /// Tick number (1-based, never wraps)
    pub tick: u64,
    /// Day counter after the tick
    pub day: u32,
    /// Total tokens pooled at end of tick (e8s)
    pub ttp: Nat,
    /// Total value locked at end of tick (USD e6)
    pub tvl_e6: Nat,
    /// Yield minted across all wallets this tick (e8s)
    pub yield_minted: u64,
    /// Amount moved from yield into vested this tick (e8s)
    pub vested_this_tick: u64,
}

/// APY calculation result for queries
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, Default)]
pub struct ApyInfo {
    pub realized_apy_percent: f64,
    pub advertised_apy_percent: f64,
    /// Number of simulated days used in calculation
    pub days_calculated: u32,
    /// Total yield minted over the window (e8s)
    pub total_yield_minted: u64,
}
