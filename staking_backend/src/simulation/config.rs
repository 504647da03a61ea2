use candid::{CandidType, Deserialize};
use serde::Serialize;
use std::collections::BTreeSet;

use super::fixed_point::tokens;
use crate::types::{WalletSeed, BPS_DENOMINATOR};

// =============================================================================
// DEFAULTS
// =============================================================================

pub const DEFAULT_DAILY_INTEREST_RATE_BPS: u64 = 10; // 0.1% per day
pub const DEFAULT_TOKEN_PRICE_E6: u64 = 1_000_000; // $1 per BCRE
pub const DEFAULT_APY_PERCENT: f64 = 42.0;
pub const DEFAULT_STAKING_PERIOD_DAYS: u32 = 184;
pub const DEFAULT_VESTING_INTERVAL_DAYS: u32 = 30;
pub const DEFAULT_VESTING_FRACTION_BPS: u64 = 1_000; // 10%
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000; // 1 simulated day per second
pub const DEFAULT_WITHDRAWAL_LOCK_MS: u64 = 72_000; // 72 hours, demo-scaled to 72 seconds

/// Economics and cadence of the simulated pool.
///
/// Passed as the canister init/upgrade argument; `None` selects the defaults.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct StakingConfig {
    pub daily_interest_rate_bps: u64,
    pub token_price_e6: u64,
    /// Display only, never used in accrual
    pub annual_percentage_yield: f64,
    pub staking_period_days: u32,
    pub vesting_interval_days: u32,
    pub vesting_fraction_bps: u64,
    pub tick_interval_ms: u64,
    pub withdrawal_lock_ms: u64,
    pub initial_wallets: Vec<WalletSeed>,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            daily_interest_rate_bps: DEFAULT_DAILY_INTEREST_RATE_BPS,
            token_price_e6: DEFAULT_TOKEN_PRICE_E6,
            annual_percentage_yield: DEFAULT_APY_PERCENT,
            staking_period_days: DEFAULT_STAKING_PERIOD_DAYS,
            vesting_interval_days: DEFAULT_VESTING_INTERVAL_DAYS,
            vesting_fraction_bps: DEFAULT_VESTING_FRACTION_BPS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            withdrawal_lock_ms: DEFAULT_WITHDRAWAL_LOCK_MS,
            initial_wallets: default_wallets(),
        }
    }
}

pub fn default_wallets() -> Vec<WalletSeed> {
    [("W1", 1000), ("W2", 2000), ("W3", 3000), ("W4", 4000)]
        .into_iter()
        .map(|(id, staked)| WalletSeed {
            id: id.to_string(),
            staked: tokens(staked),
        })
        .collect()
}

impl StakingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.staking_period_days == 0 {
            return Err("staking_period_days must be > 0".to_string());
        }
        if self.vesting_interval_days == 0 {
            return Err("vesting_interval_days must be > 0".to_string());
        }
        if self.vesting_fraction_bps > BPS_DENOMINATOR {
            return Err(format!(
                "vesting_fraction_bps must be <= {} (got {})",
                BPS_DENOMINATOR, self.vesting_fraction_bps
            ));
        }
        if self.daily_interest_rate_bps > BPS_DENOMINATOR {
            return Err(format!(
                "daily_interest_rate_bps must be <= {} (got {})",
                BPS_DENOMINATOR, self.daily_interest_rate_bps
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be > 0".to_string());
        }
        if !self.annual_percentage_yield.is_finite() {
            return Err("annual_percentage_yield must be a finite number".to_string());
        }
        if self.initial_wallets.is_empty() {
            return Err("initial_wallets must contain at least one wallet".to_string());
        }

        let mut seen = BTreeSet::new();
        for seed in &self.initial_wallets {
            if seed.id.trim().is_empty() {
                return Err("Wallet id cannot be empty".to_string());
            }
            if !seen.insert(seed.id.as_str()) {
                return Err(format!("Duplicate wallet id: {}", seed.id));
            }
        }
        Ok(())
    }
}
