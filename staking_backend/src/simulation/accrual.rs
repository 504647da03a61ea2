//! Accrual engine: daily yield and periodic vesting.
//!
//! A tick is a pure map over the pre-tick wallet snapshot. No wallet's result
//! depends on any other wallet, so processing order never matters.

use super::config::StakingConfig;
use super::fixed_point::{apply_bps, split_bps};
use crate::types::Wallet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccrualParams {
    pub daily_interest_rate_bps: u64,
    pub vesting_interval_days: u32,
    pub vesting_fraction_bps: u64,
}

impl From<&StakingConfig> for AccrualParams {
    fn from(config: &StakingConfig) -> Self {
        Self {
            daily_interest_rate_bps: config.daily_interest_rate_bps,
            vesting_interval_days: config.vesting_interval_days,
            vesting_fraction_bps: config.vesting_fraction_bps,
        }
    }
}

/// Result of one accrual pass over the whole pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccrualOutcome {
    pub wallets: Vec<Wallet>,
    pub yield_minted: u64,
    pub vested_total: u64,
    pub vesting_fired: bool,
}

pub fn daily_yield(staked: u64, rate_bps: u64) -> u64 {
    apply_bps(staked, rate_bps)
}

/// Day 0 counts as a multiple of every interval, so every wrap vests.
pub fn is_vesting_day(day: u32, interval_days: u32) -> bool {
    interval_days != 0 && day % interval_days == 0
}

/// Add one day of yield.
pub fn accrue_yield(wallet: &Wallet, rate_bps: u64) -> Wallet {
    Wallet {
        yield_earned: wallet
            .yield_earned
            .saturating_add(daily_yield(wallet.staked, rate_bps)),
        ..wallet.clone()
    }
}

/// Move `fraction_bps` of the current yield into vested.
///
/// Vesting is keyed by tick: a wallet already vested at `tick` is returned
/// unchanged, so a repeated call in the same tick cannot double-transfer.
pub fn vest(wallet: &Wallet, tick: u64, fraction_bps: u64) -> Wallet {
    if wallet.last_vesting_tick == Some(tick) {
        return wallet.clone();
    }
    let (moved, remaining) = split_bps(wallet.yield_earned, fraction_bps);
    Wallet {
        yield_earned: remaining,
        vested: wallet.vested.saturating_add(moved),
        last_vesting_tick: Some(tick),
        ..wallet.clone()
    }
}

/// Accrual then (on vesting days) vesting, for one wallet on one tick.
pub fn accrue_wallet(wallet: &Wallet, day: u32, tick: u64, params: &AccrualParams) -> Wallet {
    let accrued = accrue_yield(wallet, params.daily_interest_rate_bps);
    if is_vesting_day(day, params.vesting_interval_days) {
        vest(&accrued, tick, params.vesting_fraction_bps)
    } else {
        accrued
    }
}

/// One tick over the whole pool. `day` is the day counter after advancing.
pub fn accrue_all(wallets: &[Wallet], day: u32, tick: u64, params: &AccrualParams) -> AccrualOutcome {
    let next: Vec<Wallet> = wallets
        .iter()
        .map(|w| accrue_wallet(w, day, tick, params))
        .collect();

    let mut yield_minted: u128 = 0;
    let mut vested_total: u128 = 0;
    for (before, after) in wallets.iter().zip(&next) {
        let earned_before = before.yield_earned as u128 + before.vested as u128;
        let earned_after = after.yield_earned as u128 + after.vested as u128;
        yield_minted += earned_after.saturating_sub(earned_before);
        vested_total += after.vested.saturating_sub(before.vested) as u128;
    }

    AccrualOutcome {
        wallets: next,
        yield_minted: yield_minted.min(u64::MAX as u128) as u64,
        vested_total: vested_total.min(u64::MAX as u128) as u64,
        vesting_fired: is_vesting_day(day, params.vesting_interval_days),
    }
}
