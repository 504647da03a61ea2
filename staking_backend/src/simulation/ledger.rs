//! Pool ledger: the wallet collection and its pool-wide aggregates.
//!
//! TVL and TTP are never maintained incrementally. Every write (a whole-pool
//! tick replacement or a single keyed write-back) recomputes both from the
//! current wallets, so no action type can make them drift.

use candid::Nat;
use std::collections::BTreeSet;

use super::fixed_point::{nat_add, nat_divide, nat_multiply, nat_zero};
use crate::types::{Wallet, WalletId, WalletSeed, E8S_PER_TOKEN};

const REASONABLE_MAX_LIMIT: usize = 1_000; // Cap for paginated listings

/// Total tokens pooled: Σ(staked + yield + vested) in e8s.
pub fn compute_ttp(wallets: &[Wallet]) -> Nat {
    wallets.iter().fold(nat_zero(), |acc, w| {
        let active = w.staked as u128 + w.yield_earned as u128 + w.vested as u128;
        nat_add(&acc, &Nat::from(active))
    })
}

/// Total value locked in USD e6: TTP × price / 1e8.
pub fn compute_tvl(wallets: &[Wallet], token_price_e6: u64) -> Nat {
    let value = nat_multiply(&compute_ttp(wallets), &Nat::from(token_price_e6));
    nat_divide(&value, &Nat::from(E8S_PER_TOKEN)).unwrap_or_else(nat_zero)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pool {
    wallets: Vec<Wallet>,
    token_price_e6: u64,
    ttp: Nat,
    tvl_e6: Nat,
}

impl Pool {
    pub fn new(seeds: &[WalletSeed], token_price_e6: u64) -> Result<Self, String> {
        let mut seen = BTreeSet::new();
        for seed in seeds {
            if seed.id.trim().is_empty() {
                return Err("Wallet id cannot be empty".to_string());
            }
            if !seen.insert(seed.id.clone()) {
                return Err(format!("Duplicate wallet id: {}", seed.id));
            }
        }

        let wallets = seeds
            .iter()
            .map(|seed| Wallet::new(seed.id.clone(), seed.staked))
            .collect();

        let mut pool = Self {
            wallets,
            token_price_e6,
            ttp: nat_zero(),
            tvl_e6: nat_zero(),
        };
        pool.recompute();
        Ok(pool)
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ttp(&self) -> &Nat {
        &self.ttp
    }

    pub fn tvl_e6(&self) -> &Nat {
        &self.tvl_e6
    }

    pub fn token_price_e6(&self) -> u64 {
        self.token_price_e6
    }

    /// Swap in a whole new wallet collection (one tick's output).
    ///
    /// The replacement must carry exactly the same ids in the same order.
    pub fn replace_all(&mut self, next: Vec<Wallet>) -> Result<(), String> {
        if next.len() != self.wallets.len()
            || next.iter().zip(&self.wallets).any(|(a, b)| a.id != b.id)
        {
            return Err("Replacement wallet set does not match the pool".to_string());
        }
        self.wallets = next;
        self.recompute();
        Ok(())
    }

    /// Keyed write-back of a single wallet. Returns the updated wallet.
    pub fn update<F>(&mut self, id: &str, f: F) -> Result<Wallet, String>
    where
        F: FnOnce(&Wallet) -> Wallet,
    {
        let slot = self
            .wallets
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| format!("Unknown wallet: {}", id))?;

        let updated = f(&*slot);
        if updated.id != slot.id {
            return Err(format!("Wallet id changed during update: {} -> {}", slot.id, updated.id));
        }
        *slot = updated.clone();
        self.recompute();
        Ok(updated)
    }

    pub fn page(&self, offset: u64, limit: u64) -> Vec<Wallet> {
        let limit = (limit as usize).min(REASONABLE_MAX_LIMIT);
        self.wallets
            .iter()
            .skip(offset as usize)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn ids(&self) -> Vec<WalletId> {
        self.wallets.iter().map(|w| w.id.clone()).collect()
    }

    fn recompute(&mut self) {
        self.ttp = compute_ttp(&self.wallets);
        self.tvl_e6 = compute_tvl(&self.wallets, self.token_price_e6);
    }
}
