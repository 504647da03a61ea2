//! Connected-wallet session: re-stake dialog and withdrawal lock.
//!
//! The session never holds a copy of the wallet. Every action reads the
//! wallet from the pool and writes the result straight back by id.

use super::ledger::Pool;
use crate::types::{
    ReStakeComponent, ReStakeOptions, ReStakeSelection, Wallet, WalletId, WithdrawalLock,
    WithdrawalReceipt,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReStakeReceipt {
    pub wallet: Wallet,
    pub amount: u64,
    pub selection: ReStakeSelection,
    /// Lock cancelled because its pending funds were re-staked
    pub cancelled_lock: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseReceipt {
    pub wallet_id: WalletId,
    pub lock_id: u64,
    pub amount: u64,
}

/// Move the selected balances into `staked`. Returns the new wallet and the moved amount.
pub fn restake(wallet: &Wallet, selection: &ReStakeSelection) -> (Wallet, u64) {
    let mut next = wallet.clone();
    let mut amount: u64 = 0;
    if selection.yield_earned {
        amount = amount.saturating_add(next.yield_earned);
        next.yield_earned = 0;
    }
    if selection.vested {
        amount = amount.saturating_add(next.vested);
        next.vested = 0;
    }
    if selection.pending_withdrawals {
        amount = amount.saturating_add(next.pending_withdrawals);
        next.pending_withdrawals = 0;
    }
    next.staked = next.staked.saturating_add(amount);
    (next, amount)
}

/// Move yield + vested into pending withdrawals.
pub fn withdraw(wallet: &Wallet) -> (Wallet, u64) {
    let amount = wallet.yield_earned.saturating_add(wallet.vested);
    let next = Wallet {
        pending_withdrawals: wallet.pending_withdrawals.saturating_add(amount),
        yield_earned: 0,
        vested: 0,
        ..wallet.clone()
    };
    (next, amount)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    wallet_id: WalletId,
    restake_open: bool,
    selection: ReStakeSelection,
    withdrawal: WithdrawalLock,
}

impl Session {
    pub fn new(wallet_id: WalletId) -> Self {
        Self {
            wallet_id,
            restake_open: false,
            selection: ReStakeSelection::default(),
            withdrawal: WithdrawalLock::Unlocked,
        }
    }

    pub fn wallet_id(&self) -> &str {
        &self.wallet_id
    }

    pub fn restake_open(&self) -> bool {
        self.restake_open
    }

    pub fn selection(&self) -> ReStakeSelection {
        self.selection
    }

    pub fn withdrawal(&self) -> &WithdrawalLock {
        &self.withdrawal
    }

    pub fn can_withdraw(&self) -> bool {
        !self.withdrawal.is_locked()
    }

    // =========================================================================
    // RE-STAKE
    // =========================================================================

    pub fn open_restake(&mut self, pool: &Pool) -> Result<ReStakeOptions, String> {
        let wallet = self.wallet(pool)?;
        self.restake_open = true;
        Ok(ReStakeOptions {
            yield_earned: wallet.yield_earned,
            vested: wallet.vested,
            pending_withdrawals: wallet.pending_withdrawals,
            selection: self.selection,
            pending_locked: self.withdrawal.is_locked(),
        })
    }

    pub fn toggle_restake(&mut self, component: ReStakeComponent) -> Result<ReStakeSelection, String> {
        self.require_dialog()?;
        self.selection.toggle(component);
        Ok(self.selection)
    }

    pub fn cancel_restake(&mut self) -> Result<(), String> {
        self.require_dialog()?;
        self.close_dialog();
        Ok(())
    }

    /// Re-staking pending funds while a withdrawal lock is outstanding
    /// cancels that lock: the funds go back to work instead of out.
    pub fn confirm_restake(&mut self, pool: &mut Pool) -> Result<ReStakeReceipt, String> {
        self.require_dialog()?;
        let selection = self.selection;

        let mut moved = 0;
        let wallet = pool.update(&self.wallet_id, |w| {
            let (next, amount) = restake(w, &selection);
            moved = amount;
            next
        })?;

        let cancelled_lock = if selection.pending_withdrawals {
            let id = self.withdrawal.lock_id();
            self.withdrawal = WithdrawalLock::Unlocked;
            id
        } else {
            None
        };

        self.close_dialog();
        Ok(ReStakeReceipt {
            wallet,
            amount: moved,
            selection,
            cancelled_lock,
        })
    }

    // =========================================================================
    // WITHDRAWAL
    // =========================================================================

    pub fn request_withdrawal(
        &mut self,
        pool: &mut Pool,
        lock_id: u64,
        now_ms: u64,
        lock_ms: u64,
    ) -> Result<WithdrawalReceipt, String> {
        if let WithdrawalLock::Locked { expires_at_ms, .. } = &self.withdrawal {
            return Err(format!(
                "Withdrawal already pending until {} ms",
                expires_at_ms
            ));
        }

        let mut moved = 0;
        pool.update(&self.wallet_id, |w| {
            let (next, amount) = withdraw(w);
            moved = amount;
            next
        })?;

        let expires_at_ms = now_ms.saturating_add(lock_ms);
        self.withdrawal = WithdrawalLock::Locked {
            lock_id,
            wallet_id: self.wallet_id.clone(),
            amount: moved,
            requested_at_ms: now_ms,
            expires_at_ms,
        };

        Ok(WithdrawalReceipt {
            wallet_id: self.wallet_id.clone(),
            amount: moved,
            lock_id,
            requested_at_ms: now_ms,
            expires_at_ms,
        })
    }

    /// Lock expiry: pending funds leave the pool and withdrawal re-enables.
    pub fn release_withdrawal(
        &mut self,
        pool: &mut Pool,
        lock_id: u64,
        now_ms: u64,
    ) -> Result<ReleaseReceipt, String> {
        let (wallet_id, expires_at_ms) = match &self.withdrawal {
            WithdrawalLock::Locked { lock_id: current, wallet_id, expires_at_ms, .. } => {
                if *current != lock_id {
                    return Err(format!(
                        "Lock id mismatch: expected {} but got {}",
                        current, lock_id
                    ));
                }
                (wallet_id.clone(), *expires_at_ms)
            }
            WithdrawalLock::Unlocked => {
                return Err(format!("No outstanding withdrawal lock (got {})", lock_id));
            }
        };

        if now_ms < expires_at_ms {
            return Err(format!(
                "Withdrawal lock has not expired ({} ms remaining)",
                expires_at_ms - now_ms
            ));
        }

        let mut released = 0;
        pool.update(&wallet_id, |w| {
            released = w.pending_withdrawals;
            Wallet { pending_withdrawals: 0, ..w.clone() }
        })?;
        self.withdrawal = WithdrawalLock::Unlocked;

        Ok(ReleaseReceipt {
            wallet_id,
            lock_id,
            amount: released,
        })
    }

    fn wallet<'a>(&self, pool: &'a Pool) -> Result<&'a Wallet, String> {
        pool.get(&self.wallet_id)
            .ok_or_else(|| format!("Unknown wallet: {}", self.wallet_id))
    }

    fn require_dialog(&self) -> Result<(), String> {
        if !self.restake_open {
            return Err("Re-stake dialog is not open".to_string());
        }
        Ok(())
    }

    fn close_dialog(&mut self) {
        self.restake_open = false;
        self.selection = ReStakeSelection::default();
    }
}
