use candid::Nat;

use super::operations::{OpResult, Operation};
use crate::simulation::accrual::daily_yield;
use crate::simulation::command::Command;
use crate::simulation::config::StakingConfig;
use crate::simulation::engine::StakingEngine;
use crate::types::{Wallet, WithdrawalLock};

/// Drives a real `StakingEngine` and keeps shadow totals computed
/// independently, so drift in either shows up as an invariant failure.
pub struct SimulationModel {
    engine: StakingEngine,
    now_ms: u64,
    wallet_ids: Vec<String>,
    expected_holdings: u128,
    released: u128,
}

impl SimulationModel {
    pub fn new() -> Self {
        Self::with_config(StakingConfig::default())
    }

    pub fn with_config(config: StakingConfig) -> Self {
        let engine = StakingEngine::new(config).unwrap();
        let wallet_ids = engine.pool().ids();
        let expected_holdings = engine.pool().wallets().iter().map(Wallet::total_holdings).sum();
        Self {
            engine,
            now_ms: 0,
            wallet_ids,
            expected_holdings,
            released: 0,
        }
    }

    pub fn engine(&self) -> &StakingEngine {
        &self.engine
    }

    pub fn released(&self) -> u128 {
        self.released
    }

    fn current_lock(&self) -> Option<u64> {
        self.engine.session().and_then(|s| s.withdrawal().lock_id())
    }

    pub fn execute(&mut self, op: Operation) -> OpResult {
        let command = match op {
            Operation::Tick => {
                let rate = self.engine.config().daily_interest_rate_bps;
                let minted: u128 = self
                    .engine
                    .pool()
                    .wallets()
                    .iter()
                    .map(|w| daily_yield(w.staked, rate) as u128)
                    .sum();
                let result = self.run(Command::Tick);
                if result == OpResult::Success {
                    self.expected_holdings += minted;
                }
                return result;
            }
            Operation::Connect { wallet } => {
                let wallet_id = self.wallet_ids[wallet % self.wallet_ids.len()].clone();
                Command::Connect { wallet_id }
            }
            Operation::OpenReStake => Command::OpenReStake,
            Operation::Toggle { component } => Command::ToggleReStake { component },
            Operation::CancelReStake => Command::CancelReStake,
            Operation::ConfirmReStake => Command::ConfirmReStake,
            Operation::Withdraw => Command::RequestWithdrawal { now_ms: self.now_ms },
            Operation::AdvanceTime { ms } => {
                self.now_ms = self.now_ms.saturating_add(ms);
                return OpResult::Success;
            }
            Operation::FireRelease => match self.current_lock() {
                Some(lock_id) => Command::ReleaseWithdrawal { lock_id, now_ms: self.now_ms },
                None => return OpResult::NoLock,
            },
            Operation::FireStaleRelease { lock_id } => {
                Command::ReleaseWithdrawal { lock_id, now_ms: self.now_ms }
            }
        };

        let pending_before: u128 = self
            .engine
            .pool()
            .wallets()
            .iter()
            .map(|w| w.pending_withdrawals as u128)
            .sum();
        let is_release = matches!(command, Command::ReleaseWithdrawal { .. });

        let result = self.run(command);
        if is_release && result == OpResult::Success {
            self.expected_holdings -= pending_before;
            self.released += pending_before;
        }
        result
    }

    fn run(&mut self, command: Command) -> OpResult {
        match self.engine.execute(command) {
            Ok(_) => OpResult::Success,
            Err(e) => OpResult::from_error(&e),
        }
    }

    pub fn check_invariant(&self) -> Result<(), String> {
        self.engine.check_invariants()?;

        let wallets = self.engine.pool().wallets();
        let holdings: u128 = wallets.iter().map(Wallet::total_holdings).sum();
        if holdings != self.expected_holdings {
            return Err(format!(
                "Shadow drift: holdings {} != expected {}",
                holdings, self.expected_holdings
            ));
        }

        let active: u128 = wallets.iter().map(|w| w.active_balance() as u128).sum();
        if self.engine.pool().ttp() != &Nat::from(active) {
            return Err(format!("TTP {} != active sum {}", self.engine.pool().ttp(), active));
        }

        // Pending funds only exist under an outstanding lock
        let session = self.engine.session();
        for w in wallets {
            let owns_lock = session
                .map(|s| s.wallet_id() == w.id && s.withdrawal().is_locked())
                .unwrap_or(false);
            if !owns_lock && w.pending_withdrawals != 0 {
                return Err(format!("{} has pending {} without a lock", w.id, w.pending_withdrawals));
            }
        }

        if let Some(s) = session {
            if s.can_withdraw() == s.withdrawal().is_locked() {
                return Err("can_withdraw disagrees with lock state".to_string());
            }
            if let WithdrawalLock::Locked { requested_at_ms, expires_at_ms, .. } = s.withdrawal() {
                let lock_ms = self.engine.config().withdrawal_lock_ms;
                if expires_at_ms - requested_at_ms != lock_ms {
                    return Err(format!("Lock length {} != {}", expires_at_ms - requested_at_ms, lock_ms));
                }
            }
        }

        let period = self.engine.config().staking_period_days;
        if self.engine.clock().day() > period {
            return Err(format!("Day {} beyond period {}", self.engine.clock().day(), period));
        }
        if self.engine.history().len() > period as usize + 1 {
            return Err("Snapshot history exceeded one period".to_string());
        }
        Ok(())
    }
}
