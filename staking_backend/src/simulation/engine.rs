// =============================================================================
// STAKING ENGINE
// =============================================================================
// Single authoritative store for the simulation. Ticks and user actions are
// both commands, applied one at a time in FIFO order against the same pool.
// There is no second copy of the connected wallet anywhere.

use candid::{CandidType, Deserialize};
use serde::Serialize;
use std::collections::VecDeque;

use super::accrual::{accrue_all, AccrualParams};
use super::audit::AuditLog;
use super::clock::SimulatedClock;
use super::command::{Command, Event};
use super::config::StakingConfig;
use super::ledger::{compute_ttp, Pool};
use super::session::Session;
use super::statistics::{ApyInfo, DaySnapshot, SnapshotHistory};
use crate::types::{PoolStats, Wallet, WalletId, WalletView, WithdrawalLock};

/// Running totals for everything that enters or leaves the pool.
#[derive(CandidType, Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolTotals {
    pub total_yield_minted: u64,
    pub total_released: u64,
    pub total_restaked: u64,
    pub withdrawals_requested: u64,
}

#[derive(Clone, Debug)]
pub struct StakingEngine {
    config: StakingConfig,
    params: AccrualParams,
    pool: Pool,
    clock: SimulatedClock,
    session: Option<Session>,
    queue: VecDeque<Command>,
    next_lock_id: u64,
    totals: PoolTotals,
    initial_holdings: u128,
    audit: AuditLog,
    history: SnapshotHistory,
}

fn no_session() -> String {
    "No wallet connected".to_string()
}

fn active(session: &mut Option<Session>) -> Result<&mut Session, String> {
    session.as_mut().ok_or_else(no_session)
}

impl StakingEngine {
    pub fn new(config: StakingConfig) -> Result<Self, String> {
        config.validate()?;
        let pool = Pool::new(&config.initial_wallets, config.token_price_e6)?;
        let initial_holdings = pool.wallets().iter().map(Wallet::total_holdings).sum();

        Ok(Self {
            params: AccrualParams::from(&config),
            clock: SimulatedClock::new(config.staking_period_days),
            history: SnapshotHistory::new(config.staking_period_days as usize + 1),
            pool,
            session: None,
            queue: VecDeque::new(),
            next_lock_id: 1,
            totals: PoolTotals::default(),
            initial_holdings,
            audit: AuditLog::default(),
            config,
        })
    }

    // =========================================================================
    // COMMAND QUEUE
    // =========================================================================

    pub fn submit(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    pub fn process_next(&mut self) -> Option<Result<Event, String>> {
        let command = self.queue.pop_front()?;
        Some(self.apply(command))
    }

    pub fn drain(&mut self) -> Vec<Result<Event, String>> {
        let mut results = Vec::with_capacity(self.queue.len());
        while let Some(result) = self.process_next() {
            results.push(result);
        }
        results
    }

    /// Submit and drain; returns the result of `command` itself.
    pub fn execute(&mut self, command: Command) -> Result<Event, String> {
        self.submit(command);
        self.drain()
            .pop()
            .unwrap_or_else(|| Err("Command queue was empty".to_string()))
    }

    fn apply(&mut self, command: Command) -> Result<Event, String> {
        let event = match command {
            Command::Tick => self.tick()?,
            Command::Connect { wallet_id } => self.connect(wallet_id)?,
            Command::OpenReStake => {
                let options = active(&mut self.session)?.open_restake(&self.pool)?;
                Event::ReStakeOpened { options }
            }
            Command::ToggleReStake { component } => {
                let selection = active(&mut self.session)?.toggle_restake(component)?;
                Event::ReStakeToggled { selection }
            }
            Command::CancelReStake => {
                active(&mut self.session)?.cancel_restake()?;
                Event::ReStakeCancelled
            }
            Command::ConfirmReStake => {
                let receipt = active(&mut self.session)?.confirm_restake(&mut self.pool)?;
                self.totals.total_restaked = self.totals.total_restaked.saturating_add(receipt.amount);
                Event::ReStaked {
                    wallet_id: receipt.wallet.id,
                    amount: receipt.amount,
                    selection: receipt.selection,
                    cancelled_lock: receipt.cancelled_lock,
                }
            }
            Command::RequestWithdrawal { now_ms } => {
                let lock_id = self.next_lock_id;
                let receipt = active(&mut self.session)?.request_withdrawal(
                    &mut self.pool,
                    lock_id,
                    now_ms,
                    self.config.withdrawal_lock_ms,
                )?;
                self.next_lock_id += 1;
                self.totals.withdrawals_requested += 1;
                Event::WithdrawalRequested { receipt }
            }
            Command::ReleaseWithdrawal { lock_id, now_ms } => {
                let session = self
                    .session
                    .as_mut()
                    .ok_or_else(|| format!("No outstanding withdrawal lock (got {})", lock_id))?;
                let receipt = session.release_withdrawal(&mut self.pool, lock_id, now_ms)?;
                self.totals.total_released = self.totals.total_released.saturating_add(receipt.amount);
                Event::WithdrawalReleased {
                    wallet_id: receipt.wallet_id,
                    lock_id: receipt.lock_id,
                    amount: receipt.amount,
                }
            }
        };

        if event.is_auditable() {
            self.audit.record(self.clock.ticks(), self.clock.day(), event.clone());
        }
        Ok(event)
    }

    fn tick(&mut self) -> Result<Event, String> {
        let mut clock = self.clock.clone();
        let day = clock.advance();
        let tick = clock.ticks();

        let outcome = accrue_all(self.pool.wallets(), day, tick, &self.params);
        let (yield_minted, vested_total, vesting_fired) =
            (outcome.yield_minted, outcome.vested_total, outcome.vesting_fired);

        // Commit state changes
        self.pool.replace_all(outcome.wallets)?;
        self.clock = clock;
        self.totals.total_yield_minted = self.totals.total_yield_minted.saturating_add(yield_minted);
        self.history.record(DaySnapshot {
            tick,
            day,
            ttp: self.pool.ttp().clone(),
            tvl_e6: self.pool.tvl_e6().clone(),
            yield_minted,
            vested_this_tick: vested_total,
        });

        Ok(Event::DayAdvanced {
            tick,
            day,
            yield_minted,
            vested_total,
            vesting_fired,
        })
    }

    fn connect(&mut self, wallet_id: WalletId) -> Result<Event, String> {
        if let Some(session) = &self.session {
            return Ok(Event::Connected {
                wallet_id: session.wallet_id().to_string(),
                already_connected: true,
            });
        }
        if !self.pool.contains(&wallet_id) {
            return Err(format!("Unknown wallet: {}", wallet_id));
        }
        self.session = Some(Session::new(wallet_id.clone()));
        Ok(Event::Connected {
            wallet_id,
            already_connected: false,
        })
    }

    // =========================================================================
    // VIEWS
    // =========================================================================

    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn clock(&self) -> &SimulatedClock {
        &self.clock
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn totals(&self) -> PoolTotals {
        self.totals
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Withdraw is enabled only for a connected wallet with no outstanding lock.
    pub fn can_withdraw(&self) -> bool {
        self.session.as_ref().map_or(false, Session::can_withdraw)
    }

    pub fn pool_stats(&self, is_running: bool) -> PoolStats {
        PoolStats {
            tvl_e6: self.pool.tvl_e6().clone(),
            ttp: self.pool.ttp().clone(),
            apy_percent: self.config.annual_percentage_yield,
            daily_interest_rate_bps: self.config.daily_interest_rate_bps,
            token_price_e6: self.pool.token_price_e6(),
            day: self.clock.day(),
            days_to_maturity: self.clock.days_to_maturity(),
            ticks: self.clock.ticks(),
            wallet_count: self.pool.len() as u64,
            total_yield_minted: self.totals.total_yield_minted,
            total_released: self.totals.total_released,
            is_running,
        }
    }

    pub fn wallet_view(&self, id: &str) -> Option<WalletView> {
        let wallet = self.pool.get(id)?;
        let session = self.session.as_ref().filter(|s| s.wallet_id() == id);
        Some(WalletView {
            id: wallet.id.clone(),
            staked: wallet.staked,
            yield_earned: wallet.yield_earned,
            vested: wallet.vested,
            pending_withdrawals: wallet.pending_withdrawals,
            current_balance: wallet.active_balance(),
            can_withdraw: session.map_or(false, Session::can_withdraw),
            withdrawal_unlocks_at_ms: session.and_then(|s| s.withdrawal().expires_at_ms()),
        })
    }

    /// The connected wallet, if any
    pub fn my_wallet(&self) -> Option<WalletView> {
        let session = self.session.as_ref()?;
        self.wallet_view(session.wallet_id())
    }

    pub fn apy_info(&self, days: Option<u32>) -> ApyInfo {
        self.history.apy_info(days, self.config.annual_percentage_yield)
    }

    /// Conservation, fresh aggregates and lock ownership.
    pub fn check_invariants(&self) -> Result<String, String> {
        let holdings: u128 = self.pool.wallets().iter().map(Wallet::total_holdings).sum();
        let expected = (self.initial_holdings + self.totals.total_yield_minted as u128)
            .checked_sub(self.totals.total_released as u128);
        if expected != Some(holdings) {
            return Err(format!(
                "Conservation FAILED: holdings {} != initial {} + minted {} - released {}",
                holdings, self.initial_holdings, self.totals.total_yield_minted, self.totals.total_released
            ));
        }

        let fresh = compute_ttp(self.pool.wallets());
        if &fresh != self.pool.ttp() {
            return Err(format!("TTP drift: stored {} but recomputed {}", self.pool.ttp(), fresh));
        }

        if let Some(session) = &self.session {
            if let WithdrawalLock::Locked { wallet_id, .. } = session.withdrawal() {
                if wallet_id != session.wallet_id() {
                    return Err(format!(
                        "Lock held for {} but session wallet is {}",
                        wallet_id,
                        session.wallet_id()
                    ));
                }
            }
        }

        Ok(format!(
            "Invariants hold: holdings {} = initial {} + minted {} - released {}",
            holdings, self.initial_holdings, self.totals.total_yield_minted, self.totals.total_released
        ))
    }
}
