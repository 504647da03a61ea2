//! Withdrawal lock protocol tests
//!
//! Withdraw → Locked → (one-shot timer) → Unlocked, driven by a simulated
//! wall clock and a timer driver that fires one-shots when they come due,
//! the same way the canister runtime wires engine events to the scheduler.

use std::time::Duration;

use crate::simulation::command::{Command, Event};
use crate::simulation::config::StakingConfig;
use crate::simulation::engine::StakingEngine;
use crate::simulation::fixed_point::tokens;
use crate::simulation::scheduler::{Scheduler, TimerDriver, TimerEffect};
use crate::types::{ReStakeComponent, Wallet, WalletSeed};

// =============================================================================
// SIMULATED TIMERS
// =============================================================================

#[derive(Default)]
struct VirtualTimers {
    now_ms: u64,
    next_handle: u64,
    interval: Option<u64>,
    oneshots: Vec<(u64, u64, u64)>, // (handle, lock_id, due_ms)
}

impl TimerDriver for VirtualTimers {
    type Handle = u64;

    fn every(&mut self, _interval: Duration) -> u64 {
        self.next_handle += 1;
        self.interval = Some(self.next_handle);
        self.next_handle
    }

    fn once(&mut self, delay: Duration, lock_id: u64) -> u64 {
        self.next_handle += 1;
        self.oneshots.push((self.next_handle, lock_id, self.now_ms + delay.as_millis() as u64));
        self.next_handle
    }

    fn clear(&mut self, handle: u64) {
        if self.interval == Some(handle) {
            self.interval = None;
        }
        self.oneshots.retain(|(h, _, _)| *h != handle);
    }
}

struct Harness {
    engine: StakingEngine,
    scheduler: Scheduler<VirtualTimers>,
    now_ms: u64,
    releases: Vec<Event>,
}

impl Harness {
    fn new(config: StakingConfig) -> Self {
        let interval = Duration::from_millis(config.tick_interval_ms);
        let mut scheduler = Scheduler::new(VirtualTimers::default());
        scheduler.start(interval);
        Self {
            engine: StakingEngine::new(config).unwrap(),
            scheduler,
            now_ms: 0,
            releases: Vec::new(),
        }
    }

    fn dispatch(&mut self, command: Command) -> Result<Event, String> {
        let event = self.engine.execute(command)?;
        self.scheduler.apply(TimerEffect::of(&event));
        Ok(event)
    }

    /// One second of wall clock: due one-shots fire, then the tick timer.
    fn step(&mut self) {
        self.now_ms += 1_000;
        let now_ms = self.now_ms;

        let due: Vec<u64> = {
            let timers = self.driver_mut();
            timers.now_ms = now_ms;
            let due: Vec<u64> = timers
                .oneshots
                .iter()
                .filter(|(_, _, at)| *at <= now_ms)
                .map(|(_, lock_id, _)| *lock_id)
                .collect();
            timers.oneshots.retain(|(_, _, at)| *at > now_ms);
            due
        };
        for lock_id in due {
            if let Ok(event) = self.dispatch(Command::ReleaseWithdrawal { lock_id, now_ms }) {
                self.releases.push(event);
            }
        }

        if self.scheduler.is_running() {
            self.dispatch(Command::Tick).unwrap();
        }
    }

    fn withdraw(&mut self) -> Result<Event, String> {
        self.dispatch(Command::RequestWithdrawal { now_ms: self.now_ms })
    }

    fn driver_mut(&mut self) -> &mut VirtualTimers {
        self.scheduler.driver_mut()
    }
}

fn harness() -> Harness {
    let config = StakingConfig {
        initial_wallets: vec![WalletSeed { id: "W1".to_string(), staked: tokens(1000) }],
        ..StakingConfig::default()
    };
    let mut h = Harness::new(config);
    h.dispatch(Command::Connect { wallet_id: "W1".to_string() }).unwrap();
    h
}

fn wallet(h: &Harness) -> Wallet {
    h.engine.pool().get("W1").unwrap().clone()
}

// =============================================================================
// TESTS
// =============================================================================

#[test]
fn test_release_after_72_ticks_exactly_once() {
    let mut h = harness();
    for _ in 0..50 {
        h.step();
    }
    let earned = wallet(&h).yield_earned + wallet(&h).vested;
    assert_eq!(earned, tokens(50));

    h.withdraw().unwrap();
    assert_eq!(wallet(&h).pending_withdrawals, tokens(50));
    assert!(!h.engine.can_withdraw());

    for _ in 0..71 {
        h.step();
    }
    assert_eq!(wallet(&h).pending_withdrawals, tokens(50));
    assert!(h.releases.is_empty());

    h.step();
    assert_eq!(wallet(&h).pending_withdrawals, 0);
    assert!(h.engine.can_withdraw());
    assert_eq!(h.releases.len(), 1);

    for _ in 0..200 {
        h.step();
    }
    assert_eq!(h.releases.len(), 1);
    assert_eq!(h.engine.totals().total_released, tokens(50));
    h.engine.check_invariants().unwrap();
}

#[test]
fn test_withdraw_button_disabled_until_release() {
    let mut h = harness();
    h.step();
    h.withdraw().unwrap();

    for _ in 0..10 {
        h.step();
        let err = h.withdraw().unwrap_err();
        assert!(err.contains("already pending"));
    }
    // Yield kept accruing under the lock but stays put
    assert_eq!(wallet(&h).yield_earned, tokens(10));
}

#[test]
fn test_withdraw_example_balances() {
    let mut h = harness();
    // 70 BCRE earned in total, split between yield and vested by days 30 and 60
    for _ in 0..70 {
        h.step();
    }
    let w = wallet(&h);
    assert_eq!(w.yield_earned + w.vested, tokens(70));

    let event = h.withdraw().unwrap();
    assert!(matches!(event, Event::WithdrawalRequested { ref receipt } if receipt.amount == tokens(70)));
    let w = wallet(&h);
    assert_eq!((w.staked, w.yield_earned, w.vested, w.pending_withdrawals), (tokens(1000), 0, 0, tokens(70)));
}

#[test]
fn test_restaking_pending_clears_timer() {
    let mut h = harness();
    for _ in 0..20 {
        h.step();
    }
    h.withdraw().unwrap();
    assert_eq!(h.scheduler.armed_release(), Some(1));

    h.dispatch(Command::OpenReStake).unwrap();
    h.dispatch(Command::ToggleReStake { component: ReStakeComponent::PendingWithdrawals }).unwrap();
    h.dispatch(Command::ConfirmReStake).unwrap();

    assert_eq!(h.scheduler.armed_release(), None);
    assert!(h.scheduler.driver().oneshots.is_empty());
    assert_eq!(wallet(&h).staked, tokens(1020));

    for _ in 0..100 {
        h.step();
    }
    assert!(h.releases.is_empty());
    h.engine.check_invariants().unwrap();
}

#[test]
fn test_second_lock_after_release_gets_new_timer() {
    let mut h = harness();
    h.step();
    h.withdraw().unwrap();
    for _ in 0..72 {
        h.step();
    }
    assert_eq!(h.releases.len(), 1);

    h.withdraw().unwrap();
    assert_eq!(h.scheduler.armed_release(), Some(2));
    for _ in 0..72 {
        h.step();
    }
    assert_eq!(h.releases.len(), 2);
    assert_eq!(h.scheduler.armed_release(), None);
}

#[test]
fn test_pause_stops_ticks_but_not_release() {
    let mut h = harness();
    h.step();
    h.withdraw().unwrap();
    assert!(h.scheduler.stop());

    let ticks = h.engine.clock().ticks();
    for _ in 0..80 {
        h.step();
    }
    assert_eq!(h.engine.clock().ticks(), ticks);
    assert_eq!(h.releases.len(), 1);
    assert_eq!(wallet(&h).pending_withdrawals, 0);
}
