//! Canister-side state: the engine, the scheduler and the glue between them.
//!
//! Everything here touches the IC system API (time, timers, stdout). The
//! simulation itself lives in `simulation` and never does.

use std::cell::RefCell;
use std::time::Duration;

use crate::simulation::command::{Command, Event};
use crate::simulation::config::StakingConfig;
use crate::simulation::engine::StakingEngine;
use crate::simulation::scheduler::{Scheduler, TimerDriver, TimerEffect};
use ic_cdk_timers::TimerId;

thread_local! {
    static ENGINE: RefCell<Option<StakingEngine>> = const { RefCell::new(None) };
    static SCHEDULER: RefCell<Scheduler<IcTimers>> = RefCell::new(Scheduler::new(IcTimers));
}

/// `ic-cdk-timers` backed driver. Callbacks re-enter this module.
pub struct IcTimers;

impl TimerDriver for IcTimers {
    type Handle = TimerId;

    fn every(&mut self, interval: Duration) -> TimerId {
        ic_cdk_timers::set_timer_interval(interval, || async {
            on_tick();
        })
    }

    fn once(&mut self, delay: Duration, lock_id: u64) -> TimerId {
        ic_cdk_timers::set_timer(delay, async move {
            on_release(lock_id);
        })
    }

    fn clear(&mut self, handle: TimerId) {
        ic_cdk_timers::clear_timer(handle);
    }
}

fn not_initialized() -> String {
    "Simulation not initialized".to_string()
}

/// Wall clock in milliseconds
pub fn now_ms() -> u64 {
    ic_cdk::api::time() / 1_000_000
}

pub fn with_engine<R>(f: impl FnOnce(&StakingEngine) -> R) -> Result<R, String> {
    ENGINE.with(|e| e.borrow().as_ref().map(f).ok_or_else(not_initialized))
}

pub fn is_running() -> bool {
    SCHEDULER.with(|s| s.borrow().is_running())
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Build a fresh engine from `config` and start ticking.
pub fn install(config: StakingConfig) -> Result<(), String> {
    let engine = StakingEngine::new(config)?;
    let interval = Duration::from_millis(engine.config().tick_interval_ms);
    let wallets = engine.pool().len();
    let period = engine.config().staking_period_days;

    teardown();
    ENGINE.with(|e| *e.borrow_mut() = Some(engine));
    SCHEDULER.with(|s| s.borrow_mut().start(interval));

    ic_cdk::println!(
        "Staking: pool seeded with {} wallets, {}-day period, tick every {:?}",
        wallets,
        period,
        interval
    );
    Ok(())
}

pub fn teardown() {
    SCHEDULER.with(|s| s.borrow_mut().teardown());
}

pub fn pause() -> bool {
    let stopped = SCHEDULER.with(|s| s.borrow_mut().stop());
    if stopped {
        ic_cdk::println!("Staking: simulation paused");
    }
    stopped
}

pub fn resume() -> Result<bool, String> {
    let interval = with_engine(|e| Duration::from_millis(e.config().tick_interval_ms))?;
    let started = SCHEDULER.with(|s| s.borrow_mut().start(interval));
    if started {
        ic_cdk::println!("Staking: simulation resumed");
    }
    Ok(started)
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Run one command through the engine, then log it and apply its timer effect.
pub fn dispatch(command: Command) -> Result<Event, String> {
    let name = command.name();
    let result = ENGINE.with(|e| {
        let mut engine = e.borrow_mut();
        let engine = engine.as_mut().ok_or_else(not_initialized)?;
        engine.execute(command)
    });

    match &result {
        Ok(event) => {
            if event.is_auditable() {
                ic_cdk::println!("Staking: {}", event.describe());
            }
            let effect = TimerEffect::of(event);
            if effect != TimerEffect::Nothing {
                SCHEDULER.with(|s| s.borrow_mut().apply(effect));
            }
        }
        Err(e) => ic_cdk::println!("Staking: {} rejected: {}", name, e),
    }
    result
}

fn on_tick() {
    if let Err(e) = dispatch(Command::Tick) {
        ic_cdk::println!("Staking: tick failed: {}", e);
    }
}

fn on_release(lock_id: u64) {
    // Stale locks (cancelled by re-staking) are rejected by the engine
    let _ = dispatch(Command::ReleaseWithdrawal { lock_id, now_ms: now_ms() });
}
