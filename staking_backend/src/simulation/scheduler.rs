// =============================================================================
// TIMER SCHEDULER
// =============================================================================
// Owns every timer handle the canister holds: one repeating tick timer and at
// most one one-shot withdrawal release timer. Handles are kept so they can be
// cleared on pause, upgrade, and when a lock is cancelled by re-staking.

use std::fmt::Debug;
use std::time::Duration;

use super::command::Event;

pub trait TimerDriver {
    type Handle: Copy + PartialEq + Debug;

    /// Repeating timer that drives `Command::Tick`
    fn every(&mut self, interval: Duration) -> Self::Handle;

    /// One-shot timer that releases `lock_id`
    fn once(&mut self, delay: Duration, lock_id: u64) -> Self::Handle;

    fn clear(&mut self, handle: Self::Handle);
}

/// Timer side effect implied by an engine event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEffect {
    Nothing,
    ArmRelease { lock_id: u64, delay: Duration },
    CancelRelease { lock_id: u64 },
    Released { lock_id: u64 },
}

impl TimerEffect {
    pub fn of(event: &Event) -> Self {
        match event {
            Event::WithdrawalRequested { receipt } => TimerEffect::ArmRelease {
                lock_id: receipt.lock_id,
                delay: Duration::from_millis(
                    receipt.expires_at_ms.saturating_sub(receipt.requested_at_ms),
                ),
            },
            Event::ReStaked { cancelled_lock: Some(lock_id), .. } => {
                TimerEffect::CancelRelease { lock_id: *lock_id }
            }
            Event::WithdrawalReleased { lock_id, .. } => TimerEffect::Released { lock_id: *lock_id },
            _ => TimerEffect::Nothing,
        }
    }
}

pub struct Scheduler<D: TimerDriver> {
    driver: D,
    tick_timer: Option<D::Handle>,
    release_timer: Option<(u64, D::Handle)>,
}

impl<D: TimerDriver> Scheduler<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            tick_timer: None,
            release_timer: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.tick_timer.is_some()
    }

    /// Start ticking. Returns false if already running.
    pub fn start(&mut self, interval: Duration) -> bool {
        if self.tick_timer.is_some() {
            return false;
        }
        self.tick_timer = Some(self.driver.every(interval));
        true
    }

    /// Stop ticking. An armed release timer keeps running.
    pub fn stop(&mut self) -> bool {
        match self.tick_timer.take() {
            Some(handle) => {
                self.driver.clear(handle);
                true
            }
            None => false,
        }
    }

    /// Clear every handle
    pub fn teardown(&mut self) {
        self.stop();
        if let Some((_, handle)) = self.release_timer.take() {
            self.driver.clear(handle);
        }
    }

    pub fn arm_release(&mut self, lock_id: u64, delay: Duration) {
        if let Some((_, old)) = self.release_timer.take() {
            self.driver.clear(old);
        }
        let handle = self.driver.once(delay, lock_id);
        self.release_timer = Some((lock_id, handle));
    }

    /// Clear the release timer if it belongs to `lock_id`
    pub fn cancel_release(&mut self, lock_id: u64) -> bool {
        match self.release_timer {
            Some((armed, handle)) if armed == lock_id => {
                self.driver.clear(handle);
                self.release_timer = None;
                true
            }
            _ => false,
        }
    }

    pub fn armed_release(&self) -> Option<u64> {
        self.release_timer.map(|(lock_id, _)| lock_id)
    }

    pub fn apply(&mut self, effect: TimerEffect) {
        match effect {
            TimerEffect::Nothing => {}
            TimerEffect::ArmRelease { lock_id, delay } => self.arm_release(lock_id, delay),
            TimerEffect::CancelRelease { lock_id } => {
                self.cancel_release(lock_id);
            }
            // One-shot already fired; only forget the handle
            TimerEffect::Released { lock_id } => {
                if self.armed_release() == Some(lock_id) {
                    self.release_timer = None;
                }
            }
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
