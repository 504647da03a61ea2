// Integration tests for complete dashboard journeys
//
// These drive the engine through the same command sequences the canister
// endpoints and timers produce, tick by tick.

pub mod restake_journey;
pub mod withdrawal_lock;
