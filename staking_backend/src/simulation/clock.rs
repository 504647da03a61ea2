// =============================================================================
// SIMULATED CLOCK
// =============================================================================
// One tick = one simulated day. The day counter runs over 0..=period and wraps
// back to 0 on the tick after it reaches the period (the pool "matures" on
// day == period, then a new staking period begins).

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulatedClock {
    day: u32,
    period: u32,
    ticks: u64,
}

impl SimulatedClock {
    pub fn new(period: u32) -> Self {
        Self { day: 0, period, ticks: 0 }
    }

    /// Advance one day and return the new day counter.
    pub fn advance(&mut self) -> u32 {
        self.day = if self.day >= self.period { 0 } else { self.day + 1 };
        self.ticks += 1;
        self.day
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Total ticks since the simulation started (never wraps).
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn days_to_maturity(&self) -> u32 {
        self.period.saturating_sub(self.day)
    }
}
