use candid::Nat;
use std::collections::VecDeque;

use super::types::{ApyInfo, DaySnapshot};
use crate::simulation::fixed_point::{nat_to_f64, nat_zero};

/// Maximum days allowed for APY calculation
pub const MAX_APY_DAYS: u32 = 365;

#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotHistory {
    entries: VecDeque<DaySnapshot>,
    capacity: usize,
}

impl SnapshotHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1_024)),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, snapshot: DaySnapshot) {
        // Same tick twice would double count yield in APY windows
        if self.entries.back().map(|last| last.tick) == Some(snapshot.tick) {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&DaySnapshot> {
        self.entries.back()
    }

    /// Most recent `limit` snapshots in chronological order
    pub fn recent(&self, limit: u32) -> Vec<DaySnapshot> {
        let start = self.entries.len().saturating_sub(limit as usize);
        self.entries.iter().skip(start).cloned().collect()
    }

    /// Realized APY over the last `days` ticks (default 7, capped at `MAX_APY_DAYS`).
    ///
    /// ```text
    /// realized_apy = (yield_minted / ttp_at_window_start) * (365 / days) * 100
    /// ```
    pub fn apy_info(&self, days: Option<u32>, advertised_apy_percent: f64) -> ApyInfo {
        let days = days.unwrap_or(7).clamp(1, MAX_APY_DAYS) as usize;
        let len = self.entries.len();
        if len == 0 {
            return ApyInfo {
                advertised_apy_percent,
                ..ApyInfo::default()
            };
        }

        let use_days = days.min(len);
        let start_idx = len - use_days;

        let total_yield_minted = self
            .entries
            .iter()
            .skip(start_idx)
            .fold(0u64, |acc, s| acc.saturating_add(s.yield_minted));

        // Pooled tokens just before the window opened
        let start_ttp: Nat = if start_idx > 0 {
            self.entries[start_idx - 1].ttp.clone()
        } else {
            let first = &self.entries[0];
            if first.ttp > Nat::from(first.yield_minted) {
                first.ttp.clone() - Nat::from(first.yield_minted)
            } else {
                nat_zero()
            }
        };

        let start = nat_to_f64(&start_ttp);
        let realized_apy_percent = if start > 0.0 {
            (total_yield_minted as f64 / start) * (365.0 / use_days as f64) * 100.0
        } else {
            0.0
        };

        ApyInfo {
            realized_apy_percent,
            advertised_apy_percent,
            days_calculated: use_days as u32,
            total_yield_minted,
        }
    }
}
