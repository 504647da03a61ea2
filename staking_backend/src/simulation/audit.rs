use candid::{CandidType, Deserialize};
use serde::Serialize;
use std::collections::VecDeque;

use super::command::Event;

pub const MAX_AUDIT_ENTRIES: usize = 1_000;

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AuditEntry {
    pub seq: u64,
    pub tick: u64,
    pub day: u32,
    pub event: Event,
}

/// Bounded event trail; oldest entries are evicted first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
    next_seq: u64,
    capacity: usize,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::with_capacity(MAX_AUDIT_ENTRIES)
    }
}

impl AuditLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            next_seq: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, tick: u64, day: u32, event: Event) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(AuditEntry { seq, tick, day, event });
        seq
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total entries ever recorded, evicted ones included
    pub fn total_recorded(&self) -> u64 {
        self.next_seq
    }

    /// Most recent `limit` entries, newest first
    pub fn recent(&self, limit: u32) -> Vec<AuditEntry> {
        self.entries.iter().rev().take(limit as usize).cloned().collect()
    }

    pub fn page(&self, offset: usize, limit: usize) -> Vec<AuditEntry> {
        self.entries.iter().skip(offset).take(limit).cloned().collect()
    }
}
