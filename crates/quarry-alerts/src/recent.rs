//! Bounded window of recently emitted fingerprints

use quarry_domain::Fingerprint;
use std::collections::VecDeque;

/// Fingerprints of emitted alerts, oldest first
///
/// Holds at most `capacity` entries; recording past capacity evicts the
/// oldest.
#[derive(Debug, Clone)]
pub struct RecentAlerts {
    capacity: usize,
    entries: VecDeque<(Fingerprint, u64)>,
}

impl RecentAlerts {
    /// Create an empty window
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Maximum number of remembered fingerprints
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of remembered fingerprints
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is remembered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `fingerprint` was emitted within `cooldown_ms` of `now_ms`
    pub fn emitted_within(&self, fingerprint: &Fingerprint, now_ms: u64, cooldown_ms: u64) -> bool {
        self.entries
            .iter()
            .rev()
            .any(|(fp, at)| fp == fingerprint && now_ms.saturating_sub(*at) < cooldown_ms)
    }

    /// Remember an emitted fingerprint
    pub fn record(&mut self, fingerprint: Fingerprint, now_ms: u64) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((fingerprint, now_ms));
    }

    /// Forget fingerprints older than the cooldown; returns how many were dropped
    pub fn prune(&mut self, now_ms: u64, cooldown_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|(_, at)| now_ms.saturating_sub(*at) < cooldown_ms);
        before - self.entries.len()
    }
}
