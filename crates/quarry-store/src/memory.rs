//! In-memory record store

use crate::StoreError;
use quarry_domain::traits::{RecordQuery, RecordStats, RecordStore};
use quarry_domain::{RecordId, ScoredRecord};
use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Default)]
struct Log {
    records: Vec<ScoredRecord>,
    ids: HashSet<RecordId>,
}

/// `RwLock`-guarded, insertion-ordered record store
///
/// Appends take the write lock for the duration of a single `push`, so a
/// reader sees either the whole record or none of it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    log: RwLock<Log>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Log>, StoreError> {
        self.log.read().map_err(|_| StoreError::Poisoned)
    }
}

impl RecordStore for MemoryStore {
    type Error = StoreError;

    fn append(&self, record: ScoredRecord) -> Result<RecordId, Self::Error> {
        record.validate()?;

        let mut log = self.log.write().map_err(|_| StoreError::Poisoned)?;
        if !log.ids.insert(record.id) {
            return Err(StoreError::Duplicate(record.id.to_string()));
        }

        let id = record.id;
        log.records.push(record);
        tracing::debug!("Appended record {} ({} total)", id, log.records.len());
        Ok(id)
    }

    fn read_recent(&self, n: usize) -> Result<Vec<ScoredRecord>, Self::Error> {
        Ok(self.read()?.records.iter().rev().take(n).cloned().collect())
    }

    fn read_range(&self, start_ms: u64, end_ms: u64) -> Result<Vec<ScoredRecord>, Self::Error> {
        let mut matching: Vec<ScoredRecord> = self
            .read()?
            .records
            .iter()
            .filter(|r| r.timestamp >= start_ms && r.timestamp <= end_ms)
            .cloned()
            .collect();

        // Stable sort keeps insertion order among equal timestamps
        matching.sort_by_key(|r| r.timestamp);
        Ok(matching)
    }

    fn count(&self) -> Result<usize, Self::Error> {
        Ok(self.read()?.records.len())
    }

    fn stats(&self) -> Result<RecordStats, Self::Error> {
        let log = self.read()?;
        let records = &log.records;
        if records.is_empty() {
            return Ok(RecordStats::default());
        }

        let count = records.len();
        let relevance: f64 = records.iter().map(|r| r.relevance_score).sum();
        let confidence: f64 = records.iter().map(|r| r.confidence_score).sum();

        Ok(RecordStats {
            count,
            mean_relevance: relevance / count as f64,
            mean_confidence: confidence / count as f64,
        })
    }

    fn query_records(&self, query: &RecordQuery) -> Result<Vec<ScoredRecord>, Self::Error> {
        let log = self.read()?;
        let limit = query.limit.unwrap_or(usize::MAX);

        Ok(log
            .records
            .iter()
            .rev()
            .filter(|r| query.min_relevance.map_or(true, |min| r.relevance_score >= min))
            .skip(query.offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
