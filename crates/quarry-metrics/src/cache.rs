//! Time-bounded single-value cache

use crate::MetricsError;
use quarry_domain::Clock;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
struct Entry<T> {
    value: T,
    stored_at_ms: u64,
}

/// Holds one computed value until it expires or is invalidated
///
/// Expiry reads the injected clock, so tests can step past the TTL
/// without sleeping.
///
/// # Examples
///
/// ```
/// use quarry_domain::ManualClock;
/// use quarry_metrics::ExpiringCache;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = ManualClock::new(0);
/// let cache = ExpiringCache::new(Duration::from_secs(60), Arc::new(clock.clone()));
///
/// let v = cache.get_or_try_insert_with(|| Ok::<_, quarry_metrics::MetricsError>(1)).unwrap();
/// assert_eq!(v, 1);
/// assert_eq!(cache.get().unwrap(), Some(1));
///
/// clock.advance(Duration::from_secs(61));
/// assert_eq!(cache.get().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct ExpiringCache<T> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<Entry<T>>>,
}

impl<T: Clone> ExpiringCache<T> {
    /// Create an empty cache
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(None),
        }
    }

    /// Time-to-live of a stored value
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value if present and fresh
    pub fn get(&self) -> Result<Option<T>, MetricsError> {
        let now_ms = self.clock.now_millis();
        let slot = self.slot.lock().map_err(|_| MetricsError::Poisoned)?;
        Ok(slot
            .as_ref()
            .filter(|entry| self.is_fresh(entry, now_ms))
            .map(|entry| entry.value.clone()))
    }

    /// Cached value, or compute and store a new one
    ///
    /// The lock is held while `compute` runs, so concurrent misses compute
    /// once. A failed computation leaves the cache empty.
    pub fn get_or_try_insert_with<F, E>(&self, compute: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<MetricsError>,
    {
        let now_ms = self.clock.now_millis();
        let mut slot = self.slot.lock().map_err(|_| MetricsError::Poisoned)?;

        if let Some(entry) = slot.as_ref().filter(|entry| self.is_fresh(entry, now_ms)) {
            tracing::debug!("Metrics cache hit");
            return Ok(entry.value.clone());
        }

        tracing::debug!("Metrics cache miss");
        *slot = None;
        let value = compute()?;
        *slot = Some(Entry {
            value: value.clone(),
            stored_at_ms: now_ms,
        });
        Ok(value)
    }

    /// Drop the cached value
    pub fn invalidate(&self) -> Result<(), MetricsError> {
        let mut slot = self.slot.lock().map_err(|_| MetricsError::Poisoned)?;
        *slot = None;
        Ok(())
    }

    fn is_fresh(&self, entry: &Entry<T>, now_ms: u64) -> bool {
        now_ms.saturating_sub(entry.stored_at_ms) < self.ttl.as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_domain::ManualClock;
    use std::cell::Cell;

    fn cache() -> (ExpiringCache<u32>, ManualClock) {
        let clock = ManualClock::new(1_000);
        let cache = ExpiringCache::new(Duration::from_secs(300), Arc::new(clock.clone()));
        (cache, clock)
    }

    #[test]
    fn test_computes_once_while_fresh() {
        let (cache, clock) = cache();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, MetricsError>(7)
        };

        assert_eq!(cache.get_or_try_insert_with(compute).unwrap(), 7);
        clock.advance(Duration::from_secs(299));
        assert_eq!(cache.get_or_try_insert_with(compute).unwrap(), 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_expires_after_ttl() {
        let (cache, clock) = cache();
        cache.get_or_try_insert_with(|| Ok::<_, MetricsError>(1)).unwrap();
        clock.advance(Duration::from_secs(300));
        assert_eq!(cache.get().unwrap(), None);
        assert_eq!(cache.get_or_try_insert_with(|| Ok::<_, MetricsError>(2)).unwrap(), 2);
    }

    #[test]
    fn test_invalidate() {
        let (cache, _) = cache();
        cache.get_or_try_insert_with(|| Ok::<_, MetricsError>(1)).unwrap();
        cache.invalidate().unwrap();
        assert_eq!(cache.get().unwrap(), None);
    }

    #[test]
    fn test_failed_compute_leaves_cache_empty() {
        let (cache, _) = cache();
        let result = cache.get_or_try_insert_with(|| Err::<u32, _>(MetricsError::Store("down".into())));
        assert!(result.is_err());
        assert_eq!(cache.get().unwrap(), None);
    }
}
