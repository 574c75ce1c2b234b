//! In-memory TTL store with single-flight recomputation.
//!
//! Values are stored as `serde_json::Value`, so each call site declares the
//! concrete result type it expects while the store itself stays untyped.
//! A per-key in-flight table guarantees that at most one computation runs
//! per key at a time; concurrent callers for the same stale key await the
//! same result. Computations run on a spawned task, so a caller abandoning
//! its wait never cancels the computation other waiters depend on.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::Domain;
use crate::error::{CacheError, Error, Result};

/// Result shared between the executing caller and all waiters of one
/// computation round. Errors are reference-counted so every waiter
/// observes the same failure.
type FlightResult = std::result::Result<Value, Arc<Error>>;

/// A stored report with its own validity window.
struct Entry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_fresh(&self) -> bool {
        self.stored_at.elapsed() < self.ttl
    }
}

struct CacheInner {
    entries: Mutex<HashMap<String, Entry>>,
    inflight: Mutex<HashMap<String, broadcast::Sender<FlightResult>>>,
}

/// Process-wide report cache with per-entry TTL and single-flight
/// recomputation.
///
/// Construct one instance and pass a reference to whatever layer needs it;
/// fresh instances per test keep the TTL and invalidation properties
/// testable in isolation.
pub struct ReportCache {
    inner: Arc<CacheInner>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl ReportCache {
    /// Create a cache whose background expiry sweep runs at the given
    /// interval. A zero interval disables the sweep (useful in tests that
    /// control time themselves).
    pub fn new(sweep_interval: Duration) -> Self {
        let inner = Arc::new(CacheInner {
            entries: Mutex::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        });

        let sweeper = if sweep_interval.is_zero() {
            None
        } else {
            Some(spawn_sweeper(Arc::downgrade(&inner), sweep_interval))
        };

        Self {
            inner,
            sweeper: Mutex::new(sweeper),
        }
    }

    /// Return the cached value for `key`, recomputing it at most once per
    /// staleness event regardless of concurrent demand.
    ///
    /// If a non-stale entry exists its value is returned without invoking
    /// `compute`. Otherwise the first caller becomes the executor: its
    /// computation runs to completion on a spawned task and, on success,
    /// is stored with a fresh timestamp. Callers arriving while that
    /// computation is in flight await the same result. A failed
    /// computation writes nothing and surfaces to every caller of the
    /// round as [`CacheError::ComputationFailed`]; a later call retries.
    pub async fn get_or_compute<T, F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if key.is_empty() {
            return Err(CacheError::EmptyKey.into());
        }
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl.into());
        }

        // Fast path: fresh entry
        if let Some(value) = self.lookup(key) {
            log::debug!("Cache hit: {}", key);
            return Ok(serde_json::from_value(value)?);
        }

        let mut rx = {
            let mut flights = lock(&self.inner.inflight);

            if let Some(tx) = flights.get(key) {
                // Someone else is already computing this key
                tx.subscribe()
            } else {
                // A flight may have settled between the miss above and
                // taking the lock; its result is fresh enough to serve.
                if let Some(value) = self.lookup(key) {
                    return Ok(serde_json::from_value(value)?);
                }

                let (tx, rx) = broadcast::channel(1);
                flights.insert(key.to_string(), tx.clone());
                drop(flights);

                log::debug!("Cache miss: {} (computing)", key);
                let fut = compute();
                spawn_flight(Arc::clone(&self.inner), key.to_string(), ttl, fut, tx);
                rx
            }
        };

        match rx.recv().await {
            Ok(Ok(value)) => Ok(serde_json::from_value(value)?),
            Ok(Err(cause)) => Err(CacheError::ComputationFailed {
                key: key.to_string(),
                cause,
            }
            .into()),
            Err(_) => Err(CacheError::FlightInterrupted {
                key: key.to_string(),
            }
            .into()),
        }
    }

    /// Remove the entry for `key` if present. No-op when absent.
    pub fn invalidate(&self, key: &str) {
        lock(&self.inner.entries).remove(key);
    }

    /// Remove every stored key matching `pattern` and return the number
    /// removed.
    ///
    /// Patterns use regular-expression semantics and match the *whole* key
    /// string, not a prefix: `"dashboard.*"` matches `"dashboard-analytics"`,
    /// while `"analytics"` matches nothing.
    pub fn invalidate_pattern(&self, pattern: &str) -> Result<usize> {
        let re = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
            CacheError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;

        let mut entries = lock(&self.inner.entries);
        let before = entries.len();
        entries.retain(|key, _| !re.is_match(key));
        Ok(before - entries.len())
    }

    /// Table-driven fan-out: drop every cached view that a change in
    /// `domain` stales, and return the number of entries removed.
    ///
    /// External mutation endpoints call this after a successful write
    /// without needing to know the key-naming scheme.
    pub fn invalidate_related(&self, domain: Domain) -> Result<usize> {
        let mut removed = 0;
        for pattern in domain.patterns() {
            removed += self.invalidate_pattern(pattern)?;
        }
        log::debug!(
            "Invalidated {} cached entries related to domain '{}'",
            removed,
            domain
        );
        Ok(removed)
    }

    /// Whether a fresh entry currently exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        lock(&self.inner.entries)
            .get(key)
            .is_some_and(Entry::is_fresh)
    }

    /// Point-in-time entry counts.
    pub fn stats(&self) -> CacheStats {
        let entries = lock(&self.inner.entries);
        let total = entries.len();
        let fresh = entries.values().filter(|e| e.is_fresh()).count();
        CacheStats {
            total_entries: total,
            fresh_entries: fresh,
            expired_entries: total - fresh,
        }
    }

    /// Stop the background expiry sweep. Entries remain served until their
    /// TTL elapses; only the proactive removal stops.
    pub fn shutdown(&self) {
        if let Some(handle) = lock(&self.sweeper).take() {
            handle.abort();
        }
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        let entries = lock(&self.inner.entries);
        entries
            .get(key)
            .filter(|e| e.is_fresh())
            .map(|e| e.value.clone())
    }
}

impl Drop for ReportCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl CacheInner {
    fn store(&self, key: String, value: Value, ttl: Duration) {
        lock(&self.entries).insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    fn finish_flight(&self, key: &str) {
        lock(&self.inflight).remove(key);
    }

    fn purge_expired(&self) -> usize {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|_, e| e.is_fresh());
        before - entries.len()
    }
}

/// Run one computation round on its own task so an abandoned caller never
/// cancels it, then release every waiter with the settled result.
fn spawn_flight<T, Fut>(
    inner: Arc<CacheInner>,
    key: String,
    ttl: Duration,
    fut: Fut,
    tx: broadcast::Sender<FlightResult>,
) where
    T: Serialize + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    tokio::spawn(async move {
        let outcome: FlightResult = match fut.await {
            Ok(report) => match serde_json::to_value(&report) {
                Ok(value) => {
                    inner.store(key.clone(), value.clone(), ttl);
                    Ok(value)
                }
                Err(e) => Err(Arc::new(Error::from(e))),
            },
            Err(e) => {
                log::warn!("Computation for cache key '{}' failed: {}", key, e);
                Err(Arc::new(e))
            }
        };

        // Drop the flight before releasing waiters so a caller arriving
        // after a failure starts a fresh computation instead of joining a
        // settled one.
        inner.finish_flight(&key);
        let _ = tx.send(outcome);
    });
}

fn spawn_sweeper(inner: Weak<CacheInner>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick completes immediately
        loop {
            ticker.tick().await;
            let Some(inner) = inner.upgrade() else {
                break;
            };
            let removed = inner.purge_expired();
            if removed > 0 {
                log::debug!("Expiry sweep removed {} entries", removed);
            }
        }
    })
}

/// Lock a mutex, recovering the guard if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Point-in-time view of cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub fresh_entries: usize,
    pub expired_entries: usize,
}
