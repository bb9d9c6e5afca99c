//! Scan result cache.
//!
//! Caches per-root scan results so repeated runs skip the directory walk,
//! which matters when roots live on SMB mounts where a single listing can
//! take seconds. Entries expire after a TTL; a stale entry is
//! indistinguishable from an absent one, so callers always recompute.
//!
//! Time comes from an injected [`Clock`] rather than [`chrono::Utc::now`]
//! directly, which lets tests pin and advance the clock.

mod persist;

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::types::ScanResult;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Second resolution.
#[derive(Debug)]
pub struct ManualClock {
    unix_secs: AtomicI64,
}

impl ManualClock {
    /// Create a clock pinned at `start`.
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            unix_secs: AtomicI64::new(start.timestamp()),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        self.unix_secs
            .fetch_add(duration.as_secs() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = self.unix_secs.load(Ordering::SeqCst);
        DateTime::from_timestamp(secs, 0).unwrap_or_default()
    }
}

/// Entry in the scan cache.
struct CacheEntry {
    result: ScanResult,
    written_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Thread-safe TTL cache of scan results, keyed by root path + media kind.
///
/// No capacity bound: the key space is the configured roots, not an
/// unbounded universe of lookups.
pub struct ScanCache {
    entries: DashMap<String, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl ScanCache {
    /// Create an empty cache reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Create an empty cache on the system clock.
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Current time as seen by this cache's clock. Scan timestamps come
    /// from here too, so cached and computed results age consistently.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Get a fresh scan result, or `None` when the key was never written or
    /// its entry has expired. Expired entries are removed on the way out.
    pub fn get(&self, key: &str) -> Option<ScanResult> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_fresh(now) {
                return Some(entry.result.clone());
            }
            // Entry is stale, remove it
            drop(entry);
            self.entries.remove(key);
        }
        None
    }

    /// Store a scan result under `key`, replacing any prior entry.
    pub fn put(&self, key: &str, result: ScanResult, ttl: Duration) {
        let written_at = self.clock.now();
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                result,
                written_at,
                expires_at: expiry(written_at, ttl),
            },
        );
    }

    /// Drop the entry for `key`, if any.
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove expired entries.
    pub fn cleanup_expired(&self) {
        let now = self.clock.now();
        self.entries.retain(|_, entry| entry.is_fresh(now));
    }
}

impl Default for ScanCache {
    fn default() -> Self {
        Self::with_system_clock()
    }
}

/// Expiry instant for an entry written at `written_at`, saturating instead
/// of overflowing for absurd TTLs.
fn expiry(written_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| written_at.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
