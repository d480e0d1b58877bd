//! Bucket storage and eviction.
//!
//! `BucketStore` is the seam for swapping the in-memory map for a shared
//! store. Implementations must make `update` atomic per key: the limiter's
//! prune/check/append runs inside the closure.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;

/// Default staleness ceiling for the sweep (10 minutes).
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(10 * 60);

// ============================================================================
// Bucket
// ============================================================================

/// Request timestamps (ms) for one tracking key, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    timestamps: VecDeque<u64>,
}

impl Bucket {
    /// Drop timestamps that are a full window or more behind `now_ms`.
    pub fn prune(&mut self, now_ms: u64, window_ms: u64) {
        self.timestamps.retain(|&ts| now_ms.saturating_sub(ts) < window_ms);
    }

    pub fn push(&mut self, ts_ms: u64) {
        self.timestamps.push_back(ts_ms);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn oldest(&self) -> Option<u64> {
        self.timestamps.front().copied()
    }

    pub fn newest(&self) -> Option<u64> {
        self.timestamps.back().copied()
    }
}

// ============================================================================
// BucketStore
// ============================================================================

pub trait BucketStore: Send + Sync {
    /// Run `f` on the bucket for `key`, creating an empty one if absent.
    fn update<R, F>(&self, key: &str, f: F) -> R
    where
        F: FnOnce(&mut Bucket) -> R;

    /// Keep only buckets for which `keep` returns true. Returns the number
    /// removed.
    fn retain(&self, keep: &mut dyn FnMut(&str, &Bucket) -> bool) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single-process store behind one mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BucketStore for MemoryStore {
    fn update<R, F>(&self, key: &str, f: F) -> R
    where
        F: FnOnce(&mut Bucket) -> R,
    {
        let mut buckets = self.buckets.lock();
        if let Some(bucket) = buckets.get_mut(key) {
            return f(bucket);
        }
        f(buckets.entry(key.to_string()).or_default())
    }

    fn retain(&self, keep: &mut dyn FnMut(&str, &Bucket) -> bool) -> usize {
        let mut buckets = self.buckets.lock();
        let before = buckets.len();
        buckets.retain(|key, bucket| keep(key, bucket));
        before - buckets.len()
    }

    fn len(&self) -> usize {
        self.buckets.lock().len()
    }
}

// ============================================================================
// EvictionPolicy
// ============================================================================

pub trait EvictionPolicy: Send + Sync {
    fn is_stale(&self, bucket: &Bucket, now_ms: u64) -> bool;
}

/// Evict buckets that are empty or whose newest request is older than a
/// fixed ceiling. The ceiling does not depend on any route's window.
#[derive(Debug, Clone, Copy)]
pub struct StalenessCeiling {
    stale_after_ms: u64,
}

impl StalenessCeiling {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            stale_after_ms: stale_after.as_millis() as u64,
        }
    }
}

impl Default for StalenessCeiling {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_AFTER)
    }
}

impl EvictionPolicy for StalenessCeiling {
    fn is_stale(&self, bucket: &Bucket, now_ms: u64) -> bool {
        match bucket.newest() {
            Some(newest) => now_ms.saturating_sub(newest) > self.stale_after_ms,
            None => true,
        }
    }
}
