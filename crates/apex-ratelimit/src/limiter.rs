//! Sliding-window rate limiter.
//!
//! Each tracking key owns a bucket of request timestamps. On every gated
//! request the bucket is pruned to the policy window, then either the
//! request is recorded or refused. Stale buckets are swept opportunistically
//! when a request arrives and the last sweep is at least one sweep interval
//! old.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::policy::{RateLimitPolicy, RequestContext};
use crate::response::{RateLimitMetadata, RateLimitRejection};
use crate::store::{
    BucketStore, EvictionPolicy, MemoryStore, StalenessCeiling, DEFAULT_STALE_AFTER,
};

/// Default cadence of the opportunistic sweep (5 minutes).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

// ============================================================================
// Options and outcome
// ============================================================================

/// Sweep settings for the default in-memory limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterOptions {
    /// Minimum time between opportunistic sweeps.
    pub sweep_interval: Duration,
    /// Buckets idle for longer than this are evicted.
    pub stale_after: Duration,
}

impl Default for LimiterOptions {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            stale_after: DEFAULT_STALE_AFTER,
        }
    }
}

/// Result of running a request through the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The route has no policy; the limiter did not look at it.
    Bypass,
    Allowed(RateLimitMetadata),
    Rejected(RateLimitRejection),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Decision::Rejected(_))
    }

    pub fn metadata(&self) -> Option<&RateLimitMetadata> {
        match self {
            Decision::Bypass => None,
            Decision::Allowed(meta) => Some(meta),
            Decision::Rejected(rejection) => Some(&rejection.metadata),
        }
    }

    /// Headers to attach to the response. Empty for bypassed routes.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self {
            Decision::Bypass => Vec::new(),
            Decision::Allowed(meta) => meta.headers(),
            Decision::Rejected(rejection) => rejection.headers(),
        }
    }

    /// `Err` on rejection, for hosts that propagate with `?`.
    pub fn into_result(self) -> Result<Option<RateLimitMetadata>, RateLimitRejection> {
        match self {
            Decision::Bypass => Ok(None),
            Decision::Allowed(meta) => Ok(Some(meta)),
            Decision::Rejected(rejection) => Err(rejection),
        }
    }
}

/// Bucket state captured under the store lock.
struct Outcome {
    allowed: bool,
    count: usize,
    oldest: Option<u64>,
}

// ============================================================================
// SlidingWindowRateLimiter
// ============================================================================

pub struct SlidingWindowRateLimiter<C = SystemClock, S = MemoryStore, E = StalenessCeiling>
where
    C: Clock,
    S: BucketStore,
    E: EvictionPolicy,
{
    clock: C,
    store: S,
    eviction: E,
    sweep_interval_ms: u64,
    last_sweep_ms: AtomicU64,
}

impl SlidingWindowRateLimiter {
    /// In-memory limiter on the wall clock.
    pub fn new(options: LimiterOptions) -> Self {
        Self::with_clock(SystemClock, options)
    }
}

impl Default for SlidingWindowRateLimiter {
    fn default() -> Self {
        Self::new(LimiterOptions::default())
    }
}

impl<C: Clock> SlidingWindowRateLimiter<C> {
    /// In-memory limiter on a caller-supplied clock.
    pub fn with_clock(clock: C, options: LimiterOptions) -> Self {
        Self::from_parts(
            clock,
            MemoryStore::new(),
            StalenessCeiling::new(options.stale_after),
            options.sweep_interval,
        )
    }
}

impl<C, S, E> SlidingWindowRateLimiter<C, S, E>
where
    C: Clock,
    S: BucketStore,
    E: EvictionPolicy,
{
    pub fn from_parts(clock: C, store: S, eviction: E, sweep_interval: Duration) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            store,
            eviction,
            sweep_interval_ms: sweep_interval.as_millis() as u64,
            last_sweep_ms: AtomicU64::new(now),
        }
    }

    /// Gate one request. Routes without a policy bypass the limiter.
    pub fn check(&self, request: &RequestContext, policy: Option<&RateLimitPolicy>) -> Decision {
        match policy {
            Some(policy) => self.check_key(&request.tracking_key(), policy),
            None => Decision::Bypass,
        }
    }

    /// Gate one request against an already-built tracking key.
    pub fn check_key(&self, key: &str, policy: &RateLimitPolicy) -> Decision {
        let now = self.clock.now_ms();
        self.maybe_sweep(now);

        let window_ms = policy.window_ms();
        let max_requests = policy.max_requests() as usize;

        let outcome = self.store.update(key, |bucket| {
            bucket.prune(now, window_ms);
            let allowed = bucket.len() < max_requests;
            if allowed {
                bucket.push(now);
            }
            Outcome {
                allowed,
                count: bucket.len(),
                oldest: bucket.oldest(),
            }
        });

        // Saturates for windows near `u64::MAX` milliseconds.
        let reset_ms = outcome.oldest.unwrap_or(now).saturating_add(window_ms);
        let metadata = RateLimitMetadata {
            limit: policy.max_requests(),
            remaining: max_requests.saturating_sub(outcome.count) as u32,
            reset_epoch_seconds: ceil_seconds(reset_ms),
        };

        if outcome.allowed {
            return Decision::Allowed(metadata);
        }

        let retry_after_seconds = ceil_seconds(reset_ms.saturating_sub(now));

        tracing::warn!(
            key,
            max_requests = policy.max_requests(),
            window_seconds = policy.window_seconds(),
            current_requests = outcome.count,
            retry_after_seconds,
            "Rate limit exceeded"
        );

        Decision::Rejected(RateLimitRejection {
            metadata,
            window_seconds: policy.window_seconds(),
            retry_after_seconds,
        })
    }

    /// Evict stale buckets now. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_ms();
        self.last_sweep_ms.store(now, Ordering::Release);
        self.sweep_at(now)
    }

    /// Number of live buckets.
    pub fn bucket_count(&self) -> usize {
        self.store.len()
    }

    fn maybe_sweep(&self, now: u64) {
        let last = self.last_sweep_ms.load(Ordering::Acquire);
        if now.saturating_sub(last) < self.sweep_interval_ms {
            return;
        }
        // Only the request that wins the swap sweeps.
        if self
            .last_sweep_ms
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.sweep_at(now);
        }
    }

    fn sweep_at(&self, now: u64) -> usize {
        let eviction = &self.eviction;
        let evicted = self
            .store
            .retain(&mut |_, bucket| !eviction.is_stale(bucket, now));
        if evicted > 0 {
            tracing::debug!(evicted, "Rate-limit cleanup: evicted stale buckets");
        }
        evicted
    }
}

fn ceil_seconds(ms: u64) -> u64 {
    ms.div_ceil(1000)
}
