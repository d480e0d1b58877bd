//! Periodic sweep on a tokio task, for hosts whose traffic is too sparse to
//! trigger the opportunistic one.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::clock::Clock;
use crate::limiter::SlidingWindowRateLimiter;
use crate::store::{BucketStore, EvictionPolicy};

/// Sweep `limiter` every `period` until it is dropped or the handle is
/// aborted. Must be called from within a tokio runtime.
pub fn spawn_sweeper<C, S, E>(
    limiter: &Arc<SlidingWindowRateLimiter<C, S, E>>,
    period: Duration,
) -> JoinHandle<()>
where
    C: Clock + 'static,
    S: BucketStore + 'static,
    E: EvictionPolicy + 'static,
{
    let limiter: Weak<_> = Arc::downgrade(limiter);
    tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(limiter) = limiter.upgrade() else {
                tracing::debug!("Rate limiter dropped, stopping sweeper");
                return;
            };
            limiter.sweep();
        }
    })
}
