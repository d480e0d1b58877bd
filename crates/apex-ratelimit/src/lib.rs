//! Per-identity, per-route sliding-window rate limiting.
//!
//! Requests are keyed `{identity}:{method}:{route}` where identity is the
//! authenticated user id or, failing that, the client IP. Routes without a
//! policy bypass the limiter entirely.

pub mod clock;
pub mod error;
pub mod limiter;
pub mod policy;
pub mod response;
pub mod store;
#[cfg(not(target_arch = "wasm32"))]
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::RateLimitError;
pub use limiter::{Decision, LimiterOptions, SlidingWindowRateLimiter, DEFAULT_SWEEP_INTERVAL};
pub use policy::{RateLimitPolicy, RequestContext};
pub use response::{RateLimitMetadata, RateLimitRejection, STATUS_TOO_MANY_REQUESTS};
pub use store::{
    Bucket, BucketStore, EvictionPolicy, MemoryStore, StalenessCeiling, DEFAULT_STALE_AFTER,
};
#[cfg(not(target_arch = "wasm32"))]
pub use sweeper::spawn_sweeper;
