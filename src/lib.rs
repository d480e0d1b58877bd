//! PHI security utilities for the Apex Health backend.
//!
//! Re-exports the member crates and adds startup configuration plus a
//! [`Guard`] that wires them together from one key load.

pub mod config;
pub mod error;
pub mod guard;

pub use config::{GuardConfig, RateLimitConfig};
pub use error::GuardError;
pub use guard::{Guard, ProtectedField};

pub use apex_crypto as crypto;
pub use apex_phi as phi;
pub use apex_ratelimit as ratelimit;
