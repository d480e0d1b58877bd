//! Process-wide PHI guard: one key load, shared by the cipher and hasher,
//! plus the request limiter and its route policy table.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use apex_crypto::{EncryptionKey, PhiCipher, PhiHasher};
use apex_phi::{field_set, phi_fields_for, redact, redact_json, PhiValue, LOG_REDACT_FIELDS};
use apex_ratelimit::{Decision, RateLimitPolicy, RequestContext, SlidingWindowRateLimiter};
use serde_json::Value;

use crate::config::GuardConfig;
use crate::error::Result;

/// A PHI value ready to persist: the envelope plus its lookup hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedField {
    pub encrypted: String,
    pub hash: String,
}

pub struct Guard {
    cipher: PhiCipher,
    hasher: PhiHasher,
    limiter: Arc<SlidingWindowRateLimiter>,
    routes: BTreeMap<String, RateLimitPolicy>,
    log_fields: HashSet<String>,
    sweep_interval: Duration,
}

impl Guard {
    /// Load the key and build the limiter. A missing or unusable key is
    /// logged and leaves crypto operations failing with `KeyNotLoaded`.
    pub fn from_config(config: &GuardConfig) -> Self {
        let key = EncryptionKey::load(config.phi_encryption_key.as_deref());
        let cipher = PhiCipher::new(key);
        let hasher = cipher.hasher();
        let options = config.rate_limit.limiter_options();

        tracing::info!(
            key_loaded = cipher.is_key_loaded(),
            limited_routes = config.rate_limit.routes.len(),
            sweep_interval_secs = options.sweep_interval.as_secs(),
            stale_after_secs = options.stale_after.as_secs(),
            "PHI guard initialized"
        );

        Self {
            cipher,
            hasher,
            limiter: Arc::new(SlidingWindowRateLimiter::new(options)),
            routes: config.rate_limit.routes.clone(),
            log_fields: field_set(LOG_REDACT_FIELDS.iter().copied()),
            sweep_interval: options.sweep_interval,
        }
    }

    pub fn cipher(&self) -> &PhiCipher {
        &self.cipher
    }

    pub fn hasher(&self) -> &PhiHasher {
        &self.hasher
    }

    pub fn limiter(&self) -> &Arc<SlidingWindowRateLimiter> {
        &self.limiter
    }

    /// Encrypt `plaintext` and compute its lookup hash.
    pub fn protect(&self, plaintext: &str) -> Result<ProtectedField> {
        Ok(ProtectedField {
            encrypted: self.cipher.encrypt(plaintext)?,
            hash: self.hasher.hash(plaintext)?,
        })
    }

    /// Decrypt a stored envelope.
    pub fn reveal(&self, encrypted: &str) -> Result<String> {
        Ok(self.cipher.decrypt(encrypted)?)
    }

    pub fn policy_for(&self, request: &RequestContext) -> Option<&RateLimitPolicy> {
        self.routes.get(&request.route_key())
    }

    /// Gate a request against its route's policy, if it has one.
    pub fn check(&self, request: &RequestContext) -> Decision {
        self.limiter.check(request, self.policy_for(request))
    }

    /// Strip the always-sensitive fields before a payload reaches the logs.
    pub fn redact_for_logs(&self, payload: &Value) -> Value {
        redact_json(payload, &self.log_fields)
    }

    /// Redact the catalogued PHI fields of `resource` from a record.
    pub fn redact_resource(&self, resource: &str, record: &PhiValue) -> PhiValue {
        let fields = field_set(phi_fields_for(resource).iter().copied());
        redact(record, &fields)
    }

    /// Run the limiter sweep on a tokio task at the configured cadence.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn_sweeper(&self) -> tokio::task::JoinHandle<()> {
        apex_ratelimit::spawn_sweeper(&self.limiter, self.sweep_interval)
    }
}
