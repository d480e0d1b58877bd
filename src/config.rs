//! Startup configuration.
//!
//! Settings come from the process environment (`from_env`), any lookup
//! function (`from_lookup`), or a JSON document (`from_json_str`). Empty
//! values count as absent.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use apex_crypto::KEY_ENV_VAR;
use apex_ratelimit::{
    LimiterOptions, RateLimitPolicy, DEFAULT_STALE_AFTER, DEFAULT_SWEEP_INTERVAL,
};
use serde::Deserialize;

use crate::error::{GuardError, Result};

pub const SWEEP_INTERVAL_ENV_VAR: &str = "RATE_LIMIT_SWEEP_INTERVAL_SECS";
pub const STALE_AFTER_ENV_VAR: &str = "RATE_LIMIT_STALE_AFTER_SECS";

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// 64 hex characters for a raw key, anything else for a passphrase.
    pub phi_encryption_key: Option<String>,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub sweep_interval_secs: u64,
    pub stale_after_secs: u64,
    /// Policies keyed by `{METHOD}:{route}`. Routes not listed bypass the
    /// limiter.
    pub routes: BTreeMap<String, RateLimitPolicy>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL.as_secs(),
            stale_after_secs: DEFAULT_STALE_AFTER.as_secs(),
            routes: BTreeMap::new(),
        }
    }
}

impl RateLimitConfig {
    pub fn limiter_options(&self) -> LimiterOptions {
        LimiterOptions {
            sweep_interval: Duration::from_secs(self.sweep_interval_secs),
            stale_after: Duration::from_secs(self.stale_after_secs),
        }
    }
}

impl GuardConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let defaults = RateLimitConfig::default();

        let config = Self {
            phi_encryption_key: get(KEY_ENV_VAR),
            rate_limit: RateLimitConfig {
                sweep_interval_secs: match get(SWEEP_INTERVAL_ENV_VAR) {
                    Some(raw) => parse_secs(SWEEP_INTERVAL_ENV_VAR, raw)?,
                    None => defaults.sweep_interval_secs,
                },
                stale_after_secs: match get(STALE_AFTER_ENV_VAR) {
                    Some(raw) => parse_secs(STALE_AFTER_ENV_VAR, raw)?,
                    None => defaults.stale_after_secs,
                },
                routes: BTreeMap::new(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        if config.phi_encryption_key.as_deref() == Some("") {
            config.phi_encryption_key = None;
        }
        config.validate()?;
        Ok(config)
    }

    /// Add or replace the policy for `{method}:{route}`.
    pub fn with_route(mut self, method: &str, route: &str, policy: RateLimitPolicy) -> Self {
        self.rate_limit
            .routes
            .insert(format!("{method}:{route}"), policy);
        self
    }

    /// Like [`with_route`](Self::with_route), building the policy from raw
    /// limits. Zero limits are rejected.
    pub fn limit_route(
        self,
        method: &str,
        route: &str,
        max_requests: u32,
        window_seconds: u64,
    ) -> Result<Self> {
        let policy = RateLimitPolicy::new(max_requests, window_seconds)?;
        Ok(self.with_route(method, route, policy))
    }

    fn validate(&self) -> Result<()> {
        if self.rate_limit.sweep_interval_secs == 0 {
            return Err(GuardError::InvalidSetting {
                name: SWEEP_INTERVAL_ENV_VAR,
                value: "0".into(),
            });
        }
        if self.rate_limit.stale_after_secs == 0 {
            return Err(GuardError::InvalidSetting {
                name: STALE_AFTER_ENV_VAR,
                value: "0".into(),
            });
        }
        Ok(())
    }
}

fn parse_secs(name: &'static str, raw: String) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(secs) => Ok(secs),
        Err(_) => Err(GuardError::InvalidSetting { name, value: raw }),
    }
}

impl fmt::Debug for GuardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardConfig")
            .field(
                "phi_encryption_key",
                &self.phi_encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use apex_ratelimit::RateLimitError;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = GuardConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.phi_encryption_key.is_none());
        assert_eq!(config.rate_limit.sweep_interval_secs, 300);
        assert_eq!(config.rate_limit.stale_after_secs, 600);
        assert!(config.rate_limit.routes.is_empty());
    }

    #[test]
    fn reads_all_settings() {
        let config = GuardConfig::from_lookup(lookup(&[
            ("PHI_ENCRYPTION_KEY", "passphrase"),
            ("RATE_LIMIT_SWEEP_INTERVAL_SECS", "60"),
            ("RATE_LIMIT_STALE_AFTER_SECS", " 120 "),
        ]))
        .unwrap();
        assert_eq!(config.phi_encryption_key.as_deref(), Some("passphrase"));
        let options = config.rate_limit.limiter_options();
        assert_eq!(options.sweep_interval, Duration::from_secs(60));
        assert_eq!(options.stale_after, Duration::from_secs(120));
    }

    #[test]
    fn empty_values_are_absent() {
        let config = GuardConfig::from_lookup(lookup(&[
            ("PHI_ENCRYPTION_KEY", ""),
            ("RATE_LIMIT_SWEEP_INTERVAL_SECS", ""),
        ]))
        .unwrap();
        assert!(config.phi_encryption_key.is_none());
        assert_eq!(config.rate_limit.sweep_interval_secs, 300);
    }

    #[test]
    fn rejects_bad_intervals() {
        let err = GuardConfig::from_lookup(lookup(&[("RATE_LIMIT_SWEEP_INTERVAL_SECS", "5m")]))
            .unwrap_err();
        let GuardError::InvalidSetting { name, value } = err else {
            panic!("expected InvalidSetting");
        };
        assert_eq!(name, "RATE_LIMIT_SWEEP_INTERVAL_SECS");
        assert_eq!(value, "5m");

        let err = GuardConfig::from_lookup(lookup(&[("RATE_LIMIT_STALE_AFTER_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            GuardError::InvalidSetting { name: "RATE_LIMIT_STALE_AFTER_SECS", .. }
        ));
    }

    #[test]
    fn json_config_with_routes() {
        let config = GuardConfig::from_json_str(
            r#"{
                "phi_encryption_key": "",
                "rate_limit": {
                    "routes": {
                        "POST:/eligibility/verify": { "max_requests": 10, "window_seconds": 60 }
                    }
                }
            }"#,
        )
        .unwrap();
        assert!(config.phi_encryption_key.is_none());
        assert_eq!(config.rate_limit.stale_after_secs, 600);
        let policy = &config.rate_limit.routes["POST:/eligibility/verify"];
        assert_eq!(policy.max_requests(), 10);
    }

    #[test]
    fn json_config_rejects_invalid_policy() {
        let err = GuardConfig::from_json_str(
            r#"{"rate_limit":{"routes":{"GET:/members":{"max_requests":0,"window_seconds":60}}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GuardError::Json(_)));
    }

    #[test]
    fn limit_route_validates_limits() {
        let config = GuardConfig::default()
            .limit_route("POST", "/claims", 5, 60)
            .unwrap();
        assert_eq!(config.rate_limit.routes["POST:/claims"].max_requests(), 5);

        let err = GuardConfig::default()
            .limit_route("POST", "/claims", 5, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            GuardError::RateLimit(RateLimitError::ZeroWindow)
        ));
    }

    #[test]
    fn debug_redacts_key() {
        let config = GuardConfig {
            phi_encryption_key: Some("super-secret".into()),
            ..Default::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
