//! Per-route policies and request identity.

use serde::{Deserialize, Serialize};

use crate::error::{RateLimitError, Result};

// ============================================================================
// RateLimitPolicy
// ============================================================================

/// At most `max_requests` in any `window_seconds`-long sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicySpec")]
pub struct RateLimitPolicy {
    max_requests: u32,
    window_seconds: u64,
}

#[derive(Deserialize)]
struct PolicySpec {
    max_requests: u32,
    window_seconds: u64,
}

impl TryFrom<PolicySpec> for RateLimitPolicy {
    type Error = RateLimitError;

    fn try_from(spec: PolicySpec) -> Result<Self> {
        Self::new(spec.max_requests, spec.window_seconds)
    }
}

impl RateLimitPolicy {
    pub fn new(max_requests: u32, window_seconds: u64) -> Result<Self> {
        if max_requests == 0 {
            return Err(RateLimitError::ZeroMaxRequests);
        }
        if window_seconds == 0 {
            return Err(RateLimitError::ZeroWindow);
        }
        Ok(Self {
            max_requests,
            window_seconds,
        })
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    pub fn window_ms(&self) -> u64 {
        self.window_seconds.saturating_mul(1000)
    }
}

// ============================================================================
// RequestContext
// ============================================================================

/// The parts of an incoming request the limiter keys on.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Authenticated user id, when the request is authenticated.
    pub user_id: Option<String>,
    /// Raw `x-forwarded-for` header value.
    pub forwarded_for: Option<String>,
    /// Direct connection address.
    pub remote_addr: Option<String>,
    /// HTTP method.
    pub method: String,
    /// Matched route pattern, e.g. `/members/:id`.
    pub route: Option<String>,
    /// Raw request URL, used when no route pattern matched.
    pub url: String,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, route: impl Into<String>) -> Self {
        let route = route.into();
        Self {
            method: method.into(),
            url: route.clone(),
            route: Some(route),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_forwarded_for(mut self, header: impl Into<String>) -> Self {
        self.forwarded_for = Some(header.into());
        self
    }

    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// First `x-forwarded-for` entry, else the connection address, else
    /// `unknown`.
    pub fn client_ip(&self) -> &str {
        let forwarded = self
            .forwarded_for
            .as_deref()
            .and_then(|h| h.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());

        forwarded
            .or(self.remote_addr.as_deref().filter(|a| !a.is_empty()))
            .unwrap_or("unknown")
    }

    /// User id when authenticated, client IP otherwise.
    pub fn identity(&self) -> &str {
        self.user_id.as_deref().unwrap_or_else(|| self.client_ip())
    }

    /// `{method}:{route}`.
    pub fn route_key(&self) -> String {
        let route = self.route.as_deref().unwrap_or(&self.url);
        format!("{}:{}", self.method, route)
    }

    /// `{identity}:{method}:{route}`. One bucket per tracking key.
    pub fn tracking_key(&self) -> String {
        format!("{}:{}", self.identity(), self.route_key())
    }
}
