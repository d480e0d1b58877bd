//! Response metadata attached to every rate-limited route, and the 429
//! rejection payload.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};

/// HTTP status for rejected requests.
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

pub const HEADER_LIMIT: &str = "X-RateLimit-Limit";
pub const HEADER_REMAINING: &str = "X-RateLimit-Remaining";
pub const HEADER_RESET: &str = "X-RateLimit-Reset";
pub const HEADER_RETRY_AFTER: &str = "Retry-After";

/// Limit, remaining budget, and reset time for one gated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitMetadata {
    /// Configured maximum for the window.
    pub limit: u32,
    /// Requests still allowed in the current window.
    pub remaining: u32,
    /// Epoch seconds at which the oldest counted request leaves the window.
    pub reset_epoch_seconds: u64,
}

impl RateLimitMetadata {
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            (HEADER_LIMIT, self.limit.to_string()),
            (HEADER_REMAINING, self.remaining.to_string()),
            (HEADER_RESET, self.reset_epoch_seconds.to_string()),
        ]
    }
}

/// A request refused because its bucket is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRejection {
    pub metadata: RateLimitMetadata,
    pub window_seconds: u64,
    pub retry_after_seconds: u64,
}

impl RateLimitRejection {
    /// Metadata headers with `Retry-After` appended and remaining forced to 0.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = RateLimitMetadata {
            remaining: 0,
            ..self.metadata
        }
        .headers();
        headers.push((HEADER_RETRY_AFTER, self.retry_after_seconds.to_string()));
        headers
    }

    pub fn message(&self) -> String {
        format!(
            "Rate limit exceeded. Maximum {} requests per {} seconds. Retry after {} seconds.",
            self.metadata.limit, self.window_seconds, self.retry_after_seconds
        )
    }

    /// JSON body for the 429 response.
    pub fn body(&self) -> Value {
        json!({
            "statusCode": STATUS_TOO_MANY_REQUESTS,
            "error": "Too Many Requests",
            "message": self.message(),
            "retryAfter": self.retry_after_seconds,
        })
    }
}

impl fmt::Display for RateLimitRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for RateLimitRejection {}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection() -> RateLimitRejection {
        RateLimitRejection {
            metadata: RateLimitMetadata {
                limit: 10,
                remaining: 0,
                reset_epoch_seconds: 1_700_000_060,
            },
            window_seconds: 60,
            retry_after_seconds: 42,
        }
    }

    #[test]
    fn metadata_headers() {
        let meta = RateLimitMetadata {
            limit: 3,
            remaining: 2,
            reset_epoch_seconds: 99,
        };
        assert_eq!(
            meta.headers(),
            vec![
                ("X-RateLimit-Limit", "3".to_string()),
                ("X-RateLimit-Remaining", "2".to_string()),
                ("X-RateLimit-Reset", "99".to_string()),
            ]
        );
    }

    #[test]
    fn rejection_headers_include_retry_after() {
        let headers = rejection().headers();
        assert!(headers.contains(&("Retry-After", "42".to_string())));
        assert!(headers.contains(&("X-RateLimit-Remaining", "0".to_string())));
    }

    #[test]
    fn rejection_body() {
        let body = rejection().body();
        assert_eq!(body["statusCode"], 429);
        assert_eq!(body["error"], "Too Many Requests");
        assert_eq!(body["retryAfter"], 42);
        assert_eq!(
            body["message"],
            "Rate limit exceeded. Maximum 10 requests per 60 seconds. Retry after 42 seconds."
        );
    }

    #[test]
    fn rejection_is_an_error() {
        let err: Box<dyn std::error::Error> = Box::new(rejection());
        assert!(err.to_string().starts_with("Rate limit exceeded."));
    }
}
