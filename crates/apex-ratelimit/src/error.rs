use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Invalid rate-limit policy: max_requests must be at least 1")]
    ZeroMaxRequests,

    #[error("Invalid rate-limit policy: window_seconds must be at least 1")]
    ZeroWindow,
}

pub type Result<T> = std::result::Result<T, RateLimitError>;
