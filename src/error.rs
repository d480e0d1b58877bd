use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Invalid setting {name}={value:?}: expected a positive integer")]
    InvalidSetting { name: &'static str, value: String },

    #[error("Crypto error: {0}")]
    Crypto(#[from] apex_crypto::CryptoError),

    #[error("Rate limit error: {0}")]
    RateLimit(#[from] apex_ratelimit::RateLimitError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GuardError>;
