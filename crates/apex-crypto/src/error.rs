use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("PHI encryption key is not loaded. Ensure PHI_ENCRYPTION_KEY is set.")]
    KeyNotLoaded,

    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error(
        "Invalid encrypted text format: expected iv:authTag:ciphertext, got {segments} segment(s)"
    )]
    MalformedEnvelope { segments: usize },

    #[error("Invalid base64 in envelope {segment} segment")]
    InvalidBase64 { segment: &'static str },

    #[error("Invalid IV length: expected {expected}, got {got}")]
    InvalidIvLength { expected: usize, got: usize },

    #[error("Invalid auth tag length: expected {expected}, got {got}")]
    InvalidTagLength { expected: usize, got: usize },

    #[error("Authentication failed: ciphertext was tampered with or the key is wrong")]
    AuthenticationFailed,

    #[error("Decrypted payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}

impl CryptoError {
    /// The envelope is structurally invalid; no decryption was attempted.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            CryptoError::MalformedEnvelope { .. }
                | CryptoError::InvalidBase64 { .. }
                | CryptoError::InvalidIvLength { .. }
                | CryptoError::InvalidTagLength { .. }
        )
    }

    /// Tag verification failed. Callers may want to raise a security alert.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, CryptoError::AuthenticationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_and_integrity_are_disjoint() {
        let format = CryptoError::InvalidIvLength {
            expected: 16,
            got: 12,
        };
        assert!(format.is_format_error());
        assert!(!format.is_integrity_failure());

        let integrity = CryptoError::AuthenticationFailed;
        assert!(integrity.is_integrity_failure());
        assert!(!integrity.is_format_error());

        assert!(!CryptoError::KeyNotLoaded.is_format_error());
        assert!(!CryptoError::KeyNotLoaded.is_integrity_failure());
    }

    #[test]
    fn messages_carry_lengths() {
        let err = CryptoError::InvalidTagLength {
            expected: 16,
            got: 4,
        };
        assert_eq!(
            err.to_string(),
            "Invalid auth tag length: expected 16, got 4"
        );
    }
}
