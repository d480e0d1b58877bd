//! Process key loading.
//!
//! The secret is read once at startup. A 64-character hex string is raw key
//! material; anything else is a passphrase digested with SHA-256. A missing
//! secret is logged and reported as `None` so the process can still boot;
//! every operation that needs the key then fails with `KeyNotLoaded`.

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::types::{AES_KEY_LENGTH, KEY_ENV_VAR, RAW_HEX_KEY_LENGTH};

/// How the key bytes were obtained from the configured secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDerivation {
    /// 64 hex characters decoded directly.
    RawHex,
    /// SHA-256 of an arbitrary-length passphrase.
    Passphrase,
}

impl KeyDerivation {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyDerivation::RawHex => "raw-hex",
            KeyDerivation::Passphrase => "passphrase",
        }
    }
}

/// 256-bit secret shared by the cipher and the hasher. Immutable once built.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; AES_KEY_LENGTH],
    #[zeroize(skip)]
    derivation: KeyDerivation,
}

impl EncryptionKey {
    /// Wrap exactly 32 bytes of key material.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != AES_KEY_LENGTH {
            return Err(CryptoError::InvalidKeyLength {
                expected: AES_KEY_LENGTH,
                got: bytes.len(),
            });
        }
        let mut key = [0u8; AES_KEY_LENGTH];
        key.copy_from_slice(bytes);
        Ok(Self {
            bytes: key,
            derivation: KeyDerivation::RawHex,
        })
    }

    /// Resolve a configured secret into key material.
    ///
    /// Empty secrets are treated as absent.
    pub fn from_secret(secret: &str) -> Result<Self, CryptoError> {
        if secret.is_empty() {
            return Err(CryptoError::KeyNotLoaded);
        }

        if is_raw_hex(secret) {
            let mut decoded = hex::decode(secret).map_err(|_| CryptoError::InvalidKeyLength {
                expected: AES_KEY_LENGTH,
                got: secret.len() / 2,
            })?;
            let key = Self::from_bytes(&decoded);
            decoded.zeroize();
            return key;
        }

        let digest = Sha256::digest(secret.as_bytes());
        let mut bytes = [0u8; AES_KEY_LENGTH];
        bytes.copy_from_slice(&digest);
        Ok(Self {
            bytes,
            derivation: KeyDerivation::Passphrase,
        })
    }

    /// Load the key once at startup.
    ///
    /// Never fails: an absent secret is logged and yields `None`.
    pub fn load(secret: Option<&str>) -> Option<Arc<Self>> {
        let secret = match secret {
            Some(s) if !s.is_empty() => s,
            _ => {
                tracing::error!(
                    "{} is not set. PHI encryption will fail at runtime.",
                    KEY_ENV_VAR
                );
                return None;
            }
        };

        match Self::from_secret(secret) {
            Ok(key) => {
                tracing::info!(
                    derivation = key.derivation.as_str(),
                    "PHI encryption key loaded"
                );
                Some(Arc::new(key))
            }
            Err(e) => {
                tracing::error!(error = %e, "PHI encryption key could not be loaded");
                None
            }
        }
    }

    /// Read the secret from the process environment and load it.
    pub fn load_from_env() -> Option<Arc<Self>> {
        let secret = std::env::var(KEY_ENV_VAR).ok();
        Self::load(secret.as_deref())
    }

    pub fn derivation(&self) -> KeyDerivation {
        self.derivation
    }

    pub(crate) fn as_bytes(&self) -> &[u8; AES_KEY_LENGTH] {
        &self.bytes
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .field("derivation", &self.derivation)
            .finish()
    }
}

fn is_raw_hex(secret: &str) -> bool {
    secret.len() == RAW_HEX_KEY_LENGTH && secret.bytes().all(|b| b.is_ascii_hexdigit())
}
