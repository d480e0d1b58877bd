//! Keyed SHA-256 for indexing PHI without storing plaintext.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::CryptoError;
use crate::key::EncryptionKey;

/// Deterministic one-way hash of PHI values.
///
/// `hex(SHA-256(key || value))`. The key acts as a salt so known-format
/// values (SSNs, dates) cannot be looked up in precomputed tables.
#[derive(Clone)]
pub struct PhiHasher {
    key: Option<Arc<EncryptionKey>>,
}

impl PhiHasher {
    pub fn new(key: Option<Arc<EncryptionKey>>) -> Self {
        Self { key }
    }

    /// Lowercase hex digest, stable for a given key and value.
    pub fn hash(&self, value: &str) -> Result<String, CryptoError> {
        let key = self.key.as_ref().ok_or(CryptoError::KeyNotLoaded)?;
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hasher.update(value.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    fn hasher(secret: &str) -> PhiHasher {
        PhiHasher::new(Some(Arc::new(EncryptionKey::from_secret(secret).unwrap())))
    }

    #[test]
    fn deterministic() {
        let h = hasher(HEX_KEY);
        let first = h.hash("123-45-6789").unwrap();
        assert_eq!(first, h.hash("123-45-6789").unwrap());
    }

    #[test]
    fn known_digest() {
        let h = hasher(HEX_KEY);
        assert_eq!(
            h.hash("123-45-6789").unwrap(),
            "7f0a1b4fd82a0a1fa4d3c32b286c515a7058d8e2ff77f75360990477cad3f2e2"
        );
    }

    #[test]
    fn different_keys_different_hashes() {
        let a = hasher("key-a").hash("123-45-6789").unwrap();
        let b = hasher("key-b").hash("123-45-6789").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn different_values_different_hashes() {
        let h = hasher(HEX_KEY);
        assert_ne!(h.hash("a").unwrap(), h.hash("b").unwrap());
    }

    #[test]
    fn lowercase_hex_output() {
        let digest = hasher(HEX_KEY).hash("value").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn missing_key_fails() {
        let err = PhiHasher::new(None).hash("x").unwrap_err();
        assert!(matches!(err, CryptoError::KeyNotLoaded));
    }
}
