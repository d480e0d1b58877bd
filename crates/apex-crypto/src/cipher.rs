//! AES-256-GCM encryption for PHI fields at rest.
//!
//! Wire format: `base64(iv:16):base64(tag:16):base64(ciphertext)`.
//! A fresh random IV is drawn for every call. No associated data.

use std::sync::Arc;

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Key, Nonce, Tag};
use zeroize::Zeroize;

use crate::envelope::Envelope;
use crate::error::CryptoError;
use crate::hash::PhiHasher;
use crate::key::EncryptionKey;
use crate::types::{AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH};

/// AES-256-GCM with a 128-bit nonce and 128-bit tag.
type Aes256Gcm16 = AesGcm<Aes256, U16, U16>;

/// Generate a random 16-byte IV.
pub fn generate_iv() -> Result<[u8; AES_GCM_IV_LENGTH], CryptoError> {
    let mut iv = [0u8; AES_GCM_IV_LENGTH];
    getrandom::getrandom(&mut iv).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(iv)
}

/// Authenticated encryption of PHI strings under the process key.
///
/// Built from the result of [`EncryptionKey::load`]. When the key is absent
/// the cipher still constructs, but every operation fails with
/// [`CryptoError::KeyNotLoaded`].
pub struct PhiCipher {
    key: Option<Arc<EncryptionKey>>,
    cipher: Option<Aes256Gcm16>,
}

impl PhiCipher {
    pub fn new(key: Option<Arc<EncryptionKey>>) -> Self {
        let cipher = key
            .as_ref()
            .map(|k| Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(k.as_bytes())));
        Self { key, cipher }
    }

    /// Convenience for callers that already hold a key.
    pub fn with_key(key: EncryptionKey) -> Self {
        Self::new(Some(Arc::new(key)))
    }

    pub fn is_key_loaded(&self) -> bool {
        self.cipher.is_some()
    }

    /// A hasher sharing this cipher's key.
    pub fn hasher(&self) -> PhiHasher {
        PhiHasher::new(self.key.clone())
    }

    /// Encrypt a UTF-8 string and return the envelope wire format.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let cipher = self.cipher()?;
        let iv = generate_iv()?;

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = cipher
            .encrypt_in_place_detached(Nonce::<U16>::from_slice(&iv), b"", &mut buffer)
            .map_err(|e| {
                buffer.zeroize();
                CryptoError::EncryptionFailed(e.to_string())
            })?;

        let mut tag_bytes = [0u8; AES_GCM_TAG_LENGTH];
        tag_bytes.copy_from_slice(&tag);

        Ok(Envelope {
            iv,
            tag: tag_bytes,
            ciphertext: buffer,
        }
        .to_string())
    }

    /// Decrypt an envelope produced by [`PhiCipher::encrypt`].
    ///
    /// Format errors are reported before any decryption. A tag mismatch is
    /// always [`CryptoError::AuthenticationFailed`]; altered plaintext is
    /// never returned.
    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let cipher = self.cipher()?;
        let Envelope {
            iv,
            tag,
            ciphertext,
        } = Envelope::parse(encoded)?;

        let mut buffer = ciphertext;
        let verified = cipher.decrypt_in_place_detached(
            Nonce::<U16>::from_slice(&iv),
            b"",
            &mut buffer,
            Tag::<U16>::from_slice(&tag),
        );
        if verified.is_err() {
            buffer.zeroize();
            tracing::warn!("PHI envelope failed authentication");
            return Err(CryptoError::AuthenticationFailed);
        }

        String::from_utf8(buffer).map_err(|e| {
            e.into_bytes().zeroize();
            CryptoError::InvalidUtf8
        })
    }

    fn cipher(&self) -> Result<&Aes256Gcm16, CryptoError> {
        self.cipher.as_ref().ok_or(CryptoError::KeyNotLoaded)
    }
}
