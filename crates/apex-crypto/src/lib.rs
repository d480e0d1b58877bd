//! Field-level protection for PHI at rest: AES-256-GCM envelopes, keyed
//! lookup hashes, and one-time key loading.

pub mod base64;
pub mod cipher;
pub mod envelope;
pub mod error;
pub mod hash;
pub mod key;
pub mod types;

pub use base64::{base64_decode, base64_encode};
pub use cipher::{generate_iv, PhiCipher};
pub use envelope::Envelope;
pub use error::CryptoError;
pub use hash::PhiHasher;
pub use key::{EncryptionKey, KeyDerivation};
pub use types::{
    AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH, ENVELOPE_DELIMITER, KEY_ENV_VAR,
};
