/// AES-GCM IV length in bytes.
///
/// 128 bits rather than the usual 96: stored envelopes were produced with a
/// 16-byte IV and must stay decryptable.
pub const AES_GCM_IV_LENGTH: usize = 16;

/// AES-GCM tag length in bytes (128 bits).
pub const AES_GCM_TAG_LENGTH: usize = 16;

/// AES key length in bytes (256 bits).
pub const AES_KEY_LENGTH: usize = 32;

/// Length of a secret that is read as raw hex key material.
pub const RAW_HEX_KEY_LENGTH: usize = AES_KEY_LENGTH * 2;

/// Separator between the three envelope segments.
pub const ENVELOPE_DELIMITER: char = ':';

/// Conventional name of the environment variable holding the key secret.
pub const KEY_ENV_VAR: &str = "PHI_ENCRYPTION_KEY";
