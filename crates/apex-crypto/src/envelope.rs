//! Encrypted envelope wire format.
//!
//! `base64(iv):base64(tag):base64(ciphertext)`, standard base64 with padding.
//! IV and tag are always 16 bytes. Parsing checks every structural rule
//! before any decryption is attempted.

use std::fmt;

use crate::base64::{base64_decode, base64_encode};
use crate::error::CryptoError;
use crate::types::{AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, ENVELOPE_DELIMITER};

/// Decoded (IV, tag, ciphertext) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub iv: [u8; AES_GCM_IV_LENGTH],
    pub tag: [u8; AES_GCM_TAG_LENGTH],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Parse the wire format. Exactly two delimiters are required.
    pub fn parse(encoded: &str) -> Result<Self, CryptoError> {
        let parts: Vec<&str> = encoded.split(ENVELOPE_DELIMITER).collect();
        let [iv_b64, tag_b64, ct_b64] = parts.as_slice() else {
            return Err(CryptoError::MalformedEnvelope {
                segments: parts.len(),
            });
        };

        let iv = decode_segment(iv_b64, "iv")?;
        let tag = decode_segment(tag_b64, "tag")?;
        let ciphertext = decode_segment(ct_b64, "ciphertext")?;

        let iv = <[u8; AES_GCM_IV_LENGTH]>::try_from(iv.as_slice()).map_err(|_| {
            CryptoError::InvalidIvLength {
                expected: AES_GCM_IV_LENGTH,
                got: iv.len(),
            }
        })?;
        let tag = <[u8; AES_GCM_TAG_LENGTH]>::try_from(tag.as_slice()).map_err(|_| {
            CryptoError::InvalidTagLength {
                expected: AES_GCM_TAG_LENGTH,
                got: tag.len(),
            }
        })?;

        Ok(Self {
            iv,
            tag,
            ciphertext,
        })
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{d}{}{d}{}",
            base64_encode(&self.iv),
            base64_encode(&self.tag),
            base64_encode(&self.ciphertext),
            d = ENVELOPE_DELIMITER
        )
    }
}

fn decode_segment(segment: &str, name: &'static str) -> Result<Vec<u8>, CryptoError> {
    base64_decode(segment).map_err(|_| CryptoError::InvalidBase64 { segment: name })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope {
            iv: [7u8; AES_GCM_IV_LENGTH],
            tag: [9u8; AES_GCM_TAG_LENGTH],
            ciphertext: b"opaque".to_vec(),
        }
    }

    #[test]
    fn display_has_three_segments() {
        let wire = sample().to_string();
        assert_eq!(wire.matches(':').count(), 2);
        assert_eq!(Envelope::parse(&wire).unwrap(), sample());
    }

    #[test]
    fn empty_ciphertext_segment_is_valid() {
        let env = Envelope {
            ciphertext: Vec::new(),
            ..sample()
        };
        let wire = env.to_string();
        assert!(wire.ends_with(':'));
        assert_eq!(Envelope::parse(&wire).unwrap().ciphertext, Vec::<u8>::new());
    }

    #[test]
    fn rejects_wrong_segment_count() {
        let err = Envelope::parse("abc").unwrap_err();
        assert!(matches!(
            err,
            CryptoError::MalformedEnvelope { segments: 1 }
        ));

        let err = Envelope::parse("a:b:c:d").unwrap_err();
        assert!(matches!(
            err,
            CryptoError::MalformedEnvelope { segments: 4 }
        ));
    }

    #[test]
    fn rejects_short_iv() {
        let wire = format!(
            "{}:{}:{}",
            base64_encode(&[0u8; 12]),
            base64_encode(&[0u8; 16]),
            base64_encode(b"x")
        );
        let err = Envelope::parse(&wire).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidIvLength {
                expected: 16,
                got: 12
            }
        ));
    }

    #[test]
    fn rejects_short_tag() {
        let wire = format!(
            "{}:{}:{}",
            base64_encode(&[0u8; 16]),
            base64_encode(&[0u8; 8]),
            base64_encode(b"x")
        );
        let err = Envelope::parse(&wire).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidTagLength {
                expected: 16,
                got: 8
            }
        ));
    }

    #[test]
    fn rejects_bad_base64() {
        let wire = format!("!!!!:{}:", base64_encode(&[0u8; 16]));
        let err = Envelope::parse(&wire).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidBase64 { segment: "iv" }));
        assert!(err.is_format_error());
    }
}
