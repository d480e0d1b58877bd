use base64ct::{Base64, Encoding};

/// Standard (RFC 4648 section 4) base64 encode with padding.
pub fn base64_encode(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Standard base64 decode. Rejects the URL-safe alphabet and bad padding.
pub fn base64_decode(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64::decode_vec(s)
}
