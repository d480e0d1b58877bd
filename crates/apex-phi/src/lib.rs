//! Display-side PHI handling: partial masks, structural redaction, and
//! free-text scrubbing. Nothing here needs key material.

pub mod fields;
pub mod mask;
pub mod redact;
pub mod scrub;
pub mod value;

pub use fields::{phi_fields_for, LOG_REDACT_FIELDS};
pub use mask::{mask_dob, mask_ssn, MASKED_DOB, MASKED_SSN};
pub use redact::{field_set, redact, redact_json, REDACTED};
pub use scrub::scrub_message;
pub use value::PhiValue;
