//! Format-preserving partial masks for displaying PHI.
//!
//! Output formats are fixed literals: `***-**-NNNN` for SSNs and
//! `****-**-DD` for dates of birth.

use std::sync::OnceLock;

use regex::Regex;

/// Fully masked SSN placeholder.
pub const MASKED_SSN: &str = "***-**-****";

/// Fully masked date-of-birth placeholder.
pub const MASKED_DOB: &str = "****-**-**";

struct DobPatterns {
    iso: Regex,
    us: Regex,
}

static DOB_PATTERNS: OnceLock<DobPatterns> = OnceLock::new();

fn dob_patterns() -> &'static DobPatterns {
    DOB_PATTERNS.get_or_init(|| DobPatterns {
        // YYYY-MM-DD
        iso: Regex::new(r"([0-9]{4})-([0-9]{2})-([0-9]{2})").expect("valid ISO date regex"),
        // MM/DD/YYYY or MM-DD-YYYY
        us: Regex::new(r"([0-9]{2})[/-]([0-9]{2})[/-]([0-9]{4})").expect("valid US date regex"),
    })
}

/// Mask an SSN, keeping only the last four digits.
///
/// Non-digits are ignored, so `123-45-6789`, `123 45 6789` and `123456789`
/// all give `***-**-6789`. Fewer than four digits gives [`MASKED_SSN`].
pub fn mask_ssn(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return MASKED_SSN.to_string();
    }
    let last_four: String = digits[digits.len() - 4..].iter().collect();
    format!("***-**-{}", last_four)
}

/// Mask a date of birth, keeping only the day.
///
/// ISO dates are tried before US dates. The day is copied from the match
/// as-is; it is not checked against the calendar.
pub fn mask_dob(raw: &str) -> String {
    let patterns = dob_patterns();

    if let Some(caps) = patterns.iso.captures(raw) {
        return format!("****-**-{}", &caps[3]);
    }
    if let Some(caps) = patterns.us.captures(raw) {
        return format!("****-**-{}", &caps[2]);
    }

    MASKED_DOB.to_string()
}
