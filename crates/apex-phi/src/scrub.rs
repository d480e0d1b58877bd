//! Free-text scrubbing for messages that leave the process (error bodies,
//! log lines). Patterns run in a fixed order; each hit becomes `[REDACTED]`.

use std::sync::OnceLock;

use regex::Regex;

use crate::redact::REDACTED;

static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn patterns() -> &'static [Regex] {
    PATTERNS.get_or_init(|| {
        [
            // SSN
            r"\b[0-9]{3}-[0-9]{2}-[0-9]{4}\b",
            // SSN without dashes
            r"\b[0-9]{9}\b",
            // MM/DD/YYYY
            r"\b[0-9]{2}/[0-9]{2}/[0-9]{4}\b",
            // YYYY-MM-DD
            r"\b[0-9]{4}-[0-9]{2}-[0-9]{2}\b",
            // Email
            r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid scrub pattern"))
        .collect()
    })
}

/// Replace SSNs, dates and email addresses in `message`.
pub fn scrub_message(message: &str) -> String {
    let mut scrubbed = message.to_string();
    for pattern in patterns() {
        if pattern.is_match(&scrubbed) {
            scrubbed = pattern.replace_all(&scrubbed, REDACTED).into_owned();
        }
    }
    scrubbed
}
