/// Field names always redacted before a record reaches a log line.
pub const LOG_REDACT_FIELDS: &[&str] = &[
    "ssn",
    "dateOfBirth",
    "password",
    "token",
    "authorization",
    "cookie",
    "set-cookie",
];

/// Sensitive fields carried by each resource type.
///
/// Unknown resources have no catalogued PHI and yield an empty slice.
pub fn phi_fields_for(resource: &str) -> &'static [&'static str] {
    match resource {
        "members" => &[
            "ssn",
            "dateOfBirth",
            "address",
            "phone",
            "medicalHistory",
            "diagnosis",
        ],
        "patients" => &["ssn", "dateOfBirth", "address", "phone", "medicalHistory"],
        "claims" => &["memberId", "diagnosis", "procedures", "providerNotes"],
        "eligibility" => &["memberId", "dateOfBirth", "ssn"],
        "prior-auth" => &["memberId", "diagnosis", "clinicalNotes"],
        "medical-records" => &["diagnosis", "treatment", "medications", "labResults"],
        "prescriptions" => &["memberId", "medications", "prescriber"],
        "lab-results" => &["memberId", "results", "diagnosis"],
        "encounters" => &["memberId", "diagnosis", "notes", "vitals"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_resources() {
        assert!(phi_fields_for("members").contains(&"ssn"));
        assert!(phi_fields_for("encounters").contains(&"vitals"));
        assert_eq!(phi_fields_for("eligibility").len(), 3);
    }

    #[test]
    fn log_fields_cover_request_and_response_cookies() {
        for field in ["authorization", "cookie", "set-cookie", "ssn", "dateOfBirth"] {
            assert!(LOG_REDACT_FIELDS.contains(&field), "{field}");
        }
    }

    #[test]
    fn unknown_resource_is_empty() {
        assert!(phi_fields_for("providers").is_empty());
    }
}
