//! Form cleaning: raw submitted values in, typed values or per-field errors
//! out. Nothing here touches the database.

pub mod evidence;
pub mod login;
pub mod registration;
pub mod report;

pub use evidence::{clean_caption, EvidencePolicy, UploadedFile};
pub use login::{safe_next, LoginCredentials, LoginForm};
pub use registration::{Registration, RegistrationForm};
pub use report::{CleanReport, ReportSubmission, ReportVariant};

use chrono::NaiveDate;
use rightsplace_shared::types::FieldErrors;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";

/// Trimmed value, `None` when blank.
pub fn clean_text(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// `first_name` -> `First Name`
pub fn humanize(field: &str) -> String {
    field
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// HTML checkboxes submit `on`; API clients send `true`/`1`.
pub fn checkbox(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("on" | "true" | "1" | "yes")
    )
}

pub fn is_valid_email(value: &str) -> bool {
    validator::validate_email(value)
}

pub(crate) fn required(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    let cleaned = clean_text(value);
    if cleaned.is_none() {
        errors.add(field, REQUIRED);
    }
    cleaned
}

pub(crate) fn max_chars(errors: &mut FieldErrors, field: &str, value: Option<&str>, max: usize) {
    if let Some(v) = value {
        let count = v.chars().count();
        if count > max {
            errors.add(
                field,
                format!("Ensure this value has at most {max} characters (it has {count})."),
            );
        }
    }
}

pub(crate) fn optional_email(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    let cleaned = clean_text(value)?;
    if is_valid_email(&cleaned) {
        Some(cleaned)
    } else {
        errors.add(field, INVALID_EMAIL);
        None
    }
}

pub(crate) fn optional_date(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<NaiveDate> {
    let cleaned = clean_text(value)?;
    match NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Enter a valid date (YYYY-MM-DD).");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanize_titles_each_word() {
        assert_eq!(humanize("first_name"), "First Name");
        assert_eq!(humanize("phone_number"), "Phone Number");
        assert_eq!(humanize("email"), "Email");
    }

    #[test]
    fn checkbox_values() {
        assert!(checkbox(Some("on")));
        assert!(checkbox(Some("TRUE")));
        assert!(!checkbox(Some("off")));
        assert!(!checkbox(None));
    }

    #[test]
    fn blank_text_is_none() {
        assert_eq!(clean_text(Some("   ")), None);
        assert_eq!(clean_text(Some(" Lagos ")), Some("Lagos".to_string()));
    }

    #[test]
    fn dates_must_be_iso() {
        let mut errors = FieldErrors::new();
        assert!(optional_date(&mut errors, "incident_date", Some("2024-02-30")).is_none());
        assert!(errors.has("incident_date"));

        let mut errors = FieldErrors::new();
        let date = optional_date(&mut errors, "incident_date", Some("2024-02-29"));
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert!(errors.is_empty());
    }
}
