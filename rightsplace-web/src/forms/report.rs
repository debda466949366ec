use chrono::NaiveDate;

use rightsplace_shared::types::FieldErrors;

use crate::domain::ReportCategory;

use super::evidence::{EvidencePolicy, UploadedFile};
use super::{clean_text, max_chars, optional_date, optional_email, required};

/// Which report form was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportVariant {
    /// Logged-in reporter; the report is owned by their profile.
    Authenticated,
    /// No account; optional contact details instead.
    Anonymous,
}

/// Raw report submission collected from a multipart body.
#[derive(Debug, Default)]
pub struct ReportSubmission {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub incident_location: Option<String>,
    pub incident_date: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub evidence_files: Vec<UploadedFile>,
}

/// Validated report fields. Files stay on the submission.
#[derive(Debug, Clone)]
pub struct CleanReport {
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub incident_location: Option<String>,
    pub incident_date: Option<NaiveDate>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl ReportSubmission {
    /// Stores a text part by field name; unknown names are ignored.
    pub fn set_text(&mut self, name: &str, value: String) {
        let slot = match name {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "category" => &mut self.category,
            "incident_location" => &mut self.incident_location,
            "incident_date" => &mut self.incident_date,
            "contact_email" => &mut self.contact_email,
            "contact_phone" => &mut self.contact_phone,
            _ => return,
        };
        *slot = Some(value);
    }

    pub fn clean(&self, variant: ReportVariant, policy: &EvidencePolicy) -> Result<CleanReport, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = required(&mut errors, "title", self.title.as_deref());
        max_chars(&mut errors, "title", title.as_deref(), 200);
        let description = required(&mut errors, "description", self.description.as_deref());

        let category = match clean_text(self.category.as_deref()) {
            None => ReportCategory::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.add(
                    "category",
                    format!("Select a valid choice. {raw} is not one of the available choices."),
                );
                ReportCategory::default()
            }),
        };

        let incident_location = clean_text(self.incident_location.as_deref());
        max_chars(&mut errors, "incident_location", incident_location.as_deref(), 200);
        let incident_date = optional_date(&mut errors, "incident_date", self.incident_date.as_deref());

        let (contact_email, contact_phone) = match variant {
            ReportVariant::Authenticated => (None, None),
            ReportVariant::Anonymous => {
                let email = optional_email(&mut errors, "contact_email", self.contact_email.as_deref());
                let phone = clean_text(self.contact_phone.as_deref());
                max_chars(&mut errors, "contact_phone", phone.as_deref(), 20);
                (email, phone)
            }
        };

        for problem in policy.check_all(&self.evidence_files) {
            errors.add("evidence_files", problem);
        }

        match (title, description) {
            (Some(title), Some(description)) if errors.is_empty() => Ok(CleanReport {
                title,
                description,
                category,
                incident_location,
                incident_date,
                contact_email,
                contact_phone,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: usize = 1024 * 1024;

    fn submission() -> ReportSubmission {
        let mut s = ReportSubmission::default();
        s.set_text("title", "Unlawful detention at checkpoint".into());
        s.set_text("description", "Three traders were held without charge for four days.".into());
        s
    }

    #[test]
    fn minimal_report_defaults_to_other() {
        let clean = submission()
            .clean(ReportVariant::Authenticated, &EvidencePolicy::new(25 * MB))
            .unwrap();
        assert_eq!(clean.category, ReportCategory::Other);
        assert_eq!(clean.incident_date, None);
    }

    #[test]
    fn title_and_description_are_required() {
        let errors = ReportSubmission::default()
            .clean(ReportVariant::Anonymous, &EvidencePolicy::new(MB))
            .unwrap_err();
        assert!(errors.has("title"));
        assert!(errors.has("description"));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut s = submission();
        s.set_text("category", "XX".into());
        let errors = s.clean(ReportVariant::Anonymous, &EvidencePolicy::new(MB)).unwrap_err();
        assert!(errors.has("category"));
    }

    #[test]
    fn anonymous_contact_email_is_validated() {
        let mut s = submission();
        s.set_text("contact_email", "nobody@".into());
        let errors = s.clean(ReportVariant::Anonymous, &EvidencePolicy::new(MB)).unwrap_err();
        assert!(errors.has("contact_email"));

        s.set_text("contact_email", "witness@example.org".into());
        s.set_text("contact_phone", "0803 000 0000".into());
        let clean = s.clean(ReportVariant::Anonymous, &EvidencePolicy::new(MB)).unwrap();
        assert_eq!(clean.contact_email.as_deref(), Some("witness@example.org"));
    }

    #[test]
    fn contact_fields_are_dropped_for_logged_in_reports() {
        let mut s = submission();
        s.set_text("contact_email", "witness@example.org".into());
        let clean = s.clean(ReportVariant::Authenticated, &EvidencePolicy::new(MB)).unwrap();
        assert_eq!(clean.contact_email, None);
    }

    #[test]
    fn evidence_problems_are_collected_under_one_field() {
        let mut s = submission();
        s.evidence_files.push(UploadedFile::new("photo.jpg", Some("image/jpeg"), vec![0; 16]));
        s.evidence_files.push(UploadedFile::new("tool.exe", Some("application/x-msdownload"), vec![0; 16]));
        s.evidence_files.push(UploadedFile {
            file_name: "huge.mp4".into(),
            content_type: Some("video/mp4".into()),
            size: 26 * MB,
            data: Vec::new(),
        });

        let errors = s.clean(ReportVariant::Authenticated, &EvidencePolicy::new(25 * MB)).unwrap_err();
        assert_eq!(errors.get("evidence_files").len(), 2);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn unknown_text_fields_are_ignored() {
        let mut s = submission();
        s.set_text("csrfmiddlewaretoken", "abc".into());
        assert!(s.clean(ReportVariant::Anonymous, &EvidencePolicy::new(MB)).is_ok());
    }
}
