use axum::response::Html;

use rightsplace_shared::types::auth::AuthUser;
use rightsplace_shared::types::FieldErrors;

use crate::domain::{category_label, status_label, ReportCategory};
use crate::forms::{EvidencePolicy, ReportSubmission, ReportVariant};
use crate::services::report_service::ReportSummary;
use crate::session::Flash;

use super::{file_input, html_escape, input, layout, non_field_errors, select, textarea};

pub fn report_form_page(
    variant: ReportVariant,
    viewer: Option<&AuthUser>,
    form: &ReportSubmission,
    errors: &FieldErrors,
    policy: &EvidencePolicy,
) -> Html<String> {
    let (title, action, intro) = match variant {
        ReportVariant::Authenticated => (
            "Submit a report",
            "/report/create/",
            "Your report is linked to your account so you can follow its progress.",
        ),
        ReportVariant::Anonymous => (
            "Report anonymously",
            "/report/anonymous/",
            "No account is needed. Contact details are optional and only used to follow up with you.",
        ),
    };

    let categories: Vec<(&str, &str)> = ReportCategory::ALL.iter().map(|c| (c.code(), c.label())).collect();
    let selected = form.category.as_deref().unwrap_or(ReportCategory::default().code());

    let contact = match variant {
        ReportVariant::Authenticated => String::new(),
        ReportVariant::Anonymous => format!(
            "{}{}",
            input("email", "contact_email", "Contact email (optional)", form.contact_email.as_deref(), errors),
            input("tel", "contact_phone", "Contact phone (optional)", form.contact_phone.as_deref(), errors),
        ),
    };

    let help = format!(
        "Images, video, audio, PDF, Word, Excel or plain text. Up to {} MB per file.",
        policy.max_megabytes()
    );

    let body = format!(
        r#"<h1>{title}</h1>
<p>{intro}</p>
<form method="post" action="{action}" enctype="multipart/form-data">
    {non_field}
    {title_input}
    {description}
    {category}
    {location}
    {date}
    {contact}
    {files}
    <button type="submit">Submit report</button>
</form>"#,
        non_field = non_field_errors(errors),
        title_input = input("text", "title", "Title", form.title.as_deref(), errors),
        description = textarea("description", "What happened?", form.description.as_deref(), errors),
        category = select("category", "Category", &categories, Some(selected), errors),
        location = input("text", "incident_location", "Where did it happen?", form.incident_location.as_deref(), errors),
        date = input("date", "incident_date", "When did it happen?", form.incident_date.as_deref(), errors),
        files = file_input("evidence_files", "Evidence", &help, errors),
    );

    layout(title, viewer, None, &body)
}

pub fn my_reports_page(viewer: &AuthUser, reports: &[ReportSummary], flash: Option<Flash>) -> Html<String> {
    let content = if reports.is_empty() {
        r#"<p>You have not submitted any reports yet. <a href="/report/create/">Submit one now.</a></p>"#.to_string()
    } else {
        let rows: String = reports
            .iter()
            .map(|s| {
                let case = match &s.case {
                    Some(case) => {
                        let mut parts = Vec::new();
                        if let Some(name) = s.lawyer_name.as_deref() {
                            parts.push(format!("Lawyer: {}", html_escape(name)));
                        }
                        if let Some(name) = s.ngo_name.as_deref() {
                            parts.push(format!("NGO: {}", html_escape(name)));
                        }
                        if let Some(update) = case.status_update.as_deref() {
                            parts.push(html_escape(update));
                        }
                        if parts.is_empty() {
                            "Case opened".to_string()
                        } else {
                            parts.join("<br>")
                        }
                    }
                    None => "Awaiting review".to_string(),
                };
                format!(
                    r#"<tr><td>{title}</td><td>{category}</td><td><span class="badge">{status}</span></td><td>{evidence}</td><td>{case}</td><td>{submitted}</td></tr>"#,
                    title = html_escape(&s.report.title),
                    category = html_escape(category_label(&s.report.category)),
                    status = html_escape(status_label(&s.report.status)),
                    evidence = s.evidence_count,
                    submitted = s.report.created_at.format("%Y-%m-%d"),
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Title</th><th>Category</th><th>Status</th><th>Evidence</th><th>Case</th><th>Submitted</th></tr></thead><tbody>{rows}</tbody></table>"
        )
    };

    let body = format!("<h1>My reports</h1>{content}");
    layout("My reports", Some(viewer), flash, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Report;
    use chrono::Utc;
    use rightsplace_shared::types::auth::UserRole;
    use uuid::Uuid;

    fn viewer() -> AuthUser {
        AuthUser {
            id: Uuid::now_v7(),
            username: "amina".into(),
            role: UserRole::User,
            token_id: Uuid::now_v7(),
        }
    }

    #[test]
    fn anonymous_form_asks_for_contact_details() {
        let Html(html) = report_form_page(
            ReportVariant::Anonymous,
            None,
            &ReportSubmission::default(),
            &FieldErrors::new(),
            &EvidencePolicy::new(100 * 1024 * 1024),
        );
        assert!(html.contains("contact_email"));
        assert!(html.contains("Up to 100 MB per file."));
        assert!(html.contains(r#"enctype="multipart/form-data""#));
    }

    #[test]
    fn logged_in_form_has_no_contact_fields() {
        let Html(html) = report_form_page(
            ReportVariant::Authenticated,
            Some(&viewer()),
            &ReportSubmission::default(),
            &FieldErrors::new(),
            &EvidencePolicy::new(25 * 1024 * 1024),
        );
        assert!(!html.contains("contact_email"));
        assert!(html.contains(r#"<option value="OT" selected>"#));
    }

    #[test]
    fn report_rows_show_labels() {
        let now = Utc::now();
        let summary = ReportSummary {
            report: Report {
                id: Uuid::now_v7(),
                reporter_id: Some(Uuid::now_v7()),
                title: "Eviction <without notice>".into(),
                description: "…".into(),
                category: "HR".into(),
                incident_location: None,
                incident_date: None,
                status: "in_progress".into(),
                contact_email: None,
                contact_phone: None,
                created_at: now,
                updated_at: now,
            },
            evidence_count: 2,
            case: None,
            lawyer_name: None,
            ngo_name: None,
        };
        let Html(html) = my_reports_page(&viewer(), &[summary], None);
        assert!(html.contains("In Progress"));
        assert!(html.contains("Human Rights"));
        assert!(html.contains("Eviction &lt;without notice&gt;"));
    }
}
