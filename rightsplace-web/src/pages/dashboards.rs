use axum::response::Html;

use rightsplace_shared::types::auth::AuthUser;

use crate::domain::{category_label, status_label};
use crate::models::{Account, Case, Report, UserProfile};
use crate::session::Flash;

use super::{html_escape, layout};

pub fn assigned_cases_page(
    viewer: &AuthUser,
    profile: Option<&UserProfile>,
    cases: &[(Case, Report)],
    flash: Option<Flash>,
) -> Html<String> {
    let verified = profile.is_some_and(|p| p.is_verified);

    let content = if !verified {
        r#"<p class="notice">Your profile is awaiting verification. Cases will appear here once an administrator has verified your credentials.</p>"#.to_string()
    } else if cases.is_empty() {
        "<p>No cases are assigned to you yet.</p>".to_string()
    } else {
        let rows: String = cases
            .iter()
            .map(|(case, report)| {
                let contact = report
                    .contact_email
                    .as_deref()
                    .or(report.contact_phone.as_deref())
                    .map(html_escape)
                    .unwrap_or_else(|| "None".to_string());
                format!(
                    r#"<tr><td>{title}</td><td>{category}</td><td><span class="badge">{status}</span></td><td>{update}</td><td>{last_contact}</td><td>{contact}</td></tr>"#,
                    title = html_escape(&report.title),
                    category = html_escape(category_label(&report.category)),
                    status = html_escape(status_label(&report.status)),
                    update = html_escape(case.status_update.as_deref().unwrap_or("")),
                    last_contact = case
                        .last_contact_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default(),
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Report</th><th>Category</th><th>Status</th><th>Latest update</th><th>Last contact</th><th>Reporter contact</th></tr></thead><tbody>{rows}</tbody></table>"
        )
    };

    let body = format!("<h1>Assigned cases</h1>{content}");
    layout("Assigned cases", Some(viewer), flash, &body)
}

fn partner_card(profile: &UserProfile, account: &Account) -> String {
    let name = account.display_name();

    let mut details = vec![format!(
        r#"<span class="badge">{}</span>"#,
        html_escape(profile.role().label())
    )];
    if let Some(org) = profile.organization_name.as_deref() {
        details.push(html_escape(org));
    }
    if let Some(spec) = profile.specialization.as_deref() {
        details.push(html_escape(spec));
    }
    if let Some(locality) = profile.locality() {
        details.push(html_escape(&locality));
    }
    if let Some(email) = profile.email.as_deref() {
        details.push(format!(r#"<a href="mailto:{0}">{0}</a>"#, html_escape(email)));
    }
    if let Some(phone) = profile.phone_number.as_deref() {
        details.push(html_escape(phone));
    }

    format!("<li><strong>{}</strong><br>{}</li>", html_escape(&name), details.join(" &middot; "))
}

pub fn partners_page(viewer: Option<&AuthUser>, partners: &[(UserProfile, Account)]) -> Html<String> {
    let content = if partners.is_empty() {
        "<p>No verified partners yet.</p>".to_string()
    } else {
        let items: String = partners.iter().map(|(p, a)| partner_card(p, a)).collect();
        format!("<ul>{items}</ul>")
    };

    let body = format!(
        "<h1>Verified partners</h1><p>Lawyers and NGOs whose credentials our team has verified.</p>{content}"
    );
    layout("Verified partners", viewer, None, &body)
}
