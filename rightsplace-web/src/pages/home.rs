use axum::response::Html;

use rightsplace_shared::types::auth::{AuthUser, UserRole};

use crate::domain::ReportCategory;
use crate::session::Flash;

use super::{html_escape, layout};

pub fn index_page(viewer: Option<&AuthUser>, flash: Option<Flash>) -> Html<String> {
    let categories: String = ReportCategory::ALL
        .iter()
        .map(|c| format!("<li>{}</li>", html_escape(c.label())))
        .collect();

    let call_to_action = match viewer.map(|u| u.role) {
        None => r#"<p><a href="/report/anonymous/">Report anonymously</a>, or <a href="/register/">create an account</a> to follow your reports.</p>"#,
        Some(UserRole::User) => r#"<p><a href="/report/create/">Submit a report</a> or review <a href="/my-reports/">your reports</a>.</p>"#,
        Some(UserRole::Lawyer | UserRole::Ngo) => r#"<p>See the <a href="/cases/assigned/">cases assigned to you</a>.</p>"#,
        Some(UserRole::Admin) => r#"<p>Open the <a href="/admin/stats">admin overview</a>.</p>"#,
    };

    let body = format!(
        r#"<h1>Speak up safely</h1>
<p>RightsPlace connects people affected by human rights abuses with verified lawyers and NGOs.
Reports can be filed with or without an account, and evidence is stored privately.</p>
{call_to_action}
<h2>What you can report</h2>
<ul>{categories}</ul>
<p>Looking for help directly? Browse our <a href="/partners/verified/">verified partners</a>.</p>"#
    );

    layout("Home", viewer, flash, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_visitors_are_offered_anonymous_reporting() {
        let Html(html) = index_page(None, None);
        assert!(html.contains("/report/anonymous/"));
        assert!(html.contains("Whistleblowing"));
    }

    #[test]
    fn flash_is_rendered() {
        let Html(html) = index_page(None, Some(Flash::LoggedOut));
        assert!(html.contains("You have been logged out."));
    }
}
