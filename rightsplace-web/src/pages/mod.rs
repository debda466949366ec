//! Server-rendered HTML. Every value interpolated into markup goes
//! through [`html_escape`].

pub mod auth;
pub mod dashboards;
pub mod home;
pub mod reports;

use axum::response::Html;

use rightsplace_shared::types::auth::{AuthUser, UserRole};
use rightsplace_shared::types::{FieldErrors, NON_FIELD_ERRORS};

use crate::session::Flash;

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn nav(viewer: Option<&AuthUser>) -> String {
    let mut links = vec![
        r#"<a href="/">Home</a>"#.to_string(),
        r#"<a href="/partners/verified/">Verified partners</a>"#.to_string(),
    ];

    match viewer {
        None => {
            links.push(r#"<a href="/report/anonymous/">Report anonymously</a>"#.into());
            links.push(r#"<a href="/login/">Log in</a>"#.into());
            links.push(r#"<a href="/register/">Register</a>"#.into());
        }
        Some(user) => {
            match user.role {
                UserRole::User => {
                    links.push(r#"<a href="/report/create/">Submit a report</a>"#.into());
                    links.push(r#"<a href="/my-reports/">My reports</a>"#.into());
                }
                UserRole::Lawyer | UserRole::Ngo => {
                    links.push(r#"<a href="/cases/assigned/">Assigned cases</a>"#.into());
                }
                UserRole::Admin => {
                    links.push(r#"<a href="/admin/stats">Admin</a>"#.into());
                }
            }
            links.push(format!(
                r#"<span class="who">{}</span> <a href="/logout/">Log out</a>"#,
                html_escape(&user.username)
            ));
        }
    }

    format!("<nav>{}</nav>", links.join(" "))
}

pub fn layout(title: &str, viewer: Option<&AuthUser>, flash: Option<Flash>, body: &str) -> Html<String> {
    let flash = flash
        .map(|f| format!(r#"<div class="flash">{}</div>"#, html_escape(f.message())))
        .unwrap_or_default();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | RightsPlace</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; color: #1f2933; }}
        header {{ background: #123c69; color: #fff; padding: 16px 32px; }}
        header a, header .who {{ color: #fff; margin-right: 16px; text-decoration: none; }}
        main {{ max-width: 880px; margin: 32px auto; padding: 0 16px; }}
        .flash {{ background: #e3f9e5; border: 1px solid #57ae5b; padding: 12px; margin-bottom: 24px; border-radius: 6px; }}
        .notice {{ background: #fffbea; border: 1px solid #f0b429; padding: 12px; border-radius: 6px; }}
        .errorlist {{ color: #ba2525; margin: 4px 0; padding-left: 18px; }}
        label {{ display: block; font-weight: 600; margin-top: 16px; }}
        input, select, textarea {{ width: 100%; padding: 8px; box-sizing: border-box; }}
        input[type=checkbox] {{ width: auto; }}
        table {{ width: 100%; border-collapse: collapse; }}
        th, td {{ text-align: left; padding: 8px; border-bottom: 1px solid #e4e7eb; }}
        .badge {{ padding: 2px 8px; border-radius: 10px; background: #e4e7eb; font-size: 12px; }}
        button {{ margin-top: 24px; padding: 10px 24px; background: #123c69; color: #fff; border: 0; border-radius: 6px; }}
    </style>
</head>
<body>
    <header><strong>RightsPlace</strong> {nav}</header>
    <main>
        {flash}
        {body}
    </main>
</body>
</html>"#,
        title = html_escape(title),
        nav = nav(viewer),
    ))
}

/// Shows a page-level message with no form.
pub fn message_page(title: &str, viewer: Option<&AuthUser>, message: &str) -> Html<String> {
    let body = format!("<h1>{}</h1><p>{}</p>", html_escape(title), html_escape(message));
    layout(title, viewer, None, &body)
}

// --- Form widgets ---

fn error_list(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", html_escape(m)))
        .collect();
    format!(r#"<ul class="errorlist">{items}</ul>"#)
}

/// Errors that belong to no single field.
pub fn non_field_errors(errors: &FieldErrors) -> String {
    error_list(errors.get(NON_FIELD_ERRORS))
}

pub fn input(kind: &str, name: &str, label: &str, value: Option<&str>, errors: &FieldErrors) -> String {
    let value = if kind == "password" { "" } else { value.unwrap_or_default() };
    format!(
        r#"<label for="id_{name}">{label}</label><input type="{kind}" name="{name}" id="id_{name}" value="{value}">{errors}"#,
        label = html_escape(label),
        value = html_escape(value),
        errors = error_list(errors.get(name)),
    )
}

pub fn textarea(name: &str, label: &str, value: Option<&str>, errors: &FieldErrors) -> String {
    format!(
        r#"<label for="id_{name}">{label}</label><textarea name="{name}" id="id_{name}" rows="6">{value}</textarea>{errors}"#,
        label = html_escape(label),
        value = html_escape(value.unwrap_or_default()),
        errors = error_list(errors.get(name)),
    )
}

/// `options` are `(value, label)` pairs.
pub fn select(name: &str, label: &str, options: &[(&str, &str)], selected: Option<&str>, errors: &FieldErrors) -> String {
    let options: String = options
        .iter()
        .map(|(value, text)| {
            let mark = if Some(*value) == selected { " selected" } else { "" };
            format!(
                r#"<option value="{}"{mark}>{}</option>"#,
                html_escape(value),
                html_escape(text)
            )
        })
        .collect();
    format!(
        r#"<label for="id_{name}">{label}</label><select name="{name}" id="id_{name}">{options}</select>{errors}"#,
        label = html_escape(label),
        errors = error_list(errors.get(name)),
    )
}

pub fn checkbox(name: &str, label: &str, checked: bool, errors: &FieldErrors) -> String {
    let mark = if checked { " checked" } else { "" };
    format!(
        r#"<label><input type="checkbox" name="{name}"{mark}> {label}</label>{errors}"#,
        label = html_escape(label),
        errors = error_list(errors.get(name)),
    )
}

pub fn file_input(name: &str, label: &str, help: &str, errors: &FieldErrors) -> String {
    format!(
        r#"<label for="id_{name}">{label}</label><input type="file" name="{name}" id="id_{name}" multiple><small>{help}</small>{errors}"#,
        label = html_escape(label),
        help = html_escape(help),
        errors = error_list(errors.get(name)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn escapes_markup() {
        assert_eq!(html_escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;");
    }

    #[test]
    fn field_errors_render_under_their_input() {
        let mut errors = FieldErrors::new();
        errors.add("title", "This field is required.");
        let html = input("text", "title", "Title", Some("<b>"), &errors);
        assert!(html.contains("This field is required."));
        assert!(html.contains("&lt;b&gt;"));
    }

    #[test]
    fn password_values_are_never_echoed() {
        let html = input("password", "password", "Password", Some("hunter22"), &FieldErrors::new());
        assert!(!html.contains("hunter22"));
    }

    #[test]
    fn nav_depends_on_role() {
        let anonymous = nav(None);
        assert!(anonymous.contains("/login/"));

        let lawyer = AuthUser {
            id: Uuid::now_v7(),
            username: "ada".into(),
            role: UserRole::Lawyer,
            token_id: Uuid::now_v7(),
        };
        let html = nav(Some(&lawyer));
        assert!(html.contains("/cases/assigned/"));
        assert!(!html.contains("/my-reports/"));
    }

    #[test]
    fn selected_option_is_marked() {
        let html = select("role", "Role", &[("user", "Regular User"), ("ngo", "NGO")], Some("ngo"), &FieldErrors::new());
        assert!(html.contains(r#"<option value="ngo" selected>"#));
    }
}
