use serde::Deserialize;

use rightsplace_shared::types::FieldErrors;

use super::required;

pub const INVALID_LOGIN: &str = "Invalid username/email or password.";

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginForm {
    pub identifier: Option<String>,
    pub password: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub identifier: String,
    pub password: String,
}

impl LoginForm {
    pub fn clean(&self) -> Result<LoginCredentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        let identifier = required(&mut errors, "identifier", self.identifier.as_deref());

        // Passwords are never trimmed.
        let password = self.password.clone().filter(|p| !p.is_empty());
        if password.is_none() {
            errors.add("password", super::REQUIRED);
        }

        match (identifier, password) {
            (Some(identifier), Some(password)) if errors.is_empty() => Ok(LoginCredentials { identifier, password }),
            _ => Err(errors),
        }
    }
}

/// Accepts only same-site absolute paths, so `next` cannot send the browser
/// to another host.
pub fn safe_next(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    let local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control);
    local.then(|| next.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_fields_are_required() {
        let errors = LoginForm::default().clean().unwrap_err();
        assert!(errors.has("identifier"));
        assert!(errors.has("password"));
    }

    #[test]
    fn identifier_is_trimmed_but_password_is_not() {
        let form = LoginForm {
            identifier: Some("  amina@example.org ".into()),
            password: Some(" secret1 ".into()),
            next: None,
        };
        let creds = form.clean().unwrap();
        assert_eq!(creds.identifier, "amina@example.org");
        assert_eq!(creds.password, " secret1 ");
    }

    #[test]
    fn next_must_be_local() {
        assert_eq!(safe_next(Some("/my-reports/")), Some("/my-reports/".to_string()));
        assert_eq!(safe_next(Some("//evil.example/")), None);
        assert_eq!(safe_next(Some("https://evil.example/")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(None), None);
    }
}
