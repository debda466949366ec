use serde::Deserialize;

use rightsplace_shared::types::FieldErrors;

use crate::domain::{check_profile_rules, ProfileFacts, ProfileRole};
use crate::services::auth_service;

use super::{checkbox, clean_text, humanize, max_chars, optional_email, required, REQUIRED};

const USERNAME_MAX: usize = 150;

/// Raw registration submission. One form serves all three roles; `role`
/// decides which fields are required.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RegistrationForm {
    pub role: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub wants_contact: Option<String>,
    pub enrolment_number: Option<String>,
    pub specialization: Option<String>,
    pub organization_name: Option<String>,
    pub rc_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Cleaned registration, ready to become an account and a profile.
#[derive(Debug, Clone)]
pub struct Registration {
    pub role: ProfileRole,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub wants_contact: bool,
    pub enrolment_number: Option<String>,
    pub specialization: Option<String>,
    pub organization_name: Option<String>,
    pub rc_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl Registration {
    pub fn facts(&self) -> ProfileFacts<'_> {
        ProfileFacts {
            organization_name: self.organization_name.as_deref(),
            rc_number: self.rc_number.as_deref(),
            enrolment_number: self.enrolment_number.as_deref(),
            email: self.email.as_deref(),
            phone_number: self.phone_number.as_deref(),
            is_verified: false,
        }
    }
}

fn valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

impl RegistrationForm {
    pub fn role(&self) -> Option<ProfileRole> {
        self.role.as_deref().and_then(|r| r.trim().parse().ok())
    }

    pub fn clean(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let role = match self.role.as_deref().map(str::trim) {
            None | Some("") => Some(ProfileRole::User),
            Some(raw) => {
                let parsed = raw.parse::<ProfileRole>().ok();
                if parsed.is_none() {
                    errors.add("role", format!("Select a valid choice. {raw} is not one of the available choices."));
                }
                parsed
            }
        };

        let username = required(&mut errors, "username", self.username.as_deref());
        if let Some(u) = username.as_deref() {
            max_chars(&mut errors, "username", Some(u), USERNAME_MAX);
            if !valid_username(u) {
                errors.add(
                    "username",
                    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
                );
            }
        }

        let password = self.password.clone().filter(|p| !p.is_empty());
        match password.as_deref() {
            None => errors.add("password", REQUIRED),
            Some(p) => {
                if let Err(msg) = auth_service::check_password_strength(p) {
                    errors.add("password", msg);
                }
            }
        }

        let email = optional_email(&mut errors, "email", self.email.as_deref());
        let phone_number = clean_text(self.phone_number.as_deref());
        max_chars(&mut errors, "phone_number", phone_number.as_deref(), 20);

        let first_name = clean_text(self.first_name.as_deref());
        let last_name = clean_text(self.last_name.as_deref());
        max_chars(&mut errors, "first_name", first_name.as_deref(), 150);
        max_chars(&mut errors, "last_name", last_name.as_deref(), 150);

        let city = clean_text(self.city.as_deref());
        let state = clean_text(self.state.as_deref());
        max_chars(&mut errors, "city", city.as_deref(), 100);
        max_chars(&mut errors, "state", state.as_deref(), 100);

        let wants_contact = checkbox(self.wants_contact.as_deref());
        let mut enrolment_number = None;
        let mut specialization = None;
        let mut organization_name = None;
        let mut rc_number = None;

        // A field that failed format checks is not reported missing as well.
        let present = |errors: &FieldErrors, field: &str, value: Option<&str>| {
            errors.has(field) || clean_text(value).is_some()
        };

        match role {
            Some(ProfileRole::User) => {
                if wants_contact {
                    for (field, value) in [
                        ("first_name", self.first_name.as_deref()),
                        ("last_name", self.last_name.as_deref()),
                        ("email", self.email.as_deref()),
                        ("phone_number", self.phone_number.as_deref()),
                    ] {
                        if !present(&errors, field, value) {
                            errors.add(field, format!("{} is required.", humanize(field)));
                        }
                    }
                }
            }
            Some(ProfileRole::Lawyer) => {
                for (field, value) in [
                    ("first_name", self.first_name.as_deref()),
                    ("last_name", self.last_name.as_deref()),
                    ("email", self.email.as_deref()),
                    ("phone_number", self.phone_number.as_deref()),
                ] {
                    if !present(&errors, field, value) {
                        errors.add(field, REQUIRED);
                    }
                }
                enrolment_number = required(&mut errors, "enrolment_number", self.enrolment_number.as_deref());
                max_chars(&mut errors, "enrolment_number", enrolment_number.as_deref(), 50);
                specialization = clean_text(self.specialization.as_deref());
                max_chars(&mut errors, "specialization", specialization.as_deref(), 100);
            }
            Some(ProfileRole::Ngo) => {
                for (field, value) in [
                    ("first_name", self.first_name.as_deref()),
                    ("last_name", self.last_name.as_deref()),
                    ("email", self.email.as_deref()),
                    ("phone_number", self.phone_number.as_deref()),
                ] {
                    if !present(&errors, field, value) {
                        errors.add(field, REQUIRED);
                    }
                }
                organization_name = required(&mut errors, "organization_name", self.organization_name.as_deref());
                max_chars(&mut errors, "organization_name", organization_name.as_deref(), 100);
                rc_number = required(&mut errors, "rc_number", self.rc_number.as_deref());
                max_chars(&mut errors, "rc_number", rc_number.as_deref(), 50);
            }
            None => {}
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let (Some(role), Some(username), Some(password)) = (role, username, password) else {
            return Err(errors);
        };

        let registration = Registration {
            role,
            username,
            password,
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
            email,
            phone_number,
            wants_contact: role == ProfileRole::User && wants_contact,
            enrolment_number,
            specialization,
            organization_name,
            rc_number,
            city,
            state,
        };

        if let Err(msg) = check_profile_rules(registration.role, &registration.facts()) {
            errors.add_non_field(msg);
            return Err(errors);
        }

        Ok(registration)
    }
}
