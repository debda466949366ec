//! Enumerations stored as short strings and the rules attached to them.

use serde::{Deserialize, Serialize};

use rightsplace_shared::types::auth::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileRole {
    Lawyer,
    Ngo,
    User,
}

impl ProfileRole {
    pub const ALL: [ProfileRole; 3] = [ProfileRole::User, ProfileRole::Lawyer, ProfileRole::Ngo];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileRole::Lawyer => "lawyer",
            ProfileRole::Ngo => "ngo",
            ProfileRole::User => "user",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProfileRole::Lawyer => "Lawyer",
            ProfileRole::Ngo => "NGO Representative",
            ProfileRole::User => "Regular User",
        }
    }

    pub fn can_be_verified(&self) -> bool {
        matches!(self, ProfileRole::Lawyer | ProfileRole::Ngo)
    }

    pub fn session_role(&self) -> UserRole {
        match self {
            ProfileRole::Lawyer => UserRole::Lawyer,
            ProfileRole::Ngo => UserRole::Ngo,
            ProfileRole::User => UserRole::User,
        }
    }
}

impl std::fmt::Display for ProfileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProfileRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lawyer" => Ok(ProfileRole::Lawyer),
            "ngo" => Ok(ProfileRole::Ngo),
            "user" => Ok(ProfileRole::User),
            _ => Err(format!("unknown profile role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Resolved,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 3] = [ReportStatus::Pending, ReportStatus::InProgress, ReportStatus::Resolved];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::InProgress => "in_progress",
            ReportStatus::Resolved => "resolved",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending Review",
            ReportStatus::InProgress => "In Progress",
            ReportStatus::Resolved => "Resolved",
        }
    }

    /// Status after a case has been saved for the report.
    pub fn after_case_saved(self) -> Self {
        match self {
            ReportStatus::Pending => ReportStatus::InProgress,
            other => other,
        }
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReportStatus::Pending),
            "in_progress" => Ok(ReportStatus::InProgress),
            "resolved" => Ok(ReportStatus::Resolved),
            _ => Err(format!("unknown report status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportCategory {
    #[serde(rename = "HR")]
    HumanRights,
    #[serde(rename = "GV")]
    GenderViolence,
    #[serde(rename = "DV")]
    DomesticViolence,
    #[serde(rename = "WL")]
    Whistleblowing,
    #[serde(rename = "OT")]
    Other,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 5] = [
        ReportCategory::HumanRights,
        ReportCategory::GenderViolence,
        ReportCategory::DomesticViolence,
        ReportCategory::Whistleblowing,
        ReportCategory::Other,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ReportCategory::HumanRights => "HR",
            ReportCategory::GenderViolence => "GV",
            ReportCategory::DomesticViolence => "DV",
            ReportCategory::Whistleblowing => "WL",
            ReportCategory::Other => "OT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportCategory::HumanRights => "Human Rights",
            ReportCategory::GenderViolence => "Gender Violence",
            ReportCategory::DomesticViolence => "Domestic Violence",
            ReportCategory::Whistleblowing => "Whistleblowing",
            ReportCategory::Other => "Other",
        }
    }
}

impl Default for ReportCategory {
    fn default() -> Self {
        ReportCategory::Other
    }
}

impl std::str::FromStr for ReportCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportCategory::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| format!("unknown report category: {s}"))
    }
}

/// Label for a stored status string, falling back to the raw value.
pub fn status_label(raw: &str) -> &str {
    raw.parse::<ReportStatus>().map(|s| s.label()).unwrap_or(raw)
}

/// Label for a stored category code, falling back to the raw value.
pub fn category_label(raw: &str) -> &str {
    raw.parse::<ReportCategory>().map(|c| c.label()).unwrap_or(raw)
}

/// Fields of a profile the role rules look at.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProfileFacts<'a> {
    pub organization_name: Option<&'a str>,
    pub rc_number: Option<&'a str>,
    pub enrolment_number: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub is_verified: bool,
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Checks the role invariants every stored profile must satisfy.
pub fn check_profile_rules(role: ProfileRole, facts: &ProfileFacts<'_>) -> Result<(), &'static str> {
    if facts.is_verified && !role.can_be_verified() {
        return Err("Only NGOs and Lawyers can be verified.");
    }

    match role {
        ProfileRole::Ngo => {
            if !present(facts.organization_name) {
                return Err("NGO Representatives must provide an organization name.");
            }
            if !present(facts.rc_number) {
                return Err("NGO Representatives must provide an RC number.");
            }
        }
        ProfileRole::Lawyer => {
            if !present(facts.enrolment_number) {
                return Err("Lawyers must provide an enrolment number.");
            }
        }
        ProfileRole::User => {}
    }

    if role.can_be_verified() && (!present(facts.email) || !present(facts.phone_number)) {
        return Err("Lawyers and NGOs must provide both email and phone number.");
    }

    Ok(())
}
