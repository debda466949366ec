use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{ProfileFacts, ProfileRole, ReportStatus};
use crate::schema::{accounts, admin_actions, cases, evidence, reports, user_profiles};

// --- Account ---

#[derive(Debug, Queryable, Selectable, Identifiable, Serialize, Clone)]
#[diesel(table_name = accounts)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// "First Last", or the username when no name was given.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccount {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

// --- UserProfile ---

#[derive(Debug, Queryable, Selectable, Identifiable, Associations, Serialize, Clone)]
#[diesel(table_name = user_profiles)]
#[diesel(belongs_to(Account))]
pub struct UserProfile {
    pub id: Uuid,
    pub account_id: Uuid,
    pub role: String,
    pub organization_name: Option<String>,
    pub rc_number: Option<String>,
    pub enrolment_number: Option<String>,
    pub specialization: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub wants_contact: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn role(&self) -> ProfileRole {
        self.role.parse().unwrap_or(ProfileRole::User)
    }

    pub fn verified_status(&self) -> &'static str {
        if self.is_verified { "Verified" } else { "Unverified" }
    }

    pub fn facts(&self) -> ProfileFacts<'_> {
        ProfileFacts {
            organization_name: self.organization_name.as_deref(),
            rc_number: self.rc_number.as_deref(),
            enrolment_number: self.enrolment_number.as_deref(),
            email: self.email.as_deref(),
            phone_number: self.phone_number.as_deref(),
            is_verified: self.is_verified,
        }
    }

    /// "City, State" with whichever parts are present.
    pub fn locality(&self) -> Option<String> {
        let parts: Vec<&str> = [self.city.as_deref(), self.state.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() { None } else { Some(parts.join(", ")) }
    }
}

#[derive(Debug, Insertable, Default)]
#[diesel(table_name = user_profiles)]
pub struct NewUserProfile {
    pub account_id: Uuid,
    pub role: String,
    pub organization_name: Option<String>,
    pub rc_number: Option<String>,
    pub enrolment_number: Option<String>,
    pub specialization: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub wants_contact: bool,
    pub is_verified: bool,
}

// --- Report ---

#[derive(Debug, Queryable, Selectable, Identifiable, Associations, Serialize, Clone)]
#[diesel(table_name = reports)]
#[diesel(belongs_to(UserProfile, foreign_key = reporter_id))]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub incident_location: Option<String>,
    pub incident_date: Option<NaiveDate>,
    pub status: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    pub fn status(&self) -> ReportStatus {
        self.status.parse().unwrap_or(ReportStatus::Pending)
    }

    pub fn is_anonymous(&self) -> bool {
        self.reporter_id.is_none()
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reports)]
pub struct NewReport {
    pub id: Uuid,
    pub reporter_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub incident_location: Option<String>,
    pub incident_date: Option<NaiveDate>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

// --- Evidence ---

#[derive(Debug, Queryable, Selectable, Identifiable, Associations, Serialize, Clone)]
#[diesel(table_name = evidence)]
#[diesel(belongs_to(Report))]
pub struct Evidence {
    pub id: Uuid,
    pub report_id: Uuid,
    pub storage_key: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub caption: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = evidence)]
pub struct NewEvidence {
    pub report_id: Uuid,
    pub storage_key: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub caption: Option<String>,
}

// --- Case ---

#[derive(Debug, Queryable, Selectable, Identifiable, Associations, Serialize, Clone)]
#[diesel(table_name = cases)]
#[diesel(belongs_to(Report))]
pub struct Case {
    pub id: Uuid,
    pub report_id: Uuid,
    pub assigned_lawyer_id: Option<Uuid>,
    pub assigned_ngo_id: Option<Uuid>,
    pub status_update: Option<String>,
    pub last_contact_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cases)]
pub struct NewCase {
    pub report_id: Uuid,
    pub assigned_lawyer_id: Option<Uuid>,
    pub assigned_ngo_id: Option<Uuid>,
    pub status_update: Option<String>,
    pub last_contact_date: Option<NaiveDate>,
}

/// Full replacement of the editable case fields; `None` clears a column.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = cases)]
#[diesel(treat_none_as_null = true)]
pub struct CaseChanges {
    pub assigned_lawyer_id: Option<Uuid>,
    pub assigned_ngo_id: Option<Uuid>,
    pub status_update: Option<String>,
    pub last_contact_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

// --- AdminAction ---

#[derive(Debug, Queryable, Selectable, Identifiable, Serialize, Clone)]
#[diesel(table_name = admin_actions)]
pub struct AdminAction {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admin_actions)]
pub struct NewAdminAction {
    pub admin_id: Uuid,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
}
