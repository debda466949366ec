use chrono::{NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Deserialize;
use uuid::Uuid;

use rightsplace_shared::errors::{AppError, AppResult, ErrorCode};

use crate::domain::{ProfileRole, ReportStatus};
use crate::models::{Account, Case, CaseChanges, NewCase, Report, UserProfile};
use crate::schema::{accounts, cases, reports, user_profiles};
use crate::services::report_service;

/// Editable case fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseInput {
    pub assigned_lawyer_id: Option<Uuid>,
    pub assigned_ngo_id: Option<Uuid>,
    pub status_update: Option<String>,
    pub last_contact_date: Option<NaiveDate>,
}

/// A partner may only take a slot matching their role, once verified.
pub fn check_assignment(profile: &UserProfile, slot: ProfileRole) -> Result<(), String> {
    if profile.role() != slot {
        return Err(format!(
            "Profile {} is a {}, not a {}.",
            profile.id,
            profile.role().label(),
            slot.label()
        ));
    }
    if !profile.is_verified {
        return Err(format!("{} profile {} is not verified.", slot.label(), profile.id));
    }
    Ok(())
}

fn validate_slot(conn: &mut PgConnection, field: &str, profile_id: Option<Uuid>, slot: ProfileRole) -> AppResult<()> {
    let Some(profile_id) = profile_id else {
        return Ok(());
    };

    let profile = user_profiles::table
        .find(profile_id)
        .first::<UserProfile>(conn)
        .optional()?
        .ok_or_else(|| AppError::field(field, format!("Profile {profile_id} does not exist.")))?;

    check_assignment(&profile, slot).map_err(|msg| AppError::field(field, msg))
}

fn validate_input(conn: &mut PgConnection, input: &CaseInput) -> AppResult<()> {
    let lawyer = validate_slot(conn, "assigned_lawyer_id", input.assigned_lawyer_id, ProfileRole::Lawyer);
    let ngo = validate_slot(conn, "assigned_ngo_id", input.assigned_ngo_id, ProfileRole::Ngo);

    match (lawyer, ngo) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(AppError::Form(mut a)), Err(AppError::Form(b))) => {
            a.merge(b);
            Err(AppError::Form(a))
        }
        (Err(e), _) | (_, Err(e)) => Err(e),
    }
}

/// Moves a pending report forward once a case is saved for it.
fn advance_report(conn: &mut PgConnection, report: &Report) -> AppResult<Report> {
    let next = report.status().after_case_saved();
    if next == report.status() {
        return Ok(report.clone());
    }

    let updated = diesel::update(reports::table.find(report.id))
        .set((reports::status.eq(next.as_str()), reports::updated_at.eq(Utc::now())))
        .get_result::<Report>(conn)?;

    tracing::info!(report_id = %report.id, from = report.status.as_str(), to = next.as_str(), "report status advanced");
    Ok(updated)
}

/// Opens the case for a report. A report has at most one case.
pub fn create_case(conn: &mut PgConnection, report_id: Uuid, input: &CaseInput) -> AppResult<(Case, Report)> {
    conn.transaction(|conn| {
        let report = report_service::find_report(conn, report_id)?;

        let exists: bool = diesel::select(diesel::dsl::exists(
            cases::table.filter(cases::report_id.eq(report_id)),
        ))
        .get_result(conn)?;
        if exists {
            return Err(AppError::new(ErrorCode::CaseAlreadyExists, "this report already has a case"));
        }

        validate_input(conn, input)?;

        let new_case = NewCase {
            report_id,
            assigned_lawyer_id: input.assigned_lawyer_id,
            assigned_ngo_id: input.assigned_ngo_id,
            status_update: input.status_update.clone(),
            last_contact_date: input.last_contact_date,
        };

        let case = diesel::insert_into(cases::table)
            .values(&new_case)
            .get_result::<Case>(conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    AppError::new(ErrorCode::CaseAlreadyExists, "this report already has a case")
                }
                other => AppError::from(other),
            })?;

        let report = advance_report(conn, &report)?;
        metrics::counter!("rightsplace_cases_opened_total").increment(1);
        Ok((case, report))
    })
}

/// Replaces the editable fields of a case.
pub fn update_case(conn: &mut PgConnection, case_id: Uuid, input: &CaseInput) -> AppResult<(Case, Report)> {
    conn.transaction(|conn| {
        let existing = find_case(conn, case_id)?;
        validate_input(conn, input)?;

        let changes = CaseChanges {
            assigned_lawyer_id: input.assigned_lawyer_id,
            assigned_ngo_id: input.assigned_ngo_id,
            status_update: input.status_update.clone(),
            last_contact_date: input.last_contact_date,
            updated_at: Utc::now(),
        };

        let case = diesel::update(cases::table.find(existing.id))
            .set(&changes)
            .get_result::<Case>(conn)?;

        let report = report_service::find_report(conn, case.report_id)?;
        let report = advance_report(conn, &report)?;
        Ok((case, report))
    })
}

pub fn find_case(conn: &mut PgConnection, case_id: Uuid) -> AppResult<Case> {
    cases::table
        .find(case_id)
        .first::<Case>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::CaseNotFound, "case not found"))
}

pub fn delete_case(conn: &mut PgConnection, case_id: Uuid) -> AppResult<Case> {
    diesel::delete(cases::table.find(case_id))
        .get_result::<Case>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::CaseNotFound, "case not found"))
}

/// Cases where the profile holds either partner slot, most recently
/// touched first.
pub fn assigned_cases(conn: &mut PgConnection, profile_id: Uuid) -> AppResult<Vec<(Case, Report)>> {
    Ok(cases::table
        .inner_join(reports::table)
        .filter(
            cases::assigned_lawyer_id
                .eq(profile_id)
                .or(cases::assigned_ngo_id.eq(profile_id)),
        )
        .order(cases::updated_at.desc())
        .select((Case::as_select(), Report::as_select()))
        .load(conn)?)
}

/// Optional narrowing of the public partner directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerFilter {
    pub role: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl PartnerFilter {
    /// Requested partner role; anything but lawyer/ngo means both.
    pub fn partner_role(&self) -> Option<ProfileRole> {
        self.role
            .as_deref()
            .and_then(|r| r.trim().parse::<ProfileRole>().ok())
            .filter(ProfileRole::can_be_verified)
    }
}

/// Verified lawyers and NGOs with their accounts.
pub fn verified_partners(conn: &mut PgConnection, filter: &PartnerFilter) -> AppResult<Vec<(UserProfile, Account)>> {
    let roles: Vec<&str> = match filter.partner_role() {
        Some(role) => vec![role.as_str()],
        None => vec![ProfileRole::Lawyer.as_str(), ProfileRole::Ngo.as_str()],
    };

    let mut query = user_profiles::table
        .inner_join(accounts::table)
        .filter(user_profiles::is_verified.eq(true))
        .filter(user_profiles::role.eq_any(roles))
        .filter(accounts::is_active.eq(true))
        .into_boxed();

    if let Some(city) = crate::forms::clean_text(filter.city.as_deref()) {
        query = query.filter(user_profiles::city.ilike(super::like_escape(&city)));
    }
    if let Some(state) = crate::forms::clean_text(filter.state.as_deref()) {
        query = query.filter(user_profiles::state.ilike(super::like_escape(&state)));
    }

    Ok(query
        .order((user_profiles::role.asc(), user_profiles::organization_name.asc(), accounts::username.asc()))
        .select((UserProfile::as_select(), Account::as_select()))
        .load(conn)?)
}

/// Verified profiles that may fill a case slot.
pub fn eligible_partners(conn: &mut PgConnection, role: Option<ProfileRole>) -> AppResult<Vec<(UserProfile, Account)>> {
    let filter = PartnerFilter {
        role: role.map(|r| r.as_str().to_string()),
        ..Default::default()
    };
    verified_partners(conn, &filter)
}

/// Reports counted by status, in the order statuses are listed.
pub fn status_counts(conn: &mut PgConnection) -> AppResult<Vec<(ReportStatus, i64)>> {
    let rows: Vec<(String, i64)> = reports::table
        .group_by(reports::status)
        .select((reports::status, diesel::dsl::count_star()))
        .load(conn)?;

    Ok(ReportStatus::ALL
        .into_iter()
        .map(|s| {
            let n = rows.iter().find(|(raw, _)| raw == s.as_str()).map(|(_, n)| *n).unwrap_or(0);
            (s, n)
        })
        .collect())
}
