use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::Json;
use chrono::{NaiveTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use rightsplace_shared::errors::{AppError, AppResult, ErrorCode};
use rightsplace_shared::middleware::AdminUser;
use rightsplace_shared::types::api::ApiResponse;
use rightsplace_shared::types::pagination::{Paginated, PaginationParams};

use crate::domain::{check_profile_rules, ProfileFacts, ProfileRole, ReportStatus};
use crate::forms::{clean_caption, clean_text};
use crate::models::{Account, AdminAction, Case, Evidence, Report, UserProfile};
use crate::schema::{accounts, admin_actions, cases, evidence, reports, user_profiles};
use crate::services::case_service::{self, CaseInput};
use crate::services::{audit, contains_pattern, report_service};
use crate::AppState;

fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 20 }

// --- Request / Response types ---

#[derive(Debug, Deserialize)]
pub struct ProfileFilterParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub role: Option<String>,
    pub is_verified: Option<bool>,
    pub wants_contact: Option<bool>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportFilterParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub category: Option<String>,
    pub status: Option<String>,
    pub q: Option<String>,
}

/// Pagination plus free-text search, used by evidence and case lists.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EligibleParams {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerificationRequest {
    pub is_verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReportStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct EvidenceCaptionRequest {
    pub caption: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCaseRequest {
    pub report_id: Uuid,
    #[serde(flatten)]
    pub case: CaseInput,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub username: String,
    pub display_name: String,
    pub verified_status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReportRow {
    #[serde(flatten)]
    pub report: Report,
    pub has_case: bool,
}

#[derive(Debug, Serialize)]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: Report,
    pub evidence: Vec<Evidence>,
    pub case: Option<Case>,
}

#[derive(Debug, Serialize)]
pub struct EvidenceRow {
    #[serde(flatten)]
    pub evidence: Evidence,
    pub report_title: String,
}

#[derive(Debug, Serialize)]
pub struct CaseRow {
    #[serde(flatten)]
    pub case: Case,
    pub report_title: String,
    pub report_status: String,
    pub assigned_lawyer: Option<String>,
    pub assigned_ngo: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PartnerOption {
    pub id: Uuid,
    pub role: String,
    pub username: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub pending_reports: i64,
    pub in_progress_reports: i64,
    pub unverified_partners: i64,
    pub open_cases: i64,
    pub reports_today: i64,
}

// --- Query builders ---

fn profiles_query(params: &ProfileFilterParams) -> user_profiles::BoxedQuery<'static, Pg> {
    let mut query = user_profiles::table.into_boxed();

    if let Some(role) = clean_text(params.role.as_deref()) {
        query = query.filter(user_profiles::role.eq(role));
    }
    if let Some(verified) = params.is_verified {
        query = query.filter(user_profiles::is_verified.eq(verified));
    }
    if let Some(wants_contact) = params.wants_contact {
        query = query.filter(user_profiles::wants_contact.eq(wants_contact));
    }
    if let Some(q) = clean_text(params.q.as_deref()) {
        let pattern = contains_pattern(&q);
        let matching_accounts = accounts::table
            .filter(
                accounts::username
                    .ilike(pattern.clone())
                    .or(accounts::first_name.ilike(pattern.clone()))
                    .or(accounts::last_name.ilike(pattern.clone()))
                    .or(accounts::email.assume_not_null().ilike(pattern.clone())),
            )
            .select(accounts::id);

        query = query.filter(
            user_profiles::account_id
                .eq_any(matching_accounts)
                .or(user_profiles::email.assume_not_null().ilike(pattern.clone()))
                .or(user_profiles::phone_number.assume_not_null().ilike(pattern.clone()))
                .or(user_profiles::organization_name.assume_not_null().ilike(pattern.clone()))
                .or(user_profiles::enrolment_number.assume_not_null().ilike(pattern.clone()))
                .or(user_profiles::rc_number.assume_not_null().ilike(pattern.clone()))
                .or(user_profiles::specialization.assume_not_null().ilike(pattern.clone()))
                .or(user_profiles::city.assume_not_null().ilike(pattern.clone()))
                .or(user_profiles::state.assume_not_null().ilike(pattern)),
        );
    }

    query
}

fn reports_query(params: &ReportFilterParams) -> reports::BoxedQuery<'static, Pg> {
    let mut query = reports::table.into_boxed();

    if let Some(category) = clean_text(params.category.as_deref()) {
        query = query.filter(reports::category.eq(category));
    }
    if let Some(status) = clean_text(params.status.as_deref()) {
        query = query.filter(reports::status.eq(status));
    }
    if let Some(q) = clean_text(params.q.as_deref()) {
        let pattern = contains_pattern(&q);
        let matching_reporters = user_profiles::table
            .inner_join(accounts::table)
            .filter(accounts::username.ilike(pattern.clone()))
            .select(user_profiles::id.nullable());

        query = query.filter(
            reports::title
                .ilike(pattern.clone())
                .or(reports::description.ilike(pattern))
                .or(reports::reporter_id.eq_any(matching_reporters)),
        );
    }

    query
}

fn evidence_query(params: &SearchParams) -> evidence::BoxedQuery<'static, Pg> {
    let mut query = evidence::table.into_boxed();

    if let Some(q) = clean_text(params.q.as_deref()) {
        let matching_reports = reports::table
            .filter(reports::title.ilike(contains_pattern(&q)))
            .select(reports::id);
        query = query.filter(evidence::report_id.eq_any(matching_reports));
    }

    query
}

fn cases_query(params: &SearchParams) -> cases::BoxedQuery<'static, Pg> {
    let mut query = cases::table.into_boxed();

    if let Some(q) = clean_text(params.q.as_deref()) {
        let pattern = contains_pattern(&q);
        let matching_reports = reports::table
            .filter(reports::title.ilike(pattern.clone()))
            .select(reports::id);
        let matching_lawyers = user_profiles::table
            .inner_join(accounts::table)
            .filter(accounts::username.ilike(pattern.clone()))
            .select(user_profiles::id.nullable());
        let matching_ngos = user_profiles::table
            .inner_join(accounts::table)
            .filter(accounts::username.ilike(pattern))
            .select(user_profiles::id.nullable());

        query = query.filter(
            cases::report_id
                .eq_any(matching_reports)
                .or(cases::assigned_lawyer_id.eq_any(matching_lawyers))
                .or(cases::assigned_ngo_id.eq_any(matching_ngos)),
        );
    }

    query
}

fn accounts_by_id(conn: &mut PgConnection, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Account>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = accounts::table
        .filter(accounts::id.eq_any(ids))
        .load::<Account>(conn)?;
    Ok(rows.into_iter().map(|a| (a.id, a)).collect())
}

fn profile_views(conn: &mut PgConnection, profiles: Vec<UserProfile>) -> AppResult<Vec<ProfileView>> {
    let ids: Vec<Uuid> = profiles.iter().map(|p| p.account_id).collect();
    let accounts = accounts_by_id(conn, &ids)?;

    Ok(profiles
        .into_iter()
        .map(|profile| {
            let account = accounts.get(&profile.account_id);
            ProfileView {
                username: account.map(|a| a.username.clone()).unwrap_or_default(),
                display_name: account.map(Account::display_name).unwrap_or_default(),
                verified_status: profile.verified_status(),
                profile,
            }
        })
        .collect())
}

fn find_profile(conn: &mut PgConnection, profile_id: Uuid) -> AppResult<UserProfile> {
    user_profiles::table
        .find(profile_id)
        .first::<UserProfile>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

// --- Profiles ---

pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<ProfileFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<ProfileView>>>> {
    let mut conn = state.db.get()?;
    let pagination = PaginationParams::new(params.page, params.per_page);

    let total: i64 = profiles_query(&params).count().get_result(&mut conn)?;
    let profiles = profiles_query(&params)
        .order(user_profiles::created_at.desc())
        .offset(pagination.offset() as i64)
        .limit(pagination.limit() as i64)
        .load::<UserProfile>(&mut conn)?;

    let items = profile_views(&mut conn, profiles)?;
    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &pagination))))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let mut conn = state.db.get()?;
    let profile = find_profile(&mut conn, profile_id)?;
    let view = profile_views(&mut conn, vec![profile])?
        .pop()
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;
    Ok(Json(ApiResponse::ok(view)))
}

pub async fn set_verification(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(profile_id): Path<Uuid>,
    Json(body): Json<VerificationRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let mut conn = state.db.get()?;
    let profile = find_profile(&mut conn, profile_id)?;

    let facts = ProfileFacts { is_verified: body.is_verified, ..profile.facts() };
    check_profile_rules(profile.role(), &facts).map_err(|msg| {
        AppError::with_details(
            ErrorCode::ProfileRuleViolation,
            msg,
            serde_json::json!({ "profile_id": profile_id, "role": profile.role }),
        )
    })?;

    let updated: UserProfile = diesel::update(user_profiles::table.find(profile_id))
        .set(user_profiles::is_verified.eq(body.is_verified))
        .get_result(&mut conn)?;

    let action = if body.is_verified { "verify_profile" } else { "unverify_profile" };
    audit::log_admin_action(
        &mut conn,
        admin.0.id,
        action,
        "profile",
        Some(profile_id),
        serde_json::json!({ "role": updated.role, "is_verified": updated.is_verified }),
    )?;

    Ok(Json(ApiResponse::ok(updated)))
}

/// Owned reports become anonymous and case slots are cleared by the
/// foreign keys.
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let mut conn = state.db.get()?;

    let removed = conn.transaction(|conn| {
        let removed = diesel::delete(user_profiles::table.find(profile_id))
            .get_result::<UserProfile>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

        audit::log_admin_action(
            conn,
            admin.0.id,
            "delete_profile",
            "profile",
            Some(profile_id),
            serde_json::json!({ "role": removed.role, "account_id": removed.account_id }),
        )?;
        Ok::<_, AppError>(removed)
    })?;

    Ok(Json(ApiResponse::ok(removed)))
}

// --- Reports ---

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<ReportFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<ReportRow>>>> {
    let mut conn = state.db.get()?;
    let pagination = PaginationParams::new(params.page, params.per_page);

    let total: i64 = reports_query(&params).count().get_result(&mut conn)?;
    let items = reports_query(&params)
        .order(reports::created_at.desc())
        .offset(pagination.offset() as i64)
        .limit(pagination.limit() as i64)
        .load::<Report>(&mut conn)?;

    let ids: Vec<Uuid> = items.iter().map(|r| r.id).collect();
    let with_case: HashSet<Uuid> = cases::table
        .filter(cases::report_id.eq_any(&ids))
        .select(cases::report_id)
        .load::<Uuid>(&mut conn)?
        .into_iter()
        .collect();

    let rows = items
        .into_iter()
        .map(|report| ReportRow { has_case: with_case.contains(&report.id), report })
        .collect();

    Ok(Json(ApiResponse::ok(Paginated::new(rows, total as u64, &pagination))))
}

pub async fn get_report(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(report_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ReportDetail>>> {
    let mut conn = state.db.get()?;

    let report = report_service::find_report(&mut conn, report_id)?;
    let evidence = report_service::evidence_for_report(&mut conn, report_id)?;
    let case = cases::table
        .filter(cases::report_id.eq(report_id))
        .first::<Case>(&mut conn)
        .optional()?;

    Ok(Json(ApiResponse::ok(ReportDetail { report, evidence, case })))
}

pub async fn update_report_status(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(report_id): Path<Uuid>,
    Json(body): Json<ReportStatusRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let status: ReportStatus = body.status.parse().map_err(|_| {
        AppError::new(
            ErrorCode::ValidationError,
            "status must be 'pending', 'in_progress' or 'resolved'",
        )
    })?;

    let mut conn = state.db.get()?;
    let previous = report_service::find_report(&mut conn, report_id)?;

    let updated: Report = diesel::update(reports::table.find(report_id))
        .set((reports::status.eq(status.as_str()), reports::updated_at.eq(Utc::now())))
        .get_result(&mut conn)?;

    audit::log_admin_action(
        &mut conn,
        admin.0.id,
        "update_report_status",
        "report",
        Some(report_id),
        serde_json::json!({ "from": previous.status, "to": updated.status }),
    )?;

    Ok(Json(ApiResponse::ok(updated)))
}

pub async fn delete_report(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(report_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let removed = report_service::delete_report(&state.db, &state.storage, report_id).await?;

    let mut conn = state.db.get()?;
    audit::log_admin_action(
        &mut conn,
        admin.0.id,
        "delete_report",
        "report",
        Some(report_id),
        serde_json::json!({ "title": removed.title }),
    )?;

    Ok(Json(ApiResponse::ok(removed)))
}

// --- Evidence ---

pub async fn list_evidence(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<ApiResponse<Paginated<EvidenceRow>>>> {
    let mut conn = state.db.get()?;
    let pagination = PaginationParams::new(params.page, params.per_page);

    let total: i64 = evidence_query(&params).count().get_result(&mut conn)?;
    let items = evidence_query(&params)
        .order(evidence::uploaded_at.desc())
        .offset(pagination.offset() as i64)
        .limit(pagination.limit() as i64)
        .load::<Evidence>(&mut conn)?;

    let report_ids: Vec<Uuid> = items.iter().map(|e| e.report_id).collect();
    let titles: HashMap<Uuid, String> = reports::table
        .filter(reports::id.eq_any(&report_ids))
        .select((reports::id, reports::title))
        .load::<(Uuid, String)>(&mut conn)?
        .into_iter()
        .collect();

    let rows = items
        .into_iter()
        .map(|evidence| EvidenceRow {
            report_title: titles.get(&evidence.report_id).cloned().unwrap_or_default(),
            evidence,
        })
        .collect();

    Ok(Json(ApiResponse::ok(Paginated::new(rows, total as u64, &pagination))))
}

/// Redirects to a short-lived download link for the stored file.
pub async fn download_evidence(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(evidence_id): Path<Uuid>,
) -> AppResult<Redirect> {
    let item = {
        let mut conn = state.db.get()?;
        evidence::table
            .find(evidence_id)
            .first::<Evidence>(&mut conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::EvidenceNotFound, "evidence not found"))?
    };

    let url = state
        .storage
        .presigned_url(&item.storage_key, state.config.evidence_url_ttl_secs)
        .await?;

    tracing::info!(admin_id = %admin.0.id, evidence_id = %evidence_id, "evidence download issued");
    Ok(Redirect::temporary(&url))
}

pub async fn update_evidence(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(evidence_id): Path<Uuid>,
    Json(body): Json<EvidenceCaptionRequest>,
) -> AppResult<Json<ApiResponse<Evidence>>> {
    let caption = clean_caption(body.caption.as_deref()).map_err(|msg| AppError::field("caption", msg))?;

    let mut conn = state.db.get()?;
    let updated = report_service::update_caption(&mut conn, evidence_id, caption)?;

    audit::log_admin_action(
        &mut conn,
        admin.0.id,
        "update_evidence_caption",
        "evidence",
        Some(evidence_id),
        serde_json::json!({ "caption": updated.caption }),
    )?;

    Ok(Json(ApiResponse::ok(updated)))
}

pub async fn delete_evidence(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(evidence_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Evidence>>> {
    let removed = report_service::delete_evidence(&state.db, &state.storage, evidence_id).await?;

    let mut conn = state.db.get()?;
    audit::log_admin_action(
        &mut conn,
        admin.0.id,
        "delete_evidence",
        "evidence",
        Some(evidence_id),
        serde_json::json!({ "report_id": removed.report_id, "file_name": removed.file_name }),
    )?;

    Ok(Json(ApiResponse::ok(removed)))
}

// --- Cases ---

pub async fn list_cases(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<ApiResponse<Paginated<CaseRow>>>> {
    let mut conn = state.db.get()?;
    let pagination = PaginationParams::new(params.page, params.per_page);

    let total: i64 = cases_query(&params).count().get_result(&mut conn)?;
    let items = cases_query(&params)
        .order(cases::updated_at.desc())
        .offset(pagination.offset() as i64)
        .limit(pagination.limit() as i64)
        .load::<Case>(&mut conn)?;

    let report_ids: Vec<Uuid> = items.iter().map(|c| c.report_id).collect();
    let report_info: HashMap<Uuid, (String, String)> = reports::table
        .filter(reports::id.eq_any(&report_ids))
        .select((reports::id, reports::title, reports::status))
        .load::<(Uuid, String, String)>(&mut conn)?
        .into_iter()
        .map(|(id, title, status)| (id, (title, status)))
        .collect();

    let partner_ids: Vec<Uuid> = items
        .iter()
        .flat_map(|c| [c.assigned_lawyer_id, c.assigned_ngo_id])
        .flatten()
        .collect();
    let names = report_service::partner_names(&mut conn, &partner_ids)?;
    let name_of = |id: Option<Uuid>| id.and_then(|id| names.get(&id).cloned());

    let rows = items
        .into_iter()
        .map(|case| {
            let (report_title, report_status) = report_info.get(&case.report_id).cloned().unwrap_or_default();
            CaseRow {
                report_title,
                report_status,
                assigned_lawyer: name_of(case.assigned_lawyer_id),
                assigned_ngo: name_of(case.assigned_ngo_id),
                case,
            }
        })
        .collect();

    Ok(Json(ApiResponse::ok(Paginated::new(rows, total as u64, &pagination))))
}

pub async fn create_case(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Json(body): Json<CreateCaseRequest>,
) -> AppResult<Json<ApiResponse<Case>>> {
    let mut conn = state.db.get()?;
    let (case, report) = case_service::create_case(&mut conn, body.report_id, &body.case)?;

    audit::log_admin_action(
        &mut conn,
        admin.0.id,
        "create_case",
        "case",
        Some(case.id),
        serde_json::json!({
            "report_id": report.id,
            "report_status": report.status,
            "assigned_lawyer_id": case.assigned_lawyer_id,
            "assigned_ngo_id": case.assigned_ngo_id,
        }),
    )?;

    Ok(Json(ApiResponse::ok_with_message(case, "Case created.")))
}

pub async fn update_case(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(case_id): Path<Uuid>,
    Json(body): Json<CaseInput>,
) -> AppResult<Json<ApiResponse<Case>>> {
    let mut conn = state.db.get()?;
    let (case, report) = case_service::update_case(&mut conn, case_id, &body)?;

    audit::log_admin_action(
        &mut conn,
        admin.0.id,
        "update_case",
        "case",
        Some(case.id),
        serde_json::json!({
            "report_status": report.status,
            "assigned_lawyer_id": case.assigned_lawyer_id,
            "assigned_ngo_id": case.assigned_ngo_id,
            "status_update": case.status_update,
        }),
    )?;

    Ok(Json(ApiResponse::ok(case)))
}

pub async fn delete_case(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(case_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Case>>> {
    let mut conn = state.db.get()?;
    let removed = case_service::delete_case(&mut conn, case_id)?;

    audit::log_admin_action(
        &mut conn,
        admin.0.id,
        "delete_case",
        "case",
        Some(case_id),
        serde_json::json!({ "report_id": removed.report_id }),
    )?;

    Ok(Json(ApiResponse::ok(removed)))
}

// --- Partners ---

pub async fn eligible_partners(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<EligibleParams>,
) -> AppResult<Json<ApiResponse<Vec<PartnerOption>>>> {
    let role = match clean_text(params.role.as_deref()) {
        None => None,
        Some(raw) => match raw.parse::<ProfileRole>() {
            Ok(role) if role.can_be_verified() => Some(role),
            _ => {
                return Err(AppError::new(
                    ErrorCode::PartnerNotEligible,
                    "role must be 'lawyer' or 'ngo'",
                ))
            }
        },
    };

    let mut conn = state.db.get()?;
    let options = case_service::eligible_partners(&mut conn, role)?
        .into_iter()
        .map(|(profile, account)| PartnerOption {
            id: profile.id,
            name: report_service::partner_display_name(&profile, &account),
            role: profile.role,
            username: account.username,
        })
        .collect();

    Ok(Json(ApiResponse::ok(options)))
}

// --- Dashboard stats ---

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let mut conn = state.db.get()?;

    let by_status = case_service::status_counts(&mut conn)?;
    let count_of = |status: ReportStatus| {
        by_status.iter().find(|(s, _)| *s == status).map(|(_, n)| *n).unwrap_or(0)
    };

    let unverified_partners: i64 = user_profiles::table
        .filter(user_profiles::is_verified.eq(false))
        .filter(user_profiles::role.eq_any([ProfileRole::Lawyer.as_str(), ProfileRole::Ngo.as_str()]))
        .count()
        .get_result(&mut conn)?;

    let open_cases: i64 = cases::table
        .inner_join(reports::table)
        .filter(reports::status.ne(ReportStatus::Resolved.as_str()))
        .count()
        .get_result(&mut conn)?;

    let today_start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    let reports_today: i64 = reports::table
        .filter(reports::created_at.ge(today_start))
        .count()
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(DashboardStats {
        pending_reports: count_of(ReportStatus::Pending),
        in_progress_reports: count_of(ReportStatus::InProgress),
        unverified_partners,
        open_cases,
        reports_today,
    })))
}

// --- Audit log ---

pub async fn get_audit_log(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<AdminAction>>>> {
    let mut conn = state.db.get()?;

    let total: i64 = admin_actions::table.count().get_result(&mut conn)?;
    let items = admin_actions::table
        .order(admin_actions::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load::<AdminAction>(&mut conn)?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_case_request_flattens_case_fields() {
        let report_id = Uuid::now_v7();
        let body = serde_json::json!({
            "report_id": report_id,
            "status_update": "Client interviewed",
            "last_contact_date": "2025-03-14",
        });
        let request: CreateCaseRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.report_id, report_id);
        assert_eq!(request.case.status_update.as_deref(), Some("Client interviewed"));
        assert!(request.case.assigned_ngo_id.is_none());
    }

    #[test]
    fn report_rows_serialize_flat() {
        let now = Utc::now();
        let row = ReportRow {
            report: Report {
                id: Uuid::now_v7(),
                reporter_id: None,
                title: "Forced eviction".into(),
                description: "Homes demolished".into(),
                category: "HR".into(),
                incident_location: None,
                incident_date: None,
                status: "pending".into(),
                contact_email: None,
                contact_phone: None,
                created_at: now,
                updated_at: now,
            },
            has_case: false,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["title"], "Forced eviction");
        assert_eq!(json["has_case"], false);
    }
}
