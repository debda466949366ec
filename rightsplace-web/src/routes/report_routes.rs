use axum::extract::{Multipart, State};
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use rightsplace_shared::errors::{AppError, AppResult, ErrorCode};
use rightsplace_shared::middleware::OptionalAuthUser;
use rightsplace_shared::types::api::ApiResponse;
use rightsplace_shared::types::auth::{AuthUser, UserRole};
use rightsplace_shared::types::FieldErrors;

use crate::domain::{category_label, status_label};
use crate::forms::{EvidencePolicy, ReportSubmission, ReportVariant, UploadedFile};
use crate::pages::reports::{my_reports_page, report_form_page};
use crate::services::{account_service, report_service};
use crate::session::{self, Flash, ResponseFormat};
use crate::AppState;

use super::{forbidden, form_failure, form_success};

const CREATE_PATH: &str = "/report/create/";
const NO_PROFILE: &str = "Your account has no reporter profile.";

/// Staff sessions carry no profile, so they cannot own reports.
fn can_own_reports(viewer: &AuthUser) -> bool {
    viewer.role != UserRole::Admin
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(ErrorCode::PayloadTooLarge, "request body is too large")
    } else {
        AppError::bad_request(format!("invalid multipart body: {e}"))
    }
}

/// Collects text parts and evidence files. File bytes past the policy
/// limit are counted but not kept.
async fn read_submission(mut multipart: Multipart, policy: &EvidencePolicy) -> AppResult<ReportSubmission> {
    let mut submission = ReportSubmission::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name != "evidence_files" {
            let value = field.text().await.map_err(multipart_error)?;
            submission.set_text(&name, value);
            continue;
        }

        let mut file = UploadedFile {
            file_name: field.file_name().unwrap_or_default().to_string(),
            content_type: field.content_type().map(str::to_string),
            size: 0,
            data: Vec::new(),
        };

        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            file.size += chunk.len();
            if file.size <= policy.max_bytes {
                file.data.extend_from_slice(&chunk);
            }
        }

        // Browsers send an empty part when no file was chosen.
        if file.file_name.is_empty() && file.size == 0 {
            continue;
        }
        submission.evidence_files.push(file);
    }

    Ok(submission)
}

// --- Authenticated report ---

pub async fn create_form(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    format: ResponseFormat,
    jar: CookieJar,
) -> Response {
    let Some(viewer) = viewer else {
        return session::login_required(format, jar, CREATE_PATH);
    };
    if !can_own_reports(&viewer) {
        return forbidden(format, &viewer, NO_PROFILE);
    }

    let policy = EvidencePolicy::new(state.config.report_max_file_bytes());
    report_form_page(
        ReportVariant::Authenticated,
        Some(&viewer),
        &ReportSubmission::default(),
        &FieldErrors::new(),
        &policy,
    )
    .into_response()
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    format: ResponseFormat,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<Response> {
    let Some(viewer) = viewer else {
        return Ok(session::login_required(format, jar, CREATE_PATH));
    };
    if !can_own_reports(&viewer) {
        return Ok(forbidden(format, &viewer, NO_PROFILE));
    }

    let policy = EvidencePolicy::new(state.config.report_max_file_bytes());
    let submission = read_submission(multipart, &policy).await?;

    let report = match submission.clean(ReportVariant::Authenticated, &policy) {
        Ok(report) => report,
        Err(errors) => {
            return Ok(form_failure(format, errors, |e| {
                report_form_page(ReportVariant::Authenticated, Some(&viewer), &submission, e, &policy)
            }))
        }
    };

    let profile = {
        let mut conn = state.db.get()?;
        account_service::profile_for_account(&mut conn, viewer.id)?
    };
    let Some(profile) = profile else {
        return Ok(forbidden(format, &viewer, NO_PROFILE));
    };

    report_service::submit_report(&state.db, &state.storage, Some(profile.id), report, submission.evidence_files).await?;

    Ok(form_success(
        format,
        jar,
        Flash::ReportSubmitted,
        "Report submitted successfully.",
        "/my-reports/",
    ))
}

// --- Anonymous report ---

pub async fn anonymous_form(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(viewer): OptionalAuthUser,
) -> Response {
    let policy = EvidencePolicy::new(state.config.anonymous_max_file_bytes());
    report_form_page(
        ReportVariant::Anonymous,
        viewer.as_ref(),
        &ReportSubmission::default(),
        &FieldErrors::new(),
        &policy,
    )
    .into_response()
}

pub async fn anonymous(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    format: ResponseFormat,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<Response> {
    let policy = EvidencePolicy::new(state.config.anonymous_max_file_bytes());
    let submission = read_submission(multipart, &policy).await?;

    let report = match submission.clean(ReportVariant::Anonymous, &policy) {
        Ok(report) => report,
        Err(errors) => {
            return Ok(form_failure(format, errors, |e| {
                report_form_page(ReportVariant::Anonymous, viewer.as_ref(), &submission, e, &policy)
            }))
        }
    };

    report_service::submit_report(&state.db, &state.storage, None, report, submission.evidence_files).await?;

    Ok(form_success(
        format,
        jar,
        Flash::AnonymousReportSubmitted,
        "Anonymous report submitted successfully.",
        "/",
    ))
}

// --- My reports ---

#[derive(Debug, Serialize)]
pub struct MyReportView {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub status: String,
    pub evidence_count: i64,
    pub has_case: bool,
    pub assigned_lawyer: Option<String>,
    pub assigned_ngo: Option<String>,
    pub status_update: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub async fn my_reports(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    format: ResponseFormat,
    jar: CookieJar,
) -> AppResult<Response> {
    let Some(viewer) = viewer else {
        return Ok(session::login_required(format, jar, "/my-reports/"));
    };
    if !can_own_reports(&viewer) {
        return Ok(forbidden(format, &viewer, NO_PROFILE));
    }

    let mut conn = state.db.get()?;
    let Some(profile) = account_service::profile_for_account(&mut conn, viewer.id)? else {
        return Ok(forbidden(format, &viewer, NO_PROFILE));
    };
    let summaries = report_service::reports_for_reporter(&mut conn, profile.id)?;

    if format.is_json() {
        let view: Vec<MyReportView> = summaries
            .into_iter()
            .map(|s| MyReportView {
                id: s.report.id,
                category: category_label(&s.report.category).to_string(),
                status: status_label(&s.report.status).to_string(),
                evidence_count: s.evidence_count,
                has_case: s.case.is_some(),
                assigned_lawyer: s.lawyer_name,
                assigned_ngo: s.ngo_name,
                status_update: s.case.and_then(|c| c.status_update),
                created_at: s.report.created_at,
                title: s.report.title,
            })
            .collect();
        return Ok(Json(ApiResponse::ok(view)).into_response());
    }

    let (jar, flash) = session::take_flash(jar);
    Ok((jar, my_reports_page(&viewer, &summaries, flash)).into_response())
}
