use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use rightsplace_shared::errors::AppResult;
use rightsplace_shared::middleware::OptionalAuthUser;
use rightsplace_shared::types::api::ApiResponse;

use crate::domain::{category_label, status_label};
use crate::pages::dashboards::{assigned_cases_page, partners_page};
use crate::pages::home::index_page;
use crate::services::case_service::{self, PartnerFilter};
use crate::services::{account_service, report_service};
use crate::session::{self, ResponseFormat};
use crate::AppState;

use super::forbidden;

pub async fn index(OptionalAuthUser(viewer): OptionalAuthUser, jar: CookieJar) -> Response {
    let (jar, flash) = session::take_flash(jar);
    (jar, index_page(viewer.as_ref(), flash)).into_response()
}

// --- Assigned cases ---

#[derive(Debug, Serialize)]
pub struct AssignedCaseView {
    pub case_id: Uuid,
    pub report_id: Uuid,
    pub title: String,
    pub category: String,
    pub status: String,
    pub status_update: Option<String>,
    pub last_contact_date: Option<chrono::NaiveDate>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssignedCasesView {
    pub is_verified: bool,
    pub cases: Vec<AssignedCaseView>,
}

pub async fn assigned_cases(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    format: ResponseFormat,
    jar: CookieJar,
) -> AppResult<Response> {
    let Some(viewer) = viewer else {
        return Ok(session::login_required(format, jar, "/cases/assigned/"));
    };
    if !viewer.role.is_partner() {
        return Ok(forbidden(format, &viewer, "Only lawyers and NGOs can view assigned cases."));
    }

    let mut conn = state.db.get()?;
    let profile = account_service::profile_for_account(&mut conn, viewer.id)?;
    let cases = match profile.as_ref() {
        Some(p) if p.is_verified => case_service::assigned_cases(&mut conn, p.id)?,
        _ => Vec::new(),
    };

    if format.is_json() {
        let view = AssignedCasesView {
            is_verified: profile.as_ref().is_some_and(|p| p.is_verified),
            cases: cases
                .iter()
                .map(|(case, report)| AssignedCaseView {
                    case_id: case.id,
                    report_id: report.id,
                    title: report.title.clone(),
                    category: category_label(&report.category).to_string(),
                    status: status_label(&report.status).to_string(),
                    status_update: case.status_update.clone(),
                    last_contact_date: case.last_contact_date,
                    contact_email: report.contact_email.clone(),
                    contact_phone: report.contact_phone.clone(),
                })
                .collect(),
        };
        return Ok(Json(ApiResponse::ok(view)).into_response());
    }

    let (jar, flash) = session::take_flash(jar);
    Ok((jar, assigned_cases_page(&viewer, profile.as_ref(), &cases, flash)).into_response())
}

// --- Verified partners ---

#[derive(Debug, Serialize)]
pub struct PartnerView {
    pub id: Uuid,
    pub role: String,
    pub name: String,
    pub organization_name: Option<String>,
    pub specialization: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

pub async fn verified_partners(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    format: ResponseFormat,
    Query(filter): Query<PartnerFilter>,
) -> AppResult<Response> {
    let mut conn = state.db.get()?;
    let partners = case_service::verified_partners(&mut conn, &filter)?;

    if format.is_json() {
        let view: Vec<PartnerView> = partners
            .iter()
            .map(|(profile, account)| PartnerView {
                id: profile.id,
                role: profile.role.clone(),
                name: report_service::partner_display_name(profile, account),
                organization_name: profile.organization_name.clone(),
                specialization: profile.specialization.clone(),
                city: profile.city.clone(),
                state: profile.state.clone(),
            })
            .collect();
        return Ok(Json(ApiResponse::ok(view)).into_response());
    }

    Ok(partners_page(viewer.as_ref(), &partners).into_response())
}
