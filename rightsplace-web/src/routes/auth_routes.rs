use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use rightsplace_shared::errors::AppResult;
use rightsplace_shared::middleware::OptionalAuthUser;
use rightsplace_shared::types::{FieldErrors, FormSuccessResponse};
use rightsplace_shared::AppError;

use crate::forms::login::INVALID_LOGIN;
use crate::forms::{safe_next, LoginForm, RegistrationForm};
use crate::pages::auth::{login_page, register_page};
use crate::services::{account_service, token_service};
use crate::session::{self, Flash, ResponseFormat};
use crate::AppState;

use super::{form_failure, form_success, landing_page};

// --- Login ---

pub async fn login_form(
    OptionalAuthUser(viewer): OptionalAuthUser,
    jar: CookieJar,
    Query(form): Query<LoginForm>,
) -> Response {
    if let Some(user) = viewer {
        let target = safe_next(form.next.as_deref()).unwrap_or_else(|| landing_page(user.role).to_string());
        return Redirect::to(&target).into_response();
    }

    let (jar, flash) = session::take_flash(jar);
    let form = LoginForm { identifier: None, password: None, next: safe_next(form.next.as_deref()) };
    (jar, login_page(&form, &FieldErrors::new(), flash)).into_response()
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    format: ResponseFormat,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let creds = match form.clean() {
        Ok(creds) => creds,
        Err(errors) => return Ok(form_failure(format, errors, |e| login_page(&form, e, None))),
    };

    let mut conn = state.db.get()?;

    let Some(account) = account_service::authenticate(&mut conn, &creds)? else {
        metrics::counter!("rightsplace_logins_total", "outcome" => "rejected").increment(1);
        tracing::info!(identifier = %creds.identifier, "login rejected");
        let mut errors = FieldErrors::new();
        errors.add_non_field(INVALID_LOGIN);
        return Ok(form_failure(format, errors, |e| login_page(&form, e, None)));
    };

    account_service::touch_last_login(&mut conn, account.id)?;
    let profile = account_service::profile_for_account(&mut conn, account.id)?;
    let role = account_service::session_role(&account, profile.as_ref());

    let token = token_service::create_session_token(
        account.id,
        &account.username,
        role,
        &state.config.jwt_secret,
        state.config.session_ttl_secs,
    )?;

    metrics::counter!("rightsplace_logins_total", "outcome" => "accepted").increment(1);
    tracing::info!(account_id = %account.id, role = %role, "login succeeded");

    let target = safe_next(form.next.as_deref()).unwrap_or_else(|| landing_page(role).to_string());
    let jar = jar.add(session::session_cookie(token, state.config.secure_cookies));
    Ok(form_success(format, jar, Flash::LoggedIn, "Login successful.", &target))
}

// --- Registration ---

pub async fn register_form(OptionalAuthUser(viewer): OptionalAuthUser) -> Response {
    if let Some(user) = viewer {
        return Redirect::to(landing_page(user.role)).into_response();
    }
    register_page(&RegistrationForm::default(), &FieldErrors::new()).into_response()
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    format: ResponseFormat,
    jar: CookieJar,
    Form(form): Form<RegistrationForm>,
) -> AppResult<Response> {
    let registration = match form.clean() {
        Ok(registration) => registration,
        Err(errors) => return Ok(form_failure(format, errors, |e| register_page(&form, e))),
    };

    let mut conn = state.db.get()?;
    let (account, profile) = match account_service::register(&mut conn, &registration) {
        Ok(created) => created,
        Err(AppError::Form(errors)) => return Ok(form_failure(format, errors, |e| register_page(&form, e))),
        Err(e) => return Err(e),
    };

    let role = account_service::session_role(&account, Some(&profile));
    let token = token_service::create_session_token(
        account.id,
        &account.username,
        role,
        &state.config.jwt_secret,
        state.config.session_ttl_secs,
    )?;

    metrics::counter!("rightsplace_registrations_total", "role" => profile.role.clone()).increment(1);
    tracing::info!(account_id = %account.id, role = %profile.role, "account registered");

    let (flash, message) = if profile.role().can_be_verified() {
        (
            Flash::RegisteredPendingVerification,
            "Registration successful. Your profile is pending verification.",
        )
    } else {
        (Flash::Registered, "Registration successful.")
    };

    let jar = jar.add(session::session_cookie(token, state.config.secure_cookies));
    Ok(form_success(format, jar, flash, message, landing_page(role)))
}

// --- Logout ---

pub async fn logout(format: ResponseFormat, jar: CookieJar) -> Response {
    let jar = session::clear_session(jar);
    match format {
        ResponseFormat::Json => (jar, Json(FormSuccessResponse::new("Logged out."))).into_response(),
        ResponseFormat::Html => (session::set_flash(jar, Flash::LoggedOut), Redirect::to("/")).into_response(),
    }
}
