pub mod admin_routes;
pub mod auth_routes;
pub mod health;
pub mod page_routes;
pub mod report_routes;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::CookieJar;

use rightsplace_shared::errors::AppError;
use rightsplace_shared::types::auth::{AuthUser, UserRole};
use rightsplace_shared::types::{FieldErrors, FormSuccessResponse};

use crate::pages;
use crate::session::{self, Flash, ResponseFormat};

/// Where a fresh session lands when no `next` was given.
pub fn landing_page(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "/admin/stats",
        UserRole::Lawyer | UserRole::Ngo => "/cases/assigned/",
        UserRole::User => "/my-reports/",
    }
}

/// Successful form post: JSON body, or redirect carrying a flash.
pub fn form_success(
    format: ResponseFormat,
    jar: CookieJar,
    flash: Flash,
    message: &str,
    redirect: &str,
) -> Response {
    match format {
        ResponseFormat::Json => (
            jar,
            Json(FormSuccessResponse::new(message).with_redirect(redirect)),
        )
            .into_response(),
        ResponseFormat::Html => (session::set_flash(jar, flash), Redirect::to(redirect)).into_response(),
    }
}

/// Failed form post: JSON error map, or the page rendered again with
/// the errors inline.
pub fn form_failure(format: ResponseFormat, errors: FieldErrors, page: impl FnOnce(&FieldErrors) -> Html<String>) -> Response {
    match format {
        ResponseFormat::Json => AppError::Form(errors).into_response(),
        ResponseFormat::Html => page(&errors).into_response(),
    }
}

/// Signed-in viewer whose role may not see the page.
pub fn forbidden(format: ResponseFormat, viewer: &AuthUser, message: &str) -> Response {
    match format {
        ResponseFormat::Json => AppError::forbidden(message).into_response(),
        ResponseFormat::Html => (
            StatusCode::FORBIDDEN,
            pages::message_page("Access denied", Some(viewer), message),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_pages_by_role() {
        assert_eq!(landing_page(UserRole::Admin), "/admin/stats");
        assert_eq!(landing_page(UserRole::Ngo), "/cases/assigned/");
        assert_eq!(landing_page(UserRole::Lawyer), "/cases/assigned/");
        assert_eq!(landing_page(UserRole::User), "/my-reports/");
    }

    #[test]
    fn json_failure_is_bad_request() {
        let mut errors = FieldErrors::new();
        errors.add("title", "This field is required.");
        let response = form_failure(ResponseFormat::Json, errors, |_| Html(String::new()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn html_failure_renders_the_page() {
        let response = form_failure(ResponseFormat::Html, FieldErrors::new(), |_| Html("<form>".into()));
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn html_success_redirects() {
        let response = form_success(ResponseFormat::Html, CookieJar::new(), Flash::LoggedIn, "ok", "/my-reports/");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/my-reports/");
    }
}
