//! Browser session plumbing: the session cookie, one-shot flash messages,
//! and choosing between an HTML page and a JSON body for a request.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use rightsplace_shared::errors::AppError;
use rightsplace_shared::middleware::SESSION_COOKIE;

pub const FLASH_COOKIE: &str = "rp_flash";

/// Session cookie carrying the signed token. Expiry is enforced by the
/// token itself.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// One-shot notices shown on the next rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Registered,
    RegisteredPendingVerification,
    LoginRequired,
    LoggedIn,
    LoggedOut,
    ReportSubmitted,
    AnonymousReportSubmitted,
}

impl Flash {
    const ALL: [Flash; 7] = [
        Flash::Registered,
        Flash::RegisteredPendingVerification,
        Flash::LoginRequired,
        Flash::LoggedIn,
        Flash::LoggedOut,
        Flash::ReportSubmitted,
        Flash::AnonymousReportSubmitted,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Flash::Registered => "registered",
            Flash::RegisteredPendingVerification => "registered_pending",
            Flash::LoginRequired => "login_required",
            Flash::LoggedIn => "logged_in",
            Flash::LoggedOut => "logged_out",
            Flash::ReportSubmitted => "report_submitted",
            Flash::AnonymousReportSubmitted => "anonymous_report_submitted",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }

    pub fn message(&self) -> &'static str {
        match self {
            Flash::Registered => "Registration successful. Welcome to RightsPlace!",
            Flash::RegisteredPendingVerification => {
                "Registration successful. Your profile will be reviewed and verified by our team."
            }
            Flash::LoginRequired => "Please log in to continue.",
            Flash::LoggedIn => "You are now logged in.",
            Flash::LoggedOut => "You have been logged out.",
            Flash::ReportSubmitted => "Your report has been submitted successfully.",
            Flash::AnonymousReportSubmitted => {
                "Your anonymous report has been submitted successfully. Thank you for speaking up."
            }
        }
    }
}

pub fn set_flash(jar: CookieJar, flash: Flash) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, flash.code()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build(),
    )
}

/// Reads and clears the pending flash, if any.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash = jar.get(FLASH_COOKIE).and_then(|c| Flash::from_code(c.value()));
    if jar.get(FLASH_COOKIE).is_some() {
        (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
    } else {
        (jar, flash)
    }
}

/// How the caller wants the answer: a page, or a `{success, ...}` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Html,
    Json,
}

impl ResponseFormat {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ajax = headers
            .get("X-Requested-With")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));
        let wants_json = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));

        if ajax || wants_json {
            ResponseFormat::Json
        } else {
            ResponseFormat::Html
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, ResponseFormat::Json)
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ResponseFormat {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// `/login/?next=<path>`
pub fn login_url(next: &str) -> String {
    format!("/login/?next={}", urlencoding::encode(next))
}

/// Anonymous visitor on a page that needs a session.
pub fn login_required(format: ResponseFormat, jar: CookieJar, path: &str) -> Response {
    match format {
        ResponseFormat::Json => AppError::unauthorized("authentication required").into_response(),
        ResponseFormat::Html => {
            (set_flash(jar, Flash::LoginRequired), Redirect::to(&login_url(path))).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn ajax_header_selects_json() {
        let mut headers = HeaderMap::new();
        assert_eq!(ResponseFormat::from_headers(&headers), ResponseFormat::Html);

        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
        assert_eq!(ResponseFormat::from_headers(&headers), ResponseFormat::Json);
    }

    #[test]
    fn accept_json_selects_json() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json, text/plain"));
        assert!(ResponseFormat::from_headers(&headers).is_json());

        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html,*/*"));
        assert!(!ResponseFormat::from_headers(&headers).is_json());
    }

    #[test]
    fn login_url_encodes_next() {
        assert_eq!(login_url("/report/create/"), "/login/?next=%2Freport%2Fcreate%2F");
    }

    #[test]
    fn flash_round_trips_through_the_jar() {
        let jar = set_flash(CookieJar::new(), Flash::ReportSubmitted);
        let (jar, flash) = take_flash(jar);
        assert_eq!(flash, Some(Flash::ReportSubmitted));
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn unknown_flash_code_is_ignored() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "<script>"));
        let (_, flash) = take_flash(jar);
        assert_eq!(flash, None);
    }

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = session_cookie("tok".into(), true);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }
}
