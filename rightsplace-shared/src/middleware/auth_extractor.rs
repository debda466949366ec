use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use std::sync::Arc;

use crate::errors::{AppError, ErrorCode};
use crate::types::auth::{AuthUser, Claims, UserRole};

/// Name of the cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "rp_session";

/// Key material used to verify session tokens.
///
/// Application state exposes it through `FromRef` so the extractors below
/// work with any state type.
#[derive(Clone)]
pub struct SessionKeys {
    secret: String,
}

impl SessionKeys {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

/// Implemented by application state that owns the session secret.
///
/// Routers share their state as `Arc<T>`, which the binary crate cannot
/// implement `FromRef` for directly. The blanket impl below bridges it.
pub trait HasSessionKeys {
    fn session_keys(&self) -> SessionKeys;
}

impl<T: HasSessionKeys> FromRef<Arc<T>> for SessionKeys {
    fn from_ref(state: &Arc<T>) -> Self {
        state.session_keys()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let token = extract_token(&parts.headers)?;
        let claims = validate_jwt(&token, keys.secret())?;

        if claims.is_expired() {
            return Err(AppError::new(ErrorCode::TokenExpired, "session has expired"));
        }

        Ok(AuthUser::from(claims))
    }
}

/// Bearer header first, then the session cookie.
fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(value) = headers.get("Authorization") {
        let auth_header = value
            .to_str()
            .map_err(|_| AppError::new(ErrorCode::Unauthorized, "invalid authorization header"))?;

        return auth_header
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "authorization header must use Bearer scheme"));
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "authentication required"))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::new(ErrorCode::TokenExpired, "session has expired")
        }
        _ => AppError::new(ErrorCode::TokenInvalid, format!("invalid token: {e}")),
    })?;

    Ok(token_data.claims)
}

/// Optional auth extractor
pub struct OptionalAuthUser(pub Option<AuthUser>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(Self(Some(user))),
            Err(_) => Ok(Self(None)),
        }
    }
}

/// Require a staff session
pub struct AdminUser(pub AuthUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Admin {
            return Err(AppError::new(ErrorCode::Forbidden, "admin access required"));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    const SECRET: &str = "test-secret";

    fn token_for(role: UserRole, ttl: i64) -> String {
        let claims = Claims::new(Uuid::now_v7(), "tester", role, ttl);
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    struct TestState;

    impl HasSessionKeys for TestState {
        fn session_keys(&self) -> SessionKeys {
            SessionKeys::new(SECRET)
        }
    }

    fn parts_with(name: &str, value: &str) -> Parts {
        let (parts, _) = axum::http::Request::builder()
            .header(name, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[tokio::test]
    async fn shared_state_provides_session_keys() {
        let state = Arc::new(TestState);
        assert_eq!(SessionKeys::from_ref(&state).secret(), SECRET);

        let mut parts = parts_with("Authorization", &format!("Bearer {}", token_for(UserRole::Admin, 60)));
        let admin = AdminUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(admin.0.role, UserRole::Admin);

        let mut parts = parts_with("Cookie", "rp_session=not-a-token");
        let visitor = OptionalAuthUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(visitor.0.is_none());
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc"));
        headers.insert("Cookie", HeaderValue::from_static("rp_session=xyz"));
        assert_eq!(extract_token(&headers).unwrap(), "abc");
    }

    #[test]
    fn cookie_is_used_without_header() {
        let mut headers = HeaderMap::new();
        headers.insert("Cookie", HeaderValue::from_static("theme=dark; rp_session=xyz"));
        assert_eq!(extract_token(&headers).unwrap(), "xyz");
    }

    #[test]
    fn missing_token_is_unauthorized() {
        let err = extract_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn basic_scheme_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert!(extract_token(&headers).is_err());
    }

    #[test]
    fn valid_token_decodes() {
        let claims = validate_jwt(&token_for(UserRole::Lawyer, 60), SECRET).unwrap();
        assert_eq!(claims.role, UserRole::Lawyer);
        assert_eq!(claims.username, "tester");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let err = validate_jwt(&token_for(UserRole::User, 60), "other-secret").unwrap_err();
        assert!(matches!(err, AppError::Known { code: ErrorCode::TokenInvalid, .. }));
    }

    #[test]
    fn expired_token_is_rejected() {
        let err = validate_jwt(&token_for(UserRole::User, -3600), SECRET).unwrap_err();
        assert!(matches!(err, AppError::Known { code: ErrorCode::TokenExpired, .. }));
    }
}
