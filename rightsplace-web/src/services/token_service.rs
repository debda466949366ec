use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use rightsplace_shared::errors::AppError;
use rightsplace_shared::types::auth::{Claims, UserRole};

pub fn create_session_token(
    account_id: Uuid,
    username: &str,
    role: UserRole,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, AppError> {
    let claims = Claims::new(account_id, username, role, ttl_secs);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rightsplace_shared::middleware::validate_jwt;

    #[test]
    fn token_carries_role_and_username() {
        let id = Uuid::now_v7();
        let token = create_session_token(id, "ngo.admin", UserRole::Ngo, "s3cret", 600).unwrap();
        let claims = validate_jwt(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.username, "ngo.admin");
        assert_eq!(claims.role, UserRole::Ngo);
        assert_eq!(claims.exp - claims.iat, 600);
    }
}
