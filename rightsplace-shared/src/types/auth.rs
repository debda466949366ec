use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried in the session token.
///
/// `Admin` is granted to staff accounts; everyone else carries the role of
/// their profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Lawyer,
    Ngo,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Lawyer => "lawyer",
            UserRole::Ngo => "ngo",
            UserRole::Admin => "admin",
        }
    }

    /// Lawyers and NGOs.
    pub fn is_partner(&self) -> bool {
        matches!(self, UserRole::Lawyer | UserRole::Ngo)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "lawyer" => Ok(UserRole::Lawyer),
            "ngo" => Ok(UserRole::Ngo),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(account_id: Uuid, username: impl Into<String>, role: UserRole, duration_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: account_id,
            username: username.into(),
            role,
            iat: now,
            exp: now + duration_secs,
            jti: Uuid::now_v7(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub token_id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
            token_id: claims.jti,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [UserRole::User, UserRole::Lawyer, UserRole::Ngo, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("moderator".parse::<UserRole>().is_err());
    }

    #[test]
    fn only_lawyers_and_ngos_are_partners() {
        assert!(UserRole::Lawyer.is_partner());
        assert!(UserRole::Ngo.is_partner());
        assert!(!UserRole::User.is_partner());
        assert!(!UserRole::Admin.is_partner());
    }

    #[test]
    fn fresh_claims_are_not_expired() {
        let claims = Claims::new(Uuid::now_v7(), "amina", UserRole::User, 60);
        assert!(!claims.is_expired());
    }
}
