use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use rightsplace_shared::errors::{AppError, AppResult};
use rightsplace_shared::types::auth::UserRole;

use crate::forms::{LoginCredentials, Registration};
use crate::models::{Account, NewAccount, NewUserProfile, UserProfile};
use crate::schema::{accounts, user_profiles};
use crate::services::auth_service;

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

diesel::define_sql_function!(fn lower(x: diesel::sql_types::Nullable<diesel::sql_types::Varchar>) -> diesel::sql_types::Nullable<diesel::sql_types::Varchar>);

/// Creates the account and its profile in one transaction.
pub fn register(conn: &mut PgConnection, reg: &Registration) -> AppResult<(Account, UserProfile)> {
    let password_hash = auth_service::hash_password(&reg.password)?;

    conn.transaction(|conn| {
        let taken: bool = diesel::select(diesel::dsl::exists(
            accounts::table.filter(accounts::username.eq(&reg.username)),
        ))
        .get_result(conn)?;
        if taken {
            return Err(AppError::field("username", USERNAME_TAKEN));
        }

        let new_account = NewAccount {
            username: reg.username.clone(),
            email: reg.email.clone(),
            password_hash,
            first_name: reg.first_name.clone(),
            last_name: reg.last_name.clone(),
            is_staff: false,
            is_superuser: false,
        };

        let account: Account = diesel::insert_into(accounts::table)
            .values(&new_account)
            .get_result(conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    AppError::field("username", USERNAME_TAKEN)
                }
                other => AppError::from(other),
            })?;

        let new_profile = NewUserProfile {
            account_id: account.id,
            role: reg.role.as_str().to_string(),
            organization_name: reg.organization_name.clone(),
            rc_number: reg.rc_number.clone(),
            enrolment_number: reg.enrolment_number.clone(),
            specialization: reg.specialization.clone(),
            city: reg.city.clone(),
            state: reg.state.clone(),
            phone_number: reg.phone_number.clone(),
            email: reg.email.clone(),
            wants_contact: reg.wants_contact,
            is_verified: false,
        };

        let profile: UserProfile = diesel::insert_into(user_profiles::table)
            .values(&new_profile)
            .get_result(conn)?;

        Ok((account, profile))
    })
}

/// Username match first, then every account sharing the email, without
/// repeating the username match.
pub fn login_candidates(by_username: Option<Account>, by_email: Vec<Account>) -> Vec<Account> {
    let mut candidates: Vec<Account> = by_username.into_iter().collect();
    for account in by_email {
        if !candidates.iter().any(|c| c.id == account.id) {
            candidates.push(account);
        }
    }
    candidates
}

/// Resolves the identifier as a username, then as an email address.
/// Inactive accounts never authenticate.
pub fn authenticate(conn: &mut PgConnection, creds: &LoginCredentials) -> AppResult<Option<Account>> {
    let by_username = accounts::table
        .filter(accounts::username.eq(&creds.identifier))
        .first::<Account>(conn)
        .optional()?;

    let by_email = accounts::table
        .filter(lower(accounts::email).eq(creds.identifier.to_lowercase()))
        .order(accounts::created_at.asc())
        .load::<Account>(conn)?;

    for account in login_candidates(by_username, by_email) {
        if !account.is_active {
            continue;
        }
        if auth_service::verify_password(&creds.password, &account.password_hash)? {
            return Ok(Some(account));
        }
    }

    Ok(None)
}

pub fn touch_last_login(conn: &mut PgConnection, account_id: Uuid) -> AppResult<()> {
    diesel::update(accounts::table.find(account_id))
        .set(accounts::last_login.eq(Utc::now()))
        .execute(conn)?;
    Ok(())
}

pub fn profile_for_account(conn: &mut PgConnection, account_id: Uuid) -> AppResult<Option<UserProfile>> {
    Ok(user_profiles::table
        .filter(user_profiles::account_id.eq(account_id))
        .first::<UserProfile>(conn)
        .optional()?)
}

/// Role written into the session token.
pub fn session_role(account: &Account, profile: Option<&UserProfile>) -> UserRole {
    if account.is_staff {
        return UserRole::Admin;
    }
    profile.map(|p| p.role().session_role()).unwrap_or(UserRole::User)
}

/// Creates an active staff superuser. `Ok(None)` when the username is taken.
pub fn create_superuser(
    conn: &mut PgConnection,
    username: &str,
    email: Option<&str>,
    password: &str,
) -> AppResult<Option<Account>> {
    let exists: bool = diesel::select(diesel::dsl::exists(
        accounts::table.filter(accounts::username.eq(username)),
    ))
    .get_result(conn)?;
    if exists {
        return Ok(None);
    }

    let new_account = NewAccount {
        username: username.to_string(),
        email: email.map(str::to_string),
        password_hash: auth_service::hash_password(password)?,
        first_name: String::new(),
        last_name: String::new(),
        is_staff: true,
        is_superuser: true,
    };

    let account = diesel::insert_into(accounts::table)
        .values(&new_account)
        .get_result::<Account>(conn)?;
    Ok(Some(account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(username: &str, email: Option<&str>) -> Account {
        Account {
            id: Uuid::now_v7(),
            username: username.into(),
            email: email.map(str::to_string),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn username_match_comes_first() {
        let by_name = account("amina@example.org", None);
        let by_mail = account("amina", Some("amina@example.org"));
        let order = login_candidates(Some(by_name.clone()), vec![by_mail.clone()]);
        assert_eq!(order.iter().map(|a| a.id).collect::<Vec<_>>(), vec![by_name.id, by_mail.id]);
    }

    #[test]
    fn same_account_is_not_tried_twice() {
        let a = account("amina", Some("amina"));
        let order = login_candidates(Some(a.clone()), vec![a]);
        assert_eq!(order.len(), 1);
    }

    #[test]
    fn email_only_login_has_candidates() {
        let order = login_candidates(None, vec![account("amina", Some("amina@example.org"))]);
        assert_eq!(order.len(), 1);
    }

    #[test]
    fn staff_sessions_are_admin() {
        let mut staff = account("root", None);
        staff.is_staff = true;
        assert_eq!(session_role(&staff, None), UserRole::Admin);
        assert_eq!(session_role(&account("plain", None), None), UserRole::User);
    }
}
