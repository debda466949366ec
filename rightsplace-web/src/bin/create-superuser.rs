//! Bootstraps the first staff account from environment variables.
//!
//! Runs only when `CREATE_SUPERUSER=1`; reads
//! `RIGHTSPLACE_SUPERUSER_USERNAME`, `RIGHTSPLACE_SUPERUSER_EMAIL` and
//! `RIGHTSPLACE_SUPERUSER_PASSWORD`.

use rightsplace_shared::clients::db::create_pool;
use rightsplace_shared::middleware::init_tracing;
use rightsplace_web::config::AppConfig;
use rightsplace_web::forms::clean_text;
use rightsplace_web::services::account_service;

#[derive(Debug, PartialEq)]
struct SuperuserRequest {
    username: String,
    email: Option<String>,
    password: String,
}

/// `Err` carries the reason the bootstrap is skipped.
fn read_request(lookup: impl Fn(&str) -> Option<String>) -> Result<SuperuserRequest, &'static str> {
    if lookup("CREATE_SUPERUSER").as_deref().map(str::trim) != Some("1") {
        return Err("CREATE_SUPERUSER is not set to 1");
    }

    let username = clean_text(lookup("RIGHTSPLACE_SUPERUSER_USERNAME").as_deref());
    let password = lookup("RIGHTSPLACE_SUPERUSER_PASSWORD").filter(|p| !p.is_empty());
    let email = clean_text(lookup("RIGHTSPLACE_SUPERUSER_EMAIL").as_deref());

    match (username, password) {
        (Some(username), Some(password)) => Ok(SuperuserRequest { username, email, password }),
        _ => Err("superuser username or password is missing"),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing("create-superuser");

    let request = match read_request(|key| std::env::var(key).ok()) {
        Ok(request) => request,
        Err(reason) => {
            tracing::info!(reason, "skipping superuser creation");
            return Ok(());
        }
    };

    let config = AppConfig::load()?;
    let pool = create_pool(&config.database_url, 1)?;
    let mut conn = pool.get()?;

    let created = account_service::create_superuser(
        &mut conn,
        &request.username,
        request.email.as_deref(),
        &request.password,
    )?;

    match created {
        Some(account) => tracing::info!(account_id = %account.id, username = %account.username, "superuser created"),
        None => tracing::info!(username = %request.username, "superuser already exists, skipping"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn disabled_without_flag() {
        let lookup = env(&[
            ("RIGHTSPLACE_SUPERUSER_USERNAME", "root"),
            ("RIGHTSPLACE_SUPERUSER_PASSWORD", "pw"),
        ]);
        assert!(read_request(lookup).is_err());
    }

    #[test]
    fn missing_password_skips() {
        let lookup = env(&[("CREATE_SUPERUSER", "1"), ("RIGHTSPLACE_SUPERUSER_USERNAME", "root")]);
        assert_eq!(read_request(lookup), Err("superuser username or password is missing"));
    }

    #[test]
    fn full_request_is_read() {
        let lookup = env(&[
            ("CREATE_SUPERUSER", "1"),
            ("RIGHTSPLACE_SUPERUSER_USERNAME", " root "),
            ("RIGHTSPLACE_SUPERUSER_EMAIL", ""),
            ("RIGHTSPLACE_SUPERUSER_PASSWORD", "Str0ng-pass"),
        ]);
        let request = read_request(lookup).unwrap();
        assert_eq!(request.username, "root");
        assert_eq!(request.email, None);
        assert_eq!(request.password, "Str0ng-pass");
    }
}
