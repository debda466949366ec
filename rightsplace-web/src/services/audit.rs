use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use rightsplace_shared::errors::AppResult;

use crate::models::NewAdminAction;
use crate::schema::admin_actions;

/// Records an admin write in the audit log.
pub fn log_admin_action(
    conn: &mut PgConnection,
    admin_id: Uuid,
    action: &str,
    target_type: &str,
    target_id: Option<Uuid>,
    details: serde_json::Value,
) -> AppResult<()> {
    let entry = NewAdminAction {
        admin_id,
        action: action.to_string(),
        target_type: target_type.to_string(),
        target_id,
        details: Some(details),
    };

    diesel::insert_into(admin_actions::table)
        .values(&entry)
        .execute(conn)?;

    tracing::info!(admin_id = %admin_id, action, target_type, target_id = ?target_id, "admin action recorded");
    Ok(())
}
