pub mod extract;
pub mod jwt;
pub mod password;

pub use extract::{AdminUser, AuthUser};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::queries;
use crate::models::{User, UserRole};

/// Creates the configured admin account when both credentials are set and
/// the email is not yet registered. Returns whether an account was created.
pub fn bootstrap_admin(conn: &Connection, config: &AppConfig) -> anyhow::Result<bool> {
    if config.admin_email.is_empty() || config.admin_password.is_empty() {
        return Ok(false);
    }
    if queries::get_user_by_email(conn, &config.admin_email)?.is_some() {
        return Ok(false);
    }

    let hash = password::hash_password(&config.admin_password, config.bcrypt_cost)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let admin = User::new(&config.admin_email, "Administrator", "", UserRole::Admin, hash);
    let admin = User {
        phone: format!("admin-{}", admin.id),
        ..admin
    };
    queries::insert_user(conn, &admin)?;

    tracing::info!(email = %admin.email, "bootstrapped admin account");
    Ok(true)
}
