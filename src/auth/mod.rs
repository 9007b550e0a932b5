//! Admin accounts, sessions and credential helpers.

pub mod jwt;
pub mod password;

use chrono::{DateTime, Utc};
use redb::Database;
use serde::{Deserialize, Serialize};

use crate::config::AdminSeed;
use crate::error::AppError;
use crate::repository::UserRepo;

pub const ROLE_ADMIN: &str = "admin";

/// An administrator account stored in `users_v1`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdminUser {
    /// Lowercase email, also the table key.
    pub email: String,
    pub name: String,
    pub role: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A refresh-token session stored in `sessions_v1`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Session {
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Creates the seed administrator, or resets its password if it already exists.
pub fn ensure_admin(db: &Database, seed: &AdminSeed) -> Result<AdminUser, AppError> {
    let email = seed.email.trim().to_lowercase();
    let password_hash = password::hash_password(&seed.password)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))?;

    let user = match UserRepo::find_by_email(db, &email)? {
        Some(existing) => AdminUser {
            name: seed.name.clone(),
            password_hash,
            ..existing
        },
        None => AdminUser {
            email,
            name: seed.name.clone(),
            role: ROLE_ADMIN.to_string(),
            password_hash,
            created_at: Utc::now(),
        },
    };

    UserRepo::upsert(db, &user)?;
    tracing::info!(email = %user.email, "Seed administrator ready");
    Ok(user)
}
