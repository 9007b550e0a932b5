//! Service configuration
//!
//! Everything tunable is read once at startup into [`Config`] and handed to
//! the router through [`AppState`](crate::database::AppState). Nothing else in
//! the crate reads the process environment.

use std::env;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};

use crate::auth::jwt::JwtConfig;
use crate::lifecycle::TransitionPolicy;

/// India Standard Time, the default day boundary for dashboard metrics.
const DEFAULT_TIMEZONE_OFFSET_MINUTES: i32 = 330;
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Credentials for the administrator account created at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Path of the redb database file.
    pub database_url: String,
    pub cors_origins: Vec<String>,
    pub jwt: JwtConfig,
    pub admin: Option<AdminSeed>,
    /// Offset used to decide calendar days ("resolved today", daily buckets).
    pub timezone: FixedOffset,
    /// Enforce the pending → in_progress → resolved/rejected lifecycle.
    pub strict_transitions: bool,
    /// Prefix of human-facing complaint codes, e.g. `RMD` in `RMD2024011`.
    pub complaint_code_prefix: String,
}

impl Config {
    /// Configuration with local-development defaults around the given JWT settings.
    pub fn new(jwt: JwtConfig) -> Self {
        Config {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "complaints.db".to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            jwt,
            admin: None,
            timezone: FixedOffset::east_opt(DEFAULT_TIMEZONE_OFFSET_MINUTES * 60)
                .unwrap_or_else(|| Utc.fix()),
            strict_transitions: true,
            complaint_code_prefix: "RMD".to_string(),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// | Env Var                    | Default                  |
    /// |----------------------------|--------------------------|
    /// | `HOST`                     | `0.0.0.0`                |
    /// | `PORT`                     | `8080`                   |
    /// | `DATABASE_URL`             | `complaints.db`          |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`  |
    /// | `JWT_SECRET`               | **required**             |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | `60`                     |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | `7`                      |
    /// | `ADMIN_EMAIL`              | unset (no seed admin)    |
    /// | `ADMIN_PASSWORD`           | unset                    |
    /// | `ADMIN_NAME`               | `Administrator`          |
    /// | `TIMEZONE_OFFSET_MINUTES`  | `330`                    |
    /// | `STRICT_TRANSITIONS`       | `true`                   |
    /// | `COMPLAINT_CODE_PREFIX`    | `RMD`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let jwt = JwtConfig {
            secret,
            access_token_expiry_mins: parse_var("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS)?,
            refresh_token_expiry_days: parse_var(
                "JWT_REFRESH_EXPIRY_DAYS",
                DEFAULT_REFRESH_EXPIRY_DAYS,
            )?,
        };

        let defaults = Config::new(jwt);

        let offset_minutes: i32 =
            parse_var("TIMEZONE_OFFSET_MINUTES", DEFAULT_TIMEZONE_OFFSET_MINUTES)?;
        let timezone = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::Invalid {
                key: "TIMEZONE_OFFSET_MINUTES",
                value: offset_minutes.to_string(),
            })?;

        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminSeed {
                    email,
                    password,
                    name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
                })
            }
            _ => None,
        };

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.cors_origins.clone(),
        };

        Ok(Config {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            cors_origins,
            admin,
            timezone,
            strict_transitions: parse_var("STRICT_TRANSITIONS", defaults.strict_transitions)?,
            complaint_code_prefix: env::var("COMPLAINT_CODE_PREFIX")
                .unwrap_or(defaults.complaint_code_prefix),
            jwt: defaults.jwt,
        })
    }

    pub fn transition_policy(&self) -> TransitionPolicy {
        if self.strict_transitions {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Permissive
        }
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}
