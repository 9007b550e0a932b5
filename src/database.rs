//! Database initialization and table definitions
//!
//! This module handles the setup of the embedded redb database. Records are
//! stored as JSON strings; secondary indexes are plain key tables kept in sync
//! inside the same write transaction as the record they point to.

use redb::{Database, TableDefinition};
use std::sync::Arc;

use crate::config::Config;

/// Main table for complaint records
///
/// Key: internal complaint id (UUID v7, so iteration order is creation order)
/// Value: JSON-serialized `Complaint`
pub const TABLE_COMPLAINTS: TableDefinition<&str, &str> = TableDefinition::new("complaints_v1");

/// Lookup from human-facing complaint code to internal id
///
/// Example:
/// - Key: "RMD2024011"
/// - Value: "01912d6e-8c4a-7b1e-9f3a-2c5d8e7f6a10"
pub const TABLE_COMPLAINT_CODES: TableDefinition<&str, &str> =
    TableDefinition::new("complaint_codes_v1");

/// Index for tracking complaints by submitter email
///
/// Key: Composite key in format "{email}:{created_micros}:{id}"
/// Value: internal complaint id
///
/// The zero-padded timestamp keeps a single submitter's complaints in
/// chronological order for range scans.
pub const TABLE_EMAIL_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("complaint_email_index_v1");

/// Named monotonic counters (complaint code sequence)
pub const TABLE_COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters_v1");

/// Admin accounts keyed by lowercase email
pub const TABLE_USERS: TableDefinition<&str, &str> = TableDefinition::new("users_v1");

/// Refresh-token sessions keyed by the SHA-256 of the token
pub const TABLE_SESSIONS: TableDefinition<&str, &str> = TableDefinition::new("sessions_v1");

/// Revoked access tokens
///
/// Key: token `jti`
/// Value: token expiry as a Unix timestamp
pub const TABLE_REVOKED_TOKENS: TableDefinition<&str, i64> =
    TableDefinition::new("revoked_tokens_v1");

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe reference to the embedded database
    pub db: Arc<Database>,
    /// Configuration loaded at startup
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        AppState {
            db: Arc::new(db),
            config: Arc::new(config),
        }
    }
}

/// Initializes the embedded database and creates required tables
///
/// # Example
///
/// ```no_run
/// # use railcomplaint::database::init_db;
/// let db = init_db("complaints.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_COMPLAINTS)?;
        write_txn.open_table(TABLE_COMPLAINT_CODES)?;
        write_txn.open_table(TABLE_EMAIL_INDEX)?;
        write_txn.open_table(TABLE_COUNTERS)?;
        write_txn.open_table(TABLE_USERS)?;
        write_txn.open_table(TABLE_SESSIONS)?;
        write_txn.open_table(TABLE_REVOKED_TOKENS)?;
    }
    write_txn.commit()?;

    Ok(db)
}
