//! Storage operations over the redb tables
//!
//! Each operation runs in a single transaction. Write operations keep the
//! secondary indexes (`complaint_codes_v1`, `complaint_email_index_v1`) in sync
//! with the main table, so a failure never leaves a half-written complaint.

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, WriteTransaction};
use uuid::Uuid;

use crate::auth::{AdminUser, Session};
use crate::database::{
    TABLE_COMPLAINTS, TABLE_COMPLAINT_CODES, TABLE_COUNTERS, TABLE_EMAIL_INDEX,
    TABLE_REVOKED_TOKENS, TABLE_SESSIONS, TABLE_USERS,
};
use crate::error::StoreError;
use crate::model::{Complaint, NewComplaint};

/// Counter backing the sequential part of complaint codes.
const COMPLAINT_SEQUENCE: &str = "complaint_seq";

fn email_index_key(complaint: &Complaint) -> String {
    format!(
        "{}:{:020}:{}",
        complaint.email,
        complaint.created_at.timestamp_micros(),
        complaint.id
    )
}

/// Resolves an internal id or a complaint code to the internal id.
fn resolve_id<C, K>(complaints: &C, codes: &K, key: &str) -> Result<Option<String>, StoreError>
where
    C: ReadableTable<&'static str, &'static str>,
    K: ReadableTable<&'static str, &'static str>,
{
    if complaints.get(key)?.is_some() {
        return Ok(Some(key.to_string()));
    }
    Ok(codes.get(key)?.map(|guard| guard.value().to_string()))
}

pub struct ComplaintRepo;

impl ComplaintRepo {
    /// Stores a new complaint, assigning the next code in the sequence.
    ///
    /// The year in the code is the calendar year in `tz`.
    pub fn create(
        db: &Database,
        input: NewComplaint,
        code_prefix: &str,
        tz: &FixedOffset,
        now: DateTime<Utc>,
    ) -> Result<Complaint, StoreError> {
        let write_txn = db.begin_write()?;
        let complaint = {
            let mut counters = write_txn.open_table(TABLE_COUNTERS)?;
            let sequence = counters
                .get(COMPLAINT_SEQUENCE)?
                .map(|guard| guard.value())
                .unwrap_or(0)
                + 1;
            counters.insert(COMPLAINT_SEQUENCE, sequence)?;

            let year = now.with_timezone(tz).year();
            let code = format!("{code_prefix}{year}{sequence:03}");
            let complaint = Complaint::new(Uuid::now_v7().to_string(), code, input, now);

            Self::write(&write_txn, &complaint)?;

            let mut codes = write_txn.open_table(TABLE_COMPLAINT_CODES)?;
            codes.insert(complaint.complaint_id.as_str(), complaint.id.as_str())?;

            let mut email_index = write_txn.open_table(TABLE_EMAIL_INDEX)?;
            email_index.insert(email_index_key(&complaint).as_str(), complaint.id.as_str())?;

            complaint
        };
        write_txn.commit()?;

        Ok(complaint)
    }

    /// Looks a complaint up by internal id or complaint code.
    pub fn find(db: &Database, key: &str) -> Result<Option<Complaint>, StoreError> {
        let read_txn = db.begin_read()?;
        let complaints = read_txn.open_table(TABLE_COMPLAINTS)?;
        let codes = read_txn.open_table(TABLE_COMPLAINT_CODES)?;

        let Some(id) = resolve_id(&complaints, &codes, key)? else {
            return Ok(None);
        };

        match complaints.get(id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_str(value.value())?)),
            None => Ok(None),
        }
    }

    /// All complaints, newest first.
    pub fn list(db: &Database) -> Result<Vec<Complaint>, StoreError> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(TABLE_COMPLAINTS)?;

        let mut complaints = Vec::new();
        for entry in table.iter()?.rev() {
            let (_, value) = entry?;
            complaints.push(serde_json::from_str(value.value())?);
        }
        Ok(complaints)
    }

    /// Complaints submitted from `email`, newest first.
    pub fn list_by_email(db: &Database, email: &str) -> Result<Vec<Complaint>, StoreError> {
        let email = email.trim().to_lowercase();
        let read_txn = db.begin_read()?;
        let index = read_txn.open_table(TABLE_EMAIL_INDEX)?;
        let complaints = read_txn.open_table(TABLE_COMPLAINTS)?;

        // '{' sorts after ':' and every digit, bounding the prefix scan.
        let start_key = format!("{}:", email);
        let end_key = format!("{}:{{", email);

        let mut found = Vec::new();
        for entry in index.range(start_key.as_str()..end_key.as_str())?.rev() {
            let (_, id) = entry?;
            if let Some(value) = complaints.get(id.value())? {
                found.push(serde_json::from_str(value.value())?);
            }
        }
        Ok(found)
    }

    /// Loads, mutates and stores a complaint in one write transaction.
    ///
    /// Returns `Ok(None)` when no complaint matches `key`. If `apply` fails the
    /// transaction is aborted and the stored record is untouched.
    pub fn update<E, F>(db: &Database, key: &str, apply: F) -> Result<Option<Complaint>, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Complaint) -> Result<(), E>,
    {
        let write_txn = db.begin_write().map_err(StoreError::from)?;

        let Some(mut complaint) = Self::load(&write_txn, key)? else {
            write_txn.abort().map_err(StoreError::from)?;
            return Ok(None);
        };

        if let Err(err) = apply(&mut complaint) {
            write_txn.abort().map_err(StoreError::from)?;
            return Err(err);
        }

        Self::write(&write_txn, &complaint)?;
        write_txn.commit().map_err(StoreError::from)?;

        Ok(Some(complaint))
    }

    /// Permanently removes a complaint and its index entries.
    pub fn delete(db: &Database, key: &str) -> Result<Option<Complaint>, StoreError> {
        let write_txn = db.begin_write()?;

        let Some(complaint) = Self::load(&write_txn, key)? else {
            write_txn.abort()?;
            return Ok(None);
        };

        {
            let mut complaints = write_txn.open_table(TABLE_COMPLAINTS)?;
            complaints.remove(complaint.id.as_str())?;

            let mut codes = write_txn.open_table(TABLE_COMPLAINT_CODES)?;
            codes.remove(complaint.complaint_id.as_str())?;

            let mut email_index = write_txn.open_table(TABLE_EMAIL_INDEX)?;
            email_index.remove(email_index_key(&complaint).as_str())?;
        }
        write_txn.commit()?;

        Ok(Some(complaint))
    }

    fn load(write_txn: &WriteTransaction, key: &str) -> Result<Option<Complaint>, StoreError> {
        let complaints = write_txn.open_table(TABLE_COMPLAINTS)?;
        let codes = write_txn.open_table(TABLE_COMPLAINT_CODES)?;

        let Some(id) = resolve_id(&complaints, &codes, key)? else {
            return Ok(None);
        };

        let complaint = match complaints.get(id.as_str())? {
            Some(value) => Some(serde_json::from_str(value.value())?),
            None => None,
        };
        Ok(complaint)
    }

    fn write(write_txn: &WriteTransaction, complaint: &Complaint) -> Result<(), StoreError> {
        let record_json = serde_json::to_string(complaint)?;
        let mut complaints = write_txn.open_table(TABLE_COMPLAINTS)?;
        complaints.insert(complaint.id.as_str(), record_json.as_str())?;
        Ok(())
    }
}

pub struct UserRepo;

impl UserRepo {
    pub fn find_by_email(db: &Database, email: &str) -> Result<Option<AdminUser>, StoreError> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(TABLE_USERS)?;
        match table.get(email.trim().to_lowercase().as_str())? {
            Some(value) => Ok(Some(serde_json::from_str(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn upsert(db: &Database, user: &AdminUser) -> Result<(), StoreError> {
        let record_json = serde_json::to_string(user)?;
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_USERS)?;
            table.insert(user.email.as_str(), record_json.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

pub struct SessionRepo;

impl SessionRepo {
    pub fn insert(db: &Database, token_hash: &str, session: &Session) -> Result<(), StoreError> {
        let record_json = serde_json::to_string(session)?;
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_SESSIONS)?;
            table.insert(token_hash, record_json.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Removes and returns the session, so a refresh token works only once.
    pub fn take(db: &Database, token_hash: &str) -> Result<Option<Session>, StoreError> {
        let write_txn = db.begin_write()?;
        let session = {
            let mut table = write_txn.open_table(TABLE_SESSIONS)?;
            let removed = table.remove(token_hash)?;
            match removed {
                Some(value) => Some(serde_json::from_str::<Session>(value.value())?),
                None => None,
            }
        };
        write_txn.commit()?;
        Ok(session)
    }

    /// Drops sessions whose refresh token has expired. Returns how many.
    pub fn purge_expired(db: &Database, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let write_txn = db.begin_write()?;
        let purged = {
            let mut table = write_txn.open_table(TABLE_SESSIONS)?;
            let mut expired = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let session: Session = serde_json::from_str(value.value())?;
                if session.expires_at <= now {
                    expired.push(key.value().to_string());
                }
            }
            for key in &expired {
                table.remove(key.as_str())?;
            }
            expired.len()
        };
        write_txn.commit()?;
        Ok(purged)
    }
}

pub struct RevokedTokenRepo;

impl RevokedTokenRepo {
    pub fn revoke(db: &Database, jti: &str, expires_at: i64) -> Result<(), StoreError> {
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_REVOKED_TOKENS)?;
            table.insert(jti, expires_at)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn is_revoked(db: &Database, jti: &str) -> Result<bool, StoreError> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(TABLE_REVOKED_TOKENS)?;
        Ok(table.get(jti)?.is_some())
    }

    /// Forgets revocations of tokens that have expired anyway.
    pub fn purge_expired(db: &Database, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let write_txn = db.begin_write()?;
        let purged = {
            let mut table = write_txn.open_table(TABLE_REVOKED_TOKENS)?;
            let mut expired = Vec::new();
            for entry in table.iter()? {
                let (jti, expires_at) = entry?;
                if expires_at.value() <= now.timestamp() {
                    expired.push(jti.value().to_string());
                }
            }
            for jti in &expired {
                table.remove(jti.as_str())?;
            }
            expired.len()
        };
        write_txn.commit()?;
        Ok(purged)
    }
}
