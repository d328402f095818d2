//! SMS exchange log repository.

use std::sync::Arc;

use chrono::Utc;

use crate::models::sms_log::SmsLogEntry;
use crate::{AppError, Result};

use super::db::Database;

/// Repository for SMS log entries.
#[derive(Clone)]
pub struct SmsLogRepo {
    db: Arc<Database>,
}

#[derive(sqlx::FromRow)]
struct SmsLogRow {
    id: String,
    from_number: String,
    message: String,
    response: String,
    has_media: i64,
    command_type: Option<String>,
    created_at: String,
}

impl SmsLogRow {
    fn into_entry(self) -> Result<SmsLogEntry> {
        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| AppError::Db(format!("invalid created_at: {e}")))?
            .with_timezone(&Utc);
        Ok(SmsLogEntry {
            id: self.id,
            from_number: self.from_number,
            message: self.message,
            response: self.response,
            has_media: self.has_media != 0,
            command_type: self.command_type,
            created_at,
        })
    }
}

impl SmsLogRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn insert(&self, entry: &SmsLogEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO sms_log (id, from_number, message, response, has_media, command_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&entry.id)
        .bind(&entry.from_number)
        .bind(&entry.message)
        .bind(&entry.response)
        .bind(i64::from(entry.has_media))
        .bind(&entry.command_type)
        .bind(entry.created_at.to_rfc3339())
        .execute(self.db.as_ref())
        .await?;
        Ok(())
    }

    /// Most recent entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<SmsLogEntry>> {
        let rows: Vec<SmsLogRow> = sqlx::query_as(
            "SELECT id, from_number, message, response, has_media, command_type, created_at
             FROM sms_log ORDER BY created_at DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(self.db.as_ref())
        .await?;
        rows.into_iter().map(SmsLogRow::into_entry).collect()
    }
}
