//! Team member repository for `SQLite` persistence.

use std::sync::Arc;

use chrono::Utc;

use crate::models::member::TeamMember;
use crate::{AppError, Result};

use super::db::Database;

/// Repository for roster records.
#[derive(Clone)]
pub struct MemberRepo {
    db: Arc<Database>,
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    key: String,
    name: String,
    role: String,
    phone: Option<String>,
    created_at: String,
}

impl MemberRow {
    fn into_member(self) -> Result<TeamMember> {
        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| AppError::Db(format!("invalid created_at: {e}")))?
            .with_timezone(&Utc);
        Ok(TeamMember {
            key: self.key,
            name: self.name,
            role: self.role,
            phone: self.phone,
            created_at,
        })
    }
}

impl MemberRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert or replace a member by key.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the write fails.
    pub async fn upsert(&self, member: &TeamMember) -> Result<()> {
        sqlx::query(
            "INSERT INTO team_member (key, name, role, phone, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(key) DO UPDATE SET name = excluded.name, role = excluded.role,
                 phone = excluded.phone",
        )
        .bind(&member.key)
        .bind(&member.name)
        .bind(&member.role)
        .bind(&member.phone)
        .bind(member.created_at.to_rfc3339())
        .execute(self.db.as_ref())
        .await?;
        Ok(())
    }

    /// Insert a member unless the key already exists.
    ///
    /// Returns whether a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the write fails.
    pub async fn insert_if_absent(&self, member: &TeamMember) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO team_member (key, name, role, phone, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&member.key)
        .bind(&member.name)
        .bind(&member.role)
        .bind(&member.phone)
        .bind(member.created_at.to_rfc3339())
        .execute(self.db.as_ref())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All members in insertion order, which is assignment precedence.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list(&self) -> Result<Vec<TeamMember>> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            "SELECT key, name, role, phone, created_at FROM team_member ORDER BY rowid ASC",
        )
        .fetch_all(self.db.as_ref())
        .await?;
        rows.into_iter().map(MemberRow::into_member).collect()
    }

    /// Remove a member by key.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no member has `key`.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM team_member WHERE key = ?1")
            .bind(key)
            .execute(self.db.as_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("team member `{key}`")));
        }
        Ok(())
    }

    /// Number of stored members.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM team_member")
            .fetch_one(self.db.as_ref())
            .await?;
        Ok(count)
    }
}
