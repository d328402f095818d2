//! Project alias repository for `SQLite` persistence.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::project::Project;
use crate::{AppError, Result};

use super::db::Database;

/// Repository for alias-table entries.
#[derive(Clone)]
pub struct ProjectRepo {
    db: Arc<Database>,
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    simple_key: String,
    remote_list_id: String,
    display_name: String,
    parent_space: String,
    created_at: String,
    synced_at: String,
}

fn parse_ts(raw: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::Db(format!("invalid {field}: {e}")))
}

impl ProjectRow {
    fn into_project(self) -> Result<Project> {
        Ok(Project {
            created_at: parse_ts(&self.created_at, "created_at")?,
            synced_at: parse_ts(&self.synced_at, "synced_at")?,
            simple_key: self.simple_key,
            remote_list_id: self.remote_list_id,
            display_name: self.display_name,
            parent_space: self.parent_space,
        })
    }
}

impl ProjectRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert or update an entry keyed by `simple_key`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the write fails, including when
    /// `remote_list_id` already belongs to another key.
    pub async fn upsert(&self, project: &Project) -> Result<()> {
        sqlx::query(
            "INSERT INTO project (simple_key, remote_list_id, display_name, parent_space, created_at, synced_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(simple_key) DO UPDATE SET remote_list_id = excluded.remote_list_id,
                 display_name = excluded.display_name, parent_space = excluded.parent_space,
                 synced_at = excluded.synced_at",
        )
        .bind(&project.simple_key)
        .bind(&project.remote_list_id)
        .bind(&project.display_name)
        .bind(&project.parent_space)
        .bind(project.created_at.to_rfc3339())
        .bind(project.synced_at.to_rfc3339())
        .execute(self.db.as_ref())
        .await?;
        Ok(())
    }

    /// Write a batch of entries in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if any write fails; nothing is committed then.
    pub async fn upsert_all(&self, projects: &[Project]) -> Result<()> {
        let mut tx = self.db.begin().await?;
        for project in projects {
            sqlx::query(
                "INSERT INTO project (simple_key, remote_list_id, display_name, parent_space, created_at, synced_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(simple_key) DO UPDATE SET synced_at = excluded.synced_at",
            )
            .bind(&project.simple_key)
            .bind(&project.remote_list_id)
            .bind(&project.display_name)
            .bind(&project.parent_space)
            .bind(project.created_at.to_rfc3339())
            .bind(project.synced_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Insert an entry unless its key or remote id is already stored.
    ///
    /// Returns whether a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the write fails.
    pub async fn insert_if_absent(&self, project: &Project) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO project (simple_key, remote_list_id, display_name, parent_space, created_at, synced_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&project.simple_key)
        .bind(&project.remote_list_id)
        .bind(&project.display_name)
        .bind(&project.parent_space)
        .bind(project.created_at.to_rfc3339())
        .bind(project.synced_at.to_rfc3339())
        .execute(self.db.as_ref())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All entries ordered by key.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list(&self) -> Result<Vec<Project>> {
        let rows: Vec<ProjectRow> = sqlx::query_as(
            "SELECT simple_key, remote_list_id, display_name, parent_space, created_at, synced_at
             FROM project ORDER BY simple_key ASC",
        )
        .fetch_all(self.db.as_ref())
        .await?;
        rows.into_iter().map(ProjectRow::into_project).collect()
    }

    /// Remove an entry by key.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no entry has `simple_key`.
    pub async fn delete(&self, simple_key: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM project WHERE simple_key = ?1")
            .bind(simple_key)
            .execute(self.db.as_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("project `{simple_key}`")));
        }
        Ok(())
    }

    /// Number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM project")
            .fetch_one(self.db.as_ref())
            .await?;
        Ok(count)
    }
}
