//! Local task mirror repository for `SQLite` persistence.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::task::{CreatedVia, Priority, StoredTask, TaskStatus};
use crate::{AppError, Result};

use super::db::Database;

/// Repository for mirrored task records.
#[derive(Clone)]
pub struct TaskRepo {
    db: Arc<Database>,
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    remote_task_id: String,
    name: String,
    description: String,
    priority: i64,
    status: String,
    due_date: Option<String>,
    project_list_id: Option<String>,
    assignee: Option<String>,
    created_at: String,
    completed_at: Option<String>,
    created_via: String,
    created_by_phone: Option<String>,
    has_photo: i64,
}

const COLUMNS: &str = "id, remote_task_id, name, description, priority, status, due_date, \
     project_list_id, assignee, created_at, completed_at, created_via, created_by_phone, has_photo";

fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::Db(format!("invalid timestamp: {e}")))
}

fn parse_status(raw: &str) -> Result<TaskStatus> {
    match raw {
        "open" => Ok(TaskStatus::Open),
        "complete" => Ok(TaskStatus::Complete),
        other => Err(AppError::Db(format!("invalid task status: {other}"))),
    }
}

fn status_str(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Open => "open",
        TaskStatus::Complete => "complete",
    }
}

fn parse_via(raw: &str) -> Result<CreatedVia> {
    match raw {
        "sms" => Ok(CreatedVia::Sms),
        "web" => Ok(CreatedVia::Web),
        "api" => Ok(CreatedVia::Api),
        other => Err(AppError::Db(format!("invalid created_via: {other}"))),
    }
}

impl TaskRow {
    fn into_task(self) -> Result<StoredTask> {
        let priority = Priority::from_remote(self.priority)
            .ok_or_else(|| AppError::Db(format!("invalid priority: {}", self.priority)))?;
        let due_date = self
            .due_date
            .as_deref()
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|e| AppError::Db(format!("invalid due_date: {e}")))
            })
            .transpose()?;
        let completed_at = self.completed_at.as_deref().map(parse_ts).transpose()?;

        Ok(StoredTask {
            id: self.id,
            remote_task_id: self.remote_task_id,
            name: self.name,
            description: self.description,
            priority,
            status: parse_status(&self.status)?,
            due_date,
            project_list_id: self.project_list_id,
            assignee: self.assignee,
            created_at: parse_ts(&self.created_at)?,
            completed_at,
            created_via: parse_via(&self.created_via)?,
            created_by_phone: self.created_by_phone,
            has_photo: self.has_photo != 0,
        })
    }
}

impl TaskRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Record a task created remotely.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn insert(&self, task: &StoredTask) -> Result<()> {
        sqlx::query(
            "INSERT INTO task (id, remote_task_id, name, description, priority, status, due_date,
                 project_list_id, assignee, created_at, completed_at, created_via,
                 created_by_phone, has_photo)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .bind(&task.id)
        .bind(&task.remote_task_id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.priority.as_remote())
        .bind(status_str(task.status))
        .bind(task.due_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(&task.project_list_id)
        .bind(&task.assignee)
        .bind(task.created_at.to_rfc3339())
        .bind(task.completed_at.map(|ts| ts.to_rfc3339()))
        .bind(task.created_via.as_str())
        .bind(&task.created_by_phone)
        .bind(i64::from(task.has_photo))
        .execute(self.db.as_ref())
        .await?;
        Ok(())
    }

    /// Look up a task by its remote id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn find_by_remote_id(&self, remote_task_id: &str) -> Result<Option<StoredTask>> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM task WHERE remote_task_id = ?1"
        ))
        .bind(remote_task_id)
        .fetch_optional(self.db.as_ref())
        .await?;
        row.map(TaskRow::into_task).transpose()
    }

    /// Mark a mirrored task complete. Returns whether a row changed.
    ///
    /// Tasks created before the mirror existed are not an error.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn mark_complete(&self, remote_task_id: &str, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE task SET status = 'complete', completed_at = ?2
             WHERE remote_task_id = ?1 AND status != 'complete'",
        )
        .bind(remote_task_id)
        .bind(at.to_rfc3339())
        .execute(self.db.as_ref())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Tasks created or completed at or after `since`, plus every open task.
    ///
    /// This is the working set for daily and weekly summaries.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_relevant(&self, since: DateTime<Utc>) -> Result<Vec<StoredTask>> {
        let since = since.to_rfc3339();
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM task
             WHERE created_at >= ?1 OR completed_at >= ?1 OR status = 'open'
             ORDER BY created_at ASC"
        ))
        .bind(&since)
        .fetch_all(self.db.as_ref())
        .await?;
        rows.into_iter().map(TaskRow::into_task).collect()
    }
}
