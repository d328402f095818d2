//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS` and are safe to
//! re-run on every server startup.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS team_member (
    key             TEXT PRIMARY KEY NOT NULL,
    name            TEXT NOT NULL,
    role            TEXT NOT NULL,
    phone           TEXT,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS project (
    simple_key      TEXT PRIMARY KEY NOT NULL,
    remote_list_id  TEXT NOT NULL UNIQUE,
    display_name    TEXT NOT NULL,
    parent_space    TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    synced_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS task (
    id                  TEXT PRIMARY KEY NOT NULL,
    remote_task_id      TEXT NOT NULL UNIQUE,
    name                TEXT NOT NULL,
    description         TEXT NOT NULL,
    priority            INTEGER NOT NULL CHECK(priority BETWEEN 1 AND 4),
    status              TEXT NOT NULL CHECK(status IN ('open','complete')),
    due_date            TEXT,
    project_list_id     TEXT,
    assignee            TEXT,
    created_at          TEXT NOT NULL,
    completed_at        TEXT,
    created_via         TEXT NOT NULL CHECK(created_via IN ('sms','web','api')),
    created_by_phone    TEXT,
    has_photo           INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS sms_log (
    id              TEXT PRIMARY KEY NOT NULL,
    from_number     TEXT NOT NULL,
    message         TEXT NOT NULL,
    response        TEXT NOT NULL,
    has_media       INTEGER NOT NULL DEFAULT 0,
    command_type    TEXT,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_task_created_at ON task(created_at);
CREATE INDEX IF NOT EXISTS idx_task_due_date ON task(due_date);
CREATE INDEX IF NOT EXISTS idx_sms_log_created_at ON sms_log(created_at);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
