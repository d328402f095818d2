//! Persistence layer modules.

pub mod db;
pub mod member_repo;
pub mod project_repo;
pub mod schema;
pub mod settings_import;
pub mod sms_log_repo;
pub mod task_repo;

/// Re-export the database pool type for convenience.
pub use sqlx::SqlitePool;
