//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
///
/// No variant is fatal to the process: every one of them maps to a
/// user-facing reply through [`AppError::user_message`].
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Persistence failure when interacting with `SQLite`.
    Db(String),
    /// Malformed command phrase (e.g. `create project` without a name).
    InvalidCommand(String),
    /// A required external credential or setting is missing.
    NotConfigured(String),
    /// An external service did not answer within the request timeout.
    RemoteTimeout(String),
    /// An external service answered with a non-success status.
    RemoteRejected(String),
    /// The language model returned output that does not fit the task schema.
    ModelParseFailure(String),
    /// Requested entity does not exist.
    NotFound(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl AppError {
    /// Reply text shown to a field user for this error.
    ///
    /// Model parse failures never reach users (the deterministic parser takes
    /// over), so they share the generic wording.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCommand(msg) => format!("❓ {msg}"),
            Self::NotConfigured(msg) => format!("⚙️ Feature unavailable: {msg}"),
            Self::RemoteTimeout(_) => {
                "⏳ ClickUp is slow to respond. Your message was received; try again shortly."
                    .into()
            }
            Self::RemoteRejected(_) => "❌ ClickUp rejected the request. Task not created.".into(),
            Self::NotFound(msg) => format!("🔍 Not found: {msg}"),
            Self::Config(_) | Self::Db(_) | Self::ModelParseFailure(_) | Self::Io(_) => {
                "⚠️ Something went wrong on our side. Please try again.".into()
            }
        }
    }

    /// Whether the error came from a remote service being unavailable.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteTimeout(_) | Self::RemoteRejected(_))
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Db(msg) => write!(f, "db: {msg}"),
            Self::InvalidCommand(msg) => write!(f, "invalid command: {msg}"),
            Self::NotConfigured(msg) => write!(f, "not configured: {msg}"),
            Self::RemoteTimeout(msg) => write!(f, "remote timeout: {msg}"),
            Self::RemoteRejected(msg) => write!(f, "remote rejected: {msg}"),
            Self::ModelParseFailure(msg) => write!(f, "model parse failure: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::ModelParseFailure(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RemoteTimeout(err.to_string())
        } else if let Some(status) = err.status() {
            Self::RemoteRejected(format!("status {status}: {err}"))
        } else {
            Self::RemoteRejected(err.to_string())
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
