//! SMS interaction log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest message or reply body kept in the log.
pub const MAX_LOGGED_CHARS: usize = 500;

/// One inbound SMS and the reply sent back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmsLogEntry {
    /// Unique record identifier.
    pub id: String,
    /// Sender number.
    pub from_number: String,
    /// Inbound body, truncated.
    pub message: String,
    /// Reply body, truncated.
    pub response: String,
    /// Whether the message carried media.
    pub has_media: bool,
    /// Dispatch outcome classification (`task`, `report`, `help`, ...).
    pub command_type: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl SmsLogEntry {
    /// Construct a log entry, truncating long bodies.
    #[must_use]
    pub fn new(
        from_number: impl Into<String>,
        message: &str,
        response: &str,
        has_media: bool,
        command_type: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from_number: from_number.into(),
            message: truncate_chars(message, MAX_LOGGED_CHARS),
            response: truncate_chars(response, MAX_LOGGED_CHARS),
            has_media,
            command_type,
            created_at: Utc::now(),
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
