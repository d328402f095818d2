//! Project alias entries and their remote counterparts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A local alias mapping a short key to a remote ClickUp list.
///
/// `simple_key` and `remote_list_id` are each unique within the alias table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    /// Short human-friendly key (e.g. `oak`, `oak1`).
    pub simple_key: String,
    /// Opaque remote list identifier; the join key to ClickUp.
    pub remote_list_id: String,
    /// Remote list name at the time the alias was created.
    pub display_name: String,
    /// Name of the remote space holding the list.
    pub parent_space: String,
    /// When the alias was first created.
    pub created_at: DateTime<Utc>,
    /// When a sync pass last saw the remote list.
    pub synced_at: DateTime<Utc>,
}

/// A project container as reported by the remote task service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteProject {
    /// Remote list identifier.
    pub list_id: String,
    /// Remote list name.
    pub name: String,
    /// Name of the containing space.
    pub space: String,
}

impl RemoteProject {
    /// Construct a remote project descriptor.
    #[must_use]
    pub fn new(
        list_id: impl Into<String>,
        name: impl Into<String>,
        space: impl Into<String>,
    ) -> Self {
        Self {
            list_id: list_id.into(),
            name: name.into(),
            space: space.into(),
        }
    }
}
