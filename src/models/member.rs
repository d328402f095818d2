//! Team member model for the assignment roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A crew member eligible for task assignment.
///
/// Looked up by word-bounded match of either `key` or `name` against
/// inbound message text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamMember {
    /// Short unique identifier (lowercase, e.g. `mike`).
    pub key: String,
    /// Canonical display name (e.g. `Mike`).
    pub name: String,
    /// Trade or role, advisory only.
    pub role: String,
    /// Contact number, if known.
    pub phone: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TeamMember {
    /// Construct a member with the given key, name and role.
    ///
    /// The key is normalised to lowercase.
    #[must_use]
    pub fn new(key: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            key: key.into().trim().to_lowercase(),
            name: name.into().trim().to_owned(),
            role: role.into(),
            phone: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// The roster seeded on first start when no members are stored.
#[must_use]
pub fn default_roster() -> Vec<TeamMember> {
    vec![
        TeamMember::new("mike", "Mike", "Plumbing"),
        TeamMember::new("tom", "Tom", "Grading"),
        TeamMember::new("sarah", "Sarah", "Electrical"),
        TeamMember::new("john", "John", "General"),
    ]
}
