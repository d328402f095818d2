//! Task records: the normalized in-flight record and the local mirror.

use std::collections::BTreeSet;

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task priority using ClickUp's numeric scale.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Drop everything (1).
    Urgent = 1,
    /// Do next (2).
    High = 2,
    /// Default (3).
    #[default]
    Normal = 3,
    /// Whenever convenient (4).
    Low = 4,
}

impl Priority {
    /// The ClickUp numeric priority.
    #[must_use]
    pub fn as_remote(self) -> i64 {
        self as i64
    }

    /// Parse a ClickUp numeric priority; out-of-range values yield `None`.
    #[must_use]
    pub fn from_remote(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Urgent),
            2 => Some(Self::High),
            3 => Some(Self::Normal),
            4 => Some(Self::Low),
            _ => None,
        }
    }

    /// Parse a priority label such as `urgent` or `High`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "urgent" | "emergency" | "critical" => Some(Self::Urgent),
            "high" | "important" => Some(Self::High),
            "normal" | "medium" => Some(Self::Normal),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Lowercase label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }
}

/// Binary media attached to an inbound message (e.g. an MMS photo).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Raw media bytes.
    pub data: Bytes,
    /// MIME type reported by the transport.
    pub content_type: String,
    /// File name used for the upload.
    pub file_name: String,
    /// Where the media can still be fetched if the upload fails.
    pub source_url: Option<String>,
}

impl Attachment {
    /// Build an attachment, deriving a file name from the content type.
    #[must_use]
    pub fn new(data: Bytes, content_type: impl Into<String>, source_url: Option<String>) -> Self {
        let content_type = content_type.into();
        let ext = match content_type.as_str() {
            "image/png" => "png",
            "image/gif" => "gif",
            "image/heic" => "heic",
            "application/pdf" => "pdf",
            _ => "jpg",
        };
        Self {
            data,
            file_name: format!("site_photo_{}.{ext}", Utc::now().format("%Y%m%d_%H%M%S")),
            content_type,
            source_url,
        }
    }
}

/// A normalized task extracted from one inbound message.
///
/// Created per message and handed straight to the submission gateway.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskRecord {
    /// Message text as received.
    pub raw_message: String,
    /// Cleaned task title; never empty.
    pub title: String,
    /// Title as sent to ClickUp, possibly prefixed with `[Assignee]`.
    pub display_title: String,
    /// Canonical name of the resolved assignee.
    pub assignee: Option<String>,
    /// Resolved priority.
    pub priority: Priority,
    /// Resolved due date.
    pub due_date: Option<NaiveDate>,
    /// Remote list id of the resolved project.
    pub project_ref: Option<String>,
    /// Job-type tags.
    pub tags: BTreeSet<String>,
    /// Generated audit description.
    pub description: String,
    /// Optional media to attach after creation.
    #[serde(skip)]
    pub media: Option<Attachment>,
}

/// Channel a task arrived through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CreatedVia {
    /// Twilio SMS/MMS webhook.
    Sms,
    /// Chat-style web UI.
    Web,
    /// REST endpoint.
    Api,
}

impl CreatedVia {
    /// Lowercase label stored in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Web => "web",
            Self::Api => "api",
        }
    }
}

/// Local lifecycle status mirrored from ClickUp.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, not yet done.
    Open,
    /// Marked complete.
    Complete,
}

/// Local mirror of a task successfully created in ClickUp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredTask {
    /// Local identifier.
    pub id: String,
    /// ClickUp task id.
    pub remote_task_id: String,
    /// Display title as created.
    pub name: String,
    /// Description as created.
    pub description: String,
    /// Priority as created.
    pub priority: Priority,
    /// Current status.
    pub status: TaskStatus,
    /// Due date, if any.
    pub due_date: Option<NaiveDate>,
    /// Remote list id the task was created in.
    pub project_list_id: Option<String>,
    /// Assignee name, if any.
    pub assignee: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Channel the task came from.
    pub created_via: CreatedVia,
    /// Sender phone for SMS-created tasks.
    pub created_by_phone: Option<String>,
    /// Whether a photo accompanied the task.
    pub has_photo: bool,
}

impl StoredTask {
    /// Build a mirror entry for a freshly created remote task.
    #[must_use]
    pub fn from_record(
        record: &TaskRecord,
        remote_task_id: impl Into<String>,
        created_via: CreatedVia,
        phone: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            remote_task_id: remote_task_id.into(),
            name: record.display_title.clone(),
            description: record.description.clone(),
            priority: record.priority,
            status: TaskStatus::Open,
            due_date: record.due_date,
            project_list_id: record.project_ref.clone(),
            assignee: record.assignee.clone(),
            created_at: Utc::now(),
            completed_at: None,
            created_via,
            created_by_phone: phone,
            has_photo: record.media.is_some(),
        }
    }
}
