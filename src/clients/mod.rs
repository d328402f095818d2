//! Outbound collaborators: the remote task service, the language model and
//! the SMS transport.
//!
//! Each collaborator sits behind a trait so dispatch and the HTTP layer can
//! be exercised with in-process fakes. Implementations own their HTTP client
//! and apply the configured request timeout.

pub mod clickup;
pub mod openai;
pub mod twilio;

use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::project::RemoteProject;
use crate::models::task::{Attachment, Priority};
use crate::Result;

/// Boxed future returned by collaborator trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Payload for creating a task in the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRemoteTask {
    /// Task name (the display title).
    pub name: String,
    /// Task description.
    pub description: String,
    /// Priority on the remote 1..=4 scale.
    pub priority: Priority,
    /// Due date; sent as midnight UTC in epoch milliseconds.
    pub due_date: Option<NaiveDate>,
    /// Tag names.
    pub tags: Vec<String>,
}

/// A task as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTask {
    /// Remote task id.
    pub id: String,
    /// Task name.
    pub name: String,
    /// Remote status label (e.g. `to do`, `complete`).
    pub status: Option<String>,
    /// Browser URL, when the service returns one.
    pub url: Option<String>,
}

/// The remote project-management service (ClickUp-like).
pub trait TaskService: Send + Sync {
    /// List every project container visible to the workspace.
    ///
    /// # Errors
    ///
    /// Returns `RemoteTimeout` or `RemoteRejected` on transport failure.
    fn list_projects(&self) -> BoxFuture<'_, Vec<RemoteProject>>;

    /// Create a project container named `name`.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` when no target space can be found, or a remote
    /// error on transport failure.
    fn create_list<'a>(&'a self, name: &'a str) -> BoxFuture<'a, RemoteProject>;

    /// Create a task in `list_id`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteTimeout` or `RemoteRejected` on transport failure.
    fn create_task<'a>(&'a self, list_id: &'a str, task: &'a NewRemoteTask)
        -> BoxFuture<'a, RemoteTask>;

    /// Set the status label of a task.
    ///
    /// # Errors
    ///
    /// Returns `RemoteTimeout` or `RemoteRejected` on transport failure.
    fn update_task_status<'a>(&'a self, task_id: &'a str, status: &'a str) -> BoxFuture<'a, ()>;

    /// Replace the description of a task.
    ///
    /// # Errors
    ///
    /// Returns `RemoteTimeout` or `RemoteRejected` on transport failure.
    fn update_task_description<'a>(
        &'a self,
        task_id: &'a str,
        description: &'a str,
    ) -> BoxFuture<'a, ()>;

    /// Upload a file attachment to a task.
    ///
    /// # Errors
    ///
    /// Returns `RemoteTimeout` or `RemoteRejected` on transport failure.
    fn add_attachment<'a>(&'a self, task_id: &'a str, media: &'a Attachment) -> BoxFuture<'a, ()>;

    /// Add a comment to a task.
    ///
    /// # Errors
    ///
    /// Returns `RemoteTimeout` or `RemoteRejected` on transport failure.
    fn add_comment<'a>(&'a self, task_id: &'a str, text: &'a str) -> BoxFuture<'a, ()>;

    /// List the open tasks of a project container.
    ///
    /// # Errors
    ///
    /// Returns `RemoteTimeout` or `RemoteRejected` on transport failure.
    fn list_open_tasks<'a>(&'a self, list_id: &'a str) -> BoxFuture<'a, Vec<RemoteTask>>;
}

/// The language-model backend (OpenAI-like).
pub trait LanguageModel: Send + Sync {
    /// Run a chat completion and return the assistant's text.
    ///
    /// # Errors
    ///
    /// Returns a remote error on transport failure or an empty response.
    fn complete<'a>(&'a self, system: &'a str, user: &'a str) -> BoxFuture<'a, String>;

    /// Transcribe an audio clip to text.
    ///
    /// # Errors
    ///
    /// Returns a remote error on transport failure.
    fn transcribe<'a>(&'a self, audio: &'a Attachment) -> BoxFuture<'a, String>;
}

/// The SMS/MMS transport (Twilio-like).
pub trait SmsTransport: Send + Sync {
    /// Send an outbound text message.
    ///
    /// # Errors
    ///
    /// Returns a remote error on transport failure.
    fn send_sms<'a>(&'a self, to: &'a str, body: &'a str) -> BoxFuture<'a, ()>;

    /// Fetch inbound media referenced by a webhook.
    ///
    /// # Errors
    ///
    /// Returns a remote error on transport failure.
    fn download_media<'a>(
        &'a self,
        url: &'a str,
        content_type: &'a str,
    ) -> BoxFuture<'a, Attachment>;
}
