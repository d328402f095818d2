//! Message dispatch shared by the SMS, chat and REST surfaces.
//!
//! [`handle_message`] classifies one inbound message, runs the matching
//! command and always produces a [`Reply`]: errors become user-facing text,
//! never a failed request.

pub mod projects;
pub mod queries;
pub mod tasks;

use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};

use crate::models::task::{Attachment, CreatedVia, TaskRecord};
use crate::parser::{classify, Command};
use crate::state::AppState;
use crate::{AppError, Result};

/// One inbound message.
#[derive(Debug, Clone)]
pub struct Inbound {
    /// Message text (or voice-note transcript).
    pub text: String,
    /// Channel it arrived on.
    pub channel: CreatedVia,
    /// Sender phone number, for SMS.
    pub sender: Option<String>,
    /// Media to attach to a created task.
    pub media: Option<Attachment>,
}

impl Inbound {
    /// A text-only message.
    #[must_use]
    pub fn text(text: impl Into<String>, channel: CreatedVia) -> Self {
        Self {
            text: text.into(),
            channel,
            sender: None,
            media: None,
        }
    }

    /// Set the sender number.
    #[must_use]
    pub fn from_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Attach media.
    #[must_use]
    pub fn with_media(mut self, media: Option<Attachment>) -> Self {
        self.media = media;
        self
    }
}

/// The outcome of dispatching one message.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    /// Text shown to the sender.
    pub message: String,
    /// Outcome classification (`task`, `project`, `help`, `report`, ...).
    pub command_type: &'static str,
    /// Whether the command succeeded.
    pub success: bool,
    /// Remote task id for created tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Remote task URL for created tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_url: Option<String>,
    /// The parsed task, for task-creation messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<TaskRecord>,
}

impl Reply {
    /// A successful reply.
    #[must_use]
    pub fn ok(command_type: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            command_type,
            success: true,
            task_id: None,
            task_url: None,
            record: None,
        }
    }

    /// A failed reply carrying the error's user message.
    #[must_use]
    pub fn failed(command_type: &'static str, err: &AppError) -> Self {
        warn!(command_type, %err, "command failed");
        Self {
            success: false,
            ..Self::ok(command_type, err.user_message())
        }
    }

    /// Attach the parsed task.
    #[must_use]
    pub fn with_record(mut self, record: TaskRecord) -> Self {
        self.record = Some(record);
        self
    }

    fn from_result(command_type: &'static str, result: Result<String>) -> Self {
        match result {
            Ok(message) => Self::ok(command_type, message),
            Err(err) => Self::failed(command_type, &err),
        }
    }
}

/// Classify and run one message.
pub async fn handle_message(state: &AppState, inbound: Inbound) -> Reply {
    let span = info_span!("dispatch", channel = inbound.channel.as_str());
    async move {
        let command = match classify(&inbound.text) {
            Ok(command) => command,
            Err(err) => return Reply::failed("invalid", &err),
        };

        let reply = match command {
            Command::ProjectCreate { name } => projects::create(state, &name).await,
            Command::Query(query) => queries::answer(state, &query, &inbound).await,
            Command::TaskCreate { message } => tasks::create(state, &message, inbound).await,
        };
        info!(command_type = reply.command_type, success = reply.success, "message handled");
        reply
    }
    .instrument(span)
    .await
}

/// Transcribe a voice note through the language model.
///
/// # Errors
///
/// Returns `NotConfigured` without a model backend, `RemoteTimeout` past
/// the model deadline, or the backend's error.
pub async fn transcribe(state: &AppState, audio: &Attachment) -> Result<String> {
    let model = state
        .model
        .as_deref()
        .ok_or_else(|| AppError::NotConfigured("voice notes need a language model".into()))?;
    let text = crate::gateway::bounded(
        state.config.model_timeout(),
        "transcription",
        model.transcribe(audio),
    )
    .await?;
    if text.trim().is_empty() {
        return Err(AppError::InvalidCommand(
            "could not understand the voice note. Please text the task instead.".into(),
        ));
    }
    Ok(text)
}
