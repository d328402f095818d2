//! Task creation from free text.

use chrono::Local;
use tracing::warn;

use crate::audit::{AuditEntry, AuditEventType};
use crate::gateway::SubmitOutcome;
use crate::models::task::{Priority, StoredTask, TaskRecord};
use crate::parser::llm;
use crate::parser::ExtractContext;
use crate::state::AppState;

use super::{Inbound, Reply};

/// Parse `message` into a record without submitting it.
pub async fn parse(state: &AppState, message: &str) -> TaskRecord {
    let lexicon = state.lexicon.snapshot();
    let projects = state.projects.snapshot().projects();
    let ctx = ExtractContext {
        roster: &lexicon.roster,
        projects: &projects,
        job_types: &lexicon.job_types,
        default_assignee: state.config.default_assignee.as_deref(),
        today: Local::now().date_naive(),
    };
    llm::parse_task(
        state.model.as_deref(),
        message,
        &ctx,
        state.config.model.min_message_chars,
        state.config.model_timeout(),
    )
    .await
}

/// Parse, submit and mirror a task.
pub async fn create(state: &AppState, message: &str, inbound: Inbound) -> Reply {
    let mut record = parse(state, message).await;
    record.media = inbound.media;

    match state.gateway.submit(&record).await {
        Ok(outcome) => {
            let stored = StoredTask::from_record(
                &record,
                outcome.task.id.as_str(),
                inbound.channel,
                inbound.sender.clone(),
            );
            if let Err(err) = state.tasks().insert(&stored).await {
                warn!(task_id = %outcome.task.id, %err, "failed to mirror task locally");
            }

            state.audit(
                AuditEntry::new(AuditEventType::TaskCreated)
                    .with_channel(inbound.channel.as_str())
                    .with_sender(inbound.sender)
                    .with_task(outcome.task.id.as_str())
                    .with_message(record.raw_message.as_str())
                    .with_details(serde_json::to_value(&record).unwrap_or_default()),
            );

            Reply {
                task_id: Some(outcome.task.id.clone()),
                task_url: outcome.task.url.clone(),
                ..Reply::ok("task", confirmation(state, &record, &outcome))
            }
            .with_record(record)
        }
        Err(err) => {
            state.audit(
                AuditEntry::new(AuditEventType::TaskFailed)
                    .with_channel(inbound.channel.as_str())
                    .with_sender(inbound.sender)
                    .with_message(record.raw_message.as_str())
                    .with_result(err.to_string()),
            );
            Reply::failed("task", &err).with_record(record)
        }
    }
}

/// Confirmation text for a created task.
fn confirmation(state: &AppState, record: &TaskRecord, outcome: &SubmitOutcome) -> String {
    let mut lines = vec![format!("✅ Task created: {}", record.display_title)];

    if let Some(assignee) = &record.assignee {
        lines.push(format!("👤 {assignee}"));
    }
    let table = state.projects.snapshot();
    if let Some(project) = table.by_remote_id(&outcome.list_id) {
        lines.push(format!("📁 {}", project.display_name));
    }
    if record.priority != Priority::Normal {
        let icon = if record.priority == Priority::Urgent { "🚨" } else { "⚡" };
        lines.push(format!("{icon} Priority: {}", record.priority.label()));
    }
    if let Some(due) = record.due_date {
        lines.push(format!("📅 Due: {}", due.format("%a %b %d")));
    }
    if !record.tags.is_empty() {
        let tags: Vec<&str> = record.tags.iter().map(String::as_str).collect();
        lines.push(format!("🏷️ {}", tags.join(", ")));
    }
    if record.media.is_some() {
        lines.push(if outcome.attachment_ok {
            "📷 Photo attached".into()
        } else {
            "⚠️ Photo upload failed; link saved in the task".into()
        });
    }
    lines.push(format!("🆔 {}", outcome.task.id));
    lines.join("\n")
}
