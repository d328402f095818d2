//! Informational sub-commands: help, status, reports, list, done.

use chrono::{Local, Utc};
use tracing::warn;

use crate::audit::{AuditEntry, AuditEventType};
use crate::models::report::{DailySummary, WeeklySummary};
use crate::parser::Query;
use crate::reports;
use crate::state::AppState;
use crate::{AppError, Result};

use super::{Inbound, Reply};

/// Open tasks listed by `list <project>`.
pub const LIST_LIMIT: usize = 10;

/// Help text.
pub const HELP_TEXT: &str = "📋 Site Taskbot\n\
Send a task: \"Mike fix the leak at oak by Friday, urgent\"\n\
Prefix a project: \"oak: order rebar\"\n\
create project <name>\n\
status | list <project>\n\
report | weekly | tomorrow\n\
done #<task id>";

/// Answer one query.
pub async fn answer(state: &AppState, query: &Query, inbound: &Inbound) -> Reply {
    let label = query.label();
    let result = match query {
        Query::Help => Ok(HELP_TEXT.to_owned()),
        Query::Status | Query::List(None) => Ok(project_list(state)),
        Query::DailyReport => daily(state)
            .await
            .map(|summary| reports::format_daily_sms(&summary)),
        Query::WeeklyReport => weekly(state)
            .await
            .map(|summary| reports::format_weekly_sms(&summary)),
        Query::Tomorrow => daily(state)
            .await
            .map(|summary| reports::format_tomorrow_sms(&summary)),
        Query::List(Some(key)) => list_project(state, key).await,
        Query::Done(None) => Err(AppError::InvalidCommand(
            "which task? Try: done #<task id>".into(),
        )),
        Query::Done(Some(task_id)) => complete(state, task_id, inbound).await,
    };
    Reply::from_result(label, result)
}

/// Alias list, one line per project.
#[must_use]
pub fn project_list(state: &AppState) -> String {
    let table = state.projects.snapshot();
    if table.is_empty() {
        return "📁 No projects yet. Text \"create project <name>\" to add one.".into();
    }
    let mut lines = vec![format!("📁 Projects ({}):", table.len())];
    lines.extend(
        table
            .projects()
            .iter()
            .map(|p| format!("• {} - {}", p.simple_key, p.display_name)),
    );
    lines.join("\n")
}

/// Today's summary from the local mirror.
///
/// # Errors
///
/// Returns `AppError::Db` if the mirror cannot be read.
pub async fn daily(state: &AppState) -> Result<DailySummary> {
    let today = Local::now().date_naive();
    daily_for(state, today).await
}

/// Summary of `date` from the local mirror.
///
/// # Errors
///
/// Returns `AppError::Db` if the mirror cannot be read.
pub async fn daily_for(state: &AppState, date: chrono::NaiveDate) -> Result<DailySummary> {
    let today = Local::now().date_naive();
    let since = reports::day_start_utc(date, &Local);
    let tasks = state.tasks().list_relevant(since).await?;
    let table = state.projects.snapshot();
    Ok(reports::daily_summary(&tasks, date, today, &Local, &table))
}

/// This week's summary from the local mirror.
///
/// # Errors
///
/// Returns `AppError::Db` if the mirror cannot be read.
pub async fn weekly(state: &AppState) -> Result<WeeklySummary> {
    let today = Local::now().date_naive();
    let since = reports::day_start_utc(reports::week_start(today), &Local);
    let tasks = state.tasks().list_relevant(since).await?;
    let table = state.projects.snapshot();
    Ok(reports::weekly_summary(&tasks, today, &Local, &table))
}

async fn list_project(state: &AppState, key: &str) -> Result<String> {
    let table = state.projects.snapshot();
    let project = table
        .get(&key.to_lowercase())
        .ok_or_else(|| AppError::NotFound(format!("project `{key}`. Text \"status\" for the list")))?;

    let tasks = state.gateway.open_tasks(&project.remote_list_id).await?;
    if tasks.is_empty() {
        return Ok(format!("📋 {}: no open tasks.", project.display_name));
    }

    let mut lines = vec![format!("📋 {} ({} open):", project.display_name, tasks.len())];
    lines.extend(
        tasks
            .iter()
            .take(LIST_LIMIT)
            .map(|t| format!("• {} #{}", t.name, t.id)),
    );
    if tasks.len() > LIST_LIMIT {
        lines.push(format!("…and {} more", tasks.len() - LIST_LIMIT));
    }
    Ok(lines.join("\n"))
}

/// Whether `task_id` is safe to splice into a remote URL path.
#[must_use]
pub fn is_valid_task_id(task_id: &str) -> bool {
    !task_id.is_empty()
        && task_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

async fn complete(state: &AppState, task_id: &str, inbound: &Inbound) -> Result<String> {
    if !is_valid_task_id(task_id) {
        return Err(AppError::InvalidCommand(format!(
            "'{task_id}' is not a task id. Try: done #<task id>"
        )));
    }
    let comment = format!("✅ Marked complete via {}", inbound.channel.as_str());
    state.gateway.complete(task_id, &comment).await?;

    match state.tasks().mark_complete(task_id, Utc::now()).await {
        Ok(false) => warn!(task_id, "completed task is not in the local mirror"),
        Ok(true) => {}
        Err(err) => warn!(task_id, %err, "failed to update local mirror"),
    }

    state.audit(
        AuditEntry::new(AuditEventType::TaskCompleted)
            .with_channel(inbound.channel.as_str())
            .with_sender(inbound.sender.clone())
            .with_task(task_id),
    );
    Ok(format!("✅ Task #{task_id} marked complete."))
}
