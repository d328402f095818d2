//! JSON endpoints for the chat UI and administration.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::audit::{AuditEntry, AuditEventType};
use crate::dispatch::{self, queries, tasks, Inbound, Reply};
use crate::gateway::bounded;
use crate::models::member::TeamMember;
use crate::models::project::Project;
use crate::models::report::{DailySummary, WeeklySummary};
use crate::models::task::{CreatedVia, TaskRecord};
use crate::parser::{classify, Command};
use crate::reports;
use crate::state::AppState;
use crate::sync::SyncReport;
use crate::{AppError, Result};

/// A free-text message.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Message text.
    pub message: String,
}

/// Classification and, for task messages, the parsed record.
#[derive(Debug, Serialize)]
pub struct ParseResponse {
    /// How the message was classified.
    pub command: Command,
    /// Parsed task for task-creation messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<TaskRecord>,
}

/// `POST /api/chat`: dispatch like an SMS from the web UI.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MessageRequest>,
) -> Json<Reply> {
    Json(dispatch::handle_message(&state, Inbound::text(req.message, CreatedVia::Web)).await)
}

/// `POST /api/parse`: classify and parse without side effects.
///
/// # Errors
///
/// Returns `InvalidCommand` for a malformed project-creation phrase.
pub async fn parse(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ParseResponse>> {
    let command = classify(&req.message)?;
    let record = match &command {
        Command::TaskCreate { message } => Some(tasks::parse(&state, message).await),
        Command::ProjectCreate { .. } | Command::Query(_) => None,
    };
    Ok(Json(ParseResponse { command, record }))
}

/// `POST /api/tasks`: create a task, skipping command classification.
///
/// # Errors
///
/// Returns `InvalidCommand` for an empty message.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<Reply>> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::InvalidCommand("message must not be empty".into()));
    }
    let inbound = Inbound::text(message, CreatedVia::Api);
    Ok(Json(tasks::create(&state, message, inbound).await))
}

/// `GET /api/projects`.
pub async fn list_projects(State(state): State<Arc<AppState>>) -> Json<Vec<Project>> {
    Json(state.projects.snapshot().projects())
}

/// `POST /api/projects/sync`.
///
/// # Errors
///
/// Returns `NotConfigured`, a remote error, or `Db`.
pub async fn sync_projects(State(state): State<Arc<AppState>>) -> Result<Json<SyncReport>> {
    let report = state.projects.sync_from(&state.gateway).await?;
    state.audit(
        AuditEntry::new(AuditEventType::ProjectsSynced)
            .with_channel(CreatedVia::Api.as_str())
            .with_details(serde_json::to_value(&report).unwrap_or_default()),
    );
    Ok(Json(report))
}

/// `DELETE /api/projects/{key}`: the only way an alias is removed.
///
/// # Errors
///
/// Returns `NotFound` for an unknown key.
pub async fn remove_project(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Project>> {
    let removed = state.projects.remove(&key).await?;
    state.audit(
        AuditEntry::new(AuditEventType::ProjectRemoved)
            .with_project(removed.simple_key.as_str())
            .with_result(format!("list {}", removed.remote_list_id)),
    );
    Ok(Json(removed))
}

/// `GET /api/team`.
pub async fn list_team(State(state): State<Arc<AppState>>) -> Json<Vec<TeamMember>> {
    Json(state.lexicon.snapshot().roster.clone())
}

/// Body of `POST /api/team`.
#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    /// Short key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Trade.
    #[serde(default)]
    pub role: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

/// `POST /api/team`: add or replace a member.
///
/// # Errors
///
/// Returns `InvalidCommand` for a blank key or name, or `Db`.
pub async fn upsert_member(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MemberRequest>,
) -> Result<Json<TeamMember>> {
    if req.key.trim().is_empty() || req.name.trim().is_empty() {
        return Err(AppError::InvalidCommand("key and name are required".into()));
    }
    let mut member = TeamMember::new(
        req.key.as_str(),
        req.name.as_str(),
        req.role.as_deref().unwrap_or("General"),
    );
    member.phone = req.phone.filter(|p| !p.trim().is_empty());

    state.members().upsert(&member).await?;
    state.lexicon.upsert_member(member.clone());
    info!(key = %member.key, "team member saved");
    Ok(Json(member))
}

/// `DELETE /api/team/{key}`.
///
/// # Errors
///
/// Returns `NotFound` for an unknown key.
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Value>> {
    let key = key.trim().to_lowercase();
    state.members().delete(&key).await?;
    state.lexicon.remove_member(&key);
    info!(%key, "team member removed");
    Ok(Json(json!({ "success": true, "removed": key })))
}

/// Query of `GET /api/report/daily`.
#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    /// `YYYY-MM-DD`; today when absent.
    pub date: Option<String>,
}

/// `GET /api/report/daily`.
///
/// # Errors
///
/// Returns `InvalidCommand` for a malformed date, or `Db`.
pub async fn daily_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<DailySummary>> {
    let summary = match query.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                AppError::InvalidCommand(format!("invalid date `{raw}`, expected YYYY-MM-DD"))
            })?;
            queries::daily_for(&state, date).await?
        }
        None => queries::daily(&state).await?,
    };
    Ok(Json(summary))
}

/// `GET /api/report/weekly`.
///
/// # Errors
///
/// Returns `Db` if the mirror cannot be read.
pub async fn weekly_report(State(state): State<Arc<AppState>>) -> Result<Json<WeeklySummary>> {
    Ok(Json(queries::weekly(&state).await?))
}

/// Body of `POST /api/send-daily-reports`.
#[derive(Debug, Default, Deserialize)]
pub struct SendReportsRequest {
    /// Recipients; the configured manager numbers when absent.
    #[serde(default)]
    pub numbers: Option<Vec<String>>,
}

/// Delivery result of `POST /api/send-daily-reports`.
#[derive(Debug, Serialize)]
pub struct SendReportsResponse {
    /// Always `true` when the request was processed.
    pub success: bool,
    /// Numbers that received the report.
    pub sent: Vec<String>,
    /// Numbers whose delivery failed.
    pub failed: Vec<String>,
    /// The report text.
    pub report: String,
}

/// `POST /api/send-daily-reports`: text today's summary to managers.
///
/// # Errors
///
/// Returns `NotConfigured` without an SMS transport, `InvalidCommand` when
/// there are no recipients, or `Db`.
pub async fn send_daily_reports(
    State(state): State<Arc<AppState>>,
    body: Option<Json<SendReportsRequest>>,
) -> Result<Json<SendReportsResponse>> {
    let transport = state
        .sms
        .clone()
        .ok_or_else(|| AppError::NotConfigured("Twilio is not configured".into()))?;

    let requested = body.and_then(|Json(req)| req.numbers).unwrap_or_default();
    let recipients: Vec<String> = if requested.is_empty() {
        state.config.credentials.manager_phones.clone()
    } else {
        requested
    };
    if recipients.is_empty() {
        return Err(AppError::InvalidCommand(
            "no recipients: pass numbers or set MANAGER_PHONES".into(),
        ));
    }

    let report = reports::format_daily_sms(&queries::daily(&state).await?);
    let mut sent = Vec::new();
    let mut failed = Vec::new();
    for number in recipients {
        let outcome = bounded(
            state.config.remote_timeout(),
            "daily report sms",
            transport.send_sms(&number, &report),
        )
        .await;
        match outcome {
            Ok(()) => sent.push(number),
            Err(err) => {
                warn!(%number, %err, "daily report delivery failed");
                failed.push(number);
            }
        }
    }

    info!(sent = sent.len(), failed = failed.len(), "daily reports sent");
    Ok(Json(SendReportsResponse {
        success: true,
        sent,
        failed,
        report,
    }))
}
