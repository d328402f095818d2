//! `GET /health`.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Configuration status of each collaborator.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// Always `ok` when the server answers.
    pub status: &'static str,
    /// Remote task service credentials present.
    pub clickup_configured: bool,
    /// Language-model credentials present.
    pub openai_configured: bool,
    /// SMS transport credentials present.
    pub twilio_configured: bool,
    /// Known project aliases.
    pub projects: usize,
    /// Roster size.
    pub team_members: usize,
}

/// Report liveness and configuration status.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        clickup_configured: state.gateway.is_configured(),
        openai_configured: state.model.is_some(),
        twilio_configured: state.sms.is_some(),
        projects: state.projects.snapshot().len(),
        team_members: state.lexicon.snapshot().roster.len(),
    })
}
