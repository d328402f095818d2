//! HTTP surface: Twilio webhook, chat, REST administration and health.

pub mod api;
pub mod health;
pub mod sms;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::state::AppState;
use crate::{AppError, Result};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidCommand(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::RemoteTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::RemoteRejected(_) | Self::ModelParseFailure(_) => StatusCode::BAD_GATEWAY,
            Self::Config(_) | Self::Db(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({
            "success": false,
            "error": self.to_string(),
            "message": self.user_message(),
        });
        (status, Json(body)).into_response()
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/sms", post(sms::webhook))
        .route("/api/chat", post(api::chat))
        .route("/api/parse", post(api::parse))
        .route("/api/tasks", post(api::create_task))
        .route("/api/projects", get(api::list_projects))
        .route("/api/projects/sync", post(api::sync_projects))
        .route("/api/projects/{key}", delete(api::remove_project))
        .route("/api/team", get(api::list_team).post(api::upsert_member))
        .route("/api/team/{key}", delete(api::remove_member))
        .route("/api/report/daily", get(api::daily_report))
        .route("/api/report/weekly", get(api::weekly_report))
        .route("/api/send-daily-reports", post(api::send_daily_reports))
        .with_state(state)
}

/// Serve on `0.0.0.0:<http_port>` until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Config` if the port cannot be bound, or `AppError::Io`
/// if the server fails.
pub async fn serve(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind {addr}: {err}")))?;
    info!(%addr, "http server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(AppError::from)
}
