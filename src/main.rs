#![forbid(unsafe_code)]

//! `site-taskbot`: construction-site task assistant server.
//!
//! Loads configuration and credentials, opens the database, syncs project
//! aliases once and serves the SMS webhook, chat and REST API.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use site_taskbot::audit::{AuditEntry, AuditEventType};
use site_taskbot::config::GlobalConfig;
use site_taskbot::state::AppState;
use site_taskbot::{http, AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "site-taskbot", about = "Construction-site task assistant", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// HTTP listen port, overriding `http_port`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("site-taskbot bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    if let Some(port) = args.port {
        config.http_port = port;
    }
    config.load_credentials().await?;
    info!(port = config.http_port, "configuration loaded");

    let state = Arc::new(AppState::bootstrap(config).await?);
    startup_sync(&state).await;

    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let server_state = Arc::clone(&state);
    let mut server = tokio::spawn(async move { http::serve(server_state, server_ct).await });

    let outcome = tokio::select! {
        () = shutdown_signal() => {
            info!("shutdown signal received");
            ct.cancel();
            server.await
        }
        outcome = &mut server => outcome,
    };
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(err)) => error!(%err, "http server failed"),
        Err(err) => error!(%err, "http server task panicked"),
    }
    state.db.close().await;
    info!("site-taskbot shut down");
    Ok(())
}

/// Refresh the alias table from the remote service; failures are logged.
async fn startup_sync(state: &AppState) {
    if !state.gateway.is_configured() {
        info!("clickup not configured; skipping project sync");
        return;
    }
    match state.projects.sync_from(&state.gateway).await {
        Ok(report) => state.audit(
            AuditEntry::new(AuditEventType::ProjectsSynced)
                .with_channel("startup")
                .with_details(serde_json::to_value(&report).unwrap_or_default()),
        ),
        Err(err) => warn!(%err, "startup project sync failed"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
