#![forbid(unsafe_code)]

//! `site-taskbot-ctl`: admin companion for a running `site-taskbot`.
//!
//! Calls the server's REST endpoints and prints the JSON answers.

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Debug, Parser)]
#[command(
    name = "site-taskbot-ctl",
    about = "Admin CLI for the site-taskbot server",
    version,
    long_about = None
)]
struct Cli {
    /// Base URL of the server.
    #[arg(long, env = "SITE_TASKBOT_URL", default_value = "http://127.0.0.1:5000")]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show configuration status.
    Health,

    /// List project aliases.
    Projects,

    /// Sync project aliases from ClickUp.
    Sync,

    /// Remove a project alias.
    RemoveProject {
        /// Alias key.
        key: String,
    },

    /// Show how a message would be parsed, without creating anything.
    Parse {
        /// Message text.
        message: String,
    },

    /// Send a message as if from the chat UI.
    Send {
        /// Message text.
        message: String,
    },

    /// Show the daily or weekly report.
    Report {
        /// Weekly instead of daily.
        #[arg(long)]
        weekly: bool,
        /// Day to report (`YYYY-MM-DD`); today when omitted.
        #[arg(long, conflicts_with = "weekly")]
        date: Option<String>,
    },

    /// Text today's report to managers.
    SendReports {
        /// Recipient numbers; the server's manager list when omitted.
        numbers: Vec<String>,
    },

    /// List the team roster.
    Team,
}

enum Call {
    Get(String),
    Post(String, Value),
    Delete(String),
}

impl Command {
    fn call(&self) -> Call {
        match self {
            Self::Health => Call::Get("/health".into()),
            Self::Projects => Call::Get("/api/projects".into()),
            Self::Sync => Call::Post("/api/projects/sync".into(), json!({})),
            Self::RemoveProject { key } => Call::Delete(format!("/api/projects/{key}")),
            Self::Parse { message } => {
                Call::Post("/api/parse".into(), json!({ "message": message }))
            }
            Self::Send { message } => Call::Post("/api/chat".into(), json!({ "message": message })),
            Self::Report { weekly: true, .. } => Call::Get("/api/report/weekly".into()),
            Self::Report { date: Some(date), .. } => {
                Call::Get(format!("/api/report/daily?date={date}"))
            }
            Self::Report { .. } => Call::Get("/api/report/daily".into()),
            Self::SendReports { numbers } => {
                let body = if numbers.is_empty() {
                    json!({})
                } else {
                    json!({ "numbers": numbers })
                };
                Call::Post("/api/send-daily-reports".into(), body)
            }
            Self::Team => Call::Get("/api/team".into()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Cli::parse();
    let base = args.url.trim_end_matches('/');

    match send(base, args.command.call()).await {
        Ok((status, body)) => {
            println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
            if !status.is_success() {
                eprintln!("Error: server answered {status}");
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("Failed to reach server: {err}");
            eprintln!("Is site-taskbot running at '{base}'?");
            std::process::exit(1);
        }
    }
}

async fn send(
    base: &str,
    call: Call,
) -> std::result::Result<(reqwest::StatusCode, Value), reqwest::Error> {
    let client = reqwest::Client::new();
    let request = match call {
        Call::Get(path) => client.get(format!("{base}{path}")),
        Call::Post(path, body) => client.post(format!("{base}{path}")).json(&body),
        Call::Delete(path) => client.delete(format!("{base}{path}")),
    };
    let response = request.send().await?;
    let status = response.status();
    let body = response.json::<Value>().await?;
    Ok((status, body))
}
