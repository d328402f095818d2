//! Decide whether a message creates a project, creates a task, or asks a question.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::literal;
use crate::{AppError, Result};

/// An informational sub-command.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "query", content = "arg")]
pub enum Query {
    /// `help`
    Help,
    /// `status`: list project aliases.
    Status,
    /// `report` / `daily`: today's summary.
    DailyReport,
    /// `weekly`: this week's summary.
    WeeklyReport,
    /// `tomorrow`: tasks due tomorrow.
    Tomorrow,
    /// `list [project]`
    List(Option<String>),
    /// `done <task id>`
    Done(Option<String>),
}

impl Query {
    /// Short label used in logs and the SMS log.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Status => "status",
            Self::DailyReport => "report",
            Self::WeeklyReport => "weekly",
            Self::Tomorrow => "tomorrow",
            Self::List(_) => "list",
            Self::Done(_) => "done",
        }
    }
}

/// Classification of one inbound message. Exactly one variant applies.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Command {
    /// Create a remote project with the given title-cased name.
    ProjectCreate {
        /// Project display name.
        name: String,
    },
    /// Answer an informational query.
    Query(Query),
    /// Create a task from the full message.
    TaskCreate {
        /// Message text, trimmed.
        message: String,
    },
}

static PROJECT_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    literal(
        r"(?i)\b(?:create|new|start|make)\s+(?:(?:a|the)\s+)?(?:new\s+)?project\b(?:\s+(?:a|the)\b)?",
    )
});

const CONNECTING_WORDS: [&str; 5] = ["called", "named", "a", "the", "is"];

/// Classify `message`.
///
/// # Errors
///
/// Returns `AppError::InvalidCommand` when a project-creation phrase has no
/// project name after it.
pub fn classify(message: &str) -> Result<Command> {
    let trimmed = message.trim();

    if let Some(found) = PROJECT_TRIGGER.find(trimmed) {
        let name = project_name(&trimmed[found.end()..]);
        if name.is_empty() {
            return Err(AppError::InvalidCommand(
                "missing project name. Try: create project Oak Street".into(),
            ));
        }
        return Ok(Command::ProjectCreate { name });
    }

    if let Some(query) = parse_query(trimmed) {
        return Ok(Command::Query(query));
    }

    Ok(Command::TaskCreate {
        message: trimmed.to_owned(),
    })
}

fn parse_query(trimmed: &str) -> Option<Query> {
    let bare = trimmed.trim_end_matches(['.', '!', '?']).trim();
    let lowered = bare.to_lowercase();

    let exact = match lowered.as_str() {
        "" | "help" | "commands" => Some(Query::Help),
        "status" | "projects" => Some(Query::Status),
        "report" | "daily" => Some(Query::DailyReport),
        "weekly" => Some(Query::WeeklyReport),
        "tomorrow" => Some(Query::Tomorrow),
        "list" => Some(Query::List(None)),
        "done" => Some(Query::Done(None)),
        _ => None,
    };
    if exact.is_some() {
        return exact;
    }

    let (head, rest) = bare.split_once(char::is_whitespace)?;
    let arg = rest.trim().trim_start_matches('#').trim().to_owned();
    match head.to_lowercase().as_str() {
        "list" => Some(Query::List(Some(arg).filter(|a| !a.is_empty()))),
        "done" => Some(Query::Done(Some(arg).filter(|a| !a.is_empty()))),
        _ => None,
    }
}

/// Strip leading punctuation and one connecting word, then title-case.
fn project_name(remainder: &str) -> String {
    let rest = remainder.trim_start_matches(|c: char| c.is_whitespace() || c == ':' || c == '-');
    let mut words = rest.split_whitespace().peekable();
    if let Some(first) = words.peek() {
        if CONNECTING_WORDS.contains(&first.to_lowercase().as_str()) {
            words.next();
        }
    }
    let kept: Vec<&str> = words.collect();
    title_case(&kept.join(" "))
}

/// Upper-case the first letter of every word and lower-case the rest.
#[must_use]
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
