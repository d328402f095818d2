//! Language-model parsing layered over deterministic extraction.
//!
//! The model is asked for a single JSON object. Its reply is validated
//! against a strict schema and merged field by field with the deterministic
//! result; anything missing or unrecognised keeps the deterministic value.
//! Any failure (transport, timeout, malformed JSON, wrong shape) yields
//! `None` and the caller uses [`extractor::extract`] output unchanged.

use std::fmt::Write as _;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use super::extractor::{self, compose_display_title, ExtractContext, Extraction};
use super::{literal, word_pattern};
use crate::clients::LanguageModel;
use crate::lexicon;
use crate::models::task::{Priority, TaskRecord};
use crate::{AppError, Result};

static FAST_PATH_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    literal(r"(?i)safety|danger|hazard|\bosha\b|\bviolations?\b|\binspect\w*")
});

/// Priority as the model may express it: `1`..`4` or a label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PriorityValue {
    /// ClickUp numeric priority.
    Number(i64),
    /// Label such as `urgent`.
    Label(String),
}

impl PriorityValue {
    fn resolve(&self) -> Option<Priority> {
        match self {
            Self::Number(n) => Priority::from_remote(*n),
            Self::Label(label) => label
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(Priority::from_remote)
                .or_else(|| Priority::from_label(label)),
        }
    }
}

/// The JSON object the model is instructed to return.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelReply {
    /// Must be `task`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Cleaned task name.
    pub name: String,
    /// Team member name or key.
    #[serde(default)]
    pub assignee: Option<String>,
    /// Project short key.
    #[serde(default)]
    pub project: Option<String>,
    /// Priority.
    #[serde(default)]
    pub priority: Option<PriorityValue>,
    /// Due date as `YYYY-MM-DD`.
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Whether `message` takes the safety/inspection fast path that never
/// consults the model.
#[must_use]
pub fn is_fast_path(message: &str) -> bool {
    FAST_PATH_WORDS.is_match(message)
}

/// Whether the model should be consulted for `message`.
#[must_use]
pub fn should_use_model(message: &str, min_chars: usize) -> bool {
    message.trim().chars().count() > min_chars && !is_fast_path(message)
}

/// System prompt listing the roster and known project keys.
#[must_use]
pub fn build_prompt(ctx: &ExtractContext<'_>) -> String {
    let mut prompt = String::from(
        "You turn construction-site messages into tasks. \
         Reply with ONE JSON object and nothing else, shaped as \
         {\"type\":\"task\",\"name\":string,\"assignee\":string|null,\
         \"project\":string|null,\"priority\":1|2|3|4,\"due_date\":\"YYYY-MM-DD\"|null}.\n\
         Priority: 1 urgent, 2 high, 3 normal, 4 low.\n\
         Do not repeat the assignee's name inside \"name\"; write only the work to be done.\n",
    );

    let _ = writeln!(prompt, "Today is {} ({}).", ctx.today, ctx.today.format("%A"));

    let team: Vec<&str> = ctx.roster.iter().map(|m| m.name.as_str()).collect();
    let _ = writeln!(
        prompt,
        "Team members: {}.",
        if team.is_empty() { "none".to_owned() } else { team.join(", ") }
    );

    if ctx.projects.is_empty() {
        prompt.push_str("Projects: none.\n");
    } else {
        prompt.push_str("Projects (use the key):\n");
        for project in ctx.projects {
            let _ = writeln!(prompt, "- {}: {}", project.simple_key, project.display_name);
        }
    }
    prompt
}

/// Parse and validate a raw model reply.
///
/// # Errors
///
/// Returns `AppError::ModelParseFailure` when no JSON object is present, it
/// does not deserialize, `type` is not `task`, or `name` is blank.
pub fn parse_reply(text: &str) -> Result<ModelReply> {
    let unfenced = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```");
    let start = unfenced
        .find('{')
        .ok_or_else(|| AppError::ModelParseFailure("no JSON object in reply".into()))?;
    let end = unfenced
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| AppError::ModelParseFailure("unterminated JSON object".into()))?;

    let reply: ModelReply = serde_json::from_str(&unfenced[start..=end])?;
    if !reply.kind.eq_ignore_ascii_case("task") {
        return Err(AppError::ModelParseFailure(format!(
            "unexpected type `{}`",
            reply.kind
        )));
    }
    if reply.name.trim().is_empty() {
        return Err(AppError::ModelParseFailure("empty task name".into()));
    }
    Ok(reply)
}

/// Drop a leading `name` and any following colon, dash, comma or space.
#[must_use]
pub fn strip_assignee_prefix(title: &str, name: &str) -> String {
    match word_pattern(r"^\s*{}\b[\s:,\-]*", name) {
        Some(re) => re.replace(title, "").trim().to_owned(),
        None => title.trim().to_owned(),
    }
}

/// Merge a validated reply over the deterministic extraction.
///
/// A deterministic `Urgent` always wins; assignee and project must resolve
/// against the roster and alias table; tags come from the deterministic pass.
#[must_use]
pub fn merge(reply: &ModelReply, base: Extraction, ctx: &ExtractContext<'_>) -> TaskRecord {
    let priority = if base.priority == Priority::Urgent {
        Priority::Urgent
    } else {
        reply
            .priority
            .as_ref()
            .and_then(PriorityValue::resolve)
            .unwrap_or(base.priority)
    };

    let assignee = reply
        .assignee
        .as_deref()
        .and_then(|alias| lexicon::member_by_alias(ctx.roster, alias))
        .map(|m| m.name.clone())
        .or_else(|| base.assignee.clone());

    let project_ref = reply
        .project
        .as_deref()
        .and_then(|hint| {
            let wanted = hint.trim().to_lowercase();
            ctx.projects.iter().find(|p| {
                p.simple_key == wanted
                    || p.remote_list_id == hint.trim()
                    || p.display_name.to_lowercase() == wanted
            })
        })
        .map(|p| p.remote_list_id.clone())
        .or_else(|| base.project_ref.clone());

    let due_date = reply
        .due_date
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
        .or(base.due_date);

    let mut title = reply.name.trim().to_owned();
    if let Some(name) = &assignee {
        title = strip_assignee_prefix(&title, name);
    }
    if title.is_empty() {
        title.clone_from(&base.title);
    }

    TaskRecord {
        display_title: compose_display_title(&title, assignee.as_deref()),
        description: format!("Original message: {}", base.raw),
        raw_message: base.raw,
        title,
        assignee,
        priority,
        due_date,
        project_ref,
        tags: base.tags,
        media: None,
    }
}

/// Ask the model to parse `message`; `None` on any failure.
pub async fn parse_with_model(
    model: &dyn LanguageModel,
    message: &str,
    ctx: &ExtractContext<'_>,
    timeout: Duration,
) -> Option<TaskRecord> {
    let prompt = build_prompt(ctx);
    let reply = match tokio::time::timeout(timeout, model.complete(&prompt, message)).await {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => {
            warn!(%err, "model call failed, using deterministic parse");
            return None;
        }
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "model call timed out, using deterministic parse");
            return None;
        }
    };

    match parse_reply(&reply) {
        Ok(parsed) => {
            debug!(name = %parsed.name, "model reply accepted");
            Some(merge(&parsed, extractor::run(message, ctx), ctx))
        }
        Err(err) => {
            warn!(%err, "model reply rejected, using deterministic parse");
            None
        }
    }
}

/// Parse a task-creation message, consulting the model when eligible.
///
/// Always returns a usable record.
pub async fn parse_task(
    model: Option<&dyn LanguageModel>,
    message: &str,
    ctx: &ExtractContext<'_>,
    min_chars: usize,
    timeout: Duration,
) -> TaskRecord {
    if let Some(model) = model.filter(|_| should_use_model(message, min_chars)) {
        if let Some(record) = parse_with_model(model, message, ctx, timeout).await {
            return record;
        }
    }
    extractor::extract(message, ctx)
}
