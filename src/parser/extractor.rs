//! Deterministic field extraction for task-creation messages.
//!
//! Extraction is a fixed pipeline of pure passes. Each pass takes the
//! partial [`Extraction`] by value and returns the next one:
//!
//! 1. priority (safety words force `Urgent`)
//! 2. assignee (first roster member with a bounded pattern match)
//! 3. due date (first day word in precedence order)
//! 4. project hint (`key:` / `key -` prefix, else whole-word mention)
//! 5. job-type tags
//! 6. title cleanup (consumed phrases removed, never empty)
//! 7. display title (`[Name] ` prefix unless the name is already present)
//!
//! Extraction never fails; an absent signal leaves its field at the default.

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::dates::resolve_due_date;
use super::{literal, word_pattern};
use crate::lexicon;
use crate::models::job_type::JobType;
use crate::models::member::TeamMember;
use crate::models::project::Project;
use crate::models::task::{Priority, TaskRecord};

/// Urgent stems match anywhere in a word, so inflections like `dangerously`,
/// `emergencies` or `endangered` count. `high` and `low` stay word-bounded.
static URGENT_WORDS: LazyLock<Regex> =
    LazyLock::new(|| literal(r"(?i)urgen|emergenc|critical|danger|hazard|\basap\b"));
static HIGH_WORDS: LazyLock<Regex> = LazyLock::new(|| literal(r"(?i)\b(?:high|important)\b"));
static LOW_WORDS: LazyLock<Regex> = LazyLock::new(|| literal(r"(?i)\b(?:low|whenever)\b"));
static SAFETY_WORD: LazyLock<Regex> = LazyLock::new(|| literal(r"(?i)safety"));

/// Priority marker phrases removed from the title. Content words such as
/// `safety`, `hazard` or `emergency` stay in the title.
static PRIORITY_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    literal(
        r"(?i)\b(?:urgent|emergency|critical|asap|high|important|low|normal)\s+priority\b|\bpriority\s*:?\s*(?:urgent|high|normal|low)\b|\b(?:urgent(?:ly)?|asap)\b|\bwhenever(?:\s+(?:possible|you\s+can))?\b",
    )
});

static LEADING_VERB: LazyLock<Regex> = LazyLock::new(|| {
    literal(r"(?i)^\s*(?:please\s+)?(?:add|create|schedule|new)\b(?:\s+(?:a\s+)?task\b)?\s*:?")
});
static SPACE_BEFORE_PUNCT: LazyLock<Regex> = LazyLock::new(|| literal(r"\s+([,.;:!?])"));
static REPEATED_COMMAS: LazyLock<Regex> = LazyLock::new(|| literal(r",(?:\s*,)+"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| literal(r"\s+"));

/// Assignee patterns in test order; `{}` is the escaped key or name.
const ASSIGNEE_TEMPLATES: [&str; 7] = [
    r"\bassign(?:ed)?\s+to\s+{}\b",
    r"\b{}\s+needs\s+to\b",
    r"\b{}\s+should\b",
    r"\b{}\s+must\b",
    r"\b{}\s*:",
    r"\bfor\s+{}\b",
    r"\bto\s+{}\b",
];

/// Everything extraction reads besides the message itself.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    /// Roster in precedence order.
    pub roster: &'a [TeamMember],
    /// Known project aliases.
    pub projects: &'a [Project],
    /// Job-type categories for tagging.
    pub job_types: &'a [JobType],
    /// Assignee used when none is named; resolved against the roster.
    pub default_assignee: Option<&'a str>,
    /// Reference date for relative day words.
    pub today: NaiveDate,
}

/// Partial record threaded through the extraction passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Message as received, trimmed.
    pub raw: String,
    /// Lowercased copy used for substring tests.
    pub lowered: String,
    /// Priority so far.
    pub priority: Priority,
    /// Canonical assignee name.
    pub assignee: Option<String>,
    /// Resolved due date.
    pub due_date: Option<NaiveDate>,
    /// Key of the resolved project alias.
    pub project_key: Option<String>,
    /// Remote list id of the resolved project alias.
    pub project_ref: Option<String>,
    /// Job-type tags.
    pub tags: BTreeSet<String>,
    /// Byte spans of `raw` consumed by earlier passes.
    pub consumed: Vec<Range<usize>>,
    /// Cleaned title (filled by the cleanup pass).
    pub title: String,
    /// Title as submitted (filled by the display pass).
    pub display_title: String,
}

impl Extraction {
    /// Start an extraction for `message`.
    #[must_use]
    pub fn start(message: &str) -> Self {
        let raw = message.trim().to_owned();
        Self {
            lowered: raw.to_lowercase(),
            raw,
            priority: Priority::Normal,
            assignee: None,
            due_date: None,
            project_key: None,
            project_ref: None,
            tags: BTreeSet::new(),
            consumed: Vec::new(),
            title: String::new(),
            display_title: String::new(),
        }
    }

    /// Convert into a [`TaskRecord`] with a default audit description.
    #[must_use]
    pub fn into_record(self) -> TaskRecord {
        TaskRecord {
            description: format!("Original message: {}", self.raw),
            raw_message: self.raw,
            title: self.title,
            display_title: self.display_title,
            assignee: self.assignee,
            priority: self.priority,
            due_date: self.due_date,
            project_ref: self.project_ref,
            tags: self.tags,
            media: None,
        }
    }
}

/// Run the full pipeline over `message`.
#[must_use]
pub fn extract(message: &str, ctx: &ExtractContext<'_>) -> TaskRecord {
    run(message, ctx).into_record()
}

/// Run the full pipeline, returning the intermediate record.
#[must_use]
pub fn run(message: &str, ctx: &ExtractContext<'_>) -> Extraction {
    let ex = Extraction::start(message);
    let ex = detect_priority(ex);
    let ex = detect_assignee(ex, ctx);
    let ex = detect_due_date(ex, ctx.today);
    let ex = detect_project(ex, ctx.projects);
    let ex = tag_job_types(ex, ctx.job_types);
    let ex = clean_title(ex);
    display_title(ex)
}

/// Whether `message` mentions safety, which forces `Urgent`.
#[must_use]
pub fn mentions_safety(message: &str) -> bool {
    SAFETY_WORD.is_match(message)
}

/// Pass 1: priority tiers, then the unconditional safety override.
#[must_use]
pub fn detect_priority(mut ex: Extraction) -> Extraction {
    ex.priority = if URGENT_WORDS.is_match(&ex.raw) {
        Priority::Urgent
    } else if HIGH_WORDS.is_match(&ex.raw) {
        Priority::High
    } else if LOW_WORDS.is_match(&ex.raw) {
        Priority::Low
    } else {
        Priority::Normal
    };

    if mentions_safety(&ex.raw) {
        ex.priority = Priority::Urgent;
    }

    let spans: Vec<Range<usize>> = PRIORITY_MARKERS.find_iter(&ex.raw).map(|m| m.range()).collect();
    ex.consumed.extend(spans);
    ex
}

/// Pass 2: first roster member with any bounded pattern match, else the default.
#[must_use]
pub fn detect_assignee(mut ex: Extraction, ctx: &ExtractContext<'_>) -> Extraction {
    for member in ctx.roster {
        if let Some(span) = match_member(&ex.raw, member) {
            ex.assignee = Some(member.name.clone());
            ex.consumed.push(span);
            return ex;
        }
    }

    if let Some(default) = ctx.default_assignee.map(str::trim).filter(|d| !d.is_empty()) {
        ex.assignee = Some(lexicon::canonical_name(ctx.roster, default));
    }
    ex
}

fn match_member(raw: &str, member: &TeamMember) -> Option<Range<usize>> {
    let mut aliases = vec![member.key.as_str()];
    if !member.name.eq_ignore_ascii_case(&member.key) {
        aliases.push(member.name.as_str());
    }

    for template in ASSIGNEE_TEMPLATES {
        for alias in &aliases {
            if let Some(found) = word_pattern(template, alias).and_then(|re| re.find(raw)) {
                return Some(found.range());
            }
        }
    }
    None
}

/// Pass 3: first day word in precedence order.
#[must_use]
pub fn detect_due_date(mut ex: Extraction, today: NaiveDate) -> Extraction {
    if let Some(found) = resolve_due_date(&ex.raw, today) {
        ex.due_date = Some(found.date);
        ex.consumed.push(found.span);
    }
    ex
}

/// Pass 4: explicit `key:` / `key -` prefix across all aliases, then a
/// whole-word mention. Only a prefix is removed from the title.
#[must_use]
pub fn detect_project(mut ex: Extraction, projects: &[Project]) -> Extraction {
    for project in projects {
        let prefix = word_pattern(r"^\s*{}(?:\s*:|\s+-)\s*", &project.simple_key)
            .and_then(|re| re.find(&ex.raw).map(|m| m.range()));
        if let Some(span) = prefix {
            ex.project_key = Some(project.simple_key.clone());
            ex.project_ref = Some(project.remote_list_id.clone());
            ex.consumed.push(span);
            return ex;
        }
    }

    for project in projects {
        let mentioned = word_pattern(r"\b{}\b", &project.simple_key)
            .is_some_and(|re| re.is_match(&ex.raw));
        if mentioned {
            ex.project_key = Some(project.simple_key.clone());
            ex.project_ref = Some(project.remote_list_id.clone());
            return ex;
        }
    }
    ex
}

/// Pass 5: tag every job type with a keyword stem in the message.
#[must_use]
pub fn tag_job_types(mut ex: Extraction, job_types: &[JobType]) -> Extraction {
    for job_type in job_types {
        if job_type.matches(&ex.lowered) {
            ex.tags.insert(job_type.name.clone());
        }
    }
    ex
}

/// Pass 6: remove consumed phrases and filler, falling back to the raw text.
#[must_use]
pub fn clean_title(mut ex: Extraction) -> Extraction {
    let stripped = remove_spans(&ex.raw, &ex.consumed);
    let without_verb = LEADING_VERB.replace(&stripped, "");
    let collapsed = WHITESPACE.replace_all(&without_verb, " ");
    let tightened = SPACE_BEFORE_PUNCT.replace_all(&collapsed, "$1");
    let deduped = REPEATED_COMMAS.replace_all(&tightened, ",");
    let title = deduped
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | ';' | '-'))
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | ';' | '-'))
        .to_owned();

    ex.title = if title.is_empty() { ex.raw.clone() } else { title };
    ex
}

/// Pass 7: prefix `[Name] ` unless the name already appears in the title.
#[must_use]
pub fn display_title(mut ex: Extraction) -> Extraction {
    ex.display_title = compose_display_title(&ex.title, ex.assignee.as_deref());
    ex
}

/// `[Name] title` unless `name` already occurs in `title` (case-insensitive).
#[must_use]
pub fn compose_display_title(title: &str, assignee: Option<&str>) -> String {
    match assignee {
        Some(name) if !title.to_lowercase().contains(&name.to_lowercase()) => {
            format!("[{name}] {title}")
        }
        _ => title.to_owned(),
    }
}

/// Copy `text` without the given byte spans (which may overlap).
fn remove_spans(text: &str, spans: &[Range<usize>]) -> String {
    let mut sorted: Vec<Range<usize>> = spans
        .iter()
        .filter(|s| s.start < s.end && s.end <= text.len())
        .cloned()
        .collect();
    sorted.sort_by_key(|s| s.start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in sorted {
        if span.start > cursor {
            out.push_str(&text[cursor..span.start]);
            out.push(' ');
        }
        cursor = cursor.max(span.end);
    }
    if cursor < text.len() {
        out.push_str(&text[cursor..]);
    }
    out
}
