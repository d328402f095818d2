//! Due-date resolution from relative day words.

use std::ops::Range;
use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;

use super::literal;
use crate::lexicon::weekday_from_name;

/// Day words in precedence order; the first one present wins.
const DAY_WORDS: [&str; 9] = [
    "tomorrow",
    "today",
    "friday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "saturday",
    "sunday",
];

static DAY_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    DAY_WORDS
        .iter()
        .map(|word| {
            (
                *word,
                literal(&format!(r"(?i)(?:\b(?:by|on|due|this|next|until)\s+)?\b{word}\b")),
            )
        })
        .collect()
});

/// A resolved due date and the phrase that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueDateMatch {
    /// Resolved calendar date.
    pub date: NaiveDate,
    /// Byte span of the phrase (including `by`/`on`/`due`) in the searched text.
    pub span: Range<usize>,
}

/// Resolve the first day word in `text` relative to `today`.
#[must_use]
pub fn resolve_due_date(text: &str, today: NaiveDate) -> Option<DueDateMatch> {
    DAY_PATTERNS.iter().find_map(|(word, pattern)| {
        let found = pattern.find(text)?;
        let date = match *word {
            "tomorrow" => today.checked_add_days(Days::new(1))?,
            "today" => today,
            day => next_weekday(today, weekday_from_name(day)?),
        };
        Some(DueDateMatch {
            date,
            span: found.range(),
        })
    })
}

/// The next occurrence of `target` strictly after `today` (one to seven days out).
#[must_use]
pub fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let current = today.weekday().num_days_from_monday();
    let wanted = target.num_days_from_monday();
    let mut ahead = (7 + wanted - current) % 7;
    if ahead == 0 {
        ahead = 7;
    }
    today + Days::new(u64::from(ahead))
}
