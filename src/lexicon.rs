//! Read-mostly vocabulary used by the parser: roster, job types, weekdays.
//!
//! [`LexiconStore`] is injected into every component that needs it. Readers
//! take a cheap [`Arc`] snapshot; writers replace the snapshot wholesale, so
//! an in-flight parse never observes a half-edited roster.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Weekday;

use crate::models::job_type::JobType;
use crate::models::member::TeamMember;

/// Weekday names recognised in due-date phrases.
pub const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// Look up a weekday by its lowercase English name.
#[must_use]
pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    let lowered = name.trim().to_lowercase();
    WEEKDAYS
        .iter()
        .find(|(n, _)| *n == lowered)
        .map(|(_, day)| *day)
}

/// Find a member by key or name, case-insensitively. Earlier roster entries win.
#[must_use]
pub fn member_by_alias<'a>(roster: &'a [TeamMember], alias: &str) -> Option<&'a TeamMember> {
    let wanted = alias.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    roster
        .iter()
        .find(|m| m.key == wanted || m.name.to_lowercase() == wanted)
}

/// Canonical name for `alias`, or the trimmed alias when it is not on the roster.
#[must_use]
pub fn canonical_name(roster: &[TeamMember], alias: &str) -> String {
    member_by_alias(roster, alias).map_or_else(|| alias.trim().to_owned(), |m| m.name.clone())
}

/// An immutable snapshot of roster and job types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    /// Team members in assignment-precedence order.
    pub roster: Vec<TeamMember>,
    /// Job-type categories.
    pub job_types: Vec<JobType>,
}

impl Lexicon {
    /// Build a snapshot.
    #[must_use]
    pub fn new(roster: Vec<TeamMember>, job_types: Vec<JobType>) -> Self {
        Self { roster, job_types }
    }
}

/// Lock-guarded holder of the current [`Lexicon`] snapshot.
#[derive(Debug, Default)]
pub struct LexiconStore {
    current: RwLock<Arc<Lexicon>>,
}

impl LexiconStore {
    /// Create a store seeded with `lexicon`.
    #[must_use]
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            current: RwLock::new(Arc::new(lexicon)),
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Lexicon> {
        Arc::clone(
            &self
                .current
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Insert or replace a member by key.
    pub fn upsert_member(&self, member: TeamMember) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut roster = guard.roster.clone();
        if let Some(existing) = roster.iter_mut().find(|m| m.key == member.key) {
            *existing = member;
        } else {
            roster.push(member);
        }
        *guard = Arc::new(Lexicon::new(roster, guard.job_types.clone()));
    }

    /// Remove a member by key. Returns whether a member was removed.
    pub fn remove_member(&self, key: &str) -> bool {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let before = guard.roster.len();
        let roster: Vec<TeamMember> = guard
            .roster
            .iter()
            .filter(|m| m.key != key)
            .cloned()
            .collect();
        let removed = roster.len() != before;
        *guard = Arc::new(Lexicon::new(roster, guard.job_types.clone()));
        removed
    }
}
