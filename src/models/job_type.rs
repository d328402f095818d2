//! Job-type categories used to tag created tasks.

use serde::{Deserialize, Serialize};

/// A trade category with the keyword stems that identify it.
///
/// Job types are purely advisory: they add tags but never route a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobType {
    /// Short identifier (e.g. `plumbing`).
    pub key: String,
    /// Display name used as the tag value (e.g. `Plumbing`).
    pub name: String,
    /// Lowercase keyword stems matched as substrings (e.g. `excavat`).
    pub keywords: Vec<String>,
}

impl JobType {
    fn new(key: &str, name: &str, keywords: &[&str]) -> Self {
        Self {
            key: key.to_owned(),
            name: name.to_owned(),
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
        }
    }

    /// Whether any keyword stem occurs in the already-lowercased `text`.
    #[must_use]
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords
            .iter()
            .any(|kw| !kw.is_empty() && lowered.contains(kw.as_str()))
    }
}

/// Built-in job types.
#[must_use]
pub fn default_job_types() -> Vec<JobType> {
    vec![
        JobType::new(
            "plumbing",
            "Plumbing",
            &["plumb", "pipe", "water", "leak", "faucet", "valve"],
        ),
        JobType::new(
            "electrical",
            "Electrical",
            &["electric", "wire", "power", "outlet", "breaker", "panel"],
        ),
        JobType::new(
            "grading",
            "Grading",
            &["grade", "level", "excavat", "dirt", "soil", "slope"],
        ),
        JobType::new(
            "concrete",
            "Concrete",
            &["concrete", "pour", "slab", "foundation", "cement"],
        ),
        JobType::new("framing", "Framing", &["frame", "wall", "roof", "truss", "stud"]),
        JobType::new(
            "safety",
            "Safety",
            &["safety", "danger", "hazard", "violation", "osha"],
        ),
        JobType::new(
            "inspection",
            "Inspection",
            &["inspect", "review", "check", "permit"],
        ),
    ]
}
