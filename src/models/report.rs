//! Daily and weekly report summaries built from the local task mirror.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A task line in a report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportLine {
    /// Task display name.
    pub name: String,
    /// Project name, assignee, or `TBD` depending on the section.
    pub detail: String,
}

/// An overdue task with its lateness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverdueLine {
    /// Task display name.
    pub name: String,
    /// Whole days past the due date.
    pub days_overdue: i64,
}

/// Summary of activity for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailySummary {
    /// Day summarised.
    pub date: NaiveDate,
    /// Tasks created that day.
    pub created_count: usize,
    /// Created tasks with their project.
    pub created_tasks: Vec<ReportLine>,
    /// Tasks completed that day.
    pub completed_count: usize,
    /// Completed tasks with their assignee.
    pub completed_tasks: Vec<ReportLine>,
    /// Open tasks past their due date.
    pub overdue_count: usize,
    /// First five overdue tasks.
    pub overdue_tasks: Vec<OverdueLine>,
    /// Open tasks due the following day.
    pub tomorrow_count: usize,
    /// Tasks due the following day with their assignee.
    pub tomorrow_tasks: Vec<ReportLine>,
}

/// Created/completed counters for one project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectStats {
    /// Tasks created in the week.
    pub created: usize,
    /// Tasks completed in the week.
    pub completed: usize,
}

/// Summary of a Monday-to-Sunday week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklySummary {
    /// Monday of the week.
    pub week_start: NaiveDate,
    /// Sunday of the week.
    pub week_end: NaiveDate,
    /// Tasks created during the week.
    pub total_created: usize,
    /// Tasks completed during the week.
    pub total_completed: usize,
    /// Completion percentage (`"75%"`) or `"N/A"` when nothing was created.
    pub completion_rate: String,
    /// Per-project counters keyed by project name.
    pub project_stats: BTreeMap<String, ProjectStats>,
    /// Up to three `(assignee, completions)` pairs, best first.
    pub top_performers: Vec<(String, usize)>,
}
