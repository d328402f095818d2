//! Daily and weekly summaries over the local task mirror.
//!
//! Builders are pure: they take the working set returned by
//! [`TaskRepo::list_relevant`](crate::persistence::task_repo::TaskRepo::list_relevant),
//! a reference date and a time zone for bucketing timestamps into days.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::models::report::{DailySummary, OverdueLine, ProjectStats, ReportLine, WeeklySummary};
use crate::models::task::{StoredTask, TaskStatus};
use crate::sync::AliasTable;

/// Overdue tasks listed individually in a daily summary.
pub const OVERDUE_LISTED: usize = 5;
/// Performers listed in a weekly summary.
pub const TOP_PERFORMERS: usize = 3;
/// Task lines in the `tomorrow` SMS reply.
pub const TOMORROW_LINES: usize = 5;
/// Length cap for the `tomorrow` SMS reply.
pub const TOMORROW_MAX_CHARS: usize = 140;

const NO_PROJECT: &str = "No project";
const UNASSIGNED: &str = "Unassigned";

/// UTC instant of local midnight starting `date` in `tz`.
#[must_use]
pub fn day_start_utc<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map_or_else(|| naive.and_utc(), |local| local.with_timezone(&Utc))
}

/// Monday of the week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

fn local_date<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}

fn project_name(task: &StoredTask, projects: &AliasTable) -> String {
    task.project_list_id
        .as_deref()
        .and_then(|id| projects.display_name_for(id))
        .unwrap_or(NO_PROJECT)
        .to_owned()
}

/// Summary of `date`, with overdue computed relative to `today`.
#[must_use]
pub fn daily_summary<Tz: TimeZone>(
    tasks: &[StoredTask],
    date: NaiveDate,
    today: NaiveDate,
    tz: &Tz,
    projects: &AliasTable,
) -> DailySummary {
    let created_tasks: Vec<ReportLine> = tasks
        .iter()
        .filter(|t| local_date(t.created_at, tz) == date)
        .map(|t| ReportLine {
            name: t.name.clone(),
            detail: project_name(t, projects),
        })
        .collect();

    let completed_tasks: Vec<ReportLine> = tasks
        .iter()
        .filter(|t| t.completed_at.is_some_and(|at| local_date(at, tz) == date))
        .map(|t| ReportLine {
            name: t.name.clone(),
            detail: t.assignee.clone().unwrap_or_else(|| UNASSIGNED.into()),
        })
        .collect();

    let mut overdue: Vec<OverdueLine> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Open)
        .filter_map(|t| {
            let due = t.due_date.filter(|due| *due < today)?;
            Some(OverdueLine {
                name: t.name.clone(),
                days_overdue: (today - due).num_days(),
            })
        })
        .collect();
    overdue.sort_by(|a, b| b.days_overdue.cmp(&a.days_overdue).then_with(|| a.name.cmp(&b.name)));
    let overdue_count = overdue.len();
    overdue.truncate(OVERDUE_LISTED);

    let tomorrow = date.checked_add_days(Days::new(1));
    let tomorrow_tasks: Vec<ReportLine> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Open && t.due_date.is_some() && t.due_date == tomorrow)
        .map(|t| ReportLine {
            name: t.name.clone(),
            detail: t.assignee.clone().unwrap_or_else(|| "TBD".into()),
        })
        .collect();

    DailySummary {
        date,
        created_count: created_tasks.len(),
        created_tasks,
        completed_count: completed_tasks.len(),
        completed_tasks,
        overdue_count,
        overdue_tasks: overdue,
        tomorrow_count: tomorrow_tasks.len(),
        tomorrow_tasks,
    }
}

/// Summary of the Monday-to-Sunday week containing `today`.
#[must_use]
pub fn weekly_summary<Tz: TimeZone>(
    tasks: &[StoredTask],
    today: NaiveDate,
    tz: &Tz,
    projects: &AliasTable,
) -> WeeklySummary {
    let start = week_start(today);
    let end = start + Days::new(6);
    let in_week = |d: NaiveDate| d >= start && d <= end;

    let mut project_stats: BTreeMap<String, ProjectStats> = BTreeMap::new();
    let mut performers: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_created = 0;
    let mut total_completed = 0;

    for task in tasks {
        if in_week(local_date(task.created_at, tz)) {
            total_created += 1;
            project_stats
                .entry(project_name(task, projects))
                .or_default()
                .created += 1;
        }
        if task.completed_at.is_some_and(|at| in_week(local_date(at, tz))) {
            total_completed += 1;
            project_stats
                .entry(project_name(task, projects))
                .or_default()
                .completed += 1;
            if let Some(assignee) = &task.assignee {
                *performers.entry(assignee.clone()).or_default() += 1;
            }
        }
    }

    let mut top_performers: Vec<(String, usize)> = performers.into_iter().collect();
    top_performers.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_performers.truncate(TOP_PERFORMERS);

    WeeklySummary {
        week_start: start,
        week_end: end,
        total_created,
        total_completed,
        completion_rate: completion_rate(total_created, total_completed),
        project_stats,
        top_performers,
    }
}

/// `"NN%"` of completed over created, or `"N/A"` when nothing was created.
#[must_use]
pub fn completion_rate(created: usize, completed: usize) -> String {
    if created == 0 {
        return "N/A".into();
    }
    let pct = (completed * 100 + created / 2) / created;
    format!("{pct}%")
}

/// SMS rendering of a daily summary.
#[must_use]
pub fn format_daily_sms(summary: &DailySummary) -> String {
    let mut lines = vec![
        format!("📊 Daily Report {}", summary.date.format("%b %d")),
        format!("✅ Completed: {}", summary.completed_count),
        format!("📝 Created: {}", summary.created_count),
        format!("⚠️ Overdue: {}", summary.overdue_count),
        format!("📅 Due tomorrow: {}", summary.tomorrow_count),
    ];
    if !summary.overdue_tasks.is_empty() {
        lines.push("Overdue:".into());
        lines.extend(
            summary
                .overdue_tasks
                .iter()
                .map(|t| format!("• {} ({}d)", t.name, t.days_overdue)),
        );
    }
    lines.join("\n")
}

/// SMS rendering of a weekly summary.
#[must_use]
pub fn format_weekly_sms(summary: &WeeklySummary) -> String {
    let mut lines = vec![
        format!(
            "📈 Week of {} - {}",
            summary.week_start.format("%b %d"),
            summary.week_end.format("%b %d")
        ),
        format!("📝 Created: {}", summary.total_created),
        format!("✅ Completed: {}", summary.total_completed),
        format!("🎯 Completion: {}", summary.completion_rate),
    ];
    if !summary.top_performers.is_empty() {
        lines.push("🏆 Top:".into());
        lines.extend(
            summary
                .top_performers
                .iter()
                .map(|(name, count)| format!("• {name}: {count}")),
        );
    }
    lines.join("\n")
}

/// SMS rendering of the tasks due tomorrow.
#[must_use]
pub fn format_tomorrow_sms(summary: &DailySummary) -> String {
    if summary.tomorrow_tasks.is_empty() {
        return "📅 Nothing due tomorrow.".into();
    }
    let mut lines = vec![format!("📅 Due tomorrow ({}):", summary.tomorrow_count)];
    lines.extend(
        summary
            .tomorrow_tasks
            .iter()
            .take(TOMORROW_LINES)
            .map(|t| format!("• {} - {}", t.name, t.detail)),
    );
    truncate_message(&lines.join("\n"), TOMORROW_MAX_CHARS)
}

/// Cut `text` to at most `max` characters, ending with `...` when cut.
#[must_use]
pub fn truncate_message(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}
