//! Unit tests for daily and weekly summaries.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use site_taskbot::models::project::RemoteProject;
use site_taskbot::models::task::{CreatedVia, Priority, StoredTask, TaskStatus};
use site_taskbot::reports::{
    daily_summary, format_daily_sms, format_tomorrow_sms, week_start, weekly_summary,
    TOMORROW_MAX_CHARS,
};
use site_taskbot::sync::{sync, AliasTable};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().expect("timestamp")
}

fn task(name: &str, created: DateTime<Utc>) -> StoredTask {
    StoredTask {
        id: format!("local-{name}"),
        remote_task_id: format!("remote-{name}"),
        name: name.into(),
        description: String::new(),
        priority: Priority::Normal,
        status: TaskStatus::Open,
        due_date: None,
        project_list_id: Some("901".into()),
        assignee: None,
        created_at: created,
        completed_at: None,
        created_via: CreatedVia::Sms,
        created_by_phone: None,
        has_photo: false,
    }
}

fn aliases() -> AliasTable {
    sync(
        AliasTable::default(),
        &[RemoteProject::new("901", "Oak Street", "Jobs")],
        Utc::now(),
    )
    .0
}

/// Wednesday 2026-10-14.
fn fixtures() -> Vec<StoredTask> {
    let mut created_today = task("frame wall", at(2026, 10, 14, 9));
    created_today.due_date = Some(date(2026, 10, 15));

    let mut completed_today = task("pour slab", at(2026, 10, 12, 9));
    completed_today.status = TaskStatus::Complete;
    completed_today.completed_at = Some(at(2026, 10, 14, 15));
    completed_today.assignee = Some("Tom".into());

    let mut overdue_long = task("fix leak", at(2026, 10, 1, 9));
    overdue_long.due_date = Some(date(2026, 10, 4));
    let mut overdue_short = task("order rebar", at(2026, 10, 10, 9));
    overdue_short.due_date = Some(date(2026, 10, 13));

    let mut completed_monday = task("grade lot", at(2026, 10, 12, 8));
    completed_monday.status = TaskStatus::Complete;
    completed_monday.completed_at = Some(at(2026, 10, 12, 17));
    completed_monday.assignee = Some("Tom".into());
    completed_monday.project_list_id = None;

    vec![created_today, completed_today, overdue_long, overdue_short, completed_monday]
}

#[test]
fn daily_counts_created_completed_overdue_tomorrow() {
    let today = date(2026, 10, 14);
    let summary = daily_summary(&fixtures(), today, today, &Utc, &aliases());

    assert_eq!(summary.created_count, 1);
    assert_eq!(summary.created_tasks[0].detail, "Oak Street");
    assert_eq!(summary.completed_count, 1);
    assert_eq!(summary.completed_tasks[0].detail, "Tom");
    assert_eq!(summary.overdue_count, 2);
    assert_eq!(summary.overdue_tasks[0].name, "fix leak");
    assert_eq!(summary.overdue_tasks[0].days_overdue, 10);
    assert_eq!(summary.overdue_tasks[1].days_overdue, 1);
    assert_eq!(summary.tomorrow_count, 1);
    assert_eq!(summary.tomorrow_tasks[0].detail, "TBD");
}

#[test]
fn weekly_is_monday_based() {
    let today = date(2026, 10, 14);
    assert_eq!(week_start(today), date(2026, 10, 12));
    assert_eq!(week_start(date(2026, 10, 12)), date(2026, 10, 12));
    assert_eq!(week_start(date(2026, 10, 18)), date(2026, 10, 12));

    let summary = weekly_summary(&fixtures(), today, &Utc, &aliases());
    assert_eq!(summary.week_end, date(2026, 10, 18));
    assert_eq!(summary.total_created, 3);
    assert_eq!(summary.total_completed, 2);
    assert_eq!(summary.completion_rate, "67%");
    assert_eq!(summary.top_performers, vec![("Tom".to_owned(), 2)]);
    assert_eq!(summary.project_stats["Oak Street"].created, 2);
    assert_eq!(summary.project_stats["No project"].completed, 1);
}

#[test]
fn empty_week_has_no_rate() {
    let summary = weekly_summary(&[], date(2026, 10, 14), &Utc, &AliasTable::default());
    assert_eq!(summary.completion_rate, "N/A");
    assert!(summary.top_performers.is_empty());
}

#[test]
fn daily_sms_lists_overdue() {
    let today = date(2026, 10, 14);
    let text = format_daily_sms(&daily_summary(&fixtures(), today, today, &Utc, &aliases()));
    assert!(text.starts_with("📊 Daily Report Oct 14"));
    assert!(text.contains("⚠️ Overdue: 2"));
    assert!(text.contains("• fix leak (10d)"));
}

#[test]
fn tomorrow_sms_is_capped() {
    let today = date(2026, 10, 14);
    let mut tasks = Vec::new();
    for n in 0..8 {
        let mut t = task(&format!("install the long window trim set number {n}"), at(2026, 10, 13, 9));
        t.due_date = Some(date(2026, 10, 15));
        t.assignee = Some("Sarah".into());
        tasks.push(t);
    }
    let summary = daily_summary(&tasks, today, today, &Utc, &aliases());
    let text = format_tomorrow_sms(&summary);
    assert!(text.chars().count() <= TOMORROW_MAX_CHARS);
    assert!(text.ends_with("..."));

    let none = format_tomorrow_sms(&daily_summary(&[], today, today, &Utc, &aliases()));
    assert_eq!(none, "📅 Nothing due tomorrow.");
}
