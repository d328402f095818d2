//! Unit tests for the JSONL audit writer.

use chrono::Utc;
use serde_json::Value;

use site_taskbot::audit::{AuditEntry, AuditEventType, AuditLogger, JsonlAuditWriter};

#[test]
fn new_creates_nested_directory() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path().join("logs").join("audit");
    let _writer = JsonlAuditWriter::new(dir.clone()).expect("writer");
    assert!(dir.is_dir());
}

#[test]
fn entries_append_one_json_object_per_line() {
    let temp = tempfile::tempdir().expect("tempdir");
    let writer = JsonlAuditWriter::new(temp.path().to_path_buf()).expect("writer");

    writer
        .log_entry(
            AuditEntry::new(AuditEventType::TaskCreated)
                .with_channel("sms")
                .with_sender(Some("+15550100".into()))
                .with_task("86abc")
                .with_message("Mike fix the leak"),
        )
        .expect("first");
    writer
        .log_entry(AuditEntry::new(AuditEventType::ProjectRemoved).with_project("oak"))
        .expect("second");

    let path = writer.path_for(Utc::now().date_naive());
    let content = std::fs::read_to_string(&path).expect("log file");
    let lines: Vec<Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event_type"], "task_created");
    assert_eq!(lines[0]["channel"], "sms");
    assert_eq!(lines[0]["task_id"], "86abc");
    assert_eq!(lines[1]["event_type"], "project_removed");
    assert_eq!(lines[1]["project_key"], "oak");
    assert!(lines[1].get("sender").is_none());
}

#[test]
fn file_name_carries_the_date() {
    let temp = tempfile::tempdir().expect("tempdir");
    let writer = JsonlAuditWriter::new(temp.path().to_path_buf()).expect("writer");
    let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 14).expect("date");
    assert_eq!(
        writer.path_for(date),
        temp.path().join("audit-2026-10-14.jsonl")
    );
}
