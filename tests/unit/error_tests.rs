//! Unit tests for error display and user-facing wording.

use site_taskbot::AppError;

#[test]
fn display_prefixes_the_kind() {
    assert_eq!(
        AppError::InvalidCommand("missing name".into()).to_string(),
        "invalid command: missing name"
    );
    assert_eq!(AppError::NotFound("project `oak`".into()).to_string(), "not found: project `oak`");
    assert_eq!(AppError::RemoteTimeout("clickup".into()).to_string(), "remote timeout: clickup");
    assert_eq!(AppError::Db("locked".into()).to_string(), "db: locked");
}

#[test]
fn user_messages_never_leak_internals() {
    let db = AppError::Db("UNIQUE constraint failed: project.remote_list_id".into());
    assert!(!db.user_message().contains("UNIQUE"));
    assert!(db.user_message().starts_with("⚠️"));

    let rejected = AppError::RemoteRejected("status 401 Unauthorized".into());
    assert_eq!(
        rejected.user_message(),
        "❌ ClickUp rejected the request. Task not created."
    );
}

#[test]
fn user_messages_carry_actionable_detail() {
    assert_eq!(
        AppError::InvalidCommand("Usage: done <task id>".into()).user_message(),
        "❓ Usage: done <task id>"
    );
    assert!(AppError::NotConfigured("ClickUp API key".into())
        .user_message()
        .contains("ClickUp API key"));
    assert!(AppError::RemoteTimeout(String::new())
        .user_message()
        .starts_with("⏳"));
}

#[test]
fn only_remote_failures_are_remote() {
    assert!(AppError::RemoteTimeout(String::new()).is_remote());
    assert!(AppError::RemoteRejected(String::new()).is_remote());
    assert!(!AppError::NotConfigured(String::new()).is_remote());
    assert!(!AppError::ModelParseFailure(String::new()).is_remote());
}

#[test]
fn conversions_pick_the_right_variant() {
    let toml_err = toml::from_str::<toml::Value>("= broken").expect_err("bad toml");
    assert!(matches!(AppError::from(toml_err), AppError::Config(_)));

    let json_err = serde_json::from_str::<serde_json::Value>("{").expect_err("bad json");
    assert!(matches!(AppError::from(json_err), AppError::ModelParseFailure(_)));

    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(AppError::from(io_err), AppError::Io(_)));
}
