//! Unit tests for the legacy settings import and default seeding.

use std::sync::Arc;

use site_taskbot::persistence::db;
use site_taskbot::persistence::member_repo::MemberRepo;
use site_taskbot::persistence::project_repo::ProjectRepo;
use site_taskbot::persistence::settings_import::{bootstrap, import, parse_legacy};
use site_taskbot::AppError;

const LEGACY: &str = r#"{
  "team_members": {
    "Mike": {"name": "Mike", "role": "Plumbing", "phone": "+15550101"},
    "dana": {"name": "Dana"}
  },
  "projects": {
    "oak": {"list_id": "901", "name": "Oak Street", "space": "Residential"}
  }
}"#;

async fn repos() -> (MemberRepo, ProjectRepo) {
    let pool = Arc::new(db::connect_memory().await.expect("db"));
    (MemberRepo::new(Arc::clone(&pool)), ProjectRepo::new(pool))
}

#[test]
fn parse_fills_defaults() {
    let settings = parse_legacy(LEGACY).expect("valid");
    assert_eq!(settings.team_members["dana"].role, "General");
    assert!(settings.team_members["dana"].phone.is_none());
    assert_eq!(settings.projects["oak"].list_id, "901");

    let empty = parse_legacy("{}").expect("empty document");
    assert!(empty.team_members.is_empty());
}

#[test]
fn malformed_document_is_config_error() {
    let err = parse_legacy("{\"team_members\": [").expect_err("malformed");
    assert!(matches!(err, AppError::Config(_)));
}

#[tokio::test]
async fn import_inserts_only_missing_entries() {
    let (members, projects) = repos().await;
    let settings = parse_legacy(LEGACY).expect("valid");

    let first = import(&settings, &members, &projects).await.expect("import");
    assert_eq!(first.members, 2);
    assert_eq!(first.projects, 1);

    let again = import(&settings, &members, &projects).await.expect("re-import");
    assert_eq!(again.members, 0);
    assert_eq!(again.projects, 0);

    let stored = members.list().await.expect("list");
    let mike = stored.iter().find(|m| m.key == "mike").expect("key lowercased");
    assert_eq!(mike.phone.as_deref(), Some("+15550101"));
}

#[tokio::test]
async fn bootstrap_without_file_seeds_defaults() {
    let (members, projects) = repos().await;
    let temp = tempfile::tempdir().expect("tempdir");

    let summary = bootstrap(&temp.path().join("settings.json"), &members, &projects)
        .await
        .expect("bootstrap");
    assert!(summary.seeded_defaults);
    assert_eq!(members.count().await.expect("count"), 4);

    let again = bootstrap(&temp.path().join("settings.json"), &members, &projects)
        .await
        .expect("bootstrap");
    assert!(!again.seeded_defaults);
}

#[tokio::test]
async fn bootstrap_imports_file_without_seeding() {
    let (members, projects) = repos().await;
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("settings.json");
    std::fs::write(&path, LEGACY).expect("write");

    let summary = bootstrap(&path, &members, &projects).await.expect("bootstrap");
    assert_eq!(summary.members, 2);
    assert!(!summary.seeded_defaults);
    assert_eq!(projects.list().await.expect("list")[0].simple_key, "oak");
}

#[tokio::test]
async fn bootstrap_skips_malformed_file() {
    let (members, projects) = repos().await;
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("settings.json");
    std::fs::write(&path, "not json").expect("write");

    let summary = bootstrap(&path, &members, &projects).await.expect("still starts");
    assert_eq!(summary.members, 0);
    assert!(summary.seeded_defaults);
}
