//! REST surface tests against a live router on an ephemeral port.

use reqwest::StatusCode;
use serde_json::{json, Value};

use super::test_helpers::{harness, spawn_server, Setup};

#[tokio::test]
async fn health_reports_configuration() {
    let h = harness(Setup {
        twilio: false,
        ..Setup::default()
    })
    .await;
    let (base, ct) = spawn_server(h.state.clone()).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["clickup_configured"], true);
    assert_eq!(body["openai_configured"], false);
    assert_eq!(body["twilio_configured"], false);
    assert_eq!(body["projects"], 2);
    assert_eq!(body["team_members"], 4);
    ct.cancel();
}

#[tokio::test]
async fn parse_has_no_side_effects() {
    let h = harness(Setup::default()).await;
    let (base, ct) = spawn_server(h.state.clone()).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{base}/api/parse"))
        .json(&json!({"message": "Mike needs to fix the leak"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["command"]["kind"], "task_create");
    assert_eq!(body["record"]["display_title"], "[Mike] fix the leak");

    let query: Value = client
        .post(format!("{base}/api/parse"))
        .json(&json!({"message": "status"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(query["command"]["kind"], "query");
    assert!(query.get("record").is_none());

    assert!(h.remote.created().is_empty());
    ct.cancel();
}

#[tokio::test]
async fn parse_rejects_nameless_project() {
    let h = harness(Setup::default()).await;
    let (base, ct) = spawn_server(h.state.clone()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/parse"))
        .json(&json!({"message": "create project"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    ct.cancel();
}

#[tokio::test]
async fn tasks_endpoint_creates_without_classifying() {
    let h = harness(Setup::default()).await;
    let (base, ct) = spawn_server(h.state.clone()).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{base}/api/tasks"))
        .json(&json!({"message": "status of the pour"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["command_type"], "task");
    assert_eq!(body["task_id"], "t1");

    let empty = client
        .post(format!("{base}/api/tasks"))
        .json(&json!({"message": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    ct.cancel();
}

#[tokio::test]
async fn chat_returns_reply_json() {
    let h = harness(Setup::default()).await;
    let (base, ct) = spawn_server(h.state.clone()).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{base}/api/chat"))
        .json(&json!({"message": "help"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["command_type"], "help");
    assert!(body["message"].as_str().unwrap().starts_with("📋 Site Taskbot"));
    ct.cancel();
}

#[tokio::test]
async fn project_sync_list_and_remove() {
    let h = harness(Setup::default()).await;
    h.remote
        .projects
        .lock()
        .unwrap()
        .push(site_taskbot::models::project::RemoteProject::new("905", "Oak Hollow", "Residential"));
    let (base, ct) = spawn_server(h.state.clone()).await;
    let client = reqwest::Client::new();

    let report: Value = client
        .post(format!("{base}/api/projects/sync"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["added"], json!(["oak1"]));
    assert_eq!(report["refreshed"], json!(["oak", "maple"]));

    let projects: Vec<Value> = client
        .get(format!("{base}/api/projects"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(projects.len(), 3);

    let removed = client
        .delete(format!("{base}/api/projects/OAK1"))
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status(), StatusCode::OK);

    let missing = client
        .delete(format!("{base}/api/projects/pine"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    assert_eq!(h.state.projects.snapshot().len(), 2);
    ct.cancel();
}

#[tokio::test]
async fn sync_without_clickup_is_unavailable() {
    let h = harness(Setup {
        clickup: false,
        ..Setup::default()
    })
    .await;
    let (base, ct) = spawn_server(h.state.clone()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/projects/sync"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    ct.cancel();
}

#[tokio::test]
async fn team_members_can_be_added_and_removed() {
    let h = harness(Setup::default()).await;
    let (base, ct) = spawn_server(h.state.clone()).await;
    let client = reqwest::Client::new();

    let added: Value = client
        .post(format!("{base}/api/team"))
        .json(&json!({"key": "Dana", "name": "Dana", "phone": "+15550109"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(added["key"], "dana");
    assert_eq!(added["role"], "General");

    let roster: Vec<Value> = client
        .get(format!("{base}/api/team"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(roster.len(), 5);

    let parsed: Value = client
        .post(format!("{base}/api/parse"))
        .json(&json!({"message": "Dana needs to sweep the deck"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(parsed["record"]["assignee"], "Dana");

    let removed = client
        .delete(format!("{base}/api/team/dana"))
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status(), StatusCode::OK);
    let again = client
        .delete(format!("{base}/api/team/dana"))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    let blank = client
        .post(format!("{base}/api/team"))
        .json(&json!({"key": " ", "name": "Nobody"}))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    ct.cancel();
}

#[tokio::test]
async fn reports_are_served_as_json() {
    let h = harness(Setup::default()).await;
    let (base, ct) = spawn_server(h.state.clone()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/api/tasks"))
        .json(&json!({"message": "Mike needs to fix the leak"}))
        .send()
        .await
        .unwrap();

    let daily: Value = client
        .get(format!("{base}/api/report/daily"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(daily["created_count"], 1);

    let weekly: Value = client
        .get(format!("{base}/api/report/weekly"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(weekly["total_created"], 1);

    let bad = client
        .get(format!("{base}/api/report/daily?date=14-10-2026"))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    ct.cancel();
}

#[tokio::test]
async fn daily_reports_go_to_managers() {
    let h = harness(Setup {
        manager_phones: vec!["+15550001".into(), "+15550002".into()],
        ..Setup::default()
    })
    .await;
    let (base, ct) = spawn_server(h.state.clone()).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{base}/api/send-daily-reports"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["sent"], json!(["+15550001", "+15550002"]));

    let sent = h.sms.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].1.starts_with("📊 Daily Report"));
    ct.cancel();
}

#[tokio::test]
async fn daily_reports_need_twilio() {
    let h = harness(Setup {
        twilio: false,
        manager_phones: vec!["+15550001".into()],
        ..Setup::default()
    })
    .await;
    let (base, ct) = spawn_server(h.state.clone()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/send-daily-reports"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    ct.cancel();
}
