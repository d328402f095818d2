//! Twilio webhook tests: TwiML replies, media, voice notes and the reply budget.

use std::sync::Arc;
use std::time::Duration;

use site_taskbot::clients::LanguageModel;

use super::test_helpers::{harness, spawn_server, FakeModel, Setup};

const SENDER: &str = "+15550101";

async fn post_sms(base: &str, fields: &[(&str, &str)]) -> (String, String) {
    let mut form = vec![("From", SENDER)];
    form.extend_from_slice(fields);
    let resp = reqwest::Client::new()
        .post(format!("{base}/sms"))
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    (content_type, resp.text().await.unwrap())
}

#[tokio::test]
async fn help_is_answered_with_twiml() {
    let h = harness(Setup::default()).await;
    let (base, ct) = spawn_server(h.state.clone()).await;

    let (content_type, body) = post_sms(&base, &[("Body", "help")]).await;

    assert_eq!(content_type, "text/xml");
    assert!(body.starts_with("<?xml"));
    assert!(body.contains("<Response><Message>📋 Site Taskbot"));

    let log = h.state.sms_log().recent(5).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].from_number, SENDER);
    assert_eq!(log[0].command_type.as_deref(), Some("help"));
    ct.cancel();
}

#[tokio::test]
async fn task_sms_creates_task_and_logs_exchange() {
    let h = harness(Setup::default()).await;
    let (base, ct) = spawn_server(h.state.clone()).await;

    let (_, body) = post_sms(&base, &[("Body", "Mike needs to fix the leak")]).await;

    assert!(body.contains("✅ Task created: [Mike] fix the leak"));
    assert_eq!(h.remote.created().len(), 1);
    let log = h.state.sms_log().recent(5).await.unwrap();
    assert_eq!(log[0].message, "Mike needs to fix the leak");
    assert!(!log[0].has_media);
    ct.cancel();
}

#[tokio::test]
async fn photo_is_attached_to_the_task() {
    let h = harness(Setup::default()).await;
    let (base, ct) = spawn_server(h.state.clone()).await;

    let (_, body) = post_sms(
        &base,
        &[
            ("Body", "Tom should grade the east lot"),
            ("NumMedia", "1"),
            ("MediaUrl0", "https://media.example/photo1"),
            ("MediaContentType0", "image/jpeg"),
        ],
    )
    .await;

    assert!(body.contains("📷 Photo attached"));
    assert_eq!(h.remote.attachments.lock().unwrap().len(), 1);
    assert!(h.state.sms_log().recent(1).await.unwrap()[0].has_media);
    ct.cancel();
}

#[tokio::test]
async fn voice_note_is_transcribed_into_a_task() {
    let model: Arc<dyn LanguageModel> = Arc::new(FakeModel {
        transcript: "Tom should grade the east lot".into(),
    });
    let h = harness(Setup {
        model: Some(model),
        ..Setup::default()
    })
    .await;
    let (base, ct) = spawn_server(h.state.clone()).await;

    let (_, body) = post_sms(
        &base,
        &[
            ("Body", ""),
            ("NumMedia", "1"),
            ("MediaUrl0", "https://media.example/voice1"),
            ("MediaContentType0", "audio/ogg"),
        ],
    )
    .await;

    assert!(body.contains("[Tom] grade the east lot"), "{body}");
    let created = h.remote.created();
    assert_eq!(created.len(), 1);
    assert!(h.remote.attachments.lock().unwrap().is_empty());
    ct.cancel();
}

#[tokio::test]
async fn voice_note_without_model_explains_itself() {
    let h = harness(Setup::default()).await;
    let (base, ct) = spawn_server(h.state.clone()).await;

    let (_, body) = post_sms(
        &base,
        &[
            ("NumMedia", "1"),
            ("MediaUrl0", "https://media.example/voice1"),
            ("MediaContentType0", "audio/ogg"),
        ],
    )
    .await;

    assert!(body.contains("Feature unavailable"));
    assert!(h.remote.created().is_empty());
    ct.cancel();
}

#[tokio::test]
async fn slow_clickup_gets_provisional_reply_then_follow_up() {
    let h = harness(Setup {
        sms_reply_seconds: 1,
        ..Setup::default()
    })
    .await;
    *h.remote.create_delay.lock().unwrap() = Some(Duration::from_secs(2));
    let (base, ct) = spawn_server(h.state.clone()).await;

    let (_, body) = post_sms(&base, &[("Body", "Mike needs to fix the leak")]).await;
    assert!(body.contains("still processing"), "{body}");
    assert!(h.sms.sent().is_empty());

    let mut follow_up = None;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if let Some(sent) = h.sms.sent().into_iter().next() {
            follow_up = Some(sent);
            break;
        }
    }
    let (to, text) = follow_up.expect("follow-up sms");
    assert_eq!(to, SENDER);
    assert!(text.starts_with("✅ Task created: [Mike] fix the leak"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let log = h.state.sms_log().recent(5).await.unwrap();
    let kinds: Vec<Option<&str>> = log.iter().map(|e| e.command_type.as_deref()).collect();
    assert!(kinds.contains(&Some("processing")));
    assert!(kinds.contains(&Some("task")));
    ct.cancel();
}
