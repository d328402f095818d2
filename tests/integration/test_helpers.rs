//! Shared fakes and state builders for integration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use site_taskbot::audit::{AuditLogger, JsonlAuditWriter};
use site_taskbot::clients::{
    BoxFuture, LanguageModel, NewRemoteTask, RemoteTask, SmsTransport, TaskService,
};
use site_taskbot::http::router;
use site_taskbot::models::project::RemoteProject;
use site_taskbot::models::task::Attachment;
use site_taskbot::persistence::db;
use site_taskbot::state::{AppState, Collaborators};
use site_taskbot::{AppError, GlobalConfig};

/// In-memory stand-in for the remote task service.
#[derive(Default)]
pub struct FakeTaskService {
    pub projects: Mutex<Vec<RemoteProject>>,
    pub created: Mutex<Vec<(String, NewRemoteTask)>>,
    pub statuses: Mutex<Vec<(String, String)>>,
    pub comments: Mutex<Vec<(String, String)>>,
    pub attachments: Mutex<Vec<String>>,
    pub create_delay: Mutex<Option<Duration>>,
    pub reject_creates: AtomicBool,
    pub reject_attachments: AtomicBool,
    next_id: AtomicUsize,
}

impl FakeTaskService {
    pub fn with_projects(projects: Vec<RemoteProject>) -> Self {
        let fake = Self::default();
        *fake.projects.lock().unwrap() = projects;
        fake
    }

    pub fn created(&self) -> Vec<(String, NewRemoteTask)> {
        self.created.lock().unwrap().clone()
    }

    fn next(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl TaskService for FakeTaskService {
    fn list_projects(&self) -> BoxFuture<'_, Vec<RemoteProject>> {
        Box::pin(async move { Ok(self.projects.lock().unwrap().clone()) })
    }

    fn create_list<'a>(&'a self, name: &'a str) -> BoxFuture<'a, RemoteProject> {
        Box::pin(async move {
            let project = RemoteProject::new(self.next("L-"), name, "Jobs");
            self.projects.lock().unwrap().push(project.clone());
            Ok(project)
        })
    }

    fn create_task<'a>(
        &'a self,
        list_id: &'a str,
        task: &'a NewRemoteTask,
    ) -> BoxFuture<'a, RemoteTask> {
        Box::pin(async move {
            let delay = *self.create_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.reject_creates.load(Ordering::SeqCst) {
                return Err(AppError::RemoteRejected("status 400".into()));
            }
            let id = self.next("t");
            self.created
                .lock()
                .unwrap()
                .push((list_id.to_owned(), task.clone()));
            Ok(RemoteTask {
                url: Some(format!("https://app.clickup.test/t/{id}")),
                id,
                name: task.name.clone(),
                status: Some("to do".into()),
            })
        })
    }

    fn update_task_status<'a>(&'a self, task_id: &'a str, status: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.statuses
                .lock()
                .unwrap()
                .push((task_id.to_owned(), status.to_owned()));
            Ok(())
        })
    }

    fn update_task_description<'a>(
        &'a self,
        task_id: &'a str,
        description: &'a str,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.comments
                .lock()
                .unwrap()
                .push((task_id.to_owned(), description.to_owned()));
            Ok(())
        })
    }

    fn add_attachment<'a>(&'a self, task_id: &'a str, _media: &'a Attachment) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if self.reject_attachments.load(Ordering::SeqCst) {
                return Err(AppError::RemoteRejected("status 413".into()));
            }
            self.attachments.lock().unwrap().push(task_id.to_owned());
            Ok(())
        })
    }

    fn add_comment<'a>(&'a self, task_id: &'a str, text: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.comments
                .lock()
                .unwrap()
                .push((task_id.to_owned(), text.to_owned()));
            Ok(())
        })
    }

    fn list_open_tasks<'a>(&'a self, list_id: &'a str) -> BoxFuture<'a, Vec<RemoteTask>> {
        Box::pin(async move {
            Ok(self
                .created
                .lock()
                .unwrap()
                .iter()
                .enumerate()
                .filter(|(_, (list, _))| list == list_id)
                .map(|(n, (_, task))| RemoteTask {
                    id: format!("open{n}"),
                    name: task.name.clone(),
                    status: Some("to do".into()),
                    url: None,
                })
                .collect())
        })
    }
}

/// Records outbound messages; media downloads return a tiny payload.
#[derive(Default)]
pub struct FakeSms {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl FakeSms {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl SmsTransport for FakeSms {
    fn send_sms<'a>(&'a self, to: &'a str, body: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_owned(), body.to_owned()));
            Ok(())
        })
    }

    fn download_media<'a>(
        &'a self,
        url: &'a str,
        content_type: &'a str,
    ) -> BoxFuture<'a, Attachment> {
        Box::pin(async move {
            Ok(Attachment::new(
                Bytes::from_static(b"\x89PNG"),
                content_type,
                Some(url.to_owned()),
            ))
        })
    }
}

/// A model whose completions always fail and whose transcriptions are fixed.
pub struct FakeModel {
    pub transcript: String,
}

impl LanguageModel for FakeModel {
    fn complete<'a>(&'a self, _system: &'a str, _user: &'a str) -> BoxFuture<'a, String> {
        Box::pin(async { Err(AppError::RemoteRejected("status 503".into())) })
    }

    fn transcribe<'a>(&'a self, _audio: &'a Attachment) -> BoxFuture<'a, String> {
        Box::pin(async move { Ok(self.transcript.clone()) })
    }
}

/// Knobs for [`harness`].
pub struct Setup {
    pub clickup: bool,
    pub twilio: bool,
    pub model: Option<Arc<dyn LanguageModel>>,
    pub sms_reply_seconds: u64,
    pub manager_phones: Vec<String>,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            clickup: true,
            twilio: true,
            model: None,
            sms_reply_seconds: 5,
            manager_phones: Vec::new(),
        }
    }
}

/// Assembled state plus handles on its fakes.
pub struct Harness {
    pub state: Arc<AppState>,
    pub remote: Arc<FakeTaskService>,
    pub sms: Arc<FakeSms>,
    pub dir: TempDir,
}

impl Harness {
    /// Lines of today's audit file, parsed.
    pub fn audit_lines(&self) -> Vec<serde_json::Value> {
        let path = self
            .dir
            .path()
            .join("audit")
            .join(format!("audit-{}.jsonl", chrono::Utc::now().date_naive()));
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

pub fn oak_and_maple() -> Vec<RemoteProject> {
    vec![
        RemoteProject::new("901", "Oak Street", "Residential"),
        RemoteProject::new("903", "Maple Ave", "Residential"),
    ]
}

/// Build state over an in-memory database with the default roster and the
/// `oak`/`maple` aliases synced.
pub async fn harness(setup: Setup) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(FakeTaskService::with_projects(oak_and_maple()));
    let sms = Arc::new(FakeSms::default());

    let mut config = GlobalConfig::default();
    config.settings_file = dir.path().join("settings.json");
    config.audit_dir = dir.path().join("audit");
    config.clickup.default_list_id = Some("L-INBOX".into());
    config.timeouts.sms_reply_seconds = setup.sms_reply_seconds;
    config.credentials.manager_phones = setup.manager_phones;

    let tasks: Option<Arc<dyn TaskService>> = if setup.clickup {
        Some(remote.clone() as Arc<dyn TaskService>)
    } else {
        None
    };
    let transport: Option<Arc<dyn SmsTransport>> = if setup.twilio {
        Some(sms.clone() as Arc<dyn SmsTransport>)
    } else {
        None
    };
    let collaborators = Collaborators {
        tasks,
        model: setup.model,
        sms: transport,
    };

    let audit: Arc<dyn AuditLogger> = Arc::new(JsonlAuditWriter::new(config.audit_dir.clone()).unwrap());
    let pool = Arc::new(db::connect_memory().await.unwrap());
    let state = AppState::assemble(config, pool, collaborators, Some(audit))
        .await
        .unwrap();
    state.projects.apply_sync(&oak_and_maple()).await.unwrap();

    Harness {
        state: Arc::new(state),
        remote,
        sms,
        dir,
    }
}

/// Serve the router on an ephemeral port; returns its base URL.
pub async fn spawn_server(state: Arc<AppState>) -> (String, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let ct = CancellationToken::new();
    let shutdown = ct.clone();
    tokio::spawn(async move {
        axum::serve(listener, router(state))
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
    });
    (format!("http://{addr}"), ct)
}
