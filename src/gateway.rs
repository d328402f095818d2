//! Task submission gateway.
//!
//! Translates normalized records into remote-service calls. Every call is
//! bounded by the configured request timeout, surfaced as
//! `AppError::RemoteTimeout`. There are no retries: the remote service is
//! not idempotent.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, info_span, warn, Instrument};

use crate::clients::{NewRemoteTask, RemoteTask, TaskService};
use crate::models::project::RemoteProject;
use crate::models::task::TaskRecord;
use crate::{AppError, Result};

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// The created remote task.
    pub task: RemoteTask,
    /// List the task was created in.
    pub list_id: String,
    /// `false` when media was present but could not be uploaded.
    pub attachment_ok: bool,
}

/// Run `fut` with a deadline, mapping expiry to `RemoteTimeout`.
///
/// # Errors
///
/// Returns `AppError::RemoteTimeout` on expiry, otherwise the future's error.
pub async fn bounded<T>(
    timeout: Duration,
    what: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| AppError::RemoteTimeout(format!("{what} exceeded {}s", timeout.as_secs())))?
}

/// Gateway to the remote task service.
#[derive(Clone)]
pub struct TaskGateway {
    service: Option<Arc<dyn TaskService>>,
    default_list_id: Option<String>,
    timeout: Duration,
}

impl TaskGateway {
    /// Build a gateway. `service` is `None` when credentials are missing.
    #[must_use]
    pub fn new(
        service: Option<Arc<dyn TaskService>>,
        default_list_id: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            service,
            default_list_id,
            timeout,
        }
    }

    /// Whether a remote service is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.service.is_some()
    }

    /// The configured service.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotConfigured` when credentials are missing.
    pub fn service(&self) -> Result<&dyn TaskService> {
        self.service
            .as_deref()
            .ok_or_else(|| AppError::NotConfigured("ClickUp is not configured".into()))
    }

    /// Create the task described by `record`, then attach its media.
    ///
    /// Attachment failure does not fail the submission: the media URL is
    /// appended to the description instead.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` when no service or target list is available,
    /// `RemoteTimeout` when the create call exceeds the deadline, or
    /// `RemoteRejected` when the service refuses it.
    pub async fn submit(&self, record: &TaskRecord) -> Result<SubmitOutcome> {
        let service = self.service()?;
        let list_id = record
            .project_ref
            .clone()
            .or_else(|| self.default_list_id.clone())
            .ok_or_else(|| {
                AppError::NotConfigured("no project named and no default list configured".into())
            })?;

        let span = info_span!("submit_task", list_id = %list_id);
        async move {
            let payload = NewRemoteTask {
                name: record.display_title.clone(),
                description: record.description.clone(),
                priority: record.priority,
                due_date: record.due_date,
                tags: record.tags.iter().cloned().collect(),
            };
            let task = bounded(self.timeout, "create task", service.create_task(&list_id, &payload))
                .await?;
            info!(task_id = %task.id, priority = record.priority.label(), "task created");

            let mut attachment_ok = true;
            if let Some(media) = &record.media {
                let upload = bounded(
                    self.timeout,
                    "upload attachment",
                    service.add_attachment(&task.id, media),
                )
                .await;
                if let Err(err) = upload {
                    attachment_ok = false;
                    warn!(task_id = %task.id, %err, "attachment upload failed");
                    let reference = media
                        .source_url
                        .as_deref()
                        .unwrap_or("(media unavailable)");
                    let description = format!("{}\n\nPhoto: {reference}", record.description);
                    let fallback = bounded(
                        self.timeout,
                        "update description",
                        service.update_task_description(&task.id, &description),
                    )
                    .await;
                    if let Err(err) = fallback {
                        warn!(task_id = %task.id, %err, "could not record media link");
                    }
                }
            }

            Ok(SubmitOutcome {
                task,
                list_id,
                attachment_ok,
            })
        }
        .instrument(span)
        .await
    }

    /// Mark a remote task complete and leave a comment.
    ///
    /// The comment is best-effort.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` or a remote error from the status update.
    pub async fn complete(&self, task_id: &str, comment: &str) -> Result<()> {
        let service = self.service()?;
        bounded(
            self.timeout,
            "update status",
            service.update_task_status(task_id, "complete"),
        )
        .await?;
        if let Err(err) = bounded(self.timeout, "add comment", service.add_comment(task_id, comment)).await {
            warn!(task_id, %err, "completion comment failed");
        }
        Ok(())
    }

    /// Create a remote project container.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` or a remote error.
    pub async fn create_project(&self, name: &str) -> Result<RemoteProject> {
        let service = self.service()?;
        bounded(self.timeout, "create list", service.create_list(name)).await
    }

    /// Open tasks of a remote list.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` or a remote error.
    pub async fn open_tasks(&self, list_id: &str) -> Result<Vec<RemoteTask>> {
        let service = self.service()?;
        bounded(self.timeout, "list tasks", service.list_open_tasks(list_id)).await
    }

    /// All remote project containers.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` or a remote error.
    pub async fn remote_projects(&self) -> Result<Vec<RemoteProject>> {
        let service = self.service()?;
        bounded(self.timeout, "list projects", service.list_projects()).await
    }
}
