//! Lock-guarded, persisted alias table shared by every request.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, info_span, Instrument};

use super::alias_table::{sync, AliasTable, SyncReport};
use crate::gateway::TaskGateway;
use crate::models::project::{Project, RemoteProject};
use crate::persistence::project_repo::ProjectRepo;
use crate::{AppError, Result};

/// Shared alias table.
///
/// Readers take an [`Arc`] snapshot without waiting on writers. Writers
/// (sync, register, remove) run one at a time: each clones the current
/// table, applies its change, persists it, and only then publishes the new
/// snapshot. A failed write leaves the published table untouched.
pub struct ProjectRegistry {
    current: RwLock<Arc<AliasTable>>,
    writer: Mutex<()>,
    repo: ProjectRepo,
}

impl ProjectRegistry {
    /// Load the stored alias table.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the entries cannot be read.
    pub async fn load(repo: ProjectRepo) -> Result<Self> {
        let table = AliasTable::from_projects(repo.list().await?);
        Ok(Self {
            current: RwLock::new(Arc::new(table)),
            writer: Mutex::new(()),
            repo,
        })
    }

    /// The current table.
    #[must_use]
    pub fn snapshot(&self) -> Arc<AliasTable> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn publish(&self, table: AliasTable) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(table);
    }

    /// Fetch the remote container list and reconcile against it.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` or a remote error if the list cannot be
    /// fetched, or `AppError::Db` if persisting fails.
    pub async fn sync_from(&self, gateway: &TaskGateway) -> Result<SyncReport> {
        let span = info_span!("project_sync");
        async {
            let remote = gateway.remote_projects().await?;
            self.apply_sync(&remote).await
        }
        .instrument(span)
        .await
    }

    /// Reconcile the table against an already-fetched container list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if persisting fails.
    pub async fn apply_sync(&self, remote: &[RemoteProject]) -> Result<SyncReport> {
        let _guard = self.writer.lock().await;
        let base = (*self.snapshot()).clone();
        let (next, report) = sync(base, remote, Utc::now());

        let touched: Vec<Project> = report
            .added
            .iter()
            .chain(&report.refreshed)
            .filter_map(|key| next.get(key).cloned())
            .collect();
        self.repo.upsert_all(&touched).await?;
        self.publish(next);

        info!(
            added = report.added.len(),
            refreshed = report.refreshed.len(),
            stale = report.stale.len(),
            "projects synced"
        );
        Ok(report)
    }

    /// Map a newly created remote container into the table.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if persisting fails.
    pub async fn register(&self, remote: &RemoteProject) -> Result<Project> {
        let _guard = self.writer.lock().await;
        let mut next = (*self.snapshot()).clone();
        let (project, created) = next.register(remote, Utc::now());
        self.repo.upsert(&project).await?;
        self.publish(next);
        info!(key = %project.simple_key, created, "project registered");
        Ok(project)
    }

    /// Remove an alias by key.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the key is unknown, or `AppError::Db`
    /// if the delete fails.
    pub async fn remove(&self, key: &str) -> Result<Project> {
        let key = key.trim().to_lowercase();
        let _guard = self.writer.lock().await;
        let mut next = (*self.snapshot()).clone();
        let removed = next
            .remove(&key)
            .ok_or_else(|| AppError::NotFound(format!("project `{key}`")))?;
        self.repo.delete(&key).await?;
        self.publish(next);
        info!(key = %removed.simple_key, "project removed");
        Ok(removed)
    }
}
