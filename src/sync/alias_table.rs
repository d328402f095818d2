//! The alias table and its reconciliation rules.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::project::{Project, RemoteProject};

/// Key used when a remote name yields no usable first token.
pub const UNNAMED_KEY: &str = "unnamed";

/// Local mapping of short keys to remote project containers.
///
/// Both `simple_key` and `remote_list_id` are unique within the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, Project>,
}

/// What a sync pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Keys created in this pass.
    pub added: Vec<String>,
    /// Keys whose `synced_at` was refreshed.
    pub refreshed: Vec<String>,
    /// Keys present locally but absent from the remote list (kept).
    pub stale: Vec<String>,
}

impl AliasTable {
    /// Build a table from stored entries.
    ///
    /// Later duplicates of a key or remote id are dropped.
    #[must_use]
    pub fn from_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        let mut table = Self::default();
        for project in projects {
            if table.by_remote_id(&project.remote_list_id).is_none() {
                table
                    .entries
                    .entry(project.simple_key.clone())
                    .or_insert(project);
            }
        }
        table
    }

    /// Entry for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Project> {
        self.entries.get(key)
    }

    /// Entry mapped to `remote_list_id`.
    #[must_use]
    pub fn by_remote_id(&self, remote_list_id: &str) -> Option<&Project> {
        self.entries
            .values()
            .find(|p| p.remote_list_id == remote_list_id)
    }

    /// All entries in key order.
    #[must_use]
    pub fn projects(&self) -> Vec<Project> {
        self.entries.values().cloned().collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display name for a remote list id, if known.
    #[must_use]
    pub fn display_name_for(&self, remote_list_id: &str) -> Option<&str> {
        self.by_remote_id(remote_list_id)
            .map(|p| p.display_name.as_str())
    }

    /// Map one remote container into the table.
    ///
    /// Returns the entry and whether it was newly created. A container whose
    /// id is already mapped only has `synced_at` refreshed.
    pub fn register(&mut self, remote: &RemoteProject, now: DateTime<Utc>) -> (Project, bool) {
        let existing_key = self
            .by_remote_id(&remote.list_id)
            .map(|p| p.simple_key.clone());
        if let Some(key) = existing_key {
            if let Some(entry) = self.entries.get_mut(&key) {
                entry.synced_at = now;
                return (entry.clone(), false);
            }
        }

        let key = self.free_key(&candidate_key(&remote.name));
        let project = Project {
            simple_key: key.clone(),
            remote_list_id: remote.list_id.clone(),
            display_name: remote.name.clone(),
            parent_space: remote.space.clone(),
            created_at: now,
            synced_at: now,
        };
        self.entries.insert(key, project.clone());
        (project, true)
    }

    /// Remove an entry by key.
    pub fn remove(&mut self, key: &str) -> Option<Project> {
        self.entries.remove(key)
    }

    fn free_key(&self, candidate: &str) -> String {
        if !self.entries.contains_key(candidate) {
            return candidate.to_owned();
        }
        (1_u32..)
            .map(|n| format!("{candidate}{n}"))
            .find(|key| !self.entries.contains_key(key))
            .unwrap_or_else(|| format!("{candidate}-{}", self.entries.len()))
    }
}

/// Lowercased first whitespace-delimited token of `name`, with leading and
/// trailing punctuation removed; [`UNNAMED_KEY`] when nothing remains.
#[must_use]
pub fn candidate_key(name: &str) -> String {
    let token = name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    if token.is_empty() {
        UNNAMED_KEY.to_owned()
    } else {
        token
    }
}

/// Reconcile `table` against the remote container list, in list order.
///
/// Never removes entries: local keys missing from `remote` are reported as
/// stale and kept.
#[must_use]
pub fn sync(
    mut table: AliasTable,
    remote: &[RemoteProject],
    now: DateTime<Utc>,
) -> (AliasTable, SyncReport) {
    let mut report = SyncReport::default();
    for container in remote {
        let (project, created) = table.register(container, now);
        if created {
            report.added.push(project.simple_key);
        } else if !report.refreshed.contains(&project.simple_key) {
            report.refreshed.push(project.simple_key);
        }
    }

    report.stale = table
        .entries
        .values()
        .filter(|p| !remote.iter().any(|r| r.list_id == p.remote_list_id))
        .map(|p| p.simple_key.clone())
        .collect();
    (table, report)
}
