//! Start-up import of the legacy JSON settings document and default seeding.
//!
//! The document shape is
//! `{"team_members": {key: {name, role, phone?}}, "projects": {key: {list_id, name, space?}}}`.
//! Every entry is inserted only if its key (or list id) is not yet stored.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::models::member::{default_roster, TeamMember};
use crate::models::project::Project;
use crate::{AppError, Result};

use super::member_repo::MemberRepo;
use super::project_repo::ProjectRepo;

/// Legacy settings document.
#[derive(Debug, Default, Deserialize)]
pub struct LegacySettings {
    /// Members keyed by short id.
    #[serde(default)]
    pub team_members: BTreeMap<String, LegacyMember>,
    /// Projects keyed by simple key.
    #[serde(default)]
    pub projects: BTreeMap<String, LegacyProject>,
}

/// A member entry in the legacy document.
#[derive(Debug, Deserialize)]
pub struct LegacyMember {
    /// Display name.
    pub name: String,
    /// Trade.
    #[serde(default = "general_role")]
    pub role: String,
    /// Contact number.
    #[serde(default)]
    pub phone: Option<String>,
}

/// A project entry in the legacy document.
#[derive(Debug, Deserialize)]
pub struct LegacyProject {
    /// Remote list id.
    pub list_id: String,
    /// Remote list name.
    pub name: String,
    /// Remote space name.
    #[serde(default)]
    pub space: String,
}

fn general_role() -> String {
    "General".into()
}

/// Counts of rows written by [`bootstrap`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Members imported from the document.
    pub members: usize,
    /// Projects imported from the document.
    pub projects: usize,
    /// Whether the default roster was seeded.
    pub seeded_defaults: bool,
}

/// Parse a legacy settings document.
///
/// # Errors
///
/// Returns `AppError::Config` if the JSON is malformed.
pub fn parse_legacy(raw: &str) -> Result<LegacySettings> {
    serde_json::from_str(raw).map_err(|err| AppError::Config(format!("invalid settings file: {err}")))
}

/// Import `settings` into the database, skipping existing entries.
///
/// # Errors
///
/// Returns `AppError::Db` if a write fails.
pub async fn import(
    settings: &LegacySettings,
    members: &MemberRepo,
    projects: &ProjectRepo,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    let now = Utc::now();

    for (key, entry) in &settings.team_members {
        let mut member = TeamMember::new(key.as_str(), entry.name.as_str(), entry.role.as_str());
        member.phone.clone_from(&entry.phone);
        if members.insert_if_absent(&member).await? {
            summary.members += 1;
        }
    }

    for (key, entry) in &settings.projects {
        let project = Project {
            simple_key: key.trim().to_lowercase(),
            remote_list_id: entry.list_id.clone(),
            display_name: entry.name.clone(),
            parent_space: entry.space.clone(),
            created_at: now,
            synced_at: now,
        };
        if projects.insert_if_absent(&project).await? {
            summary.projects += 1;
        }
    }
    Ok(summary)
}

/// Import the legacy file if present, then seed the default roster when the
/// database holds neither members nor projects.
///
/// An unreadable or malformed file is logged and skipped.
///
/// # Errors
///
/// Returns `AppError::Db` if a database operation fails.
pub async fn bootstrap(
    settings_file: &Path,
    members: &MemberRepo,
    projects: &ProjectRepo,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    if settings_file.exists() {
        match fs::read_to_string(settings_file)
            .map_err(AppError::from)
            .and_then(|raw| parse_legacy(&raw))
        {
            Ok(settings) => {
                summary = import(&settings, members, projects).await?;
                info!(
                    path = %settings_file.display(),
                    members = summary.members,
                    projects = summary.projects,
                    "imported legacy settings"
                );
            }
            Err(err) => warn!(path = %settings_file.display(), %err, "skipping settings file"),
        }
    }

    if members.count().await? == 0 && projects.count().await? == 0 {
        for member in default_roster() {
            members.insert_if_absent(&member).await?;
        }
        summary.seeded_defaults = true;
        info!("seeded default roster");
    }
    Ok(summary)
}
