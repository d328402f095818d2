//! `create project <name>`.

use crate::audit::{AuditEntry, AuditEventType};
use crate::state::AppState;
use crate::Result;

use super::Reply;

/// Create a remote project container and register its alias.
pub async fn create(state: &AppState, name: &str) -> Reply {
    Reply::from_result("project", create_inner(state, name).await)
}

async fn create_inner(state: &AppState, name: &str) -> Result<String> {
    let remote = state.gateway.create_project(name).await?;
    let project = state.projects.register(&remote).await?;

    state.audit(
        AuditEntry::new(AuditEventType::ProjectCreated)
            .with_project(project.simple_key.as_str())
            .with_result(format!("list {}", project.remote_list_id)),
    );

    Ok(format!(
        "✅ Project created: {}\nKey: {}\nText \"{}: <task>\" to add tasks.",
        project.display_name, project.simple_key, project.simple_key
    ))
}
