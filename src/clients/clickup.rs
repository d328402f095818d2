//! ClickUp REST v2 client.

use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{BoxFuture, NewRemoteTask, RemoteTask, TaskService};
use crate::models::project::RemoteProject;
use crate::models::task::Attachment;
use crate::{AppError, Result};

#[derive(Debug, Deserialize)]
struct SpacesResponse {
    #[serde(default)]
    spaces: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct FoldersResponse {
    #[serde(default)]
    folders: Vec<Folder>,
}

#[derive(Debug, Deserialize)]
struct Folder {
    #[serde(default)]
    lists: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct ListsResponse {
    #[serde(default)]
    lists: Vec<Named>,
}

#[derive(Debug, Clone, Deserialize)]
struct Named {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct TaskResponse {
    id: String,
    #[serde(default)]
    name: String,
    status: Option<TaskStatusField>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskStatusField {
    status: String,
}

#[derive(Debug, Deserialize)]
struct TasksResponse {
    #[serde(default)]
    tasks: Vec<TaskResponse>,
}

impl TaskResponse {
    fn into_remote(self) -> RemoteTask {
        RemoteTask {
            id: self.id,
            name: self.name,
            status: self.status.map(|s| s.status),
            url: self.url,
        }
    }
}

/// ClickUp API client bound to one workspace.
#[derive(Debug, Clone)]
pub struct ClickUpClient {
    http: Client,
    base_url: String,
    token: String,
    workspace_id: String,
    space_id: Option<String>,
}

impl ClickUpClient {
    /// Build a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        workspace_id: impl Into<String>,
        space_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.into(),
            workspace_id: workspace_id.into(),
            space_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(reqwest::header::AUTHORIZATION, &self.token)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.authed(builder).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::RemoteRejected(format!(
            "clickup returned {status}: {}",
            body.chars().take(200).collect::<String>()
        )))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.http.get(self.url(path))).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::RemoteRejected(format!("unexpected clickup payload: {err}")))
    }

    async fn spaces(&self) -> Result<Vec<Named>> {
        let path = format!("/team/{}/space?archived=false", self.workspace_id);
        Ok(self.get_json::<SpacesResponse>(&path).await?.spaces)
    }

    async fn fetch_projects(&self) -> Result<Vec<RemoteProject>> {
        let mut projects = Vec::new();
        for space in self.spaces().await? {
            let folders: FoldersResponse = self
                .get_json(&format!("/space/{}/folder?archived=false", space.id))
                .await?;
            let loose: ListsResponse = self
                .get_json(&format!("/space/{}/list?archived=false", space.id))
                .await?;

            let lists = folders
                .folders
                .into_iter()
                .flat_map(|f| f.lists)
                .chain(loose.lists);
            projects.extend(lists.map(|l| RemoteProject::new(l.id, l.name, space.name.clone())));
        }
        debug!(count = projects.len(), "fetched clickup lists");
        Ok(projects)
    }

    async fn target_space(&self) -> Result<Named> {
        let spaces = self.spaces().await?;
        if let Some(wanted) = &self.space_id {
            return spaces
                .into_iter()
                .find(|s| &s.id == wanted)
                .ok_or_else(|| AppError::NotConfigured(format!("space {wanted} not found")));
        }
        spaces
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotConfigured("workspace has no spaces".into()))
    }

    async fn create_list_in_space(&self, name: &str) -> Result<RemoteProject> {
        let space = self.target_space().await?;
        let response = self
            .send(
                self.http
                    .post(self.url(&format!("/space/{}/list", space.id)))
                    .json(&json!({ "name": name })),
            )
            .await?;
        let list: Named = response
            .json()
            .await
            .map_err(|err| AppError::RemoteRejected(format!("unexpected clickup payload: {err}")))?;
        Ok(RemoteProject::new(list.id, list.name, space.name))
    }

    async fn post_task(&self, list_id: &str, task: &NewRemoteTask) -> Result<RemoteTask> {
        let mut body = json!({
            "name": task.name,
            "description": task.description,
            "priority": task.priority.as_remote(),
            "tags": task.tags,
        });
        if let Some(due) = task.due_date.map(due_date_millis) {
            body["due_date"] = json!(due);
            body["due_date_time"] = json!(false);
        }

        let response = self
            .send(
                self.http
                    .post(self.url(&format!("/list/{list_id}/task")))
                    .json(&body),
            )
            .await?;
        let created: TaskResponse = response
            .json()
            .await
            .map_err(|err| AppError::RemoteRejected(format!("unexpected clickup payload: {err}")))?;
        Ok(created.into_remote())
    }

    async fn put_task(&self, task_id: &str, body: serde_json::Value) -> Result<()> {
        self.send(self.http.put(self.url(&format!("/task/{task_id}"))).json(&body))
            .await?;
        Ok(())
    }

    async fn upload(&self, task_id: &str, media: &Attachment) -> Result<()> {
        let part = Part::bytes(media.data.to_vec())
            .file_name(media.file_name.clone())
            .mime_str(&media.content_type)
            .map_err(|err| AppError::RemoteRejected(format!("invalid media type: {err}")))?;
        let form = Form::new().part("attachment", part);
        self.send(
            self.http
                .post(self.url(&format!("/task/{task_id}/attachment")))
                .multipart(form),
        )
        .await?;
        Ok(())
    }

    async fn comment(&self, task_id: &str, text: &str) -> Result<()> {
        self.send(
            self.http
                .post(self.url(&format!("/task/{task_id}/comment")))
                .json(&json!({ "comment_text": text, "notify_all": false })),
        )
        .await?;
        Ok(())
    }

    async fn open_tasks(&self, list_id: &str) -> Result<Vec<RemoteTask>> {
        let response: TasksResponse = self
            .get_json(&format!("/list/{list_id}/task?archived=false&include_closed=false"))
            .await?;
        let tasks: Vec<RemoteTask> = response
            .tasks
            .into_iter()
            .map(TaskResponse::into_remote)
            .collect();
        if tasks.is_empty() {
            debug!(list_id, "no open tasks returned");
        }
        Ok(tasks)
    }
}

/// Midnight UTC of `date` in epoch milliseconds, as ClickUp expects.
#[must_use]
pub fn due_date_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

impl TaskService for ClickUpClient {
    fn list_projects(&self) -> BoxFuture<'_, Vec<RemoteProject>> {
        Box::pin(self.fetch_projects())
    }

    fn create_list<'a>(&'a self, name: &'a str) -> BoxFuture<'a, RemoteProject> {
        Box::pin(self.create_list_in_space(name))
    }

    fn create_task<'a>(
        &'a self,
        list_id: &'a str,
        task: &'a NewRemoteTask,
    ) -> BoxFuture<'a, RemoteTask> {
        Box::pin(self.post_task(list_id, task))
    }

    fn update_task_status<'a>(&'a self, task_id: &'a str, status: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(self.put_task(task_id, json!({ "status": status })))
    }

    fn update_task_description<'a>(
        &'a self,
        task_id: &'a str,
        description: &'a str,
    ) -> BoxFuture<'a, ()> {
        Box::pin(self.put_task(task_id, json!({ "description": description })))
    }

    fn add_attachment<'a>(&'a self, task_id: &'a str, media: &'a Attachment) -> BoxFuture<'a, ()> {
        Box::pin(self.upload(task_id, media))
    }

    fn add_comment<'a>(&'a self, task_id: &'a str, text: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(self.comment(task_id, text))
    }

    fn list_open_tasks<'a>(&'a self, list_id: &'a str) -> BoxFuture<'a, Vec<RemoteTask>> {
        Box::pin(self.open_tasks(list_id))
    }
}
