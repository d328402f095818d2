//! OpenAI-compatible chat-completion and transcription client.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BoxFuture, LanguageModel};
use crate::config::ModelConfig;
use crate::models::task::Attachment;
use crate::{AppError, Result};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// Language-model backend speaking the OpenAI REST dialect.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    transcription_model: String,
}

impl OpenAiClient {
    /// Build a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be constructed.
    pub fn new(config: &ModelConfig, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            chat_model: config.chat_model.clone(),
            transcription_model: config.transcription_model.clone(),
        })
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.api_key)
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.1,
            max_tokens: 300,
        };

        let response = self
            .authed(self.http.post(format!("{}/chat/completions", self.base_url)))
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RemoteRejected(format!(
                "model returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::ModelParseFailure("empty completion".into()))?;
        debug!(chars = content.len(), "model completion received");
        Ok(content)
    }

    async fn whisper(&self, audio: &Attachment) -> Result<String> {
        let part = Part::bytes(audio.data.to_vec())
            .file_name(audio.file_name.clone())
            .mime_str(&audio.content_type)
            .map_err(|err| AppError::RemoteRejected(format!("invalid audio type: {err}")))?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.transcription_model.clone());

        let response = self
            .authed(self.http.post(format!("{}/audio/transcriptions", self.base_url)))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RemoteRejected(format!(
                "transcription returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: TranscriptionResponse = response.json().await?;
        Ok(parsed.text.trim().to_owned())
    }
}

impl LanguageModel for OpenAiClient {
    fn complete<'a>(&'a self, system: &'a str, user: &'a str) -> BoxFuture<'a, String> {
        Box::pin(self.chat(system, user))
    }

    fn transcribe<'a>(&'a self, audio: &'a Attachment) -> BoxFuture<'a, String> {
        Box::pin(self.whisper(audio))
    }
}
