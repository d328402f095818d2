//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::job_type::{default_job_types, JobType};
use crate::{AppError, Result};

/// Keychain service name under which credentials may be stored.
pub const KEYRING_SERVICE: &str = "site-taskbot";

/// Request timeouts (seconds) for outbound calls and inbound replies.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct TimeoutConfig {
    /// ClickUp and Twilio request timeout.
    pub remote_seconds: u64,
    /// Language-model request timeout.
    pub model_seconds: u64,
    /// Longest time an SMS webhook waits before replying provisionally.
    pub sms_reply_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            remote_seconds: 10,
            model_seconds: 8,
            sms_reply_seconds: 12,
        }
    }
}

/// Language-model backend settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct ModelConfig {
    /// API base URL (OpenAI-compatible).
    pub base_url: String,
    /// Chat-completion model used for task parsing.
    pub chat_model: String,
    /// Audio transcription model used for voice notes.
    pub transcription_model: String,
    /// Messages at or below this many characters skip the model entirely.
    pub min_message_chars: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            chat_model: "gpt-4o-mini".into(),
            transcription_model: "whisper-1".into(),
            min_message_chars: 18,
        }
    }
}

/// ClickUp connectivity settings (the API token comes from credentials).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct ClickUpConfig {
    /// API base URL.
    pub base_url: String,
    /// List used when a message names no project.
    pub default_list_id: Option<String>,
    /// Space in which `create project` creates lists.
    pub space_id: Option<String>,
}

impl Default for ClickUpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.clickup.com/api/v2".into(),
            default_list_id: None,
            space_id: None,
        }
    }
}

/// Twilio connectivity settings (account credentials come from credentials).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct TwilioConfig {
    /// REST API base URL.
    pub base_url: String,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twilio.com/2010-04-01".into(),
        }
    }
}

/// Secrets loaded at runtime from the keychain or environment.
///
/// A missing value disables the matching feature; it is never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// `CLICKUP_API_KEY`.
    pub clickup_api_key: Option<String>,
    /// `WORKSPACE_ID` (ClickUp team id).
    pub workspace_id: Option<String>,
    /// `OPENAI_API_KEY`.
    pub openai_api_key: Option<String>,
    /// `TWILIO_ACCOUNT_SID`.
    pub twilio_account_sid: Option<String>,
    /// `TWILIO_AUTH_TOKEN`.
    pub twilio_auth_token: Option<String>,
    /// `TWILIO_PHONE_NUMBER`.
    pub twilio_phone_number: Option<String>,
    /// Comma-separated `MANAGER_PHONES`.
    pub manager_phones: Vec<String>,
}

impl Credentials {
    /// Whether ClickUp calls can be made.
    #[must_use]
    pub fn clickup_configured(&self) -> bool {
        self.clickup_api_key.is_some() && self.workspace_id.is_some()
    }

    /// Whether the language-model backend can be used.
    #[must_use]
    pub fn model_configured(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// Whether outbound SMS and media downloads can be made.
    #[must_use]
    pub fn twilio_configured(&self) -> bool {
        self.twilio_account_sid.is_some()
            && self.twilio_auth_token.is_some()
            && self.twilio_phone_number.is_some()
    }
}

/// Global configuration parsed from an optional `config.toml`.
///
/// Every field has a default, so an empty document is a valid configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct GlobalConfig {
    /// HTTP listen port.
    pub http_port: u16,
    /// `SQLite` database file.
    pub database_path: PathBuf,
    /// Legacy JSON settings document imported on start, if present.
    pub settings_file: PathBuf,
    /// Directory for JSONL audit logs.
    pub audit_dir: PathBuf,
    /// Assignee used when a message names none.
    pub default_assignee: Option<String>,
    /// Request timeouts.
    pub timeouts: TimeoutConfig,
    /// Language-model settings.
    pub model: ModelConfig,
    /// ClickUp settings.
    pub clickup: ClickUpConfig,
    /// Twilio settings.
    pub twilio: TwilioConfig,
    /// Job-type categories used for tagging.
    pub job_types: Vec<JobType>,
    /// Runtime secrets (never read from TOML).
    #[serde(skip)]
    pub credentials: Credentials,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            http_port: 5000,
            database_path: PathBuf::from("construction.db"),
            settings_file: PathBuf::from("settings.json"),
            audit_dir: PathBuf::from("logs"),
            default_assignee: None,
            timeouts: TimeoutConfig::default(),
            model: ModelConfig::default(),
            clickup: ClickUpConfig::default(),
            twilio: TwilioConfig::default(),
            job_types: default_job_types(),
            credentials: Credentials::default(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load all external credentials from the OS keychain with env-var fallback.
    ///
    /// Missing credentials are left unset and logged at `warn`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the keychain worker task panics.
    pub async fn load_credentials(&mut self) -> Result<()> {
        let creds = &mut self.credentials;
        creds.clickup_api_key = load_credential("clickup_api_key", "CLICKUP_API_KEY").await?;
        creds.workspace_id = load_credential("workspace_id", "WORKSPACE_ID").await?;
        creds.openai_api_key = load_credential("openai_api_key", "OPENAI_API_KEY").await?;
        creds.twilio_account_sid =
            load_credential("twilio_account_sid", "TWILIO_ACCOUNT_SID").await?;
        creds.twilio_auth_token = load_credential("twilio_auth_token", "TWILIO_AUTH_TOKEN").await?;
        creds.twilio_phone_number =
            load_credential("twilio_phone_number", "TWILIO_PHONE_NUMBER").await?;
        creds.manager_phones = load_credential("manager_phones", "MANAGER_PHONES")
            .await?
            .map(|raw| parse_phone_list(&raw))
            .unwrap_or_default();

        for (name, present) in [
            ("clickup", creds.clickup_configured()),
            ("openai", creds.model_configured()),
            ("twilio", creds.twilio_configured()),
        ] {
            if !present {
                warn!(service = name, "credentials missing; feature disabled");
            }
        }
        Ok(())
    }

    /// Outbound ClickUp/Twilio request timeout.
    #[must_use]
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.remote_seconds)
    }

    /// Language-model request timeout.
    #[must_use]
    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.model_seconds)
    }

    /// SMS webhook reply budget.
    #[must_use]
    pub fn sms_reply_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.sms_reply_seconds)
    }

    fn validate(&self) -> Result<()> {
        let t = &self.timeouts;
        if t.remote_seconds == 0 || t.model_seconds == 0 || t.sms_reply_seconds == 0 {
            return Err(AppError::Config(
                "timeouts must be greater than zero".into(),
            ));
        }

        if self.model.min_message_chars == 0 {
            return Err(AppError::Config(
                "model.min_message_chars must be greater than zero".into(),
            ));
        }

        if self.job_types.iter().any(|jt| jt.name.trim().is_empty()) {
            return Err(AppError::Config("job type names must not be empty".into()));
        }

        Ok(())
    }
}

/// Split a comma-separated phone list, dropping blanks.
#[must_use]
pub fn parse_phone_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<Option<String>> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(Some(value)),
        Ok(_) => debug!(key = keyring_key, "keychain entry is empty, trying env var"),
        Err(err) => debug!(key = keyring_key, ?err, "keychain lookup failed, trying env var"),
    }

    Ok(env::var(env_key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty()))
}
