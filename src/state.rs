//! Shared application state and start-up wiring.

use std::sync::Arc;

use tracing::{info, warn};

use crate::audit::{AuditEntry, AuditLogger, JsonlAuditWriter};
use crate::clients::clickup::ClickUpClient;
use crate::clients::openai::OpenAiClient;
use crate::clients::twilio::TwilioClient;
use crate::clients::{LanguageModel, SmsTransport, TaskService};
use crate::config::GlobalConfig;
use crate::gateway::TaskGateway;
use crate::lexicon::{Lexicon, LexiconStore};
use crate::persistence::db::{self, Database};
use crate::persistence::member_repo::MemberRepo;
use crate::persistence::project_repo::ProjectRepo;
use crate::persistence::settings_import;
use crate::persistence::sms_log_repo::SmsLogRepo;
use crate::persistence::task_repo::TaskRepo;
use crate::sync::ProjectRegistry;
use crate::Result;

/// Outbound collaborators; `None` means the feature is not configured.
#[derive(Clone, Default)]
pub struct Collaborators {
    /// Remote task service.
    pub tasks: Option<Arc<dyn TaskService>>,
    /// Language-model backend.
    pub model: Option<Arc<dyn LanguageModel>>,
    /// SMS transport.
    pub sms: Option<Arc<dyn SmsTransport>>,
}

impl Collaborators {
    /// Build real clients for every service whose credentials are present.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if an HTTP client cannot be constructed.
    pub fn from_config(config: &GlobalConfig) -> Result<Self> {
        let creds = &config.credentials;
        let mut built = Self::default();

        if let (Some(token), Some(workspace)) = (&creds.clickup_api_key, &creds.workspace_id) {
            built.tasks = Some(Arc::new(ClickUpClient::new(
                &config.clickup.base_url,
                token.as_str(),
                workspace.as_str(),
                config.clickup.space_id.clone(),
                config.remote_timeout(),
            )?));
        }

        if let Some(key) = &creds.openai_api_key {
            built.model = Some(Arc::new(OpenAiClient::new(
                &config.model,
                key.as_str(),
                config.model_timeout(),
            )?));
        }

        if let (Some(sid), Some(token), Some(from)) = (
            &creds.twilio_account_sid,
            &creds.twilio_auth_token,
            &creds.twilio_phone_number,
        ) {
            built.sms = Some(Arc::new(TwilioClient::new(
                &config.twilio.base_url,
                sid.as_str(),
                token.as_str(),
                from.as_str(),
                config.remote_timeout(),
            )?));
        }
        Ok(built)
    }
}

/// Shared application state accessible by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// `SQLite` connection pool.
    pub db: Arc<Database>,
    /// Roster and job types.
    pub lexicon: Arc<LexiconStore>,
    /// Project alias table.
    pub projects: Arc<ProjectRegistry>,
    /// Remote task submission.
    pub gateway: TaskGateway,
    /// Language-model backend, when configured.
    pub model: Option<Arc<dyn LanguageModel>>,
    /// SMS transport, when configured.
    pub sms: Option<Arc<dyn SmsTransport>>,
    /// Audit trail, when enabled.
    pub audit: Option<Arc<dyn AuditLogger>>,
}

impl AppState {
    /// Assemble state over an open database.
    ///
    /// Imports legacy settings, seeds defaults and loads the roster and
    /// alias table.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if bootstrap queries fail.
    pub async fn assemble(
        config: GlobalConfig,
        db: Arc<Database>,
        collaborators: Collaborators,
        audit: Option<Arc<dyn AuditLogger>>,
    ) -> Result<Self> {
        let members = MemberRepo::new(Arc::clone(&db));
        let project_repo = ProjectRepo::new(Arc::clone(&db));
        settings_import::bootstrap(&config.settings_file, &members, &project_repo).await?;

        let lexicon = LexiconStore::new(Lexicon::new(members.list().await?, config.job_types.clone()));
        let projects = ProjectRegistry::load(project_repo).await?;
        let gateway = TaskGateway::new(
            collaborators.tasks,
            config.clickup.default_list_id.clone(),
            config.remote_timeout(),
        );

        Ok(Self {
            config: Arc::new(config),
            db,
            lexicon: Arc::new(lexicon),
            projects: Arc::new(projects),
            gateway,
            model: collaborators.model,
            sms: collaborators.sms,
            audit,
        })
    }

    /// Open the configured database and audit directory and build real clients.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` or `AppError::Config` on start-up failure.
    pub async fn bootstrap(config: GlobalConfig) -> Result<Self> {
        let db = Arc::new(db::connect(&config.database_path).await?);
        info!(path = %config.database_path.display(), "database connected");

        let audit: Option<Arc<dyn AuditLogger>> =
            match JsonlAuditWriter::new(config.audit_dir.clone()) {
                Ok(writer) => Some(Arc::new(writer)),
                Err(err) => {
                    warn!(%err, "audit log disabled");
                    None
                }
            };

        let collaborators = Collaborators::from_config(&config)?;
        Self::assemble(config, db, collaborators, audit).await
    }

    /// Member repository over the shared pool.
    #[must_use]
    pub fn members(&self) -> MemberRepo {
        MemberRepo::new(Arc::clone(&self.db))
    }

    /// Task mirror repository over the shared pool.
    #[must_use]
    pub fn tasks(&self) -> TaskRepo {
        TaskRepo::new(Arc::clone(&self.db))
    }

    /// SMS log repository over the shared pool.
    #[must_use]
    pub fn sms_log(&self) -> SmsLogRepo {
        SmsLogRepo::new(Arc::clone(&self.db))
    }

    /// Record an audit entry; failures are logged and swallowed.
    pub fn audit(&self, entry: AuditEntry) {
        if let Some(logger) = &self.audit {
            if let Err(err) = logger.log_entry(entry) {
                warn!(%err, "audit write failed");
            }
        }
    }
}
