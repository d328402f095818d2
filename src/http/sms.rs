//! `POST /sms`: the Twilio inbound webhook.
//!
//! Always answers `200 text/xml` with a TwiML `<Message>`. Dispatch runs on
//! a spawned task; if it outlives the reply budget the sender gets a
//! provisional acknowledgement now and the real reply as a follow-up SMS.

use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::{info, info_span, warn, Instrument};

use crate::clients::twilio::twiml_message;
use crate::dispatch::{self, Inbound, Reply};
use crate::gateway::bounded;
use crate::models::sms_log::SmsLogEntry;
use crate::models::task::{Attachment, CreatedVia};
use crate::state::AppState;

/// Reply sent when dispatch exceeds the reply budget.
pub const PROVISIONAL_REPLY: &str = "⏳ Got it, still processing. I'll text you the result shortly.";

/// Twilio webhook form fields used here.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SmsWebhook {
    /// Sender number.
    #[serde(default)]
    pub from: String,
    /// Message text.
    #[serde(default)]
    pub body: String,
    /// Number of media items, as a decimal string.
    #[serde(default)]
    pub num_media: Option<String>,
    /// First media URL.
    #[serde(default, rename = "MediaUrl0")]
    pub media_url0: Option<String>,
    /// First media content type.
    #[serde(default, rename = "MediaContentType0")]
    pub media_content_type0: Option<String>,
}

impl SmsWebhook {
    fn first_media(&self) -> Option<(&str, &str)> {
        let count: u32 = self
            .num_media
            .as_deref()
            .and_then(|n| n.trim().parse().ok())
            .unwrap_or(0);
        if count == 0 {
            return None;
        }
        let url = self.media_url0.as_deref().filter(|u| !u.is_empty())?;
        let content_type = self.media_content_type0.as_deref().unwrap_or("image/jpeg");
        Some((url, content_type))
    }
}

fn twiml(body: &str) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/xml")], twiml_message(body))
}

/// Handle one inbound SMS/MMS.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SmsWebhook>,
) -> impl IntoResponse {
    let span = info_span!("sms", from = %form.from);
    async move {
        let has_media = form.first_media().is_some();
        let reply = match prepare(&state, &form).await {
            Ok(inbound) => run_with_budget(&state, inbound).await,
            Err(reply) => reply,
        };

        log_exchange(&state, &form.from, &form.body, &reply.message, has_media, reply.command_type)
            .await;
        twiml(&reply.message)
    }
    .instrument(span)
    .await
}

/// Resolve media and voice notes into an [`Inbound`].
async fn prepare(state: &AppState, form: &SmsWebhook) -> Result<Inbound, Reply> {
    let mut text = form.body.trim().to_owned();
    let mut media: Option<Attachment> = None;

    if let Some((url, content_type)) = form.first_media() {
        if content_type.starts_with("audio/") {
            let audio = download(state, url, content_type)
                .await
                .ok_or_else(|| Reply::ok("voice", "⚠️ Could not fetch the voice note. Please text the task."))?;
            let transcript = dispatch::transcribe(state, &audio)
                .await
                .map_err(|err| Reply::failed("voice", &err))?;
            info!(chars = transcript.len(), "voice note transcribed");
            text = if text.is_empty() {
                transcript
            } else {
                format!("{text} {transcript}")
            };
        } else {
            media = download(state, url, content_type).await;
        }
    }

    let mut inbound = Inbound::text(text, CreatedVia::Sms).with_media(media);
    if !form.from.is_empty() {
        inbound = inbound.from_sender(form.from.as_str());
    }
    Ok(inbound)
}

async fn download(state: &AppState, url: &str, content_type: &str) -> Option<Attachment> {
    let Some(transport) = state.sms.as_deref() else {
        warn!("media received but sms transport is not configured");
        return None;
    };
    match bounded(
        state.config.remote_timeout(),
        "media download",
        transport.download_media(url, content_type),
    )
    .await
    {
        Ok(attachment) => Some(attachment),
        Err(err) => {
            warn!(%err, "media download failed");
            None
        }
    }
}

/// Dispatch on a spawned task, waiting at most the reply budget.
async fn run_with_budget(state: &Arc<AppState>, inbound: Inbound) -> Reply {
    let sender = inbound.sender.clone();
    let worker_state = Arc::clone(state);
    let mut handle =
        tokio::spawn(async move { dispatch::handle_message(&worker_state, inbound).await });

    match tokio::time::timeout(state.config.sms_reply_timeout(), &mut handle).await {
        Ok(Ok(reply)) => reply,
        Ok(Err(err)) => {
            warn!(%err, "dispatch task failed");
            Reply::ok("error", "⚠️ Something went wrong on our side. Please try again.")
        }
        Err(_) => {
            info!("reply budget exceeded, sending provisional acknowledgement");
            let follow_state = Arc::clone(state);
            tokio::spawn(async move {
                match handle.await {
                    Ok(reply) => follow_up(&follow_state, sender.as_deref(), &reply).await,
                    Err(err) => warn!(%err, "dispatch task failed after acknowledgement"),
                }
            });
            Reply::ok("processing", PROVISIONAL_REPLY)
        }
    }
}

async fn follow_up(state: &AppState, to: Option<&str>, reply: &Reply) {
    let (Some(transport), Some(to)) = (state.sms.as_deref(), to) else {
        warn!("follow-up reply dropped: no sms transport or sender");
        return;
    };
    let sent = bounded(
        state.config.remote_timeout(),
        "follow-up sms",
        transport.send_sms(to, &reply.message),
    )
    .await;
    match sent {
        Ok(()) => {
            log_exchange(state, to, "(follow-up)", &reply.message, false, reply.command_type).await;
        }
        Err(err) => warn!(%err, "follow-up sms failed"),
    }
}

async fn log_exchange(
    state: &AppState,
    from: &str,
    message: &str,
    response: &str,
    has_media: bool,
    command_type: &str,
) {
    let entry = SmsLogEntry::new(from, message, response, has_media, Some(command_type.to_owned()));
    if let Err(err) = state.sms_log().insert(&entry).await {
        warn!(%err, "failed to record sms exchange");
    }
}
