//! Twilio messaging client and TwiML reply rendering.

use std::time::Duration;

use reqwest::Client;
use tracing::info;

use super::{BoxFuture, SmsTransport};
use crate::models::task::Attachment;
use crate::{AppError, Result};

/// Render a TwiML `<Response>` carrying one `<Message>`.
#[must_use]
pub fn twiml_message(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape_xml(body)
    )
}

/// Escape the five XML special characters.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Twilio REST client for one account and sender number.
#[derive(Debug, Clone)]
pub struct TwilioClient {
    http: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioClient {
    /// Build a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
        })
    }

    async fn post_message(&self, to: &str, body: &str) -> Result<()> {
        let url = format!("{}/Accounts/{}/Messages.json", self.base_url, self.account_sid);
        let response = self
            .http
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::RemoteRejected(format!("twilio returned {status}")));
        }
        info!(to, "sms sent");
        Ok(())
    }

    async fn fetch_media(&self, url: &str, content_type: &str) -> Result<Attachment> {
        let response = self
            .http
            .get(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::RemoteRejected(format!(
                "media download returned {status}"
            )));
        }
        let data = response.bytes().await?;
        Ok(Attachment::new(data, content_type, Some(url.to_owned())))
    }
}

impl SmsTransport for TwilioClient {
    fn send_sms<'a>(&'a self, to: &'a str, body: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(self.post_message(to, body))
    }

    fn download_media<'a>(
        &'a self,
        url: &'a str,
        content_type: &'a str,
    ) -> BoxFuture<'a, Attachment> {
        Box::pin(self.fetch_media(url, content_type))
    }
}
