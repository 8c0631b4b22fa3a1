//! # SendGrid Mail Gateway
//!
//! HTTP implementation of [`MailGateway`] against the SendGrid v3 mail-send
//! API. The gateway's `X-Message-Id` response header is captured and
//! returned as the new thread anchor.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde_json::json;

use crate::gateway::{MailError, MailGateway, OutboundMail};

/// Configuration for [`SendGridGateway`].
#[derive(Debug, Clone)]
pub struct SendGridConfig {
    /// API base URL; overridable for tests.
    pub base_url: String,
    pub api_key: String,
    /// Sender address shown to clients.
    pub from_email: String,
    /// Per-request timeout in seconds (default: 10).
    pub timeout_secs: u64,
}

impl SendGridConfig {
    pub fn new(api_key: impl Into<String>, from_email: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.sendgrid.com".to_string(),
            api_key: api_key.into(),
            from_email: from_email.into(),
            timeout_secs: 10,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// SendGrid v3 HTTP gateway.
#[derive(Debug)]
pub struct SendGridGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    from_email: String,
    timeout_secs: u64,
}

impl SendGridGateway {
    /// Build the gateway from configuration.
    pub fn new(config: SendGridConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MailError::Unavailable {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            from_email: config.from_email,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Assemble the v3 mail-send payload.
    fn payload(&self, mail: &OutboundMail) -> Result<serde_json::Value, MailError> {
        let recipients: Vec<_> = mail.to.iter().map(|e| json!({ "email": e })).collect();
        let mut body = json!({
            "personalizations": [{ "to": recipients }],
            "from": { "email": self.from_email },
            "subject": mail.subject,
            "content": [{ "type": "text/html", "value": mail.html_body }],
        });

        if let Some(anchor) = &mail.in_reply_to {
            body["headers"] = json!({
                "In-Reply-To": anchor,
                "References": anchor,
            });
        }

        if let Some(path) = &mail.attachment {
            let bytes = std::fs::read(path)?;
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            body["attachments"] = json!([{
                "content": encoded,
                "filename": filename,
                "disposition": "attachment",
            }]);
        }

        Ok(body)
    }
}

#[async_trait]
impl MailGateway for SendGridGateway {
    async fn send(&self, mail: &OutboundMail) -> Result<Option<String>, MailError> {
        let url = format!("{}/v3/mail/send", self.base_url);
        let payload = self.payload(mail)?;

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MailError::Timeout {
                        elapsed_secs: self.timeout_secs,
                    }
                } else {
                    MailError::Unavailable {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        if status.is_client_error() {
            let excerpt = resp.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                reason: format!("HTTP {status} — {excerpt}"),
            });
        }
        if !status.is_success() {
            return Err(MailError::Unavailable {
                reason: format!("HTTP {status}"),
            });
        }

        let message_id = resp
            .headers()
            .get("X-Message-Id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        Ok(message_id)
    }
}
