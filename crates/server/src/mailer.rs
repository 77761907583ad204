// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP client for a Resend-style transactional mail API.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use rentbook_api::{Notifier, NotifyError, OutboundEmail};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

/// Mailer reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    base_url: String,
    from: String,
    timeout: Duration,
}

impl HttpMailer {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Transport` if the key is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: &str,
        from: &str,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let mut headers: HeaderMap = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                NotifyError::Transport(format!("invalid mail API key header value: {e}"))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client: reqwest::Client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            from: from.to_string(),
            timeout,
        })
    }

    /// The request body for one email.
    fn payload(&self, email: &OutboundEmail) -> Value {
        let mut body: Value = json!({
            "from": self.from,
            "to": email.to,
            "template": {
                "id": email.template_id,
                "variables": email.data,
            },
        });
        if !email.attachments.is_empty() {
            let attachments: Vec<Value> = email
                .attachments
                .iter()
                .map(|attachment| {
                    json!({
                        "filename": attachment.filename,
                        "content": STANDARD.encode(attachment.content.as_bytes()),
                        "content_type": attachment.content_type,
                    })
                })
                .collect();
            body["attachments"] = Value::Array(attachments);
        }
        body
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotifyError> {
        let response: reqwest::Response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .json(&self.payload(&email))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Timeout(self.timeout)
                } else {
                    NotifyError::Transport(format!("HTTP request failed: {e}"))
                }
            })?;

        let status: StatusCode = response.status();
        debug!(
            status = %status,
            template_id = %email.template_id,
            recipients = email.to.len(),
            "Mail API response received"
        );
        if status.is_success() {
            return Ok(());
        }

        let body: String = response.text().await.unwrap_or_default();
        let message: String = format!("mail API returned {status}: {body}");
        if status.is_client_error() {
            Err(NotifyError::Rejected(message))
        } else {
            Err(NotifyError::Transport(message))
        }
    }
}
