use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use crate::mail::{MailError, MailMessage, MailService};

/// Delivers mail by POSTing it as JSON to a relay endpoint.
#[derive(Clone)]
pub struct WebhookMailService {
    client: reqwest::Client,
    url: String,
    from_address: String,
}

impl WebhookMailService {
    /// Creates a new `WebhookMailService`.
    ///
    /// # Arguments
    ///
    /// * `url` - Endpoint that accepts `{from, to, subject, content}` JSON.
    /// * `from_address` - Sender address included with every message.
    pub fn new(url: String, from_address: String) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MailError::RequestFailed(format!("Failed to create mail client: {}", e)))?;

        Ok(Self {
            client,
            url,
            from_address,
        })
    }
}

#[async_trait]
impl MailService for WebhookMailService {
    async fn send_mail(&self, message: MailMessage) -> Result<(), MailError> {
        tracing::info!("Sending mail to {} via {}", message.address, self.url);

        let payload = json!({
            "from": self.from_address,
            "to": message.address,
            "subject": message.subject,
            "content": message.content,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::RequestFailed(format!("Mail relay request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MailError::ApiError(format!(
                "Mail relay returned {}: {}",
                status, error_text
            )));
        }

        Ok(())
    }
}
