//! Forwards validated chat messages to the workflow webhook.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::WebhookConfig;
use crate::error::{RelayError, RelayResult};

use super::{ChatBackend, WebhookPayload};

#[derive(Clone)]
pub struct ChatRelay {
    client: Client,
    webhook_url: String,
}

impl ChatRelay {
    pub fn new(config: &WebhookConfig) -> RelayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RelayError::Client(e.to_string()))?;
        Ok(Self::with_client(client, config.url.clone()))
    }

    pub fn with_client(client: Client, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// POSTs `{question, timestamp}` and returns the webhook's JSON as-is.
    /// A non-2xx response is an error and its body is dropped.
    pub async fn forward(&self, payload: &WebhookPayload) -> RelayResult<serde_json::Value> {
        info!(
            "Forwarding question ({} chars) to {}",
            payload.question.len(),
            self.webhook_url
        );

        let resp = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                warn!("Webhook request failed: {}", e);
                RelayError::unreachable(&self.webhook_url, &e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!("Webhook responded with status {}", status);
            return Err(RelayError::UpstreamStatus {
                url: self.webhook_url.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|e| RelayError::unreachable(&self.webhook_url, &e))?;
        let value: serde_json::Value =
            serde_json::from_slice(&body).map_err(|e| RelayError::InvalidUpstreamBody {
                url: self.webhook_url.clone(),
                reason: e.to_string(),
            })?;
        debug!("Webhook returned {} bytes", body.len());
        Ok(value)
    }
}

#[async_trait]
impl ChatBackend for ChatRelay {
    async fn ask(&self, message: &str) -> RelayResult<serde_json::Value> {
        self.forward(&WebhookPayload::new(message)).await
    }

    fn describe(&self) -> String {
        format!("webhook {}", self.webhook_url)
    }
}
