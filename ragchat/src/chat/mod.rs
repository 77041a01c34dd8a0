//! Chat relay: the `/api/chat` surface and the downstream it forwards to.

pub mod gateway;
pub mod relay;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, RelayResult};

pub use gateway::{ChatGateway, GatewayHealth};
pub use relay::ChatRelay;

/// Inbound body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Presence check only: the message must exist and contain something
    /// other than whitespace. The original text is returned untouched.
    pub fn validate(self) -> RelayResult<String> {
        match self.message {
            Some(message) if !message.trim().is_empty() => Ok(message),
            Some(_) => Err(RelayError::InvalidRequest(
                "field 'message' must not be empty".to_string(),
            )),
            None => Err(RelayError::InvalidRequest(
                "request body must include a 'message' string".to_string(),
            )),
        }
    }
}

/// Body sent to the workflow webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl WebhookPayload {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            timestamp: Some(iso_timestamp()),
        }
    }
}

/// UTC, millisecond precision, `Z` suffix: `2025-01-01T12:00:00.000Z`.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Where a chat message goes after validation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn ask(&self, message: &str) -> RelayResult<serde_json::Value>;

    /// Human-readable target, used in logs and `/health`.
    fn describe(&self) -> String;
}
