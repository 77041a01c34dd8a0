//! In-process stand-in for the external workflow: accept the webhook
//! payload, ask the retrieval service, respond with its JSON.
//!
//! Mounting this on the gateway and pointing `webhook.url` at it runs the
//! whole chain without the low-code tool.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::routing::post;
use axum::Router;
use tracing::{info, warn};

use crate::chat::WebhookPayload;
use crate::error::{RelayError, RelayResult};
use crate::retrieval::{QueryRequest, RetrievalClient};

#[derive(Clone)]
pub struct WorkflowBridge {
    retrieval: RetrievalClient,
    top_k: usize,
}

impl WorkflowBridge {
    pub fn new(retrieval: RetrievalClient, top_k: usize) -> Self {
        Self { retrieval, top_k }
    }

    pub async fn run(&self, payload: WebhookPayload) -> RelayResult<serde_json::Value> {
        if payload.question.trim().is_empty() {
            return Err(RelayError::InvalidQuestion(
                "field 'question' must not be empty".to_string(),
            ));
        }
        info!(
            "Workflow triggered (timestamp: {}), querying {}",
            payload.timestamp.as_deref().unwrap_or("none"),
            self.retrieval.base_url()
        );
        let request = QueryRequest::new(payload.question).with_top_k(self.top_k);
        self.retrieval.query_raw(&request).await
    }

    pub fn router(self, path: &str) -> Router {
        Router::new()
            .route(path, post(webhook_handler))
            .with_state(Arc::new(self))
    }
}

async fn webhook_handler(
    State(bridge): State<Arc<WorkflowBridge>>,
    payload: Result<Json<WebhookPayload>, JsonRejection>,
) -> Result<Json<serde_json::Value>, RelayError> {
    let Json(payload) = payload.map_err(|rejection| RelayError::InvalidQuestion(rejection.body_text()))?;
    match bridge.run(payload).await {
        Ok(value) => Ok(Json(value)),
        Err(e) => {
            warn!("Workflow run failed: {}", e);
            Err(e)
        }
    }
}
