use std::future::Future;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{RagChatConfig, CHAT_ROUTE};
use crate::error::{RelayError, RelayResult};
use crate::retrieval::RetrievalClient;
use crate::workflow::WorkflowBridge;

use super::{ChatBackend, ChatRequest, ChatRelay};

/// HTTP surface of the relay: `POST /api/chat` and `GET /health`, plus the
/// workflow bridge route when enabled.
#[derive(Clone)]
pub struct ChatGateway {
    state: Arc<GatewayState>,
    bind_addr: String,
    allowed_origins: Vec<String>,
    workflow: Option<(String, WorkflowBridge)>,
}

struct GatewayState {
    backend: Arc<dyn ChatBackend>,
    workflow_enabled: bool,
    llm_api_key: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayHealth {
    pub ok: bool,
    pub backend: String,
    pub workflow_enabled: bool,
    /// `SET` or `NOT_SET`; the key itself is never exposed.
    pub llm_api_key: String,
}

impl ChatGateway {
    /// Builds the gateway with the webhook relay as its backend.
    pub fn new(config: &RagChatConfig) -> RelayResult<Self> {
        let relay = ChatRelay::new(&config.webhook)?;
        Self::with_backend(Arc::new(relay), config)
    }

    pub fn with_backend(backend: Arc<dyn ChatBackend>, config: &RagChatConfig) -> RelayResult<Self> {
        let workflow = if config.workflow.enabled {
            if config.workflow.path == CHAT_ROUTE {
                return Err(RelayError::Server(format!(
                    "workflow path '{}' collides with the relay route",
                    config.workflow.path
                )));
            }
            let retrieval = RetrievalClient::new(&config.retrieval)?;
            Some((
                config.workflow.path.clone(),
                WorkflowBridge::new(retrieval, config.retrieval.top_k),
            ))
        } else {
            None
        };

        let state = GatewayState {
            backend,
            workflow_enabled: workflow.is_some(),
            llm_api_key: config.llm.api_key_flag(),
        };

        Ok(Self {
            state: Arc::new(state),
            bind_addr: config.gateway.bind_addr.clone(),
            allowed_origins: config.gateway.allowed_origins.clone(),
            workflow,
        })
    }

    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route(CHAT_ROUTE, post(chat_handler))
            .route("/health", get(health_handler))
            .with_state(self.state.clone());

        if let Some((path, bridge)) = &self.workflow {
            router = router.merge(bridge.clone().router(path));
        }

        router
            .layer(cors_layer(&self.allowed_origins))
            .layer(TraceLayer::new_for_http())
    }

    /// Binds the configured address and serves until Ctrl-C.
    pub async fn serve(self) -> RelayResult<()> {
        let listener = TcpListener::bind(self.bind_addr.as_str())
            .await
            .map_err(|e| RelayError::Server(format!("bind {}: {}", self.bind_addr, e)))?;
        self.serve_on(listener, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
    }

    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> RelayResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener
            .local_addr()
            .map_err(|e| RelayError::Server(e.to_string()))?;
        info!(
            "Chat gateway listening on {} (backend: {})",
            local_addr,
            self.state.backend.describe()
        );
        if let Some((path, _)) = &self.workflow {
            info!("Workflow bridge mounted at {}", path);
        }

        axum::serve(listener, self.router().into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RelayError::Server(e.to_string()))
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

async fn chat_handler(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, RelayError> {
    let Json(request) = payload.map_err(|rejection| RelayError::InvalidRequest(rejection.body_text()))?;
    let message = request.validate()?;

    match state.backend.ask(&message).await {
        Ok(answer) => Ok(Json(answer)),
        Err(e) => {
            warn!("Chat relay failed: {}", e);
            Err(e)
        }
    }
}

async fn health_handler(State(state): State<Arc<GatewayState>>) -> Json<GatewayHealth> {
    Json(GatewayHealth {
        ok: true,
        backend: state.backend.describe(),
        workflow_enabled: state.workflow_enabled,
        llm_api_key: state.llm_api_key.to_string(),
    })
}
