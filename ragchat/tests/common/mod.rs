//! Stub downstream servers shared by the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use ragchat::{ChatGateway, RagChatConfig};

/// Serves `router` on an ephemeral localhost port for the rest of the test.
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// An address nothing listens on: bound once, then released.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    addr
}

/// Records every body POSTed to it and answers with a fixed status and body.
#[derive(Clone)]
pub struct StubWebhook {
    pub received: Arc<Mutex<Vec<Value>>>,
    status: StatusCode,
    body: String,
}

impl StubWebhook {
    pub fn json(status: u16, body: Value) -> Self {
        Self::raw(status, body.to_string())
    }

    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            received: Arc::new(Mutex::new(Vec::new())),
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.into(),
        }
    }

    pub fn hits(&self) -> usize {
        self.received.lock().expect("lock").len()
    }

    pub fn last(&self) -> Option<Value> {
        self.received.lock().expect("lock").last().cloned()
    }

    /// Starts the stub and returns its full URL for `path`.
    pub async fn start(&self, path: &str) -> String {
        let router = Router::new()
            .route(path, post(stub_handler))
            .with_state(self.clone());
        let addr = spawn_router(router).await;
        format!("http://{}{}", addr, path)
    }
}

async fn stub_handler(State(stub): State<StubWebhook>, Json(body): Json<Value>) -> impl IntoResponse {
    stub.received.lock().expect("lock").push(body);
    (
        stub.status,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        stub.body.clone(),
    )
}

/// A minimal retrieval service speaking the `/`, `/health`, `/ingest`,
/// `/query`, `/stats` contract. `/query` records the request it received.
#[derive(Clone, Default)]
pub struct StubRetrieval {
    pub queries: Arc<Mutex<Vec<Value>>>,
    pub ingests: Arc<Mutex<Vec<Value>>>,
}

impl StubRetrieval {
    pub async fn start(&self) -> String {
        let router = Router::new()
            .route("/", get(info_handler))
            .route("/health", get(health_handler))
            .route("/stats", get(stats_handler))
            .route("/ingest", post(ingest_handler))
            .route("/query", post(query_handler))
            .with_state(self.clone());
        let addr = spawn_router(router).await;
        format!("http://{}", addr)
    }
}

async fn info_handler() -> Json<Value> {
    Json(json!({
        "service": "LangGraph Documentation RAG Service",
        "status": "running",
        "endpoints": {
            "/health": "GET - Health check",
            "/ingest": "POST - Ingest documents",
            "/query": "POST - Query the RAG system",
            "/stats": "GET - Get ingestion statistics"
        }
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy", "index_ready": true, "documents_ingested": 2 }))
}

async fn stats_handler() -> Json<Value> {
    Json(json!({
        "status": "success",
        "document_count": 2,
        "vector_count": 17,
        "pages": [
            { "url": "https://docs.example/langgraph/overview", "title": "Overview", "length": 4200, "page_number": 1 },
            { "url": "https://docs.example/langgraph/graphs", "title": "Graphs", "length": 3100, "page_number": 2 }
        ]
    }))
}

async fn ingest_handler(State(stub): State<StubRetrieval>, Json(body): Json<Value>) -> impl IntoResponse {
    stub.ingests.lock().expect("lock").push(body.clone());
    if body.get("url").and_then(|v| v.as_str()) == Some("https://empty.example/") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": "error",
                "message": "No documents provided or scraped",
                "pages_scraped": []
            })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": "Successfully ingested 1 documents",
            "document_count": 1,
            "pages_scraped": [
                { "url": "https://docs.example/langgraph/overview", "title": "Overview", "length": 4200, "page_number": 1 }
            ],
            "total_characters": 4200
        })),
    )
}

async fn query_handler(State(stub): State<StubRetrieval>, Json(body): Json<Value>) -> impl IntoResponse {
    stub.queries.lock().expect("lock").push(body.clone());
    let question = body.get("question").and_then(|v| v.as_str()).unwrap_or_default();
    if question == "before ingest" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": "error",
                "answer": "No documents have been ingested yet. Please ingest documents first.",
                "sources": []
            })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "answer": format!("answer to: {}", question),
            "sources": [
                {
                    "text": "LangGraph is a low-level orchestration framework...",
                    "score": 0.91,
                    "metadata": { "source": "https://docs.example/langgraph/overview", "title": "Overview", "page_number": 1 }
                }
            ]
        })),
    )
}

/// Starts a gateway whose webhook points at `webhook_url`; returns its base URL.
pub async fn start_gateway(webhook_url: &str) -> String {
    let mut config = RagChatConfig::default();
    config.webhook.url = webhook_url.to_string();
    config.webhook.timeout_secs = 5;
    let gateway = ChatGateway::new(&config).expect("gateway");
    let addr = spawn_router(gateway.router()).await;
    format!("http://{}", addr)
}
