//! Client side of the retrieval service contract.
//!
//! The service itself (document scraping, indexing, embedding and answer
//! generation) lives outside this workspace. These types mirror the JSON it
//! speaks:
//!
//! - `GET /`        service info and endpoint list
//! - `GET /health`  index readiness
//! - `POST /ingest` `{url?, max_pages?}`
//! - `POST /query`  `{question, top_k?}` -> answer + sources
//! - `GET /stats`   ingestion statistics

pub mod client;

pub use client::RetrievalClient;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_INGEST_URL: &str = "https://docs.langchain.com/oss/python/langgraph/overview";
pub const DEFAULT_MAX_PAGES: u32 = 30;

const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub status: String,
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl QueryResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// A retrieved chunk backing an answer. `text` is truncated by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub text: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Source {
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(|v| v.as_str())
    }

    pub fn url(&self) -> Option<&str> {
        self.metadata.get("source").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub document_count: Option<u64>,
    #[serde(default)]
    pub pages_scraped: Vec<ScrapedPage>,
    #[serde(default)]
    pub total_characters: Option<u64>,
}

impl IngestResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub url: String,
    pub title: String,
    pub length: u64,
    pub page_number: u32,
}

/// `status` is `success`, `no_index` or `error`; the other fields depend on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub status: String,
    #[serde(default)]
    pub document_count: Option<u64>,
    #[serde(default)]
    pub vector_count: Option<u64>,
    #[serde(default)]
    pub pages: Vec<ScrapedPage>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    pub index_ready: bool,
    pub documents_ingested: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub status: String,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}
