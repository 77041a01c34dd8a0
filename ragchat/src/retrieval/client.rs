use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::RetrievalConfig;
use crate::error::{RelayError, RelayResult};

use super::{
    IngestRequest, IngestResponse, QueryRequest, QueryResponse, ServiceHealth, ServiceInfo,
    StatsResponse,
};

#[derive(Clone)]
pub struct RetrievalClient {
    client: Client,
    base_url: String,
}

impl RetrievalClient {
    pub fn new(config: &RetrievalConfig) -> RelayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RelayError::Client(e.to_string()))?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn info(&self) -> RelayResult<ServiceInfo> {
        self.get_json("/").await
    }

    pub async fn health(&self) -> RelayResult<ServiceHealth> {
        self.get_json("/health").await
    }

    pub async fn stats(&self) -> RelayResult<StatsResponse> {
        self.get_json("/stats").await
    }

    pub async fn ingest(&self, request: &IngestRequest) -> RelayResult<IngestResponse> {
        self.post_json("/ingest", request).await
    }

    pub async fn query(&self, request: &QueryRequest) -> RelayResult<QueryResponse> {
        self.post_json("/query", request).await
    }

    /// Same call as [`query`](Self::query) but keeps the service's JSON
    /// untouched, for relaying.
    pub async fn query_raw(&self, request: &QueryRequest) -> RelayResult<serde_json::Value> {
        self.post_json("/query", request).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> RelayResult<T> {
        let url = self.endpoint(path);
        debug!("GET {}", url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RelayError::unreachable(&url, &e))?;
        decode(&url, resp).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> RelayResult<T> {
        let url = self.endpoint(path);
        debug!("POST {}", url);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| RelayError::unreachable(&url, &e))?;
        decode(&url, resp).await
    }
}

async fn decode<T: DeserializeOwned>(url: &str, resp: reqwest::Response) -> RelayResult<T> {
    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|e| RelayError::unreachable(url, &e))?;
    if !status.is_success() {
        warn!("Retrieval service {} responded with status {}", url, status);
        return Err(match error_message(&body) {
            Some(message) => RelayError::ServiceError {
                url: url.to_string(),
                status: status.as_u16(),
                message,
            },
            None => RelayError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            },
        });
    }
    serde_json::from_slice(&body).map_err(|e| RelayError::InvalidUpstreamBody {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// The explanation carried by a `status: "error"` body: ingest failures use
/// `message`, query failures put it in `answer`.
fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "answer"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}
