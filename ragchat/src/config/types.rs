use serde::{Deserialize, Serialize};

/// Route the relay serves; the workflow bridge may not reuse it.
pub const CHAT_ROUTE: &str = "/api/chat";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_WEBHOOK_URL: &str = "http://localhost:5678/webhook/chat";
pub const DEFAULT_WORKFLOW_PATH: &str = "/webhook/chat";
pub const DEFAULT_RETRIEVAL_URL: &str = "http://localhost:5001";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_TOP_K: usize = 3;

/// Top-level configuration, usually loaded from `ragchat.toml`.
///
/// Every section is optional in the file; missing values take the defaults
/// below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagChatConfig {
    pub gateway: GatewayConfig,
    pub webhook: WebhookConfig,
    pub workflow: WorkflowConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind_addr: String,
    /// CORS origins allowed to call the relay. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Workflow-engine webhook the relay forwards chat messages to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WEBHOOK_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Built-in stand-in for the external workflow: webhook -> /query -> respond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: DEFAULT_WORKFLOW_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub base_url: String,
    pub top_k: usize,
    pub timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RETRIEVAL_URL.to_string(),
            top_k: DEFAULT_TOP_K,
            timeout_secs: 120,
        }
    }
}

/// Language-model provider settings. The relay never calls the provider
/// itself; it only reports whether the key is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key_env: String,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
        }
    }
}

impl LlmConfig {
    pub fn api_key_flag(&self) -> &'static str {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => "SET",
            _ => "NOT_SET",
        }
    }
}
