//! Configuration for the relay, workflow bridge and retrieval client.
//!
//! Resolution order, lowest to highest precedence: built-in defaults, the
//! TOML file, environment variables, then CLI flags. Binaries take
//! [`RagChatConfig::layered`], apply their flags and call
//! [`RagChatConfig::validate`]; [`RagChatConfig::resolve`] is the same
//! without flags.

pub mod types;

pub use types::*;

use std::net::SocketAddr;
use std::path::Path;

use tracing::{debug, info};
use url::Url;

use crate::error::{ConfigError, ConfigResult};

pub const CONFIG_PATH_ENV: &str = "RAGCHAT_CONFIG";
pub const WEBHOOK_URL_ENV: &str = "N8N_WEBHOOK_URL";
pub const RETRIEVAL_URL_ENV: &str = "RAG_SERVICE_URL";

impl RagChatConfig {
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a config file. Falls back to `../<path>` so binaries launched
    /// from a crate directory still find the workspace config.
    pub fn load(config_path: &Path) -> ConfigResult<Self> {
        let actual_path = if config_path.exists() {
            config_path.to_path_buf()
        } else {
            let parent_path = Path::new("..").join(config_path);
            if parent_path.exists() {
                parent_path
            } else {
                return Err(ConfigError::Invalid(format!(
                    "config file not found: '{}' (also tried '../{}')",
                    config_path.display(),
                    config_path.display()
                )));
            }
        };

        let content = std::fs::read_to_string(&actual_path).map_err(|source| ConfigError::Io {
            path: actual_path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", actual_path.display());
        Ok(config)
    }

    /// Defaults, then the optional file, then process environment. Not yet
    /// validated.
    pub fn layered(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// [`layered`](Self::layered) followed by [`validate`](Self::validate).
    pub fn resolve(config_path: Option<&Path>) -> ConfigResult<Self> {
        let config = Self::layered(config_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides through `lookup` so tests can feed a
    /// fixed environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(WEBHOOK_URL_ENV) {
            debug!("Webhook URL overridden by {}", WEBHOOK_URL_ENV);
            self.webhook.url = url;
        }
        if let Some(url) = non_empty(RETRIEVAL_URL_ENV) {
            debug!("Retrieval URL overridden by {}", RETRIEVAL_URL_ENV);
            self.retrieval.base_url = url;
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = non_empty(&self.llm.api_key_env);
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.gateway
            .bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| {
                ConfigError::Invalid(format!(
                    "gateway.bind_addr '{}' is not a socket address: {}",
                    self.gateway.bind_addr, e
                ))
            })?;
        validate_http_url("webhook.url", &self.webhook.url)?;
        validate_http_url("retrieval.base_url", &self.retrieval.base_url)?;
        if !self.workflow.path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "workflow.path '{}' must start with '/'",
                self.workflow.path
            )));
        }
        if self.workflow.path == CHAT_ROUTE {
            return Err(ConfigError::Invalid(format!(
                "workflow.path '{}' collides with the relay route",
                self.workflow.path
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::Invalid(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Config rendered for display, with the API key replaced by its flag.
    pub fn redacted(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(llm) = value.get_mut("llm").and_then(|v| v.as_object_mut()) {
            llm.insert(
                "api_key".to_string(),
                serde_json::Value::String(self.llm.api_key_flag().to_string()),
            );
        }
        value
    }
}

fn validate_http_url(field: &str, raw: &str) -> ConfigResult<()> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::Invalid(format!("{} '{}' is not a valid URL: {}", field, raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid(format!(
            "{} must use http or https, got '{}'",
            field, other
        ))),
    }
}
