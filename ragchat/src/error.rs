//! Error types for the relay and its configuration.
//!
//! Every failure seen by an HTTP caller collapses into [`ErrorBody`]; the
//! variant only decides the status code and the `details` text.

use std::error::Error as _;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON shape returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    InvalidRequest(String),
    /// A webhook payload without a usable `question`.
    #[error("{0}")]
    InvalidQuestion(String),
    #[error("downstream unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },
    #[error("downstream {url} responded with status {status}")]
    UpstreamStatus { url: String, status: u16 },
    /// Non-2xx response whose body explained itself.
    #[error("downstream {url} responded with status {status}: {message}")]
    ServiceError {
        url: String,
        status: u16,
        message: String,
    },
    #[error("downstream {url} returned an invalid JSON body: {reason}")]
    InvalidUpstreamBody { url: String, reason: String },
    #[error("HTTP client error: {0}")]
    Client(String),
    #[error("gateway server error: {0}")]
    Server(String),
}

pub type RelayResult<T> = Result<T, RelayError>;

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidRequest(_) | RelayError::InvalidQuestion(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wraps a transport-level reqwest failure, keeping the source chain in
    /// the reason so "connection refused" and friends survive into `details`.
    pub(crate) fn unreachable(url: &str, err: &reqwest::Error) -> Self {
        let mut reason = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            reason.push_str(": ");
            reason.push_str(&cause.to_string());
            source = cause.source();
        }
        RelayError::Unreachable {
            url: url.to_string(),
            reason,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let error = match self {
            RelayError::InvalidRequest(_) => "Message is required",
            RelayError::InvalidQuestion(_) => "Question is required",
            _ => "Failed to process message",
        };
        ErrorBody {
            error: error.to_string(),
            details: self.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
