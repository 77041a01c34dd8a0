// RAG Chat Relay
// Forwards chat messages to a workflow webhook that fronts a retrieval service.

pub mod chat;
pub mod config;
pub mod error;
pub mod retrieval;
pub mod telemetry;
pub mod workflow;

pub use chat::{ChatBackend, ChatGateway, ChatRelay, ChatRequest, WebhookPayload};
pub use config::RagChatConfig;
pub use error::{ConfigError, ErrorBody, RelayError, RelayResult};
pub use retrieval::RetrievalClient;
pub use workflow::WorkflowBridge;
