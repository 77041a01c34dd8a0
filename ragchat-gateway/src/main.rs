//! RAG Chat Gateway
//!
//! Serves the chat relay (`POST /api/chat`) and, optionally, the built-in
//! workflow bridge that stands in for the external workflow engine.
//!
//! Usage:
//!   ragchat-gateway serve --config ragchat.toml
//!   ragchat-gateway serve --webhook-url http://localhost:5678/webhook/chat
//!   ragchat-gateway check-config

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use ragchat::config::{CONFIG_PATH_ENV, RETRIEVAL_URL_ENV, WEBHOOK_URL_ENV};
use ragchat::telemetry::{init_tracing, DEFAULT_DIRECTIVES};
use ragchat::{ChatGateway, RagChatConfig};

#[derive(Parser)]
#[command(name = "ragchat-gateway")]
#[command(version)]
#[command(about = "RAG chat relay gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the relay until Ctrl-C
    Serve(ServeArgs),
    /// Print the resolved configuration (API key masked) and exit
    CheckConfig(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Path to configuration file (TOML format)
    #[arg(long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    #[arg(long)]
    bind_addr: Option<String>,

    /// Workflow webhook the relay forwards to
    #[arg(long, env = WEBHOOK_URL_ENV)]
    webhook_url: Option<String>,

    /// Retrieval service base URL (used by the workflow bridge)
    #[arg(long, env = RETRIEVAL_URL_ENV)]
    retrieval_url: Option<String>,

    /// Mount the built-in workflow bridge
    #[arg(long)]
    enable_workflow: bool,

    #[arg(long)]
    workflow_path: Option<String>,

    #[arg(long)]
    top_k: Option<usize>,

    /// Comma-separated CORS origins; empty allows any origin
    #[arg(long, value_delimiter = ',')]
    allowed_origins: Vec<String>,
}

impl ServeArgs {
    /// Config file and environment first, then CLI flags on top.
    fn resolve(self) -> anyhow::Result<RagChatConfig> {
        let mut config = RagChatConfig::layered(self.config.as_deref())?;

        if let Some(bind_addr) = self.bind_addr {
            config.gateway.bind_addr = bind_addr;
        }
        if let Some(url) = self.webhook_url {
            config.webhook.url = url;
        }
        if let Some(url) = self.retrieval_url {
            config.retrieval.base_url = url;
        }
        if self.enable_workflow {
            config.workflow.enabled = true;
        }
        if let Some(path) = self.workflow_path {
            config.workflow.path = path;
        }
        if let Some(top_k) = self.top_k {
            config.retrieval.top_k = top_k;
        }
        if !self.allowed_origins.is_empty() {
            config.gateway.allowed_origins = self.allowed_origins;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(DEFAULT_DIRECTIVES);
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let config = args.resolve()?;
            info!("Webhook URL: {}", config.webhook.url);
            info!("LLM API key: {}", config.llm.api_key_flag());
            ChatGateway::new(&config)?.serve().await?;
        }
        Commands::CheckConfig(args) => {
            let config = args.resolve()?;
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
    }
    Ok(())
}
