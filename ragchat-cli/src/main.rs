//! Operator client for the RAG chat stack.
//!
//! `ask` goes through the relay like the web UI does; the other commands
//! talk to the retrieval service directly.

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::json;

use ragchat::config::{DEFAULT_BIND_ADDR, DEFAULT_RETRIEVAL_URL, RETRIEVAL_URL_ENV};
use ragchat::retrieval::{
    IngestRequest, IngestResponse, QueryRequest, QueryResponse, DEFAULT_INGEST_URL,
    DEFAULT_MAX_PAGES,
};
use ragchat::telemetry::init_tracing;
use ragchat::{ErrorBody, RetrievalClient};

#[derive(Parser, Debug)]
#[command(name = "ragchat")]
#[command(version)]
#[command(about = "Ask, ingest and inspect the RAG chat stack")]
struct Cli {
    /// Retrieval service base URL
    #[arg(long, global = true, env = RETRIEVAL_URL_ENV, default_value = DEFAULT_RETRIEVAL_URL)]
    rag_url: String,

    /// Print raw JSON instead of a summary
    #[arg(long, global = true)]
    json: bool,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = 120)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a chat message through the relay gateway
    Ask {
        message: String,
        #[arg(long, env = "RAGCHAT_GATEWAY_URL", default_value_t = format!("http://{}", DEFAULT_BIND_ADDR))]
        gateway_url: String,
    },
    /// Ask the retrieval service to scrape and index documentation
    Ingest {
        #[arg(long, default_value = DEFAULT_INGEST_URL)]
        url: String,
        #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
        max_pages: u32,
    },
    /// Query the retrieval service directly
    Query {
        question: String,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Show ingestion statistics
    Stats,
    /// Show retrieval service health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(&["ragchat=warn"]);
    let cli = Cli::parse();

    let http = Client::builder()
        .timeout(Duration::from_secs(cli.timeout_secs))
        .build()?;
    let retrieval = RetrievalClient::with_client(http.clone(), cli.rag_url.clone());

    match cli.command {
        Commands::Ask { message, gateway_url } => {
            let resp = http
                .post(format!("{}/api/chat", gateway_url.trim_end_matches('/')))
                .json(&json!({ "message": message }))
                .send()
                .await
                .with_context(|| format!("gateway unreachable at {}", gateway_url))?;
            let status = resp.status();
            let body: serde_json::Value = resp.json().await.context("gateway returned invalid JSON")?;
            if !status.is_success() {
                let err: ErrorBody = serde_json::from_value(body)
                    .unwrap_or_else(|_| ErrorBody {
                        error: format!("gateway returned {}", status),
                        details: String::new(),
                    });
                anyhow::bail!("{}: {}", err.error, err.details);
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                match serde_json::from_value::<QueryResponse>(body.clone()) {
                    Ok(answer) => print_answer(&answer),
                    Err(_) => println!("{}", serde_json::to_string_pretty(&body)?),
                }
            }
        }
        Commands::Ingest { url, max_pages } => {
            let resp = retrieval
                .ingest(&IngestRequest {
                    url: Some(url),
                    max_pages: Some(max_pages),
                })
                .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
            } else {
                print_ingest(&resp);
            }
        }
        Commands::Query { question, top_k } => {
            let mut request = QueryRequest::new(question);
            request.top_k = top_k;
            let resp = retrieval.query(&request).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
            } else {
                print_answer(&resp);
            }
        }
        Commands::Stats => {
            let stats = retrieval.stats().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("status:    {}", stats.status);
                if let Some(message) = &stats.message {
                    println!("message:   {}", message);
                }
                if let Some(count) = stats.document_count {
                    println!("documents: {}", count);
                }
                if let Some(count) = stats.vector_count {
                    println!("vectors:   {}", count);
                }
                for page in &stats.pages {
                    println!("  [{}] {} ({} chars)", page.page_number, page.title, page.length);
                }
            }
        }
        Commands::Health => {
            let health = retrieval.health().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!(
                    "{} (index ready: {}, documents: {})",
                    health.status, health.index_ready, health.documents_ingested
                );
            }
        }
    }
    Ok(())
}

fn print_answer(resp: &QueryResponse) {
    println!("{}", resp.answer);
    if resp.sources.is_empty() {
        return;
    }
    println!();
    println!("Sources:");
    for (i, source) in resp.sources.iter().enumerate() {
        let title = source.title().unwrap_or("untitled");
        let score = source
            .score
            .map(|s| format!("{:.3}", s))
            .unwrap_or_else(|| "-".to_string());
        match source.url() {
            Some(url) => println!("  {}. {} [{}] {}", i + 1, title, score, url),
            None => println!("  {}. {} [{}]", i + 1, title, score),
        }
    }
}

fn print_ingest(resp: &IngestResponse) {
    println!("{}", resp.message);
    for page in &resp.pages_scraped {
        println!("  [{}] {} ({} chars) {}", page.page_number, page.title, page.length, page.url);
    }
    if let Some(total) = resp.total_characters {
        println!("total characters: {}", total);
    }
}
