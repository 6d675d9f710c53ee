//! Research Paper Comparator Server
//!
//! Serves a single-page form where a user uploads two research papers and an
//! OpenAI API key, and a REST endpoint that runs the comparison:
//!
//! - KPI comparison and per-paper highlights from a hosted chat model
//! - Keyword clouds for both papers
//! - A downloadable DOCX report
//!
//! The API key arrives with each request and is only used for that request.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use paper_insights::config::{ComparatorConfig, DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;

use api::{handle_compare, handle_health, handle_index};

/// Command-line arguments for the comparator server
#[derive(Parser, Debug)]
#[command(name = "paper-compare-server")]
#[command(about = "Research paper comparator with KPI and visual insights")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8501")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Chat model used for all three calls
    #[arg(long, env = "PAPER_COMPARE_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// Maximum request body size in megabytes
    #[arg(long, default_value = "200")]
    max_upload_mb: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ComparatorConfig>,
    /// Pooled outbound client; credentials are attached per request
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: ComparatorConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}

/// Routes and middleware shared by `main` and the HTTP tests
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/api/compare", post(handle_compare))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Request body limit in bytes for `--max-upload-mb`
fn upload_limit_bytes(max_upload_mb: usize) -> usize {
    max_upload_mb.saturating_mul(1024 * 1024)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting paper comparator on {}:{}", args.host, args.port);

    let config = ComparatorConfig::default()
        .with_model(args.model)
        .with_api_base_url(args.api_base_url);
    info!("Model: {}, endpoint: {}", config.model, config.api_base_url);

    let app = build_router(AppState::new(config), upload_limit_bytes(args.max_upload_mb));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Upload limit: {} MB", args.max_upload_mb);

    axum::serve(listener, app).await?;

    Ok(())
}
