mod assessment;
mod catalog;
mod classification;
mod config;
mod db;
mod errors;
mod llm_client;
mod matching;
mod matrix;
mod maturity;
mod models;
mod profiles;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::feedback::LlmFeedbackGenerator;
use crate::catalog::seed::seed_reference_data;
use crate::classification::LlmTaskClassifier;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting competency API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and reference data
    let db = create_pool(&config.database_url, config.db_max_connections).await?;
    seed_reference_data(&db, config.template_organization_id).await?;

    // One LLM client shared by the classifier and the feedback generator
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.llm_timeout)?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let state = AppState {
        db,
        config: config.clone(),
        task_classifier: Arc::new(LlmTaskClassifier(llm.clone())),
        feedback_generator: Arc::new(LlmFeedbackGenerator(llm)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
