mod auth;
mod catalog;
mod config;
mod db;
mod errors;
mod llm_client;
mod mentor;
mod models;
mod roadmap;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::client::CareerNetClient;
use crate::catalog::qualification::QualificationClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobTalk API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize MySQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize external reference-data clients
    let catalog = CareerNetClient::new(
        config.careernet_base_url.clone(),
        config.careernet_api_key.clone(),
    )?;
    let qualifications =
        QualificationClient::new(config.qnet_base_url.clone(), config.qnet_service_key.clone())?;
    info!(
        "CareerNet client initialized ({}), catalog batch size {}",
        config.careernet_base_url, config.catalog_batch_size
    );

    let policy = config.roadmap_policy();
    info!(
        "Roadmap policy: {} attempts, {}-{} nodes",
        policy.max_attempts, policy.min_nodes, policy.max_nodes
    );

    // Build app state
    let state = AppState {
        db,
        llm: Arc::new(llm),
        catalog: Arc::new(catalog),
        qualifications,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the frontend origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
