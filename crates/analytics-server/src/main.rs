//! web3-analytics HTTP Server
//!
//! Axum-based server exposing the analytics tools over the uniform tool
//! contract: list schemas, execute a call by name.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use toolkit_core::ToolRegistry;
use web3_analytics::{register_tools, AnalyticsConfig, DataSourceMode, DataSources};

use crate::handlers::{execute_tool, health_check, list_tools};
use crate::state::AppState;

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/{name}", post(execute_tool))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = AnalyticsConfig::from_env();
    config.validate()?;

    let sources = DataSources::from_config(&config)?;
    match config.data_source {
        DataSourceMode::Live => tracing::info!(
            market = sources.market.name(),
            defi = sources.defi.name(),
            gas = sources.gas.name(),
            "Using live data sources"
        ),
        DataSourceMode::Mock => tracing::warn!("Using mock data sources (ANALYTICS_DATA_SOURCE=mock)"),
    }
    if config.etherscan_api_key.is_none() {
        tracing::warn!("ETHERSCAN_API_KEY not set, gas oracle requests may be rate limited");
    }

    let mut tools = ToolRegistry::new();
    register_tools(&mut tools, &sources, &config);

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let state = AppState {
        tools: Arc::new(tools),
        data_source: config.data_source,
    };

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("web3-analytics server running on http://{}", addr);
    tracing::info!("  GET  /health            - Health check");
    tracing::info!("  GET  /api/tools         - Tool schemas");
    tracing::info!("  POST /api/tools/{{name}}  - Execute a tool");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
