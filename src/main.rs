use std::sync::Arc;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cache::{MemoizedFetcher, DEFAULT_CAPACITY};
use crate::config::Config;
use crate::models::StatKind;
use crate::provider::FanGraphsProvider;
use crate::routes::AppState;
use crate::stats::StatsService;

mod cache;
mod config;
mod error;
mod models;
mod provider;
mod routes;
mod stats;
mod table;

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting baseball stats server...");

    let config = Config::from_env().expect("Invalid server configuration");

    let provider = Arc::new(FanGraphsProvider::with_base_url(config.provider_base_url.clone()));
    let fetcher = MemoizedFetcher::new(provider);
    tracing::info!(
        "Using stats provider at {}, caching up to {} seasons for each of {} stat kinds",
        config.provider_base_url,
        DEFAULT_CAPACITY,
        StatKind::ALL.len()
    );

    let state = AppState::new(StatsService::new(fetcher));

    let addr = config.socket_addr();

    // Browser dashboards call this service directly
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .expect("Failed to start server.");
}
