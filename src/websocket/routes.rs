use crate::api::accounts::{login, register};
use crate::api::profile::{claim_reward, profile, reward_status};
use crate::config::Config;
use crate::database::DatabaseConfig;
use crate::server::GameServer;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;

use super::handler::websocket_handler;
use super::metrics::metrics_handler;

/// Create the Axum router with the JSON API and WebSocket endpoint
pub fn create_router(cors_origins: &str) -> axum::Router<Arc<GameServer>> {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    // Parse CORS origins
    let cors = if cors_origins == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("No valid CORS origins configured, using permissive CORS");
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    axum::Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/profile", get(profile))
        .route("/api/daily-reward", get(reward_status))
        .route("/api/daily-reward/claim", post(claim_reward))
        .route("/api/ws", get(websocket_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Bind `addr` and serve until the listener fails.
pub async fn run_server(addr: SocketAddr, config: Config) -> anyhow::Result<()> {
    let cors_origins = config.security.cors_origins.clone();
    let game_server = GameServer::new(config, DatabaseConfig::default())?;
    let app = create_router(&cors_origins).with_state(game_server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        cors_origins = %cors_origins,
        "Server started over HTTP - API: /api, WebSocket: /api/ws, Metrics: /metrics"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
