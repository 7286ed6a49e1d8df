use crate::hub::HubMetricsSnapshot;
use crate::server::GameServer;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    /// Live membership as reported by the hub's coordinating task.
    pub connections: usize,
    pub registered_users: usize,
    pub hub: HubMetricsSnapshot,
}

/// Hub counters and live connection count as JSON.
pub async fn metrics_handler(State(server): State<Arc<GameServer>>) -> Json<MetricsResponse> {
    let hub = server.hub();
    Json(MetricsResponse {
        connections: hub.connection_count().await,
        registered_users: server.users().user_count().await,
        hub: hub.metrics().snapshot(),
    })
}
