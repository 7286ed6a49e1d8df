use crate::api::ApiError;
use crate::auth::AuthenticatedUser;
use crate::server::GameServer;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::Response;
use std::sync::Arc;

use super::error::UpgradeError;
use super::pumps::run_connection;

/// Upgrades an authenticated request into a hub connection.
pub async fn websocket_handler(
    AuthenticatedUser(identity): AuthenticatedUser,
    State(server): State<Arc<GameServer>>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let upgrade = upgrade.map_err(|rejection| {
        let reason = rejection.body_text();
        tracing::warn!(user_id = identity.user_id, %reason, "Rejected WebSocket handshake");
        UpgradeError::Handshake(reason)
    })?;

    let user_id = identity.user_id;
    let max_message_size = server.hub().config().max_message_size;

    Ok(upgrade
        .max_message_size(max_message_size)
        .on_failed_upgrade(move |err| {
            tracing::warn!(user_id, error = %err, "WebSocket upgrade failed");
        })
        .on_upgrade(move |socket| run_connection(socket, server, identity)))
}
