//! The two per-connection loops and the task that supervises them.
//!
//! The inbound pump owns the read half and forwards every data frame to the
//! hub. The outbound pump owns the write half and drains the connection's
//! mailbox in order. Whichever stops first fires the close signal, which
//! stops the other, and the connection is then unregistered.

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use bytes::Bytes;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::PumpError;
use crate::hub::{ConnectionId, Hub, Message as HubMessage, UserIdentity};
use crate::server::GameServer;

/// How long a cancelled outbound pump waits for the transport to close.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Reads frames until the peer closes, the read fails, or `close` fires.
///
/// Text and binary frames are broadcast verbatim; control frames are
/// ignored (pings are answered by the transport).
pub async fn inbound_pump<S, E>(
    mut stream: S,
    conn_id: ConnectionId,
    hub: Hub,
    close: CancellationToken,
) -> Result<(), PumpError>
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        let frame = tokio::select! {
            biased;
            () = close.cancelled() => return Ok(()),
            frame = stream.next() => frame,
        };

        match frame {
            None => return Ok(()),
            Some(Err(err)) => return Err(PumpError::Read(err.to_string())),
            Some(Ok(Message::Text(text))) => {
                hub.broadcast(Bytes::from(text)).await;
            }
            Some(Ok(Message::Binary(data))) => hub.broadcast(data).await,
            Some(Ok(Message::Close(frame))) => {
                debug!(%conn_id, ?frame, "Peer closed connection");
                return Ok(());
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
        }
    }
}

/// Writes mailbox payloads in arrival order.
///
/// When the registry drops the mailbox (unregister) the frames already
/// queued are still written, then a Close frame, then `close` is fired so
/// the inbound pump stops too. Every write is raced against `close`, so a
/// peer that stopped reading cannot hold the pump open once it is signalled.
pub async fn outbound_pump<Si>(
    mut sink: Si,
    mut mailbox: mpsc::Receiver<Bytes>,
    close: CancellationToken,
) -> Result<(), PumpError>
where
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
{
    loop {
        tokio::select! {
            biased;
            payload = mailbox.recv() => match payload {
                Some(payload) => {
                    let frame = frame_for(payload);
                    match send_unless_closed(&mut sink, frame, &close).await {
                        Ok(true) => {}
                        Ok(false) => return Ok(()),
                        Err(err) => {
                            close.cancel();
                            return Err(err);
                        }
                    }
                }
                None => {
                    let result = send_unless_closed(&mut sink, Message::Close(None), &close)
                        .await
                        .map(|_| ());
                    close.cancel();
                    return result;
                }
            },
            () = close.cancelled() => {
                match tokio::time::timeout(CLOSE_GRACE, sink.close()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => debug!(error = %err, "Closing write half failed"),
                    Err(_) => debug!("Write half did not close in time"),
                }
                return Ok(());
            }
        }
    }
}

/// Writes one frame unless `close` fires first. `Ok(false)` means the frame
/// was abandoned because the connection is closing.
async fn send_unless_closed<Si>(
    sink: &mut Si,
    frame: Message,
    close: &CancellationToken,
) -> Result<bool, PumpError>
where
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
{
    tokio::select! {
        biased;
        () = close.cancelled() => Ok(false),
        result = sink.send(frame) => result
            .map(|()| true)
            .map_err(|err| PumpError::Write(err.to_string())),
    }
}

/// Payloads are opaque to the hub; valid UTF-8 goes out as text.
fn frame_for(payload: Bytes) -> Message {
    match Utf8Bytes::try_from(payload.clone()) {
        Ok(text) => Message::Text(text),
        Err(_) => Message::Binary(payload),
    }
}

/// Drives one upgraded socket for its whole life.
pub async fn run_connection(socket: WebSocket, server: Arc<GameServer>, identity: UserIdentity) {
    let hub = server.hub().clone();
    let (connection, handle) = hub.open_connection(identity);
    let conn_id = connection.id();
    let identity = connection.identity().clone();
    let close = connection.close_signal();
    let (sink, stream) = socket.split();

    hub.register(handle).await;
    info!(%conn_id, user_id = identity.user_id, username = %identity.username, "WebSocket connection established");
    if hub.config().announce_presence {
        hub.broadcast_message(&HubMessage::user_joined(&identity))
            .await;
    }

    let mut outbound = tokio::spawn(outbound_pump(sink, connection.into_mailbox(), close.clone()));
    let mut inbound = tokio::spawn(inbound_pump(stream, conn_id, hub.clone(), close.clone()));

    let remaining = tokio::select! {
        result = &mut inbound => {
            log_pump_exit(conn_id, "inbound", result);
            ("outbound", outbound)
        }
        result = &mut outbound => {
            log_pump_exit(conn_id, "outbound", result);
            ("inbound", inbound)
        }
    };

    close.cancel();
    hub.unregister(conn_id).await;

    let (name, task) = remaining;
    log_pump_exit(conn_id, name, task.await);

    if hub.config().announce_presence {
        hub.broadcast_message(&HubMessage::user_left(&identity))
            .await;
    }
    info!(%conn_id, user_id = identity.user_id, "WebSocket connection closed");
}

fn log_pump_exit(
    conn_id: ConnectionId,
    pump: &'static str,
    result: Result<Result<(), PumpError>, JoinError>,
) {
    match result {
        Ok(Ok(())) => debug!(%conn_id, pump, "Pump finished"),
        Ok(Err(err)) => debug!(%conn_id, pump, error = %err, "Pump stopped"),
        Err(err) => warn!(%conn_id, pump, error = %err, "Pump task failed"),
    }
}
