use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::connection::{ClientHandle, Connection, ConnectionId, SendOutcome, UserIdentity};
use super::message::Message;
use super::metrics::HubMetrics;
use crate::config::HubConfig;

/// Requests consumed by the coordinating task, in arrival order.
#[derive(Debug)]
enum HubCommand {
    Register(ClientHandle),
    Unregister(ConnectionId),
    Broadcast(Bytes),
    Count(oneshot::Sender<usize>),
    Contains(ConnectionId, oneshot::Sender<bool>),
}

/// Handle to the process-wide connection registry.
///
/// Every membership change and every broadcast is executed by a single
/// coordinating task, one command at a time. Cloning the handle is cheap.
#[derive(Debug, Clone)]
pub struct Hub {
    commands: mpsc::Sender<HubCommand>,
    metrics: Arc<HubMetrics>,
    config: HubConfig,
}

impl Hub {
    /// Starts the coordinating task. Must be called inside a tokio runtime.
    ///
    /// The task lives until every `Hub` clone is dropped.
    pub fn spawn(config: HubConfig) -> Self {
        let (commands, receiver) = mpsc::channel(config.command_buffer.max(1));
        let metrics = Arc::new(HubMetrics::new());

        let worker = HubWorker {
            clients: HashMap::new(),
            commands: receiver,
            metrics: metrics.clone(),
        };
        tokio::spawn(worker.run());

        Self {
            commands,
            metrics,
            config,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<HubMetrics> {
        self.metrics.clone()
    }

    /// Creates a connection whose mailbox uses the configured capacity.
    pub fn open_connection(&self, identity: UserIdentity) -> (Connection, ClientHandle) {
        Connection::open(identity, self.config.mailbox_capacity)
    }

    pub async fn register(&self, handle: ClientHandle) {
        self.submit(HubCommand::Register(handle)).await;
    }

    /// Idempotent. Removing a member closes its mailbox.
    pub async fn unregister(&self, id: ConnectionId) {
        self.submit(HubCommand::Unregister(id)).await;
    }

    /// Copies `payload` into every member's mailbox without waiting on any of
    /// them. Members whose mailbox is full are evicted and their close signal
    /// fired.
    pub async fn broadcast(&self, payload: Bytes) {
        self.submit(HubCommand::Broadcast(payload)).await;
    }

    pub async fn broadcast_message(&self, message: &Message) {
        match message.to_bytes() {
            Ok(payload) => self.broadcast(payload).await,
            Err(err) => {
                warn!(kind = %message.kind, error = %err, "Failed to serialize hub message");
            }
        }
    }

    /// Number of members once all previously submitted commands have run.
    pub async fn connection_count(&self) -> usize {
        let (reply, response) = oneshot::channel();
        self.submit(HubCommand::Count(reply)).await;
        response.await.unwrap_or(0)
    }

    pub async fn is_registered(&self, id: ConnectionId) -> bool {
        let (reply, response) = oneshot::channel();
        self.submit(HubCommand::Contains(id, reply)).await;
        response.await.unwrap_or(false)
    }

    async fn submit(&self, command: HubCommand) {
        if let Err(err) = self.commands.send(command).await {
            debug!(command = ?err.0, "Hub coordinator is no longer running");
        }
    }
}

struct HubWorker {
    clients: HashMap<ConnectionId, ClientHandle>,
    commands: mpsc::Receiver<HubCommand>,
    metrics: Arc<HubMetrics>,
}

impl HubWorker {
    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            self.handle(command);
        }
        debug!(remaining = self.clients.len(), "Hub coordinator stopped");
    }

    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register(handle) => self.register(handle),
            HubCommand::Unregister(id) => self.unregister(id),
            HubCommand::Broadcast(payload) => self.broadcast(payload),
            HubCommand::Count(reply) => {
                let _ = reply.send(self.clients.len());
            }
            HubCommand::Contains(id, reply) => {
                let _ = reply.send(self.clients.contains_key(&id));
            }
        }
    }

    fn register(&mut self, handle: ClientHandle) {
        let id = handle.id();
        let user_id = handle.identity().user_id;
        if self.clients.insert(id, handle).is_some() {
            // Replaced handle is dropped here, closing the stale mailbox.
            warn!(conn_id = %id, user_id, "Connection registered twice");
            return;
        }
        self.metrics.record_registered();
        info!(conn_id = %id, user_id, members = self.clients.len(), "Connection registered");
    }

    fn unregister(&mut self, id: ConnectionId) {
        let Some(handle) = self.clients.remove(&id) else {
            debug!(conn_id = %id, "Unregister for unknown connection ignored");
            return;
        };
        self.metrics.record_unregistered();
        info!(
            conn_id = %id,
            user_id = handle.identity().user_id,
            members = self.clients.len(),
            "Connection unregistered"
        );
    }

    fn broadcast(&mut self, payload: Bytes) {
        let mut delivered = 0u64;
        let mut slow = Vec::new();

        for (id, handle) in &self.clients {
            match handle.send(payload.clone()) {
                SendOutcome::Enqueued => delivered += 1,
                SendOutcome::Dropped => slow.push(*id),
            }
        }

        self.metrics.record_broadcast(delivered, slow.len() as u64);

        for id in slow {
            if let Some(handle) = self.clients.remove(&id) {
                // The pump is stuck writing, so the mailbox alone would never
                // tell it to stop.
                handle.close();
                self.metrics.record_evicted();
                warn!(
                    conn_id = %id,
                    user_id = handle.identity().user_id,
                    "Evicting slow consumer"
                );
            }
        }
    }
}
