use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Process-unique identifier of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Authenticated user behind a connection. Copied once at upgrade time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: u64,
    pub username: String,
}

/// Result of a non-blocking mailbox enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Enqueued,
    /// Mailbox full or already closed. The caller should evict the connection.
    Dropped,
}

/// Registry-side half of a connection.
///
/// Holds the only mailbox sender, so dropping the handle closes the mailbox.
#[derive(Debug)]
pub struct ClientHandle {
    id: ConnectionId,
    identity: UserIdentity,
    mailbox: mpsc::Sender<Bytes>,
    close_signal: CancellationToken,
}

impl ClientHandle {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    /// Enqueue without waiting. Never blocks the broadcaster.
    pub fn send(&self, payload: Bytes) -> SendOutcome {
        match self.mailbox.try_send(payload) {
            Ok(()) => SendOutcome::Enqueued,
            Err(TrySendError::Full(_)) => {
                tracing::debug!(conn_id = %self.id, "Mailbox full");
                SendOutcome::Dropped
            }
            Err(TrySendError::Closed(_)) => SendOutcome::Dropped,
        }
    }

    /// Fires the shared close signal. Safe to call any number of times.
    pub fn close(&self) {
        self.close_signal.cancel();
    }
}

/// Pump-side half of a connection: the mailbox receiver and the close signal.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    identity: UserIdentity,
    mailbox: mpsc::Receiver<Bytes>,
    close_signal: CancellationToken,
}

impl Connection {
    /// Creates both halves of a new connection sharing one bounded mailbox.
    pub fn open(identity: UserIdentity, mailbox_capacity: usize) -> (Self, ClientHandle) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(mailbox_capacity.max(1));
        let close_signal = CancellationToken::new();

        let handle = ClientHandle {
            id,
            identity: identity.clone(),
            mailbox: tx,
            close_signal: close_signal.clone(),
        };
        let connection = Self {
            id,
            identity,
            mailbox: rx,
            close_signal,
        };
        (connection, handle)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    pub fn close_signal(&self) -> CancellationToken {
        self.close_signal.clone()
    }

    pub fn into_mailbox(self) -> mpsc::Receiver<Bytes> {
        self.mailbox
    }
}
