use thiserror::Error;

/// The HTTP request could not be turned into a WebSocket.
///
/// No connection is created and no pumps start when this is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpgradeError {
    #[error("WebSocket upgrade rejected: {0}")]
    Handshake(String),
}

/// Why a pump stopped before its peer closed cleanly.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PumpError {
    #[error("read failed: {0}")]
    Read(String),
    #[error("write failed: {0}")]
    Write(String),
}
