//! Real-time connection hub.
//!
//! - connection: the two halves of a live connection (registry handle and pump side)
//! - registry: the coordinating task that owns membership and performs fan-out
//! - message: the `{type, payload}` envelope for server-originated frames
//! - metrics: counters reported by the metrics endpoint

mod connection;
mod message;
mod metrics;
mod registry;

pub use connection::{ClientHandle, Connection, ConnectionId, SendOutcome, UserIdentity};
pub use message::Message;
pub use metrics::{HubMetrics, HubMetricsSnapshot};
pub use registry::Hub;
