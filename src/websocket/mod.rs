// WebSocket module - transport side of the connection hub
//
// - handler: WebSocket upgrade handler (entry point)
// - pumps: inbound/outbound loops and the per-connection supervisor
// - error: upgrade and pump errors
// - routes: HTTP route setup (API, health, metrics)
// - metrics: hub counters endpoint

mod error;
mod handler;
mod metrics;
mod pumps;
mod routes;

pub use error::{PumpError, UpgradeError};
pub use handler::websocket_handler;
pub use metrics::{metrics_handler, MetricsResponse};
pub use pumps::{inbound_pump, outbound_pump, run_connection};
pub use routes::{create_router, run_server};
