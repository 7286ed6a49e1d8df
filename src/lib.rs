#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names
)]

//! # MRPG Server
//!
//! Game backend with accounts, daily rewards and a real-time WebSocket hub
//! that relays every client frame to every connected client.
//!
//! In-memory storage, no external services.

/// JSON HTTP endpoints
pub mod api;

/// Password hashing, access tokens and the request authentication extractor
pub mod auth;

/// Server configuration and environment variables
pub mod config;

/// User storage abstraction (in-memory implementation)
pub mod database;

/// Connection registry and broadcast fan-out
pub mod hub;

/// Structured logging configuration
pub mod logging;

/// Daily reward rule
pub mod rewards;

/// Shared server state
pub mod server;

/// WebSocket upgrade, pumps and route setup
pub mod websocket;
