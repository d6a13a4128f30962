//! Operator API server for the diel cycle controller.
//!
//! Serves a REST API and a `WebSocket` stream over the live scheduler
//! state: world clocks, the active job, and per-pass summaries.
//! Read-only routes are open; mutating routes (reload, stop, world
//! management) require the configured bearer token.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use error::OperatorApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{StartupError, spawn_operator};
pub use state::AppState;
