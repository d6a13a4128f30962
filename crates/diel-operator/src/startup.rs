//! Background startup for the operator server.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::server::{ServerConfig, start_server};
use crate::state::AppState;

/// Errors that can occur when spawning the operator server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The configured bind address is not valid.
    #[error("invalid bind address: {0}")]
    InvalidAddress(String),
}

/// Spawn the operator server on a background task.
///
/// The configured host must be an IP address; it is validated before
/// spawning so configuration problems surface at startup rather than
/// inside the task. Bind and serve failures after that are logged from
/// the task itself.
///
/// # Errors
///
/// Returns [`StartupError::InvalidAddress`] if the host and port do
/// not form a valid socket address.
pub fn spawn_operator(
    config: ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let addr = format!("{}:{}", config.host, config.port);
    addr.parse::<std::net::SocketAddr>()
        .map_err(|e| StartupError::InvalidAddress(format!("{addr}: {e}")))?;

    let port = config.port;
    let handle = tokio::spawn(async move {
        if let Err(e) = start_server(config, state).await {
            error!(error = %e, "Operator server exited with error");
        }
    });

    info!(port, "Operator server spawned");
    Ok(handle)
}
