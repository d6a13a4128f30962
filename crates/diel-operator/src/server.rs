//! HTTP server setup and lifecycle for the operator API.

use std::sync::Arc;

use diel_core::config::OperatorConfig;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Network configuration for the operator server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Build a server config from the operator section of the app
    /// configuration.
    pub fn from_app_config(config: &OperatorConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Errors that can occur while running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind the listener to the configured address.
    #[error("failed to bind listener: {0}")]
    Bind(String),

    /// The server exited with an error.
    #[error("server error: {0}")]
    Serve(String),
}

/// Bind the listener and serve the operator API until shutdown.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be bound and
/// [`ServerError::Serve`] if the server exits abnormally.
pub async fn start_server(config: ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let router = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::Bind(format!("{addr}: {e}")))?;

    info!(addr = %addr, "Operator server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))?;

    Ok(())
}
