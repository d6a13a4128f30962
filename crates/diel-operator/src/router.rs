//! Axum router wiring every operator endpoint to its handler.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, operator, ws};

/// Build the operator router with CORS and request tracing layers.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket stream
        .route("/ws/passes", get(ws::ws_passes))
        // REST API
        .route("/api/status", get(handlers::status))
        .route(
            "/api/worlds",
            get(handlers::list_worlds).post(operator::load_world),
        )
        .route(
            "/api/worlds/{id}",
            get(handlers::get_world).delete(operator::unload_world),
        )
        .route("/api/worlds/{id}/cycle", post(operator::set_cycle))
        // Operator commands
        .route("/api/operator/reload", post(operator::reload))
        .route("/api/operator/stop", post(operator::stop))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
