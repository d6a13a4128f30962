//! HTTP request handlers for the mutating operator endpoints.
//!
//! | Method | Path                       | Description                      |
//! |--------|----------------------------|----------------------------------|
//! | POST   | `/api/operator/reload`     | Re-read config, restart the job  |
//! | POST   | `/api/operator/stop`       | Request a driver stop            |
//! | POST   | `/api/worlds`              | Load a new world                 |
//! | DELETE | `/api/worlds/{id}`         | Unload a world                   |
//! | POST   | `/api/worlds/{id}/cycle`   | Enable or disable a world's cycle |
//!
//! Every handler here checks the bearer token before touching state.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use diel_core::WorldHost;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::authorize;
use crate::error::OperatorApiError;
use crate::handlers::parse_world_id;
use crate::state::AppState;

/// Generic success response for operator commands.
#[derive(Debug, Serialize)]
struct OperatorResponse {
    /// Whether the command was applied.
    ok: bool,
    /// Human-readable outcome message.
    message: String,
}

/// Request body for `POST /api/worlds`.
#[derive(Debug, Deserialize)]
pub struct LoadWorldRequest {
    /// Display name for the world. Must be unique among loaded worlds.
    pub name: String,
    /// Whether the world participates in the cycle. Defaults to true.
    #[serde(default = "default_cycle_enabled")]
    pub cycle_enabled: bool,
    /// Starting value of the full-time counter. Defaults to 0.
    #[serde(default)]
    pub initial_time: u64,
}

const fn default_cycle_enabled() -> bool {
    true
}

/// Request body for `POST /api/worlds/{id}/cycle`.
#[derive(Debug, Deserialize)]
pub struct SetCycleRequest {
    /// Whether the world should follow the day/night cycle.
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// POST /api/operator/reload - re-read config and restart the job
// ---------------------------------------------------------------------------

/// Re-read the cycle configuration and install a fresh scheduling job.
///
/// Validation problems in the new configuration are reported in the
/// response as warnings, not errors; an unreadable config file leaves
/// the current job untouched and returns a 500.
pub async fn reload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, OperatorApiError> {
    authorize(&state, &headers)?;

    let outcome = state.controller.reload().await?;

    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("Cycle configuration applied at epoch {}", outcome.epoch),
        "outcome": outcome,
    })))
}

// ---------------------------------------------------------------------------
// POST /api/operator/stop - request a driver stop
// ---------------------------------------------------------------------------

/// Ask the tick driver to exit after the pass in flight.
pub async fn stop(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, OperatorApiError> {
    authorize(&state, &headers)?;

    state.control.request_stop();
    info!("Operator requested driver stop");

    Ok(Json(OperatorResponse {
        ok: true,
        message: String::from("Stop requested -- driver will exit after the current tick"),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/worlds - load a new world
// ---------------------------------------------------------------------------

/// Load a world into the registry.
///
/// The scheduler starts tracking it on the next pass; no reload is
/// required.
pub async fn load_world(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<LoadWorldRequest>,
) -> Result<impl IntoResponse, OperatorApiError> {
    authorize(&state, &headers)?;

    if body.name.trim().is_empty() {
        return Err(OperatorApiError::InvalidRequest(String::from(
            "world name must not be empty",
        )));
    }

    let id = state
        .host
        .write()
        .await
        .load_world(&body.name, body.cycle_enabled, body.initial_time)
        .map_err(|err| OperatorApiError::InvalidRequest(err.to_string()))?;

    Ok(Json(serde_json::json!({
        "ok": true,
        "id": id,
        "message": format!("World '{}' loaded", body.name),
    })))
}

// ---------------------------------------------------------------------------
// DELETE /api/worlds/{id} - unload a world
// ---------------------------------------------------------------------------

/// Unload a world and report its final clock reading.
///
/// The scheduler retires the world's remainder on the next pass.
pub async fn unload_world(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, OperatorApiError> {
    authorize(&state, &headers)?;
    let id = parse_world_id(&id_str)?;

    let world = state
        .host
        .write()
        .await
        .unload_world(id)
        .map_err(|err| OperatorApiError::NotFound(err.to_string()))?;

    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("World '{}' unloaded", world.name),
        "final_time": world.clock.full_time(),
    })))
}

// ---------------------------------------------------------------------------
// POST /api/worlds/{id}/cycle - enable or disable a world's cycle
// ---------------------------------------------------------------------------

/// Flip a world's cycle participation flag.
///
/// Disabling removes the world from scheduling on the next pass;
/// re-enabling picks it back up with a zeroed remainder if it was
/// retired in between.
pub async fn set_cycle(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    headers: HeaderMap,
    Json(body): Json<SetCycleRequest>,
) -> Result<impl IntoResponse, OperatorApiError> {
    authorize(&state, &headers)?;
    let id = parse_world_id(&id_str)?;

    let changed = state.host.write().await.set_cycle_enabled(id, body.enabled);
    if !changed {
        return Err(OperatorApiError::NotFound(format!("world {id}")));
    }

    let verb = if body.enabled { "enabled" } else { "disabled" };
    Ok(Json(OperatorResponse {
        ok: true,
        message: format!("Cycle {verb} for world {id}"),
    }))
}
