//! HTTP request handlers for the read-only operator endpoints.
//!
//! | Method | Path                | Description                       |
//! |--------|---------------------|-----------------------------------|
//! | GET    | `/`                 | HTML status page                  |
//! | GET    | `/api/status`       | Controller and driver status      |
//! | GET    | `/api/worlds`       | List loaded worlds                |
//! | GET    | `/api/worlds/{id}`  | Inspect a single world            |
//!
//! Mutating endpoints live in [`crate::operator`].

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use diel_core::reload::ControllerState;
use diel_types::WorldId;
use uuid::Uuid;

use crate::error::OperatorApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / - HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page summarizing the controller.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.controller.status().await;
    let worlds = state.host.read().await.count();
    let ticks = state.control.ticks_driven();

    let state_label = match status.state {
        ControllerState::Running => "running",
        ControllerState::Idle => "idle",
    };
    let epoch = status
        .job
        .map_or_else(|| String::from("--"), |job| job.epoch.to_string());
    let durations = status.job.map_or_else(
        || String::from("--"),
        |job| {
            format!(
                "{}m day / {}m night",
                job.day_duration_minutes, job.night_duration_minutes
            )
        },
    );

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Diel Operator</title>
    <style>
        body {{ font-family: ui-monospace, 'Cascadia Code', monospace; background: #0d1117; color: #c9d1d9; margin: 40px; }}
        h1 {{ color: #e3b341; }}
        .status {{ display: inline-block; padding: 4px 12px; border-radius: 4px; background: #1f6feb; color: white; }}
        table {{ border-collapse: collapse; margin-top: 20px; }}
        td {{ padding: 6px 16px; border-bottom: 1px solid #30363d; }}
        td:first-child {{ color: #8b949e; }}
        .endpoints {{ margin-top: 30px; color: #8b949e; }}
        code {{ background: #161b22; padding: 2px 6px; border-radius: 3px; }}
    </style>
</head>
<body>
    <h1>Diel Operator</h1>
    <span class="status">{state_label}</span>
    <table>
        <tr><td>Epoch</td><td>{epoch}</td></tr>
        <tr><td>Cycle</td><td>{durations}</td></tr>
        <tr><td>Worlds</td><td>{worlds}</td></tr>
        <tr><td>Ticks driven</td><td>{ticks}</td></tr>
    </table>
    <div class="endpoints">
        <p>Endpoints:</p>
        <p><code>GET /api/status</code> <code>GET /api/worlds</code> <code>GET /api/worlds/{{id}}</code></p>
        <p><code>POST /api/operator/reload</code> <code>POST /api/operator/stop</code> <code>WS /ws/passes</code></p>
    </div>
</body>
</html>"#
    );

    Html(html)
}

// ---------------------------------------------------------------------------
// GET /api/status - controller and driver status
// ---------------------------------------------------------------------------

/// Report the controller state, the scheduling job, and driver counters.
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let controller = state.controller.status().await;
    let worlds = state.host.read().await.count();

    Json(serde_json::json!({
        "controller": controller,
        "driver": {
            "ticks_driven": state.control.ticks_driven(),
            "stop_requested": state.control.is_stop_requested(),
            "elapsed_seconds": state.control.elapsed_seconds(),
            "started_at": state.control.started_at().to_rfc3339(),
        },
        "worlds": worlds,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/worlds - list loaded worlds
// ---------------------------------------------------------------------------

/// List every loaded world with its clock readings.
pub async fn list_worlds(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let host = state.host.read().await;

    let worlds: Vec<serde_json::Value> = host
        .worlds()
        .map(|(id, world)| {
            serde_json::json!({
                "id": id,
                "name": world.name,
                "full_time": world.clock.full_time(),
                "phase_time": world.clock.phase_time(),
                "phase": world.clock.phase(),
                "cycle_enabled": world.cycle_enabled,
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": worlds.len(),
        "worlds": worlds,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/worlds/{id} - inspect a single world
// ---------------------------------------------------------------------------

/// Fetch one world's clock readings plus its stored remainder.
pub async fn get_world(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, OperatorApiError> {
    let id = parse_world_id(&id_str)?;

    let world = {
        let host = state.host.read().await;
        host.get(id)
            .cloned()
            .ok_or_else(|| OperatorApiError::NotFound(format!("world {id}")))?
    };
    // Host lock is released before the slot lock is taken.
    let remainder = state.controller.slot().remainder(id).await;

    Ok(Json(serde_json::json!({
        "id": id,
        "name": world.name,
        "full_time": world.clock.full_time(),
        "phase_time": world.clock.phase_time(),
        "phase": world.clock.phase(),
        "cycle_enabled": world.cycle_enabled,
        "remainder": remainder,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a world id from a request path segment.
pub(crate) fn parse_world_id(raw: &str) -> Result<WorldId, OperatorApiError> {
    raw.parse::<Uuid>()
        .map(WorldId::from)
        .map_err(|source| OperatorApiError::InvalidWorldId {
            raw: raw.to_owned(),
            source,
        })
}
