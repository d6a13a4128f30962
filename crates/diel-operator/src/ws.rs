//! WebSocket endpoint streaming per-pass scheduler summaries.
//!
//! | Method | Path         | Description                        |
//! |--------|--------------|------------------------------------|
//! | GET    | `/ws/passes` | JSON stream of per-pass summaries  |

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error};

use crate::state::AppState;

/// Upgrade the connection and stream pass summaries until the client
/// disconnects.
pub async fn ws_passes(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut rx = state.subscribe();
    debug!("WebSocket client connected to pass stream");

    loop {
        tokio::select! {
            result = rx.recv() => match result {
                Ok(summary) => {
                    let json = match serde_json::to_string(&summary) {
                        Ok(json) => json,
                        Err(e) => {
                            error!(error = %e, "Failed to serialize pass summary");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "WebSocket client lagged, skipping summaries");
                }
                Err(RecvError::Closed) => break,
            },
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Ping(data))) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                Some(Err(_)) => break,
                _ => {}
            },
        }
    }

    debug!("WebSocket client disconnected from pass stream");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use diel_core::scheduler::PassSummary;

    #[test]
    fn summary_serializes_with_expected_fields() {
        let summary = PassSummary {
            epoch: 3,
            worlds_seen: 2,
            worlds_adjusted: 1,
            worlds_skipped: 0,
            net_ticks: -1,
        };

        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["epoch"], 3);
        assert_eq!(json["worlds_seen"], 2);
        assert_eq!(json["worlds_adjusted"], 1);
        assert_eq!(json["net_ticks"], -1);
    }
}
