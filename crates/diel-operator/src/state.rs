//! Shared application state for the operator API server.

use std::sync::Arc;

use diel_core::reload::ReloadController;
use diel_core::runner::DriverControl;
use diel_core::scheduler::PassSummary;
use diel_host::HostWorlds;
use tokio::sync::{RwLock, broadcast};

/// Capacity of the pass-summary broadcast channel.
///
/// Clients that fall more than this many summaries behind receive a
/// lag notice and resume from the most recent one.
const BROADCAST_CAPACITY: usize = 256;

/// Shared state handed to every route handler.
///
/// Wrapped in an [`Arc`] and injected through Axum's `State`
/// extractor. REST handlers read the live world registry through the
/// read-write lock; the broadcast sender fans pass summaries out to
/// connected `WebSocket` clients.
#[derive(Clone)]
pub struct AppState {
    /// Live world registry, shared with the tick driver.
    pub host: Arc<RwLock<HostWorlds>>,
    /// Controller owning the scheduling job and its accumulators.
    pub controller: Arc<ReloadController>,
    /// Stop flag and tick counters for the driver loop.
    pub control: Arc<DriverControl>,
    /// Broadcast sender for per-pass summaries.
    pub tx: broadcast::Sender<PassSummary>,
    /// Bearer token required on mutating routes. Empty disables the
    /// check entirely.
    pub auth_token: String,
}

impl AppState {
    /// Build application state around the shared driver handles.
    pub fn new(
        host: Arc<RwLock<HostWorlds>>,
        controller: Arc<ReloadController>,
        control: Arc<DriverControl>,
        auth_token: String,
    ) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            host,
            controller,
            control,
            tx,
            auth_token,
        }
    }

    /// Subscribe to the pass-summary broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<PassSummary> {
        self.tx.subscribe()
    }

    /// Publish a pass summary to all connected `WebSocket` clients.
    ///
    /// Returns the number of receivers that got the message. `send`
    /// returns `Err` only when there are zero receivers, which is
    /// normal when no clients are connected.
    pub fn broadcast(&self, summary: &PassSummary) -> usize {
        self.tx.send(*summary).unwrap_or(0)
    }
}
