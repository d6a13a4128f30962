//! Pass callback that feeds the operator API.
//!
//! After each scheduler pass, this callback broadcasts the
//! [`PassSummary`] to all connected `WebSocket` clients.

use std::sync::Arc;

use diel_core::runner::PassCallback;
use diel_core::scheduler::PassSummary;
use diel_operator::state::AppState;
use tracing::debug;

/// Callback that bridges the tick driver to the operator API.
pub struct OperatorCallback {
    state: Arc<AppState>,
}

impl OperatorCallback {
    /// Create a callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl PassCallback for OperatorCallback {
    fn on_pass(&mut self, tick: u64, summary: &PassSummary) {
        let receivers = self.state.broadcast(summary);
        debug!(tick, receivers, "Pass summary broadcast sent");
    }
}
