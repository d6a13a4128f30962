//! The tick driver.
//!
//! Drives the host and the scheduler at a fixed twenty ticks per
//! second. Each tick advances every cycle-enabled world natively by one
//! tick, retires remainders of worlds the host unloaded, and runs one
//! scheduling pass through the shared slot. The host write lock is
//! acquired first and the slot lock second, matching the order the
//! rest of the crate documents.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::host::WorldHost;
use crate::reload::SchedulerSlot;
use crate::scheduler::PassSummary;

/// Real-time spacing between driver ticks, twenty per second.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Shared flags for stopping and observing the driver.
#[derive(Debug)]
pub struct DriverControl {
    stop_requested: AtomicBool,
    ticks_driven: AtomicU64,
    started_at: DateTime<Utc>,
}

impl DriverControl {
    /// A fresh control with no stop requested.
    pub fn new() -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            ticks_driven: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    /// Ask the driver to stop before its next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Ticks the driver has completed.
    pub fn ticks_driven(&self) -> u64 {
        self.ticks_driven.load(Ordering::Acquire)
    }

    /// When this control was created.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole seconds since this control was created.
    pub fn elapsed_seconds(&self) -> u64 {
        let seconds = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
            .max(0);
        u64::try_from(seconds).unwrap_or(0)
    }

    /// Record one completed tick, returning the new total.
    fn record_tick(&self) -> u64 {
        self.ticks_driven
            .fetch_add(1, Ordering::AcqRel)
            .saturating_add(1)
    }
}

impl Default for DriverControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Hook invoked after every completed scheduling pass.
pub trait PassCallback: Send {
    /// Called with the driver tick number and the pass result.
    fn on_pass(&mut self, tick: u64, summary: &PassSummary);
}

/// Callback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl PassCallback for NoOpCallback {
    fn on_pass(&mut self, _tick: u64, _summary: &PassSummary) {}
}

/// Totals from one driver run.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverStats {
    /// Ticks the driver completed.
    pub ticks_driven: u64,

    /// Ticks on which a job was installed and a pass ran.
    pub passes_run: u64,

    /// The last pass result observed, if any pass ran.
    pub final_summary: Option<PassSummary>,
}

/// Drive the host and scheduler until a stop is requested.
///
/// The stop flag is checked at the top of every tick, so a stop
/// requested before the first tick means no work is done at all.
pub async fn run_driver<H>(
    host: &Arc<RwLock<H>>,
    slot: &Arc<SchedulerSlot>,
    control: &Arc<DriverControl>,
    callback: &mut dyn PassCallback,
) -> DriverStats
where
    H: WorldHost,
{
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut stats = DriverStats::default();
    info!("tick driver started");

    loop {
        interval.tick().await;

        if control.is_stop_requested() {
            info!(ticks = control.ticks_driven(), "tick driver stopping");
            break;
        }

        let pass = {
            let mut worlds = host.write().await;
            worlds.advance_native();
            for id in worlds.take_unloaded() {
                if slot.remove_world(id).await.is_some() {
                    debug!(world_id = %id, "dropped remainder of unloaded world");
                }
            }
            slot.run_pass(&mut *worlds).await
        };

        let tick = control.record_tick();
        stats.ticks_driven = tick;

        if let Some(summary) = pass {
            stats.passes_run = stats.passes_run.saturating_add(1);
            callback.on_pass(tick, &summary);
            if summary.worlds_adjusted > 0 {
                debug!(
                    tick,
                    adjusted = summary.worlds_adjusted,
                    net_ticks = summary.net_ticks,
                    "pass applied adjustments"
                );
            }
            stats.final_summary = Some(summary);
        }
    }

    stats
}
