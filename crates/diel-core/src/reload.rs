//! Live configuration reload.
//!
//! The driver and the operator API share one [`SchedulerSlot`] holding
//! the active job and its accumulators behind a single async mutex, so
//! a pass never observes a half-installed job. The [`ReloadController`]
//! re-reads the configuration source and swaps a fresh job into the
//! slot; boot goes through the same path as a live reload.
//!
//! Swapping flushes every carried remainder. At worst that discards a
//! fraction of one tick per world, which the next passes absorb.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use diel_types::WorldId;

use crate::accumulator::AccumulatorStore;
use crate::config::{ConfigError, ConfigSource, ConfigWarning, DurationConfig};
use crate::host::WorldHost;
use crate::scheduler::{JobStatus, PassSummary, PhaseIncrements, TimeScheduler};

/// Shared slot holding the active job and its accumulators.
///
/// Lock order: callers that also lock the host must acquire the host
/// first and the slot second, as the driver does.
#[derive(Debug, Default)]
pub struct SchedulerSlot {
    inner: Mutex<SlotState>,
}

#[derive(Debug, Default)]
struct SlotState {
    job: Option<TimeScheduler>,
    accumulators: AccumulatorStore,
}

impl SchedulerSlot {
    /// An empty slot with no job installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one scheduling pass with the active job.
    ///
    /// Returns `None` when no job is installed.
    pub async fn run_pass<H>(&self, host: &mut H) -> Option<PassSummary>
    where
        H: WorldHost + ?Sized,
    {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;
        state
            .job
            .as_ref()
            .map(|job| job.run_pass(&mut state.accumulators, host))
    }

    /// Install a job, flushing every carried remainder.
    ///
    /// Returns the epoch of the job it replaced, if one was running.
    pub async fn install(&self, job: TimeScheduler) -> Option<u64> {
        let mut guard = self.inner.lock().await;
        let previous = guard.job.as_ref().map(TimeScheduler::epoch);
        guard.accumulators.clear();
        guard.job = Some(job);
        previous
    }

    /// Remove the job and flush remainders, returning its epoch.
    pub async fn stop(&self) -> Option<u64> {
        let mut guard = self.inner.lock().await;
        guard.accumulators.clear();
        guard.job.take().map(|job| job.epoch())
    }

    /// Whether a job is currently installed.
    pub async fn is_running(&self) -> bool {
        self.inner.lock().await.job.is_some()
    }

    /// Status snapshot of the installed job, if any.
    pub async fn job_status(&self) -> Option<JobStatus> {
        self.inner
            .lock()
            .await
            .job
            .as_ref()
            .map(TimeScheduler::status)
    }

    /// Drop the carried remainder of an unloaded world.
    pub async fn remove_world(&self, id: WorldId) -> Option<f64> {
        self.inner.lock().await.accumulators.remove(id)
    }

    /// The carried remainder of a world, if it has one.
    pub async fn remainder(&self, id: WorldId) -> Option<f64> {
        self.inner.lock().await.accumulators.get(id)
    }

    /// Number of worlds with a carried remainder.
    pub async fn tracked_worlds(&self) -> usize {
        self.inner.lock().await.accumulators.len()
    }
}

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    /// No job installed; passes are no-ops.
    Idle,

    /// A job is installed and driving adjustments.
    Running,
}

/// Errors surfaced by a reload request.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    /// The configuration source could not be read or parsed.
    #[error("config re-read failed: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },
}

/// Successful reload result, suitable for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ReloadOutcome {
    /// Epoch of the newly installed job.
    pub epoch: u64,

    /// Epoch of the job that was replaced, if one was running.
    pub previous_epoch: Option<u64>,

    /// Durations the new job runs with.
    pub durations: DurationConfig,

    /// Increments the new job applies.
    pub increments: PhaseIncrements,

    /// Substitutions recorded while validating the config.
    pub warnings: Vec<ConfigWarning>,
}

/// Snapshot of the controller and its job.
#[derive(Debug, Clone, Serialize)]
pub struct ControllerStatus {
    /// Current lifecycle state.
    pub state: ControllerState,

    /// The installed job, when running.
    pub job: Option<JobStatus>,

    /// Worlds with a carried fractional remainder.
    pub tracked_worlds: u64,
}

/// Applies configuration to the scheduler slot.
///
/// Owns the epoch counter: every successful reload installs a job under
/// the next epoch. The configuration source is read before the running
/// job is touched, so a source that fails to read or parse leaves the
/// current job running untouched.
#[derive(Debug)]
pub struct ReloadController {
    slot: Arc<SchedulerSlot>,
    source: ConfigSource,
    next_epoch: AtomicU64,
}

impl ReloadController {
    /// Build a controller that installs jobs into the given slot.
    pub const fn new(slot: Arc<SchedulerSlot>, source: ConfigSource) -> Self {
        Self {
            slot,
            source,
            next_epoch: AtomicU64::new(1),
        }
    }

    /// The slot this controller installs jobs into.
    pub const fn slot(&self) -> &Arc<SchedulerSlot> {
        &self.slot
    }

    /// Read the configuration source and install a fresh job.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::Config`] if the source cannot be read or
    /// parsed. The running job is untouched in that case.
    pub async fn reload(&self) -> Result<ReloadOutcome, ReloadError> {
        let cycle = self.source.read_cycle()?;
        let (durations, warnings) = DurationConfig::from_cycle(&cycle);

        let epoch = self.next_epoch.fetch_add(1, Ordering::AcqRel);
        let job = TimeScheduler::new(epoch, durations);
        let increments = job.increments();
        let previous_epoch = self.slot.install(job).await;

        info!(
            epoch,
            previous_epoch = ?previous_epoch,
            day_minutes = durations.day_minutes,
            night_minutes = durations.night_minutes,
            warnings = warnings.len(),
            "scheduler job installed"
        );

        Ok(ReloadOutcome {
            epoch,
            previous_epoch,
            durations,
            increments,
            warnings,
        })
    }

    /// Cancel the running job, if any.
    pub async fn shutdown(&self) {
        match self.slot.stop().await {
            Some(epoch) => info!(epoch, "scheduler job cancelled"),
            None => debug!("no scheduler job to cancel"),
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> ControllerState {
        if self.slot.is_running().await {
            ControllerState::Running
        } else {
            ControllerState::Idle
        }
    }

    /// Status snapshot for API responses.
    pub async fn status(&self) -> ControllerStatus {
        let job = self.slot.job_status().await;
        let state = if job.is_some() {
            ControllerState::Running
        } else {
            ControllerState::Idle
        };
        let tracked = self.slot.tracked_worlds().await;
        ControllerStatus {
            state,
            job,
            tracked_worlds: u64::try_from(tracked).unwrap_or(u64::MAX),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::CycleConfig;
    use crate::host::StubWorldHost;

    fn fixed_controller(day: i64, night: i64) -> ReloadController {
        ReloadController::new(
            Arc::new(SchedulerSlot::new()),
            ConfigSource::Fixed(CycleConfig::from_minutes(day, night)),
        )
    }

    #[tokio::test]
    async fn empty_slot_runs_no_pass() {
        let slot = SchedulerSlot::new();
        let mut host = StubWorldHost::new();
        let id = host.add_world(700);

        assert!(slot.run_pass(&mut host).await.is_none());
        assert_eq!(host.full_time(id), Some(700));
    }

    #[tokio::test]
    async fn boot_reload_installs_epoch_one() {
        let controller = fixed_controller(20, 5);

        let outcome = controller.reload().await.unwrap();

        assert_eq!(outcome.epoch, 1);
        assert_eq!(outcome.previous_epoch, None);
        assert_eq!(outcome.durations.day_minutes, 20);
        assert_eq!(outcome.durations.night_minutes, 5);
        assert!(outcome.warnings.is_empty());
        assert_eq!(controller.state().await, ControllerState::Running);

        let status = controller.status().await;
        assert_eq!(status.state, ControllerState::Running);
        assert_eq!(status.job.unwrap().epoch, 1);
        assert_eq!(status.tracked_worlds, 0);
    }

    #[tokio::test]
    async fn second_reload_increments_epoch_and_flushes() {
        let controller = fixed_controller(10, 20);
        controller.reload().await.unwrap();

        let mut host = StubWorldHost::new();
        let id = host.add_world(0);
        host.freeze_phase(id, 18_000);
        controller.slot().run_pass(&mut host).await.unwrap();
        assert_eq!(controller.slot().remainder(id).await, Some(-0.5));
        assert_eq!(controller.status().await.tracked_worlds, 1);

        let outcome = controller.reload().await.unwrap();

        assert_eq!(outcome.epoch, 2);
        assert_eq!(outcome.previous_epoch, Some(1));
        assert_eq!(controller.slot().remainder(id).await, None);
        assert_eq!(controller.status().await.tracked_worlds, 0);
    }

    #[tokio::test]
    async fn invalid_durations_substitute_with_warnings() {
        let controller = fixed_controller(0, -5);

        let outcome = controller.reload().await.unwrap();

        assert_eq!(outcome.durations, DurationConfig::default());
        assert_eq!(outcome.warnings.len(), 2);
        assert_eq!(controller.state().await, ControllerState::Running);
    }

    #[tokio::test]
    async fn unparseable_file_keeps_running_job() {
        let path = std::env::temp_dir().join(format!("diel-reload-{}.yaml", WorldId::new()));
        std::fs::write(&path, "cycle:\n  day-duration-minutes: 20\n").unwrap();

        let controller = ReloadController::new(
            Arc::new(SchedulerSlot::new()),
            ConfigSource::File(path.clone()),
        );
        let first = controller.reload().await.unwrap();
        assert_eq!(first.epoch, 1);
        assert_eq!(first.durations.day_minutes, 20);

        std::fs::write(&path, "cycle: [broken").unwrap();
        let err = controller.reload().await.unwrap_err();
        assert!(matches!(err, ReloadError::Config { .. }));

        // The parse failure happened before the slot was touched.
        assert_eq!(controller.state().await, ControllerState::Running);
        assert_eq!(controller.slot().job_status().await.unwrap().epoch, 1);

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn reload_with_unchanged_config_only_flushes_remainder() {
        let controller = fixed_controller(10, 20);
        controller.reload().await.unwrap();

        let mut host = StubWorldHost::new();
        let id = host.add_world(100);
        host.freeze_phase(id, 18_000);
        controller.slot().run_pass(&mut host).await.unwrap();
        assert_eq!(controller.slot().remainder(id).await, Some(-0.5));

        controller.reload().await.unwrap();

        // Behavior after the flush matches a fresh start: one skipped
        // half, then a whole tick on the second pass.
        let first = controller.slot().run_pass(&mut host).await.unwrap();
        let second = controller.slot().run_pass(&mut host).await.unwrap();
        assert_eq!(first.net_ticks, 0);
        assert_eq!(second.net_ticks, -1);
        assert_eq!(host.full_time(id), Some(99));
    }

    #[tokio::test]
    async fn shutdown_cancels_job() {
        let controller = fixed_controller(10, 10);
        controller.reload().await.unwrap();
        assert_eq!(controller.state().await, ControllerState::Running);

        controller.shutdown().await;

        assert_eq!(controller.state().await, ControllerState::Idle);
        assert!(controller.slot().job_status().await.is_none());

        // A second shutdown is a quiet no-op.
        controller.shutdown().await;
        assert_eq!(controller.state().await, ControllerState::Idle);
    }

    #[tokio::test]
    async fn unloaded_world_remainder_is_dropped() {
        let controller = fixed_controller(10, 20);
        controller.reload().await.unwrap();

        let mut host = StubWorldHost::new();
        let id = host.add_world(0);
        host.freeze_phase(id, 18_000);
        controller.slot().run_pass(&mut host).await.unwrap();

        assert_eq!(controller.slot().remove_world(id).await, Some(-0.5));
        assert_eq!(controller.slot().remainder(id).await, None);
        assert_eq!(controller.slot().tracked_worlds().await, 0);
    }
}
