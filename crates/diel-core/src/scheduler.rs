//! The per-pass duration algorithm.
//!
//! A pass walks every loaded world, reads its phase, and compares the
//! per-pass advance that phase's configured duration calls for against
//! the single tick the host applies natively. At a ten-minute phase the
//! two agree and the scheduler does nothing. Shorter durations produce
//! increments above one tick, so the scheduler pushes time forward;
//! longer durations produce increments below one, so it pulls time back.
//! Whole ticks are applied immediately and the fractional remainder is
//! carried per world in an [`AccumulatorStore`].
//!
//! The increment for a phase lasting `m` minutes is
//! `12_000 / (m * 60 * 20)` ticks per pass: the phase's tick span spread
//! over the real seconds it should occupy at twenty passes per second.

use serde::{Deserialize, Serialize};
use tracing::debug;

use diel_types::{DayPhase, TICK_RATE, WorldId};

use crate::accumulator::AccumulatorStore;
use crate::config::DurationConfig;
use crate::host::WorldHost;

/// Ticks in one phase, as a float. Equal to [`diel_types::DAY_PHASE_TICKS`].
const PHASE_TICKS_F64: f64 = 12_000.0;

/// Per-pass advance for a phase lasting `minutes` real minutes.
fn increment_for(minutes: u32) -> f64 {
    PHASE_TICKS_F64 / (f64::from(minutes) * 60.0 * f64::from(TICK_RATE))
}

/// Per-tick fractional advances, one per phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseIncrements {
    /// Ticks to advance per pass while a world is in its day phase.
    pub day: f64,

    /// Ticks to advance per pass while a world is in its night phase.
    pub night: f64,
}

impl PhaseIncrements {
    /// Compute the increments for a validated pair of durations.
    pub fn from_durations(durations: DurationConfig) -> Self {
        Self {
            day: increment_for(durations.day_minutes),
            night: increment_for(durations.night_minutes),
        }
    }

    /// The increment that applies to the given phase.
    pub const fn for_phase(self, phase: DayPhase) -> f64 {
        match phase {
            DayPhase::Day => self.day,
            DayPhase::Night => self.night,
        }
    }
}

/// A scheduling job bound to one validated pair of phase durations.
///
/// Jobs are immutable: a configuration reload installs a new job with a
/// fresh epoch rather than mutating the running one.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeScheduler {
    epoch: u64,
    durations: DurationConfig,
    increments: PhaseIncrements,
}

impl TimeScheduler {
    /// Build a job for the given epoch and durations.
    pub fn new(epoch: u64, durations: DurationConfig) -> Self {
        Self {
            epoch,
            durations,
            increments: PhaseIncrements::from_durations(durations),
        }
    }

    /// The reload epoch this job was installed under.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The validated durations this job runs with.
    pub const fn durations(&self) -> DurationConfig {
        self.durations
    }

    /// The per-phase increments this job applies.
    pub const fn increments(&self) -> PhaseIncrements {
        self.increments
    }

    /// A serializable snapshot of this job for status responses.
    pub const fn status(&self) -> JobStatus {
        JobStatus {
            epoch: self.epoch,
            day_duration_minutes: self.durations.day_minutes,
            night_duration_minutes: self.durations.night_minutes,
            day_increment: self.increments.day,
            night_increment: self.increments.night,
        }
    }

    /// Run one scheduling pass over every world the host reports.
    ///
    /// Worlds that are mid-load, mid-unload, or cycle-disabled are
    /// skipped with their carried remainder untouched. A rejected clock
    /// write likewise leaves the previously stored remainder in place.
    pub fn run_pass<H>(&self, accumulators: &mut AccumulatorStore, host: &mut H) -> PassSummary
    where
        H: WorldHost + ?Sized,
    {
        let mut summary = PassSummary {
            epoch: self.epoch,
            ..PassSummary::default()
        };

        for id in host.world_ids() {
            summary.worlds_seen = summary.worlds_seen.saturating_add(1);

            let Some(phase_time) = host.phase_time(id) else {
                summary.worlds_skipped = summary.worlds_skipped.saturating_add(1);
                continue;
            };
            if host.cycle_enabled(id) != Some(true) {
                summary.worlds_skipped = summary.worlds_skipped.saturating_add(1);
                continue;
            }

            let phase = DayPhase::from_phase_time(phase_time);
            let adjustment = self.increments.for_phase(phase) - 1.0;
            let accumulated = accumulators.get_or_init(id) + adjustment;
            let whole = accumulated.trunc();

            // `whole` is bounded by the largest per-phase increment
            // (10.0 at the one-minute floor) plus the carried fraction.
            #[allow(clippy::cast_possible_truncation)]
            let delta = whole as i64;

            if delta == 0 {
                accumulators.set(id, accumulated);
                continue;
            }

            if host.adjust_time(id, delta) {
                accumulators.set(id, accumulated - whole);
                summary.worlds_adjusted = summary.worlds_adjusted.saturating_add(1);
                summary.net_ticks = summary.net_ticks.saturating_add(delta);
            } else {
                summary.worlds_skipped = summary.worlds_skipped.saturating_add(1);
            }
        }

        debug!(
            epoch = summary.epoch,
            seen = summary.worlds_seen,
            adjusted = summary.worlds_adjusted,
            skipped = summary.worlds_skipped,
            net_ticks = summary.net_ticks,
            "scheduler pass complete"
        );
        summary
    }
}

/// Serializable snapshot of an active job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JobStatus {
    /// The reload epoch the job was installed under.
    pub epoch: u64,

    /// Configured day phase duration in minutes.
    pub day_duration_minutes: u32,

    /// Configured night phase duration in minutes.
    pub night_duration_minutes: u32,

    /// Per-pass advance applied during the day phase.
    pub day_increment: f64,

    /// Per-pass advance applied during the night phase.
    pub night_increment: f64,
}

/// Outcome of one scheduling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    /// Epoch of the job that ran the pass.
    pub epoch: u64,

    /// Worlds the host reported at the start of the pass.
    pub worlds_seen: u32,

    /// Worlds whose counter moved this pass.
    pub worlds_adjusted: u32,

    /// Worlds passed over: mid-load or mid-unload, cycle-disabled, or a
    /// rejected clock write.
    pub worlds_skipped: u32,

    /// Signed sum of all ticks applied across worlds this pass.
    pub net_ticks: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::host::StubWorldHost;

    #[test]
    fn increments_follow_durations() {
        let increments = PhaseIncrements::from_durations(DurationConfig {
            day_minutes: 10,
            night_minutes: 20,
        });
        assert_eq!(
            increments,
            PhaseIncrements {
                day: 1.0,
                night: 0.5
            }
        );

        let fast = PhaseIncrements::from_durations(DurationConfig {
            day_minutes: 1,
            night_minutes: 5,
        });
        assert_eq!(fast, PhaseIncrements { day: 10.0, night: 2.0 });
    }

    #[test]
    fn unit_increment_never_adjusts() {
        let scheduler = TimeScheduler::new(1, DurationConfig::default());
        let mut host = StubWorldHost::new();
        let id = host.add_world(100);
        let mut accumulators = AccumulatorStore::new();

        for _ in 0..100 {
            let summary = scheduler.run_pass(&mut accumulators, &mut host);
            assert_eq!(summary.worlds_seen, 1);
            assert_eq!(summary.worlds_adjusted, 0);
            assert_eq!(summary.net_ticks, 0);
        }

        assert_eq!(host.full_time(id), Some(100));
        assert_eq!(accumulators.get(id), Some(0.0));
    }

    #[test]
    fn half_increment_applies_every_other_pass() {
        let scheduler = TimeScheduler::new(1, DurationConfig {
            day_minutes: 10,
            night_minutes: 20,
        });
        let mut host = StubWorldHost::new();
        let id = host.add_world(100);
        host.freeze_phase(id, 15_000);
        let mut accumulators = AccumulatorStore::new();

        let first = scheduler.run_pass(&mut accumulators, &mut host);
        assert_eq!(first.worlds_adjusted, 0);
        assert_eq!(host.full_time(id), Some(100));
        assert_eq!(accumulators.get(id), Some(-0.5));

        let second = scheduler.run_pass(&mut accumulators, &mut host);
        assert_eq!(second.worlds_adjusted, 1);
        assert_eq!(second.net_ticks, -1);
        assert_eq!(host.full_time(id), Some(99));
        assert_eq!(accumulators.get(id), Some(0.0));
    }

    #[test]
    fn one_minute_day_applies_nine_extra_ticks_per_pass() {
        let scheduler = TimeScheduler::new(1, DurationConfig {
            day_minutes: 1,
            night_minutes: 10,
        });
        let mut host = StubWorldHost::new();
        let id = host.add_world(0);
        host.freeze_phase(id, 3_000);
        let mut accumulators = AccumulatorStore::new();

        let summary = scheduler.run_pass(&mut accumulators, &mut host);

        assert_eq!(summary.net_ticks, 9);
        assert_eq!(host.full_time(id), Some(9));
        assert_eq!(accumulators.get(id), Some(0.0));
    }

    #[test]
    fn matching_day_duration_tracks_native_rate_exactly() {
        let scheduler = TimeScheduler::new(1, DurationConfig {
            day_minutes: 10,
            night_minutes: 20,
        });
        let mut host = StubWorldHost::new();
        let id = host.add_world(0);
        let mut accumulators = AccumulatorStore::new();

        // Ten real minutes of ticks spanning the whole day phase.
        for _ in 0..12_000 {
            host.advance_native();
            let summary = scheduler.run_pass(&mut accumulators, &mut host);
            assert_eq!(summary.worlds_adjusted, 0);
        }

        // A ten-minute day matches the native rate, so the counter
        // holds exactly the native count. The final pass lands on the
        // first night tick and starts carrying the night fraction.
        assert_eq!(host.full_time(id), Some(12_000));
        assert_eq!(accumulators.get(id), Some(-0.5));
    }

    #[test]
    fn seven_minute_day_crosses_phase_in_real_minutes() {
        let scheduler = TimeScheduler::new(1, DurationConfig {
            day_minutes: 7,
            night_minutes: 10,
        });
        let mut host = StubWorldHost::new();
        let id = host.add_world(0);
        host.freeze_phase(id, 6_000);
        let mut accumulators = AccumulatorStore::new();

        // Seven real minutes of ticks at twenty per second.
        for _ in 0..(7 * 60 * 20) {
            host.advance_native();
            scheduler.run_pass(&mut accumulators, &mut host);
            let remainder = accumulators.get(id).unwrap();
            assert!(remainder.abs() < 1.0);
        }

        // Native ticks plus applied adjustments must land one full
        // phase ahead, give or take the carried fraction.
        let advanced = host.full_time(id).unwrap();
        assert!((11_999..=12_001).contains(&advanced), "advanced {advanced} ticks");
    }

    #[test]
    fn increment_switches_exactly_at_phase_boundary() {
        let scheduler = TimeScheduler::new(1, DurationConfig {
            day_minutes: 5,
            night_minutes: 10,
        });
        let mut host = StubWorldHost::new();
        let id = host.add_world(11_999);
        let mut accumulators = AccumulatorStore::new();

        // 11_999 is the last day tick: the day increment applies.
        host.freeze_phase(id, 11_999);
        let day_pass = scheduler.run_pass(&mut accumulators, &mut host);
        assert_eq!(day_pass.net_ticks, 1);
        assert_eq!(host.full_time(id), Some(12_000));

        // 12_000 is the first night tick: the night increment applies.
        host.freeze_phase(id, 12_000);
        let night_pass = scheduler.run_pass(&mut accumulators, &mut host);
        assert_eq!(night_pass.net_ticks, 0);
        assert_eq!(host.full_time(id), Some(12_000));
    }

    #[test]
    fn worlds_accumulate_independently() {
        let scheduler = TimeScheduler::new(1, DurationConfig {
            day_minutes: 5,
            night_minutes: 20,
        });
        let mut host = StubWorldHost::new();
        let fast = host.add_world(1_000);
        let slow = host.add_world(20_000);
        host.freeze_phase(fast, 1_000);
        host.freeze_phase(slow, 20_000);
        let mut accumulators = AccumulatorStore::new();

        let first = scheduler.run_pass(&mut accumulators, &mut host);
        let second = scheduler.run_pass(&mut accumulators, &mut host);

        // The day world gains a tick per pass; the night world loses
        // one every second pass.
        assert_eq!(first.worlds_seen, 2);
        assert_eq!(first.net_ticks, 1);
        assert_eq!(second.net_ticks, 0);
        assert_eq!(host.full_time(fast), Some(1_002));
        assert_eq!(host.full_time(slow), Some(19_999));
        assert_eq!(accumulators.get(fast), Some(0.0));
        assert_eq!(accumulators.get(slow), Some(0.0));
    }

    #[test]
    fn disabled_world_is_skipped() {
        let scheduler = TimeScheduler::new(1, DurationConfig {
            day_minutes: 5,
            night_minutes: 5,
        });
        let mut host = StubWorldHost::new();
        let id = host.add_world(500);
        assert!(host.set_cycle_enabled(id, false));
        let mut accumulators = AccumulatorStore::new();

        let summary = scheduler.run_pass(&mut accumulators, &mut host);

        assert_eq!(summary.worlds_seen, 1);
        assert_eq!(summary.worlds_skipped, 1);
        assert_eq!(summary.worlds_adjusted, 0);
        assert_eq!(host.full_time(id), Some(500));
        assert_eq!(accumulators.get(id), None);
    }

    #[test]
    fn transient_gap_leaves_remainder_untouched() {
        struct GapHost {
            ids: Vec<WorldId>,
        }

        impl WorldHost for GapHost {
            fn world_ids(&self) -> Vec<WorldId> {
                self.ids.clone()
            }
            fn full_time(&self, _id: WorldId) -> Option<u64> {
                None
            }
            fn phase_time(&self, _id: WorldId) -> Option<u64> {
                None
            }
            fn cycle_enabled(&self, _id: WorldId) -> Option<bool> {
                None
            }
            fn set_cycle_enabled(&mut self, _id: WorldId, _enabled: bool) -> bool {
                false
            }
            fn adjust_time(&mut self, _id: WorldId, _delta: i64) -> bool {
                false
            }
            fn advance_native(&mut self) {}
            fn take_unloaded(&mut self) -> Vec<WorldId> {
                Vec::new()
            }
        }

        let scheduler = TimeScheduler::new(1, DurationConfig {
            day_minutes: 5,
            night_minutes: 5,
        });
        let id = WorldId::new();
        let mut host = GapHost { ids: vec![id] };
        let mut accumulators = AccumulatorStore::new();
        accumulators.set(id, 0.6);

        let summary = scheduler.run_pass(&mut accumulators, &mut host);

        assert_eq!(summary.worlds_skipped, 1);
        assert_eq!(accumulators.get(id), Some(0.6));
    }

    #[test]
    fn rejected_write_keeps_previous_remainder() {
        let scheduler = TimeScheduler::new(1, DurationConfig {
            day_minutes: 10,
            night_minutes: 20,
        });
        let mut host = StubWorldHost::new();
        let id = host.add_world(0);
        host.freeze_phase(id, 18_000);
        let mut accumulators = AccumulatorStore::new();

        scheduler.run_pass(&mut accumulators, &mut host);
        assert_eq!(accumulators.get(id), Some(-0.5));

        // The counter sits at zero, so the -1 write is rejected and the
        // stored remainder survives for the next pass.
        let summary = scheduler.run_pass(&mut accumulators, &mut host);
        assert_eq!(summary.worlds_skipped, 1);
        assert_eq!(host.full_time(id), Some(0));
        assert_eq!(accumulators.get(id), Some(-0.5));
    }

    #[test]
    fn status_reports_durations() {
        let scheduler = TimeScheduler::new(3, DurationConfig {
            day_minutes: 10,
            night_minutes: 20,
        });

        let status = scheduler.status();
        assert_eq!(status.epoch, 3);
        assert_eq!(status.day_duration_minutes, 10);
        assert_eq!(status.night_duration_minutes, 20);
        assert_eq!(
            scheduler.increments(),
            PhaseIncrements {
                day: 1.0,
                night: 0.5
            }
        );
    }
}
