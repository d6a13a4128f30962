//! Per-world time counter.

use serde::{Deserialize, Serialize};

use diel_types::{DayPhase, cycle};

/// Absolute tick counter for one world.
///
/// The counter grows by one per native tick; scheduler adjustments move
/// it in either direction but never below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldClock {
    full_time: u64,
}

impl WorldClock {
    /// A clock starting at the given absolute tick.
    pub const fn new(full_time: u64) -> Self {
        Self { full_time }
    }

    /// The absolute tick counter.
    pub const fn full_time(self) -> u64 {
        self.full_time
    }

    /// Position within the current cycle, in `0..24_000`.
    pub const fn phase_time(self) -> u64 {
        cycle::phase_time(self.full_time)
    }

    /// The phase the clock currently sits in.
    pub const fn phase(self) -> DayPhase {
        DayPhase::from_phase_time(self.phase_time())
    }

    /// Advance by one native tick.
    pub const fn advance(&mut self) {
        self.full_time = self.full_time.saturating_add(1);
    }

    /// Apply a signed scheduler adjustment, returning the new counter.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::AdjustmentOutOfRange`] if the adjustment
    /// would move the counter below zero or past `u64::MAX`. The
    /// counter is unchanged in that case.
    pub fn apply_adjustment(&mut self, delta: i64) -> Result<u64, ClockError> {
        let adjusted = self.full_time.checked_add_signed(delta).ok_or(
            ClockError::AdjustmentOutOfRange {
                full_time: self.full_time,
                delta,
            },
        )?;
        self.full_time = adjusted;
        Ok(adjusted)
    }
}

/// Errors from clock adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// The adjustment would move the counter out of range.
    #[error("adjustment of {delta} ticks out of range at tick {full_time}")]
    AdjustmentOutOfRange {
        /// Counter value when the adjustment was rejected.
        full_time: u64,

        /// The rejected adjustment.
        delta: i64,
    },
}
