//! Constants and phase classification for the day/night cycle.
//!
//! A world's absolute time counter only ever increases; its position
//! within the day/night cycle is the counter folded into the 24000-tick
//! cycle. The first half of the cycle is day, the second half night.
//! These derivations never live in stored state -- the counter is the
//! single source of truth.

use serde::{Deserialize, Serialize};

/// Number of simulation ticks in one full day/night cycle.
pub const TICKS_PER_CYCLE: u64 = 24_000;

/// Number of ticks in the day phase. Phase times `0..DAY_PHASE_TICKS`
/// are day; the remainder of the cycle is night.
pub const DAY_PHASE_TICKS: u64 = 12_000;

/// Fixed host tick rate in simulation ticks per real-time second.
pub const TICK_RATE: u32 = 20;

/// The two phases of the day/night cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPhase {
    /// Phase times 0 through 11999.
    Day,
    /// Phase times 12000 through 23999.
    Night,
}

impl DayPhase {
    /// Classify a phase time into day or night.
    ///
    /// Values at or beyond [`TICKS_PER_CYCLE`] are folded back into the
    /// cycle first, so absolute counters can be passed directly.
    pub const fn from_phase_time(phase_time: u64) -> Self {
        let folded = match phase_time.checked_rem(TICKS_PER_CYCLE) {
            Some(t) => t,
            None => 0,
        };
        if folded < DAY_PHASE_TICKS {
            Self::Day
        } else {
            Self::Night
        }
    }
}

/// Fold an absolute time counter into its position within the cycle.
pub const fn phase_time(full_time: u64) -> u64 {
    match full_time.checked_rem(TICKS_PER_CYCLE) {
        Some(t) => t,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_constants_are_consistent() {
        // The day phase is exactly half the cycle.
        assert_eq!(DAY_PHASE_TICKS.saturating_mul(2), TICKS_PER_CYCLE);
    }

    #[test]
    fn phase_boundaries() {
        assert_eq!(DayPhase::from_phase_time(0), DayPhase::Day);
        assert_eq!(DayPhase::from_phase_time(11_999), DayPhase::Day);
        assert_eq!(DayPhase::from_phase_time(12_000), DayPhase::Night);
        assert_eq!(DayPhase::from_phase_time(23_999), DayPhase::Night);
    }

    #[test]
    fn absolute_counters_fold_into_cycle() {
        // 24000 is the start of the second day.
        assert_eq!(DayPhase::from_phase_time(24_000), DayPhase::Day);
        assert_eq!(DayPhase::from_phase_time(36_000), DayPhase::Night);
        assert_eq!(phase_time(24_000), 0);
        assert_eq!(phase_time(36_500), 12_500);
        assert_eq!(phase_time(11_999), 11_999);
    }

    #[test]
    fn phase_serializes_lowercase() {
        let json = serde_json::to_string(&DayPhase::Day).unwrap_or_default();
        assert_eq!(json, "\"day\"");
    }
}
