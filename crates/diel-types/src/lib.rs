//! Shared type definitions for the diel cycle controller.
//!
//! This crate is the single source of truth for the types every other
//! workspace member builds on: world identifiers and the constants and
//! phase classification of the 24000-tick day/night cycle.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for world identifiers
//! - [`cycle`] -- Cycle constants and day/night phase classification

pub mod cycle;
pub mod ids;

// Re-export primary types at crate root for convenience.
pub use cycle::{DAY_PHASE_TICKS, DayPhase, TICK_RATE, TICKS_PER_CYCLE};
pub use ids::WorldId;
