//! In-process world host.
//!
//! Owns the set of loaded worlds and their clocks, and implements the
//! scheduling host interface the tick driver works against.

pub mod clock;
pub mod error;
pub mod worlds;

pub use clock::{ClockError, WorldClock};
pub use error::HostError;
pub use worlds::{HostWorlds, WorldState};
