//! Core scheduling for diel.
//!
//! This crate owns the pieces between the world host and the operator
//! surface: typed configuration with validation, the per-pass duration
//! algorithm, per-world fractional accumulators, the shared scheduler
//! slot with its reload controller, and the fixed-rate tick driver.

pub mod accumulator;
pub mod config;
pub mod host;
pub mod reload;
pub mod runner;
pub mod scheduler;

pub use accumulator::AccumulatorStore;
pub use config::{
    ConfigError, ConfigSource, ConfigWarning, CycleConfig, DielConfig, DurationConfig, HostConfig,
    OperatorConfig, WorldSeed,
};
pub use host::{StubWorldHost, WorldHost};
pub use reload::{
    ControllerState, ControllerStatus, ReloadController, ReloadError, ReloadOutcome, SchedulerSlot,
};
pub use runner::{
    DriverControl, DriverStats, NoOpCallback, PassCallback, TICK_INTERVAL, run_driver,
};
pub use scheduler::{JobStatus, PassSummary, PhaseIncrements, TimeScheduler};
