//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: diel_core::config::ConfigError,
    },

    /// Seeding the world host failed.
    #[error("host error: {source}")]
    Host {
        /// The underlying host error.
        #[from]
        source: diel_host::HostError,
    },

    /// Installing the initial scheduling job failed.
    #[error("reload error: {source}")]
    Reload {
        /// The underlying reload error.
        #[from]
        source: diel_core::reload::ReloadError,
    },

    /// The operator API server failed to start.
    #[error("operator error: {message}")]
    Operator {
        /// Description of the operator failure.
        message: String,
    },
}
