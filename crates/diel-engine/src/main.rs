//! Engine binary for the diel cycle controller.
//!
//! This is the main entry point that wires together the world host,
//! the tick driver, the reload controller, and the operator API. It
//! loads configuration, seeds the initial worlds, installs the first
//! scheduling job, and drives scheduler passes until shutdown.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `diel-config.yaml`
//! 3. Seed the world host from the config
//! 4. Create the scheduler slot, driver control, and reload controller
//! 5. Install the initial scheduling job
//! 6. Start the operator API server (if enabled)
//! 7. Listen for Ctrl-C and request a driver stop
//! 8. Run the tick driver
//! 9. Shut down the controller and log the result

mod error;
mod pass_callback;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use diel_core::config::{ConfigSource, DielConfig};
use diel_core::reload::{ReloadController, SchedulerSlot};
use diel_core::runner::{self, DriverControl, NoOpCallback, PassCallback};
use diel_host::HostWorlds;
use diel_operator::server::ServerConfig;
use diel_operator::state::AppState;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::pass_callback::OperatorCallback;

/// Default path of the configuration file, relative to the working
/// directory. Overridable with the `DIEL_CONFIG` environment variable.
const CONFIG_PATH: &str = "diel-config.yaml";

/// Application entry point for the engine.
///
/// Initializes all subsystems and runs the tick driver. Returns an
/// error code on failure.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("diel-engine starting");

    // 2. Load configuration.
    let config_path = config_path();
    let config = load_config(&config_path)?;
    info!(
        path = %config_path.display(),
        worlds = config.host.worlds.len(),
        operator_enabled = config.operator.enabled,
        "Configuration loaded"
    );

    // 3. Seed the world host.
    let host = Arc::new(RwLock::new(HostWorlds::from_seeds(&config.host.worlds)?));
    info!(world_count = host.read().await.count(), "World host seeded");

    // 4. Create the shared driver handles.
    let slot = Arc::new(SchedulerSlot::new());
    let control = Arc::new(DriverControl::new());
    let controller = Arc::new(ReloadController::new(
        Arc::clone(&slot),
        ConfigSource::File(config_path),
    ));

    // 5. Install the initial scheduling job.
    let outcome = controller.reload().await?;
    info!(
        epoch = outcome.epoch,
        day_minutes = outcome.durations.day_minutes,
        night_minutes = outcome.durations.night_minutes,
        warnings = outcome.warnings.len(),
        "Initial cycle job installed"
    );

    // 6. Start the operator API server.
    let mut callback: Box<dyn PassCallback> = if config.operator.enabled {
        let state = Arc::new(AppState::new(
            Arc::clone(&host),
            Arc::clone(&controller),
            Arc::clone(&control),
            config.operator.auth_token.clone(),
        ));
        let server_config = ServerConfig::from_app_config(&config.operator);
        let _operator_handle = diel_operator::spawn_operator(server_config, Arc::clone(&state))
            .map_err(|e| EngineError::Operator {
                message: format!("{e}"),
            })?;
        info!(port = config.operator.port, "Operator API server started");
        Box::new(OperatorCallback::new(state))
    } else {
        info!("Operator API disabled by config");
        Box::new(NoOpCallback)
    };

    // 7. Request a driver stop on Ctrl-C.
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            info!("Shutdown signal received, requesting driver stop");
            control.request_stop();
        });
    }

    // 8. Run the tick driver until stopped.
    info!("Entering tick driver loop");
    let stats = runner::run_driver(&host, &slot, &control, callback.as_mut()).await;

    // 9. Shut down the controller and log the result.
    controller.shutdown().await;

    info!(
        ticks_driven = stats.ticks_driven,
        passes_run = stats.passes_run,
        "diel-engine shutdown complete"
    );

    Ok(())
}

/// Resolve the configuration file path, honoring `DIEL_CONFIG`.
fn config_path() -> PathBuf {
    std::env::var("DIEL_CONFIG").map_or_else(|_| PathBuf::from(CONFIG_PATH), PathBuf::from)
}

/// Load the engine configuration from the resolved config path.
fn load_config(path: &Path) -> Result<DielConfig, EngineError> {
    if path.exists() {
        let config = DielConfig::from_file(path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(DielConfig::default())
    }
}
