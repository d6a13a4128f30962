//! Configuration loading and typed config structures for diel.
//!
//! The canonical configuration lives in `diel-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and validates the raw day/night durations into a
//! [`DurationConfig`] the scheduler can trust.
//!
//! Only the `cycle` section is re-read at runtime (on reload); the `host`
//! and `operator` sections are boot-time settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `diel-config.yaml`. Every section has
/// defaults, so a missing file or an empty section is always usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DielConfig {
    /// Day/night cycle durations (re-read on every reload).
    #[serde(default)]
    pub cycle: CycleConfig,

    /// Worlds to create at startup.
    #[serde(default)]
    pub host: HostConfig,

    /// Operator API settings.
    #[serde(default)]
    pub operator: OperatorConfig,
}

impl DielConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Raw day/night durations as written in the config file.
///
/// Values are unvalidated: they may be absent or non-positive. Use
/// [`DurationConfig::from_cycle`] to turn them into durations the
/// scheduler can use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CycleConfig {
    /// Desired real-time length of the day phase, in minutes.
    #[serde(default)]
    pub day_duration_minutes: Option<i64>,

    /// Desired real-time length of the night phase, in minutes.
    #[serde(default)]
    pub night_duration_minutes: Option<i64>,
}

impl CycleConfig {
    /// A cycle config with explicit values for both phases.
    pub const fn from_minutes(day: i64, night: i64) -> Self {
        Self {
            day_duration_minutes: Some(day),
            night_duration_minutes: Some(night),
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self::from_minutes(
            i64::from(DurationConfig::DEFAULT_MINUTES),
            i64::from(DurationConfig::DEFAULT_MINUTES),
        )
    }
}

/// Validated per-phase durations in minutes. Both values are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationConfig {
    /// Real-time minutes one day phase should last.
    pub day_minutes: u32,

    /// Real-time minutes one night phase should last.
    pub night_minutes: u32,
}

impl DurationConfig {
    /// Fallback phase duration used when a configured value is missing
    /// or not a positive integer.
    pub const DEFAULT_MINUTES: u32 = 10;

    /// Validate a raw [`CycleConfig`], substituting the default for any
    /// value that is missing or not a positive integer.
    ///
    /// Returns the validated durations together with one warning per
    /// substitution, so callers can surface them in reload responses.
    pub fn from_cycle(cycle: &CycleConfig) -> (Self, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();
        let day_minutes = validate_duration(
            "day-duration-minutes",
            cycle.day_duration_minutes,
            &mut warnings,
        );
        let night_minutes = validate_duration(
            "night-duration-minutes",
            cycle.night_duration_minutes,
            &mut warnings,
        );
        (
            Self {
                day_minutes,
                night_minutes,
            },
            warnings,
        )
    }
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            day_minutes: Self::DEFAULT_MINUTES,
            night_minutes: Self::DEFAULT_MINUTES,
        }
    }
}

/// A recorded duration substitution from config validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigWarning {
    /// The config key whose value was rejected.
    pub key: String,

    /// The rejected raw value, or `None` if the key was absent.
    pub given: Option<i64>,

    /// The value used instead.
    pub substituted: u32,
}

/// Validate one duration value, recording a warning on substitution.
fn validate_duration(key: &str, raw: Option<i64>, warnings: &mut Vec<ConfigWarning>) -> u32 {
    match raw.and_then(|n| u32::try_from(n).ok()).filter(|&n| n >= 1) {
        Some(minutes) => minutes,
        None => {
            warn!(
                key,
                given = ?raw,
                default = DurationConfig::DEFAULT_MINUTES,
                "invalid or missing duration in config, using default"
            );
            warnings.push(ConfigWarning {
                key: key.to_owned(),
                given: raw,
                substituted: DurationConfig::DEFAULT_MINUTES,
            });
            DurationConfig::DEFAULT_MINUTES
        }
    }
}

/// Boot-time host settings: the worlds to create at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    /// Worlds created when the host starts.
    #[serde(default = "default_worlds")]
    pub worlds: Vec<WorldSeed>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            worlds: default_worlds(),
        }
    }
}

/// One world to create at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorldSeed {
    /// Unique display name for the world.
    pub name: String,

    /// Whether the host advances this world's time natively each tick.
    #[serde(default = "default_true")]
    pub cycle_enabled: bool,

    /// Starting value of the absolute time counter.
    #[serde(default)]
    pub initial_time: u64,
}

/// Operator API settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OperatorConfig {
    /// Whether the operator API server is started.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Host address the operator server binds to.
    #[serde(default = "default_operator_host")]
    pub host: String,

    /// TCP port the operator server listens on.
    #[serde(default = "default_operator_port")]
    pub port: u16,

    /// Bearer token for mutating operator requests (empty = no auth).
    #[serde(default)]
    pub auth_token: String,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_operator_host(),
            port: default_operator_port(),
            auth_token: String::new(),
        }
    }
}

/// Where the reload controller reads cycle durations from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Re-read and parse the YAML file on every reload. A missing file
    /// yields the default cycle section.
    File(PathBuf),

    /// Fixed in-memory values (tests and embedding).
    Fixed(CycleConfig),
}

impl ConfigSource {
    /// Read the current cycle section from this source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file exists but cannot be
    /// read or parsed.
    pub fn read_cycle(&self) -> Result<CycleConfig, ConfigError> {
        match self {
            Self::File(path) => {
                if path.exists() {
                    Ok(DielConfig::from_file(path)?.cycle)
                } else {
                    debug!(path = %path.display(), "config file not found, using default cycle");
                    Ok(CycleConfig::default())
                }
            }
            Self::Fixed(cycle) => Ok(cycle.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_worlds() -> Vec<WorldSeed> {
    vec![WorldSeed {
        name: "overworld".to_owned(),
        cycle_enabled: true,
        initial_time: 0,
    }]
}

fn default_operator_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_operator_port() -> u16 {
    8080
}

const fn default_true() -> bool {
    true
}
