//! Study planner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::domain::Hours;
use crate::planner::{PlannerSettings, SaveMode};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Save behaviour
    pub save: SaveConfig,

    /// Status line behaviour
    pub status: StatusConfig,

    /// Item form options
    pub items: ItemsConfig,

    /// Host link
    pub host: HostConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Everything checked here is what `planner_settings` needs to succeed.
    pub fn validate(&self) -> Result<()> {
        self.planner_settings().map(|_| ())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .studyplanner.yml
        let local_config = PathBuf::from(".studyplanner.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/studyplanner/studyplanner.yml
        if let Some(user_config) = user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Peek at the log level before logging is set up
    ///
    /// Errors are swallowed here; the full load reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".studyplanner.yml")];
                paths.extend(user_config_path());
                paths
            }
        };
        candidates
            .into_iter()
            .find(|p| p.exists())
            .and_then(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Planner behaviour derived from this configuration
    pub fn planner_settings(&self) -> Result<PlannerSettings> {
        debug!("Config::planner_settings: called");
        let default_hours = Hours::new(self.items.default_hours)
            .map_err(|e| eyre::eyre!("items.default-hours is invalid: {}", e))?;
        let noun = self.items.noun.trim();
        if noun.is_empty() {
            return Err(eyre::eyre!("items.noun must not be empty"));
        }
        Ok(PlannerSettings {
            save_mode: self.save.mode,
            save_delay: Duration::from_millis(self.save.delay_ms),
            status_clear_after: Duration::from_millis(self.status.clear_after_ms),
            track_hours: self.items.track_hours,
            default_hours,
            noun: noun.to_string(),
        })
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("studyplanner").join("studyplanner.yml"))
}

/// Save behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// `auto` saves after every change, `manual` only on request
    pub mode: SaveMode,

    /// Simulated save latency in milliseconds
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            mode: SaveMode::Manual,
            delay_ms: 1000,
        }
    }
}

/// Status line behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// How long transient status messages stay visible
    #[serde(rename = "clear-after-ms")]
    pub clear_after_ms: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self { clear_after_ms: 2000 }
    }
}

/// Item form options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemsConfig {
    /// Collect planned hours per item
    #[serde(rename = "track-hours")]
    pub track_hours: bool,

    /// Hours pre-filled in the form
    #[serde(rename = "default-hours")]
    pub default_hours: f64,

    /// What an item is called in prompts ("subject", "task")
    pub noun: String,
}

impl Default for ItemsConfig {
    fn default() -> Self {
        Self {
            track_hours: true,
            default_hours: 1.0,
            noun: "subject".to_string(),
        }
    }
}

/// Host link
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Socket of the embedding host; standalone when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket: Option<PathBuf>,

    /// Connect timeout in milliseconds
    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            socket: None,
            connect_timeout_ms: 5000,
        }
    }
}
