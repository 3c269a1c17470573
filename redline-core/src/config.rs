//! User configuration loaded from `$XDG_CONFIG_HOME/redline/config.toml`.
//!
//! Every field has a default, so an empty or missing file yields a working
//! configuration. [`load`] reports parse errors; the binary logs them and
//! starts with defaults.
//!
//! ```toml
//! theme = "catppuccin-mocha"
//! api_base_url = "http://localhost:8000"
//! log_level = "info"
//!
//! [review]
//! initial_delay_ms = 3000
//! interval_ms = 3000
//! max_attempts = 100
//!
//! [navigation]
//! cooldown_ms = 300
//! wheel_threshold = 50.0
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::navigator::NavConfig;
use crate::review_sync::PollConfig;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: String,
    pub api_base_url: String,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log file; defaults to `redline.log` under the state directory.
    pub log_file: Option<PathBuf>,
    pub review: ReviewConfig,
    pub navigation: NavigationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            api_base_url: "http://localhost:8000".to_owned(),
            log_level: "info".to_owned(),
            log_file: None,
            review: ReviewConfig::default(),
            navigation: NavigationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub initial_delay_ms: u64,
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self { initial_delay_ms: 3000, interval_ms: 3000, max_attempts: 100 }
    }
}

impl From<ReviewConfig> for PollConfig {
    fn from(c: ReviewConfig) -> Self {
        PollConfig {
            initial_delay: Duration::from_millis(c.initial_delay_ms),
            interval: Duration::from_millis(c.interval_ms),
            max_attempts: c.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub cooldown_ms: u64,
    pub wheel_threshold: f64,
    pub swipe_min_distance: f64,
    pub swipe_max_duration_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 300,
            wheel_threshold: 50.0,
            swipe_min_distance: 50.0,
            swipe_max_duration_ms: 500,
        }
    }
}

impl From<NavigationConfig> for NavConfig {
    fn from(c: NavigationConfig) -> Self {
        NavConfig {
            cooldown: Duration::from_millis(c.cooldown_ms),
            wheel_threshold: c.wheel_threshold,
            swipe_min_distance: c.swipe_min_distance,
            swipe_max_duration: Duration::from_millis(c.swipe_max_duration_ms),
        }
    }
}

/// Returns the path to the redline config file.
///
/// Prefers `$XDG_CONFIG_HOME/redline/config.toml`; falls back to
/// `~/.config/redline/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("redline").join("config.toml")
}

/// Returns the directory for the log file.
///
/// Prefers `$XDG_STATE_HOME/redline`, then `~/.local/state/redline`.
pub fn state_dir() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".local").join("state"))
        })
        .unwrap_or_else(|| PathBuf::from("."))
        .join("redline")
}

/// Reads and parses the config at `path`. A missing file is not an error.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] for I/O failures other than not-found, and
/// [`ConfigError::Parse`] for invalid TOML or mistyped fields.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => return Err(ConfigError::Read { path: path.to_owned(), source }),
    };
    toml::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.to_owned(), source })
}
