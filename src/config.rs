//! Configuration file handling.
//!
//! Loads settings from `~/.config/multicam/config.toml` or a custom path.
//! A missing file means defaults; a file that exists but does not parse is
//! an error.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::capture::CaptureMode;
use crate::naming;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
}

#[derive(Debug, Deserialize)]
pub struct CaptureConfig {
    /// "sequential" or "concurrent".
    #[serde(default)]
    pub mode: CaptureMode,
    /// Upper bound in seconds on one concurrent-mode wait.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Present in the file format but consulted by nothing yet.
    #[serde(default)]
    pub keep_on_camera: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            mode: CaptureMode::default(),
            timeout_secs: default_timeout_secs(),
            keep_on_camera: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NamingConfig {
    /// Filename pattern: {0} is the shot name, {1} the camera name.
    #[serde(default = "default_template")]
    pub template: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ViewerConfig {
    /// Command used to open captured images (default: the platform opener).
    pub command: Option<String>,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_template() -> String {
    naming::DEFAULT_TEMPLATE.to_string()
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("multicam/config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/multicam/config.toml")
        })
}
