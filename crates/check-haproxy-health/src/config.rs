//! Optional YAML configuration file.
//!
//! ```yaml
//! socket:
//!   file: /var/run/haproxy.sock
//!   dir: /run/haproxy        # takes precedence over `file`
//!   timeout: 5s
//! counters:
//!   zero: true
//! logging:
//!   level: warn
//!   format: text             # or json
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::cli::Args;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub socket: SocketSettings,

    #[serde(default)]
    pub counters: CounterSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        self.socket.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SocketSettings {
    #[validate(custom = "validate_socket_path")]
    pub file: String,

    #[validate(custom = "validate_socket_path")]
    pub dir: Option<String>,

    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_timeout")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterSettings {
    /// Reset haproxy counters after every check
    pub zero: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    #[validate(custom = "validate_log_level")]
    pub level: Option<String>,

    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for SocketSettings {
    fn default() -> Self {
        Self {
            file: haproxy_stats::DEFAULT_SOCKET_FILE.to_string(),
            dir: None,
            timeout: Duration::from_secs(5),
        }
    }
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self { zero: true }
    }
}

fn validate_socket_path<T: AsRef<str> + ?Sized>(path: &T) -> Result<(), ValidationError> {
    let trimmed = path.as_ref().trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("socket_path_empty"));
    }
    if !trimmed.starts_with('/') && !trimmed.starts_with("./") {
        return Err(ValidationError::new("socket_path_invalid_format"));
    }
    Ok(())
}

fn validate_timeout(timeout: &Duration) -> Result<(), ValidationError> {
    let millis = timeout.as_millis();
    if !(1..=300_000).contains(&millis) {
        return Err(ValidationError::new("socket_timeout_out_of_range"));
    }
    Ok(())
}

fn validate_log_level<T: AsRef<str> + ?Sized>(level: &T) -> Result<(), ValidationError> {
    match level.as_ref().to_ascii_lowercase().as_str() {
        "error" | "warn" | "info" | "debug" | "trace" | "off" => Ok(()),
        _ => Err(ValidationError::new("log_level_unknown")),
    }
}

impl Config {
    /// Load `explicit` if given, otherwise the first file found in the
    /// standard locations, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit.map(Path::to_path_buf).or_else(Self::find_config_file) {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not a mapping
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/check-haproxy-health/config.yaml")];

        if let Some(home_path) = Self::home_config_path() {
            paths.push(home_path);
        }

        paths.push(PathBuf::from("./check-haproxy-health.yaml"));

        paths.into_iter().find(|p| p.is_file())
    }

    fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/check-haproxy-health/config.yaml"))
    }

    /// Combine with command-line flags. Flags win over file values.
    pub fn resolve(&self, args: &Args) -> Settings {
        let target = match (&args.socket_dir, &args.socket_file, &self.socket.dir) {
            (Some(dir), _, _) => SocketTarget::Dir(dir.clone()),
            (None, Some(file), _) => SocketTarget::File(file.clone()),
            (None, None, Some(dir)) => SocketTarget::Dir(PathBuf::from(dir)),
            (None, None, None) => SocketTarget::File(PathBuf::from(&self.socket.file)),
        };

        Settings {
            target,
            timeout: args
                .timeout
                .map(Duration::from_secs)
                .unwrap_or(self.socket.timeout),
            zero_counters: self.counters.zero && !args.nozerocounters,
            verbosity: args.verbose,
            log_level: self.logging.level.clone(),
            log_format: self.logging.format,
        }
    }
}

/// Where the stats sockets are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketTarget {
    File(PathBuf),
    Dir(PathBuf),
}

/// Effective settings of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub target: SocketTarget,
    pub timeout: Duration,
    pub zero_counters: bool,
    pub verbosity: u8,
    pub log_level: Option<String>,
    pub log_format: LogFormat,
}

impl Settings {
    /// Filter directive used when `RUST_LOG` is not set. Verbosity flags
    /// above `-v` win over the configured level.
    pub fn log_level(&self) -> &str {
        match (&self.log_level, self.verbosity) {
            (Some(level), 0 | 1) => level.as_str(),
            _ => common::logging::level_for_verbosity(self.verbosity),
        }
    }
}
