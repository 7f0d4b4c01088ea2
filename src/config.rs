//! # Configuration Module
//!
//! Loads the CORS configuration from a YAML file and lets environment
//! variables override individual fields. The result is a raw
//! [`CorsConfig`]; normalization (and the fatal empty-origins check) happens
//! when the middleware is built.
//!
//! ## File Format
//!
//! ```yaml
//! cors:
//!   origins: "https://app.example.com, https://admin.example.com"
//!   methods: "GET, POST, PUT"
//!   request_headers: "Content-Type, Authorization"
//!   exposed_headers: "X-Total-Count"
//!   max_age_secs: 600
//!   credentials: true
//!   validate_headers: true
//!   on_reject: 403
//! ```
//!
//! ## Environment Variables
//!
//! | Variable                    | Field              |
//! |-----------------------------|--------------------|
//! | `CORSGATE_ORIGINS`          | `origins`          |
//! | `CORSGATE_METHODS`          | `methods`          |
//! | `CORSGATE_REQUEST_HEADERS`  | `request_headers`  |
//! | `CORSGATE_EXPOSED_HEADERS`  | `exposed_headers`  |
//! | `CORSGATE_MAX_AGE_SECS`     | `max_age_secs`     |
//! | `CORSGATE_CREDENTIALS`      | `credentials`      |
//! | `CORSGATE_VALIDATE_HEADERS` | `validate_headers` |
//! | `CORSGATE_ON_REJECT`        | `on_reject`        |
//!
//! Booleans accept `true/false`, `1/0`, `yes/no`, `on/off`.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::middleware::{CorsConfig, RejectBehavior};

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub cors: CorsConfig,
}

/// Failure to read or parse configuration
#[derive(Debug)]
pub enum ConfigLoadError {
    /// The file could not be read
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The YAML did not match [`AppConfig`]
    Yaml(serde_yaml::Error),
    /// An override variable held an unusable value
    InvalidEnv {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLoadError::Io { path, source } => {
                write!(f, "failed to read config file {}: {}", path.display(), source)
            }
            ConfigLoadError::Yaml(e) => write!(f, "invalid config YAML: {}", e),
            ConfigLoadError::InvalidEnv {
                var,
                value,
                expected,
            } => write!(f, "{}='{}' is invalid, expected {}", var, value, expected),
        }
    }
}

impl std::error::Error for ConfigLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigLoadError::Io { source, .. } => Some(source),
            ConfigLoadError::Yaml(e) => Some(e),
            ConfigLoadError::InvalidEnv { .. } => None,
        }
    }
}

impl From<serde_yaml::Error> for ConfigLoadError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigLoadError::Yaml(e)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigLoadError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigLoadError::InvalidEnv {
            var,
            value: value.to_string(),
            expected: "a boolean",
        }),
    }
}

impl AppConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigLoadError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Read a YAML file, then apply `CORSGATE_*` environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let mut config = Self::from_yaml_file(path)?;
        config.cors.apply_env_overrides()?;
        Ok(config)
    }
}

impl CorsConfig {
    /// Apply `CORSGATE_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigLoadError> {
        self.apply_overrides(|var| env::var(var).ok())
    }

    /// Apply overrides from any variable lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CORSGATE_ORIGINS") {
            self.origins = v;
        }
        if let Some(v) = lookup("CORSGATE_METHODS") {
            self.methods = v;
        }
        if let Some(v) = lookup("CORSGATE_REQUEST_HEADERS") {
            self.request_headers = v;
        }
        if let Some(v) = lookup("CORSGATE_EXPOSED_HEADERS") {
            self.exposed_headers = v;
        }
        if let Some(v) = lookup("CORSGATE_MAX_AGE_SECS") {
            let secs = v
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigLoadError::InvalidEnv {
                    var: "CORSGATE_MAX_AGE_SECS",
                    value: v.clone(),
                    expected: "a whole number of seconds",
                })?;
            self.max_age = Duration::from_secs(secs);
        }
        if let Some(v) = lookup("CORSGATE_CREDENTIALS") {
            self.credentials = parse_bool("CORSGATE_CREDENTIALS", &v)?;
        }
        if let Some(v) = lookup("CORSGATE_VALIDATE_HEADERS") {
            self.validate_headers = parse_bool("CORSGATE_VALIDATE_HEADERS", &v)?;
        }
        if let Some(v) = lookup("CORSGATE_ON_REJECT") {
            self.on_reject =
                v.parse::<RejectBehavior>()
                    .map_err(|_| ConfigLoadError::InvalidEnv {
                        var: "CORSGATE_ON_REJECT",
                        value: v.clone(),
                        expected: "\"passthrough\" or an HTTP status",
                    })?;
        }
        Ok(())
    }
}
