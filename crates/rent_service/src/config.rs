//! Service configuration
//!
//! Values come from a TOML file (every section optional), then
//! `RENTWISE_*` environment variables, then command-line flags.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub artifacts: ArtifactConfig,
    pub server: ServerConfig,
    pub history: HistoryConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Where the model and encoder artifacts live
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactConfig {
    pub model_path: PathBuf,
    pub encoders_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Records kept per session; 0 keeps everything
    pub max_records: usize,
    /// Live sessions before the oldest is ended
    pub max_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency_symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/rent_model.json"),
            encoders_path: PathBuf::from("models/label_encoders.json"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8501,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_records: 0,
            max_sessions: 1024,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl HistoryConfig {
    /// Per-session cap, `None` when unbounded
    pub fn record_limit(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.max_records)
    }
}

impl ServiceConfig {
    /// Load `path`, falling back to defaults when the file does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `RENTWISE_*` variables from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`; unparsable values are ignored with a warning
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("RENTWISE_MODEL_PATH") {
            self.artifacts.model_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("RENTWISE_ENCODERS_PATH") {
            self.artifacts.encoders_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("RENTWISE_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("RENTWISE_PORT") {
            match val.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid RENTWISE_PORT {:?}", val),
            }
        }
        if let Some(val) = lookup("RENTWISE_HISTORY_MAX") {
            match val.trim().parse() {
                Ok(max) => self.history.max_records = max,
                Err(_) => warn!("Ignoring invalid RENTWISE_HISTORY_MAX {:?}", val),
            }
        }
        if let Some(val) = lookup("RENTWISE_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Non-fatal problems worth logging at startup
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("Server port is 0, an ephemeral port will be chosen".to_string());
        }

        if self.display.currency_symbol.trim().is_empty() {
            warnings.push("Currency symbol is empty".to_string());
        }

        if self.history.max_sessions == 0 {
            warnings.push("max_sessions is 0, only the newest session will be kept".to_string());
        }

        if self.artifacts.model_path == self.artifacts.encoders_path {
            warnings.push("Model and encoder artifacts point at the same file".to_string());
        }

        warnings
    }
}
