//! Configuration System
//!
//! Layered configuration: built-in defaults, the global config file, workspace
//! config files, then `PERSONA__*` environment variables. Values explicitly
//! stored in the settings store are overlaid on the spoof section when a
//! session is built (see [`SpoofConfig::with_settings`]).

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::prefetch::PrefetchConfig;
use crate::resolver::SpoofConfig;
use crate::speed::SpeedConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Client spoofing profiles and toggles
    #[serde(default)]
    pub spoof: SpoofConfig,

    /// Metadata prefetch cache
    #[serde(default)]
    pub prefetch: PrefetchConfig,

    /// Playback speed tracking
    #[serde(default)]
    pub speed: SpeedConfig,

    /// Storage paths
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Settings database, relative paths resolve against the workspace root
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,
}

fn default_settings_path() -> PathBuf {
    PathBuf::from(".persona/settings")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.settings_path.as_os_str().is_empty() {
            return Err("Settings path cannot be empty".to_string());
        }
        Ok(())
    }

    /// Absolute settings path for `workspace_root`.
    pub fn resolve_settings_path(&self, workspace_root: &Path) -> PathBuf {
        if self.settings_path.is_absolute() {
            self.settings_path.clone()
        } else {
            workspace_root.join(&self.settings_path)
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Prefetch(String),
    Speed(String),
    Storage(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Prefetch(msg) => write!(f, "Prefetch: {}", msg),
            ValidationError::Speed(msg) => write!(f, "Speed: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PersonaConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.prefetch.validate() {
            errors.push(ValidationError::Prefetch(e));
        }
        if let Err(e) = self.speed.validate() {
            errors.push(ValidationError::Speed(e));
        }
        if let Err(e) = self.storage.validate() {
            errors.push(ValidationError::Storage(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding all problems into a single error.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    /// Render as TOML, e.g. for `persona config show`.
    pub fn to_toml_string(&self) -> Result<String, ApiError> {
        toml::to_string_pretty(self).map_err(|e| ApiError::ConfigError(e.to_string()))
    }
}
