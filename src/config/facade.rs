//! Config loader: assembles sources in precedence order and deserializes.

use crate::config::merge::merge_policy;
use crate::config::sources::{global_file, workspace_file};
use crate::config::PersonaConfig;
use config::{ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix for environment overrides, e.g. `PERSONA__SPOOF__ENABLED=false`.
const ENV_PREFIX: &str = "PERSONA";
const ENV_SEPARATOR: &str = "__";

/// Loads [`PersonaConfig`] from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global file, workspace
    /// `config/config.toml`, workspace `config/{PERSONA_ENV}.toml`, environment.
    pub fn load(workspace_root: &Path) -> Result<PersonaConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder.add_source(Self::environment()).build()?;

        debug!(workspace_root = %workspace_root.display(), "Loaded configuration");
        config.try_deserialize()
    }

    /// Load configuration from one explicit file (plus defaults and environment).
    pub fn load_from_file(path: &Path) -> Result<PersonaConfig, ConfigError> {
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(Self::environment())
            .build()?;

        debug!(config_path = %path.display(), "Loaded configuration file");
        config.try_deserialize()
    }

    /// Location of the global config file, if one can be determined.
    pub fn xdg_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
    }
}
