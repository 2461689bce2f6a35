//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::{Commands, ConfigCommands, SettingsCommands};
use crate::cli::presentation::{format_profiles, format_resolution, format_settings_list};
use crate::config::{ConfigLoader, PersonaConfig};
use crate::context::PersonaContext;
use crate::error::{ApiError, FetchError};
use crate::fetch::FnFetcher;
use crate::request;
use crate::resolver::{self, ResolutionContext, SpoofConfig};
use crate::settings::{catalog, export_json, import_json, SledSettingsStore, SettingsStore};
use crate::types::ContentMetadata;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Runtime context for CLI execution: workspace and effective configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: PersonaConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &PersonaConfig {
        &self.config
    }

    /// Execute a command and return its printable output.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Profiles { format } => {
                let store = self.open_settings()?;
                format_profiles(&self.spoof_config(&store), format)
            }
            Commands::Resolve {
                short,
                live,
                unplayable,
                no_metadata,
            } => {
                let store = self.open_settings()?;
                let config = self.spoof_config(&store);
                let metadata =
                    (!no_metadata).then(|| ContentMetadata::new(*live, !*unplayable));
                let client = resolver::select(&ResolutionContext::new(*short, metadata, &config));
                Ok(format_resolution(client))
            }
            Commands::Classify {
                params,
                short_playing,
            } => {
                let short = request::is_short_or_clip(params.as_deref(), *short_playing);
                Ok(if short { "short/clip" } else { "ordinary" }.to_string())
            }
            Commands::Simulate {
                video_id,
                params,
                live,
                unplayable,
                fetch_delay_ms,
                fail,
            } => self.simulate(
                video_id,
                params.as_deref(),
                ContentMetadata::new(*live, !*unplayable),
                Duration::from_millis(*fetch_delay_ms),
                *fail,
            ),
            Commands::Settings { command } => self.handle_settings(command),
            Commands::Config { command } => match command {
                ConfigCommands::Show => {
                    let global = ConfigLoader::xdg_config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "(none)".to_string());
                    Ok(format!(
                        "# global config file: {}\n{}",
                        global,
                        self.config.to_toml_string()?
                    ))
                }
                ConfigCommands::Validate => {
                    self.config.ensure_valid()?;
                    Ok("Configuration is valid".to_string())
                }
            },
        }
    }

    fn open_settings(&self) -> Result<SledSettingsStore, ApiError> {
        let path = self
            .config
            .storage
            .resolve_settings_path(&self.workspace_root);
        std::fs::create_dir_all(&path)?;
        Ok(SledSettingsStore::new(&path)?)
    }

    fn spoof_config(&self, store: &dyn SettingsStore) -> SpoofConfig {
        self.config.spoof.clone().with_settings(store)
    }

    fn handle_settings(&self, command: &SettingsCommands) -> Result<String, ApiError> {
        let store = self.open_settings()?;
        let output = match command {
            SettingsCommands::List { format } => {
                format_settings_list(&store, &catalog::all(), format)?
            }
            SettingsCommands::Get { key } => {
                let setting = find_setting(key)?;
                setting.display_value(&store)
            }
            SettingsCommands::Set { key, value } => {
                let setting = find_setting(key)?;
                setting.set_from_str(&store, value)?;
                let mut message = format!("{} = {}", key, setting.display_value(&store));
                if setting.reboot_required() {
                    message.push_str(" (restart required)");
                }
                message
            }
            SettingsCommands::Reset { key } => {
                let setting = find_setting(key)?;
                setting.import(&store, None)?;
                format!("{} reset to {}", key, setting.display_value(&store))
            }
            SettingsCommands::Export { output } => {
                let json = export_json(&store, &catalog::all())?;
                match output {
                    Some(path) => {
                        std::fs::write(path, &json)?;
                        format!("Exported settings to {}", path.display())
                    }
                    None => json,
                }
            }
            SettingsCommands::Import { path } => {
                let json = std::fs::read_to_string(path)?;
                let report = import_json(&store, &catalog::all(), &json)?;
                let mut message = format!("Imported settings ({} changed)", report.updated);
                if report.reboot_required {
                    message.push_str("; restart required");
                }
                message
            }
        };
        store.flush()?;
        Ok(output)
    }

    fn simulate(
        &self,
        video_id: &str,
        params: Option<&str>,
        metadata: ContentMetadata,
        delay: Duration,
        fail: bool,
    ) -> Result<String, ApiError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| ApiError::RuntimeError(e.to_string()))?;

        let fetcher = FnFetcher::shared(move |_id| {
            std::thread::sleep(delay);
            if fail {
                Err(FetchError::Failed("simulated fetch failure".to_string()))
            } else {
                Ok(metadata)
            }
        });

        let context = PersonaContext::open(
            &self.workspace_root,
            self.config.clone(),
            runtime.handle().clone(),
            fetcher,
        )?;

        let session = context.session();
        session.set_player_response_video_id(video_id, params, false);
        let client = session.current_profile();
        info!(video_id, client = %client, "Simulated player response");

        let mut lines = vec![
            format!("client: {}", format_resolution(client)),
            format!("client_type_id: {}", session.client_type_id(0)),
            format!("client_version: {}", session.client_version("")),
            format!("client_model: {}", session.client_model("")),
        ];
        let annotated = session.annotate("1080p");
        if annotated != "1080p" {
            lines.push(format!("stats: {}", annotated));
        }
        Ok(lines.join("\n"))
    }
}

fn find_setting(key: &str) -> Result<&'static dyn crate::settings::SettingDescriptor, ApiError> {
    catalog::find(key).ok_or_else(|| ApiError::ConfigError(format!("Unknown setting: {}", key)))
}
