//! Process context: wires configuration, collaborators and the spoof session.
//!
//! Constructed once per process and handed to every call site by reference.

use crate::config::PersonaConfig;
use crate::error::ApiError;
use crate::fetch::MetadataFetcher;
use crate::notify::{LogNotifier, NotificationSink};
use crate::prefetch::PrefetchCache;
use crate::session::SpoofSession;
use crate::settings::{SettingsStore, SledSettingsStore};
use crate::speed::SpeedTracker;
use crate::whitelist::ChannelWhitelist;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::info;

/// Collaborators a context is built from.
pub struct Collaborators {
    pub settings: Arc<dyn SettingsStore>,
    pub fetcher: Arc<dyn MetadataFetcher>,
    pub notifier: Arc<dyn NotificationSink>,
}

/// Everything a host needs at its injection points.
pub struct PersonaContext {
    config: PersonaConfig,
    settings: Arc<dyn SettingsStore>,
    whitelist: Arc<ChannelWhitelist>,
    session: SpoofSession,
    speed: SpeedTracker,
}

impl PersonaContext {
    /// Build a context from explicit collaborators.
    pub fn new(
        config: PersonaConfig,
        runtime: Handle,
        collaborators: Collaborators,
    ) -> Result<Self, ApiError> {
        config.ensure_valid()?;

        let Collaborators {
            settings,
            fetcher,
            notifier,
        } = collaborators;

        let spoof = config.spoof.clone().with_settings(settings.as_ref());
        let cache = PrefetchCache::new(runtime, config.prefetch.clone());
        let session = SpoofSession::new(spoof, cache, fetcher);

        let whitelist = Arc::new(ChannelWhitelist::with_channels(
            config.speed.whitelist.iter().cloned(),
        ));
        let speed = SpeedTracker::new(
            Arc::clone(&settings),
            whitelist.clone(),
            notifier,
            config.speed.clone(),
        );

        Ok(Self {
            config,
            settings,
            whitelist,
            session,
            speed,
        })
    }

    /// Open the sled settings store under `workspace_root` and build a
    /// context that logs notifications.
    pub fn open(
        workspace_root: &Path,
        config: PersonaConfig,
        runtime: Handle,
        fetcher: Arc<dyn MetadataFetcher>,
    ) -> Result<Self, ApiError> {
        let settings_path = config.storage.resolve_settings_path(workspace_root);
        std::fs::create_dir_all(&settings_path)?;
        let settings = Arc::new(SledSettingsStore::new(&settings_path)?);
        info!(settings_path = %settings_path.display(), "Opened settings store");

        Self::new(
            config,
            runtime,
            Collaborators {
                settings,
                fetcher,
                notifier: Arc::new(LogNotifier),
            },
        )
    }

    pub fn config(&self) -> &PersonaConfig {
        &self.config
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn whitelist(&self) -> &ChannelWhitelist {
        &self.whitelist
    }

    pub fn session(&self) -> &SpoofSession {
        &self.session
    }

    pub fn speed(&self) -> &SpeedTracker {
        &self.speed
    }
}
