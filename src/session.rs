//! Spoof Session
//!
//! The injection-point surface. One session is constructed per process and
//! shared by handle with every call site; it owns the prefetch cache and the
//! resolver. Every entry point is fail-safe: when spoofing is disabled or
//! anything goes wrong the caller's original value comes back unchanged.
//!
//! Blocking discipline: [`SpoofSession::set_player_response_video_id`] is the
//! only call that waits on a fetch, and only once per content id. Every other
//! entry point polls the cache without blocking.

use crate::fetch::MetadataFetcher;
use crate::prefetch::PrefetchCache;
use crate::profile::ClientType;
use crate::request;
use crate::resolver::{ResolutionContext, Resolver, SpoofConfig};
use crate::settings::catalog::{
    SPOOF_CLIENT, SPOOF_CLIENT_FALLBACK, SPOOF_CLIENT_GENERAL, SPOOF_CLIENT_LIVESTREAM,
    SPOOF_CLIENT_SHORTS, SPOOF_CLIENT_STATS_FOR_NERDS,
};
use crate::settings::SettingsStore;
use crate::types::ContentId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

impl SpoofConfig {
    /// Overlay values explicitly stored in `store` on top of `self`.
    pub fn with_settings(mut self, store: &dyn SettingsStore) -> Self {
        if let Some(enabled) = SPOOF_CLIENT.stored(store) {
            self.enabled = enabled;
        }
        if let Some(client) = SPOOF_CLIENT_GENERAL.stored(store) {
            self.general = client;
        }
        if let Some(client) = SPOOF_CLIENT_LIVESTREAM.stored(store) {
            self.livestream = client;
        }
        if let Some(client) = SPOOF_CLIENT_FALLBACK.stored(store) {
            self.fallback = client;
        }
        if let Some(client) = SPOOF_CLIENT_SHORTS.stored(store) {
            self.shorts = client;
        }
        if let Some(stats) = SPOOF_CLIENT_STATS_FOR_NERDS.stored(store) {
            self.stats_for_nerds = stats;
        }
        self
    }
}

/// Process-scoped client spoofing session
pub struct SpoofSession {
    config: SpoofConfig,
    cache: PrefetchCache,
    resolver: Resolver,
    fetcher: Arc<dyn MetadataFetcher>,
    short_or_clip: AtomicBool,
}

impl SpoofSession {
    pub fn new(
        config: SpoofConfig,
        cache: PrefetchCache,
        fetcher: Arc<dyn MetadataFetcher>,
    ) -> Self {
        info!(
            enabled = config.enabled,
            general = %config.general,
            livestream = %config.livestream,
            fallback = %config.fallback,
            shorts = %config.shorts,
            "Client spoofing session created"
        );
        Self {
            config,
            cache,
            resolver: Resolver::new(),
            fetcher,
            short_or_clip: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SpoofConfig {
        &self.config
    }

    pub fn cache(&self) -> &PrefetchCache {
        &self.cache
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn is_spoofing_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Observe a player response for `video_id`.
    ///
    /// Classifies the content and, for ordinary content, makes sure its
    /// metadata fetch is in flight. The first observation of an id blocks
    /// until the fetch completes or the configured timeout elapses, so the
    /// right client is known before playback starts. The parameters are
    /// returned unchanged.
    pub fn set_player_response_video_id(
        &self,
        video_id: &str,
        parameters: Option<&str>,
        is_short_opening_or_playing: bool,
    ) -> Option<String> {
        if self.config.enabled {
            let short_or_clip = request::is_short_or_clip(parameters, is_short_opening_or_playing);
            self.short_or_clip.store(short_or_clip, Ordering::SeqCst);

            if !short_or_clip {
                let id = ContentId::new(video_id);
                if self
                    .cache
                    .ensure_fetching(id.clone(), Arc::clone(&self.fetcher))
                {
                    let metadata = self.cache.get_for(&id, true, self.cache.timeout());
                    debug!(content_id = %id, metadata = ?metadata, "Prefetched content metadata");
                }
            }
        }
        parameters.map(str::to_string)
    }

    /// Resolve the profile for the content currently being played.
    pub fn current_profile(&self) -> ClientType {
        let short_or_clip = self.short_or_clip.load(Ordering::SeqCst);
        let metadata = if short_or_clip {
            None
        } else {
            self.cache.get(false, self.cache.timeout())
        };
        self.resolver
            .resolve(&ResolutionContext::new(short_or_clip, metadata, &self.config))
    }

    /// Resolve the profile for `id`, polling the cache without blocking.
    pub fn resolve_profile(&self, id: &ContentId, is_short_or_clip: bool) -> ClientType {
        let metadata = if is_short_or_clip {
            None
        } else {
            self.cache.get_for(id, false, self.cache.timeout())
        };
        self.resolver
            .resolve(&ResolutionContext::new(is_short_or_clip, metadata, &self.config))
    }

    pub fn client_type_id(&self, original: i32) -> i32 {
        if self.config.enabled {
            return self.current_profile().id();
        }
        original
    }

    pub fn client_version<'a>(&self, original: &'a str) -> &'a str {
        if self.config.enabled {
            return self.current_profile().version();
        }
        original
    }

    pub fn client_model<'a>(&self, original: &'a str) -> &'a str {
        if self.config.enabled {
            return self.current_profile().model();
        }
        original
    }

    /// Spoofed clients lose the player gesture flag; keep it on.
    pub fn enable_player_gesture(&self, original: bool) -> bool {
        self.config.enabled || original
    }

    pub fn force_speed_menu(&self, original: bool) -> bool {
        self.resolver.force_speed_menu(self.config.enabled, original)
    }

    pub fn force_speed_menu_reversed(&self, original: bool) -> bool {
        self.resolver
            .force_speed_menu_reversed(self.config.enabled, original)
    }

    /// Append the last resolved client's name to a stats string.
    pub fn annotate(&self, display: &str) -> String {
        self.resolver.annotate(display, &self.config)
    }

    /// Redirect `/get_watch` requests to an unreachable host.
    pub fn block_get_watch_request(&self, uri: &str) -> String {
        if self.config.enabled {
            match request::rewrite_get_watch(uri) {
                Ok(Some(replacement)) => {
                    debug!(uri, replacement = %replacement, "Blocking get_watch request");
                    return replacement;
                }
                Ok(None) => {}
                Err(e) => error!(uri, error = %e, "blockGetWatchRequest failure"),
            }
        }
        uri.to_string()
    }

    /// Redirect or strip `/initplayback` requests depending on the client.
    pub fn block_init_playback_request(&self, url: &str) -> String {
        if self.config.enabled {
            match request::rewrite_init_playback(url, || self.current_profile()) {
                Ok(Some(replacement)) => {
                    debug!(url, replacement = %replacement, "Blocking initplayback request");
                    return replacement;
                }
                Ok(None) => {}
                Err(e) => error!(url, error = %e, "blockInitPlaybackRequest failure"),
            }
        }
        url.to_string()
    }
}
