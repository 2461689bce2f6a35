//! Client Profile Resolver
//!
//! Maps (content kind, fetched metadata, configuration) to the client profile
//! presented to the remote service. Resolution is total: missing metadata
//! simply falls through to the general profile.
//!
//! Priority order, first match wins:
//! 1. shorts and clips, decided without looking at metadata
//! 2. livestreams
//! 3. content whose playability check failed
//! 4. everything else

use crate::profile::{ClientType, SpeedMenu};
use crate::types::ContentMetadata;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Left-to-right override, matching the layout of the surrounding stats text.
const LTR_OVERRIDE: char = '\u{202D}';
const THIN_SPACE: char = '\u{2009}';

/// Client spoofing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpoofConfig {
    /// Master switch; when off every injection point returns its original value
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Profile for ordinary content
    #[serde(default = "default_general")]
    pub general: ClientType,

    /// Profile for livestreams
    #[serde(default = "default_livestream")]
    pub livestream: ClientType,

    /// Profile when the playability check failed
    #[serde(default = "default_fallback")]
    pub fallback: ClientType,

    /// Profile for shorts and clips
    #[serde(default = "default_shorts")]
    pub shorts: ClientType,

    /// Append the resolved client name to the stats overlay
    #[serde(default)]
    pub stats_for_nerds: bool,
}

fn default_true() -> bool {
    true
}

fn default_general() -> ClientType {
    ClientType::AndroidTestsuite
}

fn default_livestream() -> ClientType {
    ClientType::AndroidVr
}

fn default_fallback() -> ClientType {
    ClientType::TvEmbedded
}

fn default_shorts() -> ClientType {
    ClientType::Ios
}

impl Default for SpoofConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            general: default_general(),
            livestream: default_livestream(),
            fallback: default_fallback(),
            shorts: default_shorts(),
            stats_for_nerds: false,
        }
    }
}

/// Inputs for a single resolution. Built fresh per decision.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    pub is_short_or_clip: bool,
    pub metadata: Option<ContentMetadata>,
    pub config: &'a SpoofConfig,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(
        is_short_or_clip: bool,
        metadata: Option<ContentMetadata>,
        config: &'a SpoofConfig,
    ) -> Self {
        Self {
            is_short_or_clip,
            metadata,
            config,
        }
    }
}

/// Pick the profile for `ctx` without recording it.
pub fn select(ctx: &ResolutionContext<'_>) -> ClientType {
    if ctx.is_short_or_clip {
        return ctx.config.shorts;
    }
    match ctx.metadata {
        Some(metadata) if metadata.is_live => ctx.config.livestream,
        Some(metadata) if !metadata.playability_ok => ctx.config.fallback,
        _ => ctx.config.general,
    }
}

/// Resolver that remembers the last profile it handed out.
#[derive(Debug, Default)]
pub struct Resolver {
    last_resolved: RwLock<Option<ClientType>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve and record the profile for `ctx`.
    pub fn resolve(&self, ctx: &ResolutionContext<'_>) -> ClientType {
        let client = select(ctx);
        *self.last_resolved.write() = Some(client);
        trace!(
            client = %client,
            short_or_clip = ctx.is_short_or_clip,
            metadata = ?ctx.metadata,
            "Resolved client profile"
        );
        client
    }

    /// Profile chosen by the most recent [`resolve`](Self::resolve).
    pub fn last_resolved(&self) -> Option<ClientType> {
        *self.last_resolved.read()
    }

    /// Whether the playback speed menu must be force-created.
    ///
    /// Profiles whose player response lacks the menu need it forced on.
    pub fn force_speed_menu(&self, enabled: bool, original: bool) -> bool {
        match self.last_resolved() {
            Some(client) if enabled && client.speed_menu() == SpeedMenu::Missing => true,
            _ => original,
        }
    }

    /// Inverted variant of [`force_speed_menu`](Self::force_speed_menu) for
    /// profiles that gate the menu behind a negated flag.
    pub fn force_speed_menu_reversed(&self, enabled: bool, original: bool) -> bool {
        match self.last_resolved() {
            Some(client) if enabled && client.speed_menu() == SpeedMenu::MissingReversed => false,
            _ => original,
        }
    }

    /// Append the last resolved profile's name to a stats display string.
    pub fn annotate(&self, display: &str, config: &SpoofConfig) -> String {
        if !config.enabled || !config.stats_for_nerds || display.is_empty() {
            return display.to_string();
        }
        match self.last_resolved() {
            Some(client) => format!(
                "{LTR_OVERRIDE}{display}{THIN_SPACE}({})",
                client.friendly_name()
            ),
            None => display.to_string(),
        }
    }
}
