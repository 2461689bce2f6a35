//! Playback Speed Tracker
//!
//! Tracks the user-selected playback speed across video transitions and
//! decides which speed to apply when a new video or livestream starts.

use crate::notify::NotificationSink;
use crate::settings::catalog::{
    DEFAULT_VIDEO_SPEED, ENABLE_CUSTOM_VIDEO_SPEED, ENABLE_SAVE_VIDEO_SPEED,
};
use crate::settings::SettingsStore;
use crate::whitelist::Whitelist;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Speed meaning "leave the player's speed alone".
pub const UNCHANGED_SPEED: f32 = -1.0;

/// Speed forced for livestreams.
pub const LIVE_SPEED: f32 = 1.0;

/// Playback speed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedConfig {
    /// Highest default speed applied when custom speeds are disabled
    #[serde(default = "default_max_standard_speed")]
    pub max_standard_speed: f32,

    /// Channels whose videos keep the player's own speed
    #[serde(default)]
    pub whitelist: Vec<String>,
}

fn default_max_standard_speed() -> f32 {
    2.0
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            max_standard_speed: default_max_standard_speed(),
            whitelist: Vec::new(),
        }
    }
}

impl SpeedConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_standard_speed.is_nan() || self.max_standard_speed <= 0.0 {
            return Err(format!(
                "max_standard_speed must be positive, got {}",
                self.max_standard_speed
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SpeedState {
    selected_speed: f32,
    new_video: bool,
    is_live: bool,
}

impl Default for SpeedState {
    fn default() -> Self {
        Self {
            selected_speed: UNCHANGED_SPEED,
            new_video: false,
            is_live: false,
        }
    }
}

/// Playback speed state machine
pub struct SpeedTracker {
    settings: Arc<dyn SettingsStore>,
    whitelist: Arc<dyn Whitelist>,
    notifier: Arc<dyn NotificationSink>,
    config: SpeedConfig,
    state: Mutex<SpeedState>,
}

impl SpeedTracker {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        whitelist: Arc<dyn Whitelist>,
        notifier: Arc<dyn NotificationSink>,
        config: SpeedConfig,
    ) -> Self {
        Self {
            settings,
            whitelist,
            notifier,
            config,
            state: Mutex::new(SpeedState::default()),
        }
    }

    pub fn selected_speed(&self) -> f32 {
        self.state.lock().selected_speed
    }

    /// The user picked a speed from the menu.
    pub fn user_changed_speed(&self, speed: f32) {
        self.state.lock().selected_speed = speed;

        if !ENABLE_SAVE_VIDEO_SPEED.get(self.settings.as_ref()) {
            return;
        }
        match DEFAULT_VIDEO_SPEED.save(self.settings.as_ref(), speed) {
            Ok(()) => self
                .notifier
                .notify(&format!("Changing default speed to {}x", speed)),
            Err(e) => error!(speed, error = %e, "Failed to save default video speed"),
        }
    }

    pub fn live_video_started(&self) {
        self.state.lock().is_live = true;
    }

    pub fn new_video_started(&self, video_id: &str) {
        debug!(video_id, "New video started");
        self.state.lock().new_video = true;
    }

    pub fn override_speed(&self, speed: f32) {
        let mut state = self.state.lock();
        if speed != state.selected_speed {
            state.selected_speed = speed;
        }
    }

    /// Decide the speed to apply now. `channel` is the current channel
    /// identity, used for the whitelist check on new videos.
    pub fn set_default_speed(&self, channel: Option<&str>) -> f32 {
        let speed = {
            let mut state = self.state.lock();
            let mut speed = state.selected_speed;
            if state.is_live {
                state.is_live = false;
                state.new_video = false;
                speed = LIVE_SPEED;
            }
            if state.new_video {
                speed = DEFAULT_VIDEO_SPEED.get(self.settings.as_ref());
                state.selected_speed = speed;
                state.new_video = false;

                if channel.is_some_and(|c| self.whitelist.is_exempt(c)) {
                    speed = UNCHANGED_SPEED;
                } else if !self.is_custom_speed_enabled() && speed >= self.config.max_standard_speed
                {
                    speed = self.config.max_standard_speed;
                }
            }
            speed
        };
        self.override_speed(speed);
        debug!(speed, "Applied default playback speed");
        speed
    }

    pub fn is_custom_speed_enabled(&self) -> bool {
        ENABLE_CUSTOM_VIDEO_SPEED.get(self.settings.as_ref())
    }
}
