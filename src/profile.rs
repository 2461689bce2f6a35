//! Client profiles
//!
//! The finite set of client identities that can be presented to the remote
//! service. Each profile is a fixed `(id, version, model, friendly name)`
//! tuple plus how its player response treats the playback speed menu.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a profile's player response exposes the playback speed menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedMenu {
    /// Menu is present, nothing to force
    Present,
    /// Menu is missing; creation must be forced on
    Missing,
    /// Menu is missing behind an inverted flag; the flag must be forced off
    MissingReversed,
}

/// Statically enumerated client profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    Android,
    Ios,
    AndroidVr,
    AndroidTestsuite,
    AndroidEmbedded,
    TvEmbedded,
}

/// Immutable description of a client profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientProfile {
    pub id: i32,
    pub version: &'static str,
    pub model: &'static str,
    pub friendly_name: &'static str,
    pub speed_menu: SpeedMenu,
}

const ANDROID: ClientProfile = ClientProfile {
    id: 3,
    version: "19.29.37",
    model: "Pixel 8 Pro",
    friendly_name: "Android",
    speed_menu: SpeedMenu::Present,
};

const IOS: ClientProfile = ClientProfile {
    id: 5,
    version: "19.29.1",
    model: "iPhone16,2",
    friendly_name: "iOS",
    speed_menu: SpeedMenu::Missing,
};

const ANDROID_VR: ClientProfile = ClientProfile {
    id: 28,
    version: "1.57.29",
    model: "Quest 3",
    friendly_name: "Android VR",
    speed_menu: SpeedMenu::Present,
};

const ANDROID_TESTSUITE: ClientProfile = ClientProfile {
    id: 30,
    version: "1.9",
    model: "Pixel 8 Pro",
    friendly_name: "Android Testsuite",
    speed_menu: SpeedMenu::Missing,
};

const ANDROID_EMBEDDED: ClientProfile = ClientProfile {
    id: 55,
    version: "19.29.37",
    model: "Pixel 8 Pro",
    friendly_name: "Android Embedded Player",
    speed_menu: SpeedMenu::Present,
};

const TV_EMBEDDED: ClientProfile = ClientProfile {
    id: 85,
    version: "2.0",
    model: "SmartTV",
    friendly_name: "TV Embedded Player",
    speed_menu: SpeedMenu::MissingReversed,
};

impl ClientType {
    pub const ALL: [ClientType; 6] = [
        ClientType::Android,
        ClientType::Ios,
        ClientType::AndroidVr,
        ClientType::AndroidTestsuite,
        ClientType::AndroidEmbedded,
        ClientType::TvEmbedded,
    ];

    pub fn profile(self) -> &'static ClientProfile {
        match self {
            ClientType::Android => &ANDROID,
            ClientType::Ios => &IOS,
            ClientType::AndroidVr => &ANDROID_VR,
            ClientType::AndroidTestsuite => &ANDROID_TESTSUITE,
            ClientType::AndroidEmbedded => &ANDROID_EMBEDDED,
            ClientType::TvEmbedded => &TV_EMBEDDED,
        }
    }

    pub fn id(self) -> i32 {
        self.profile().id
    }

    pub fn version(self) -> &'static str {
        self.profile().version
    }

    pub fn model(self) -> &'static str {
        self.profile().model
    }

    pub fn friendly_name(self) -> &'static str {
        self.profile().friendly_name
    }

    pub fn speed_menu(self) -> SpeedMenu {
        self.profile().speed_menu
    }

    /// Stable name used in configuration and settings storage.
    pub fn name(self) -> &'static str {
        match self {
            ClientType::Android => "android",
            ClientType::Ios => "ios",
            ClientType::AndroidVr => "android_vr",
            ClientType::AndroidTestsuite => "android_testsuite",
            ClientType::AndroidEmbedded => "android_embedded",
            ClientType::TvEmbedded => "tv_embedded",
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClientType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ClientType::ALL
            .into_iter()
            .find(|client| client.name() == normalized)
            .ok_or_else(|| ApiError::UnknownClientType(s.to_string()))
    }
}
