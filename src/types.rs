//! Core value types shared by the resolver and the prefetch cache.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a unit of media whose metadata is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        ContentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(id: &str) -> Self {
        ContentId::new(id)
    }
}

impl From<String> for ContentId {
    fn from(id: String) -> Self {
        ContentId(id)
    }
}

/// Outcome of one completed metadata fetch for one content id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Content is a livestream
    pub is_live: bool,
    /// Normal playback is currently possible
    pub playability_ok: bool,
}

impl ContentMetadata {
    pub fn new(is_live: bool, playability_ok: bool) -> Self {
        Self {
            is_live,
            playability_ok,
        }
    }

    /// Metadata for ordinary, playable, non-live content.
    pub fn playable() -> Self {
        Self::new(false, true)
    }
}
