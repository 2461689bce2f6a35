//! Channel whitelist lookup.

use parking_lot::RwLock;
use std::collections::HashSet;

/// Membership lookup by channel identity.
pub trait Whitelist: Send + Sync {
    fn is_exempt(&self, identity: &str) -> bool;
}

/// In-memory whitelist
#[derive(Debug, Default)]
pub struct ChannelWhitelist {
    channels: RwLock<HashSet<String>>,
}

impl ChannelWhitelist {
    pub fn with_channels<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            channels: RwLock::new(channels.into_iter().map(Into::into).collect()),
        }
    }

    /// Returns `true` if the channel was newly added.
    pub fn add(&self, identity: impl Into<String>) -> bool {
        self.channels.write().insert(identity.into())
    }

    /// Returns `true` if the channel was present.
    pub fn remove(&self, identity: &str) -> bool {
        self.channels.write().remove(identity)
    }
}

impl Whitelist for ChannelWhitelist {
    fn is_exempt(&self, identity: &str) -> bool {
        self.channels.read().contains(identity)
    }
}
