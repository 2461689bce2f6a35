//! Metadata fetch collaborator
//!
//! The network side is opaque to this crate: whoever wires a session supplies
//! a [`MetadataFetcher`]. It is invoked from a background task and may fail.

use crate::error::FetchError;
use crate::types::{ContentId, ContentMetadata};
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches liveness and playability metadata for one content id.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, id: &ContentId) -> Result<ContentMetadata, FetchError>;
}

type BlockingFetchFn = dyn Fn(&ContentId) -> Result<ContentMetadata, FetchError> + Send + Sync;

/// Adapter running a blocking closure on the runtime's blocking pool.
pub struct FnFetcher {
    func: Arc<BlockingFetchFn>,
}

impl FnFetcher {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&ContentId) -> Result<ContentMetadata, FetchError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Convenience for call sites that hold `Arc<dyn MetadataFetcher>`.
    pub fn shared<F>(func: F) -> Arc<dyn MetadataFetcher>
    where
        F: Fn(&ContentId) -> Result<ContentMetadata, FetchError> + Send + Sync + 'static,
    {
        Arc::new(Self::new(func))
    }
}

#[async_trait]
impl MetadataFetcher for FnFetcher {
    async fn fetch(&self, id: &ContentId) -> Result<ContentMetadata, FetchError> {
        let func = Arc::clone(&self.func);
        let id = id.clone();
        tokio::task::spawn_blocking(move || func(&id))
            .await
            .map_err(|e| FetchError::Panicked(e.to_string()))?
    }
}

/// Fetcher that always answers with the same metadata.
pub struct StaticFetcher(pub ContentMetadata);

#[async_trait]
impl MetadataFetcher for StaticFetcher {
    async fn fetch(&self, _id: &ContentId) -> Result<ContentMetadata, FetchError> {
        Ok(self.0)
    }
}
