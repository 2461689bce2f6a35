//! Shared test utilities for integration tests
//!
//! Provides scripted fetchers, runtimes and environment isolation so each
//! test controls exactly when metadata becomes available.

use async_trait::async_trait;
use persona::error::FetchError;
use persona::fetch::MetadataFetcher;
use persona::types::{ContentId, ContentMetadata};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::runtime::Runtime;
use tokio::sync::Semaphore;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Multi-threaded runtime; blocking reads must never run on its workers.
pub fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

/// Fetcher that records every invocation and answers immediately.
pub struct CountingFetcher {
    calls: AtomicUsize,
    answer: ContentMetadata,
}

impl CountingFetcher {
    pub fn new(answer: ContentMetadata) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            answer,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataFetcher for CountingFetcher {
    async fn fetch(&self, _id: &ContentId) -> Result<ContentMetadata, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }
}

/// Fetcher that holds its answer until [`open`](GatedFetcher::open) is called.
pub struct GatedFetcher {
    gate: Semaphore,
    answer: Result<ContentMetadata, FetchError>,
}

impl GatedFetcher {
    pub fn new(answer: Result<ContentMetadata, FetchError>) -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            answer,
        })
    }

    pub fn open(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl MetadataFetcher for GatedFetcher {
    async fn fetch(&self, _id: &ContentId) -> Result<ContentMetadata, FetchError> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| FetchError::Failed(e.to_string()))?;
        permit.forget();
        self.answer.clone()
    }
}

/// Fetcher that never completes.
pub struct NeverFetcher;

#[async_trait]
impl MetadataFetcher for NeverFetcher {
    async fn fetch(&self, _id: &ContentId) -> Result<ContentMetadata, FetchError> {
        futures::future::pending().await
    }
}

/// Environment variable state to restore after test
struct EnvState {
    vars: Vec<(&'static str, Option<String>)>,
}

const ISOLATED_VARS: [&str; 4] = ["HOME", "XDG_CONFIG_HOME", "PERSONA_ENV", "PERSONA__SPOOF__ENABLED"];

impl EnvState {
    fn capture() -> Self {
        Self {
            vars: ISOLATED_VARS
                .iter()
                .map(|name| (*name, std::env::var(name).ok()))
                .collect(),
        }
    }

    fn restore(self) {
        for (name, value) in self.vars {
            match value {
                Some(orig) => std::env::set_var(name, orig),
                None => std::env::remove_var(name),
            }
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointed into `test_dir` and the
/// persona environment variables cleared.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_config_home = test_dir.path().join("xdg");
    let test_home = test_dir.path().join("home");
    std::fs::create_dir_all(&test_config_home).unwrap();
    std::fs::create_dir_all(&test_home).unwrap();

    std::env::set_var("HOME", &test_home);
    std::env::set_var("XDG_CONFIG_HOME", &test_config_home);
    std::env::remove_var("PERSONA_ENV");
    std::env::remove_var("PERSONA__SPOOF__ENABLED");

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    env_state.restore();

    match result {
        Ok(value) => value,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}
