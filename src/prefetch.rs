//! Single-slot Metadata Prefetch Cache
//!
//! Holds at most one in-flight (or completed) metadata fetch, keyed by the
//! content id it was issued for. Observing a new id replaces the slot; the
//! superseded fetch keeps running but writes only into its own abandoned
//! cell, so a stale result can never be read back for the new id.
//!
//! Reads come in two flavours: a non-blocking poll and a bounded blocking
//! wait. Neither ever surfaces a fetch failure; failures and timeouts are
//! logged here and reported to the caller as "metadata absent".

use crate::error::FetchError;
use crate::fetch::MetadataFetcher;
use crate::types::{ContentId, ContentMetadata};
use futures::FutureExt;
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, error, trace};

type FetchOutcome = Result<ContentMetadata, FetchError>;

/// Prefetch cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchConfig {
    /// Upper bound for a blocking read (milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl PrefetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("Prefetch timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Result cell for one issued fetch.
struct PendingFetch {
    key: ContentId,
    generation: u64,
    outcome: Mutex<Option<FetchOutcome>>,
    ready: Condvar,
    notify: Notify,
}

impl PendingFetch {
    fn new(key: ContentId, generation: u64) -> Self {
        Self {
            key,
            generation,
            outcome: Mutex::new(None),
            ready: Condvar::new(),
            notify: Notify::new(),
        }
    }

    fn complete(&self, outcome: FetchOutcome) {
        {
            let mut slot = self.outcome.lock();
            if slot.is_none() {
                *slot = Some(outcome);
            }
        }
        self.ready.notify_all();
        self.notify.notify_waiters();
    }

    fn try_outcome(&self) -> Option<FetchOutcome> {
        self.outcome.lock().clone()
    }

    /// Block the calling thread until completion or `timeout`.
    ///
    /// A timeout too large to express as a deadline waits without bound.
    fn wait(&self, timeout: Duration) -> Option<FetchOutcome> {
        let deadline = Instant::now().checked_add(timeout);
        let mut outcome = self.outcome.lock();
        while outcome.is_none() {
            match deadline {
                Some(deadline) => {
                    if self.ready.wait_until(&mut outcome, deadline).timed_out() {
                        break;
                    }
                }
                None => self.ready.wait(&mut outcome),
            }
        }
        outcome.clone()
    }

    async fn wait_async(&self) -> FetchOutcome {
        loop {
            let notified = self.notify.notified();
            if let Some(outcome) = self.try_outcome() {
                return outcome;
            }
            notified.await;
        }
    }
}

#[derive(Default)]
struct Slot {
    current_key: Option<ContentId>,
    generation: u64,
    pending: Option<Arc<PendingFetch>>,
}

/// Single-slot, key-deduplicated asynchronous metadata cache.
pub struct PrefetchCache {
    slot: Mutex<Slot>,
    runtime: Handle,
    config: PrefetchConfig,
}

impl PrefetchCache {
    /// Create an empty cache whose fetches run on `runtime`.
    pub fn new(runtime: Handle, config: PrefetchConfig) -> Self {
        Self {
            slot: Mutex::new(Slot::default()),
            runtime,
            config,
        }
    }

    /// Configured bound for blocking reads.
    pub fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    /// Content id of the in-flight or most recent fetch.
    pub fn current_key(&self) -> Option<ContentId> {
        self.slot.lock().current_key.clone()
    }

    /// Number of fetches issued so far.
    pub fn generation(&self) -> u64 {
        self.slot.lock().generation
    }

    /// Make sure a fetch for `id` is in flight.
    ///
    /// Returns `false` without scheduling anything when `id` is already the
    /// current key. Otherwise the slot is replaced and `fetcher` is spawned
    /// on the runtime; the caller is never blocked.
    pub fn ensure_fetching(&self, id: ContentId, fetcher: Arc<dyn MetadataFetcher>) -> bool {
        let pending = {
            let mut slot = self.slot.lock();
            if slot.current_key.as_ref() == Some(&id) {
                trace!(content_id = %id, "Fetch already issued for content id");
                return false;
            }
            slot.generation += 1;
            let pending = Arc::new(PendingFetch::new(id.clone(), slot.generation));
            slot.current_key = Some(id);
            slot.pending = Some(Arc::clone(&pending));
            pending
        };

        debug!(
            content_id = %pending.key,
            generation = pending.generation,
            "Scheduling metadata fetch"
        );

        let task = Arc::clone(&pending);
        self.runtime.spawn(async move {
            let outcome = match AssertUnwindSafe(fetcher.fetch(&task.key))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(payload) => Err(FetchError::Panicked(panic_message(&*payload))),
            };
            trace!(
                content_id = %task.key,
                generation = task.generation,
                ok = outcome.is_ok(),
                "Metadata fetch finished"
            );
            task.complete(outcome);
        });

        true
    }

    /// Read the metadata of the current fetch.
    ///
    /// With `wait_for_completion == false` an unfinished fetch yields `None`
    /// immediately. Otherwise the calling thread blocks for at most `timeout`.
    pub fn get(&self, wait_for_completion: bool, timeout: Duration) -> Option<ContentMetadata> {
        let pending = self.slot.lock().pending.clone()?;
        self.read(&pending, wait_for_completion, timeout)
    }

    /// Like [`get`](Self::get), but only answers for `id` when it is still the
    /// current key.
    pub fn get_for(
        &self,
        id: &ContentId,
        wait_for_completion: bool,
        timeout: Duration,
    ) -> Option<ContentMetadata> {
        let pending = {
            let slot = self.slot.lock();
            if slot.current_key.as_ref() != Some(id) {
                return None;
            }
            slot.pending.clone()?
        };
        self.read(&pending, wait_for_completion, timeout)
    }

    /// Await the current fetch, racing it against `timeout`.
    pub async fn get_async(&self, timeout: Duration) -> Option<ContentMetadata> {
        let pending = self.slot.lock().pending.clone()?;
        let outcome = tokio::time::timeout(timeout, pending.wait_async())
            .await
            .ok();
        self.settle(&pending, outcome, Some(timeout))
    }

    fn read(
        &self,
        pending: &PendingFetch,
        wait_for_completion: bool,
        timeout: Duration,
    ) -> Option<ContentMetadata> {
        if wait_for_completion {
            let outcome = pending.wait(timeout);
            self.settle(pending, outcome, Some(timeout))
        } else {
            self.settle(pending, pending.try_outcome(), None)
        }
    }

    fn settle(
        &self,
        pending: &PendingFetch,
        outcome: Option<FetchOutcome>,
        waited: Option<Duration>,
    ) -> Option<ContentMetadata> {
        match outcome {
            Some(Ok(metadata)) => Some(metadata),
            Some(Err(err)) => {
                error!(
                    content_id = %pending.key,
                    generation = pending.generation,
                    error = %err,
                    "Could not get content metadata"
                );
                None
            }
            None => {
                if let Some(timeout) = waited {
                    debug!(
                        content_id = %pending.key,
                        generation = pending.generation,
                        error = %FetchError::Timeout(timeout),
                        "Could not get content metadata (wait timed out)"
                    );
                }
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
