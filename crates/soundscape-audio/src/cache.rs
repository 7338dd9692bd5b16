//! Buffer cache with in-flight load deduplication.
//!
//! Every URL owns a `OnceCell` holding the outcome of one load. The first
//! caller runs the load on the blocking pool; callers arriving while it is
//! in flight wait on the same cell and share its outcome, failure included.
//! A failed cell is evicted once settled so a later call can retry.

use crate::buffer::AudioBuffer;
use crate::loader::AssetLoader;
use parking_lot::Mutex;
use soundscape_core::{Result, SoundscapeError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Outcome of one load. Failures keep the reason so every waiter can
/// report the same `Load` error.
type Outcome = std::result::Result<Arc<AudioBuffer>, String>;
type Slot = Arc<OnceCell<Outcome>>;

/// Process-lifetime cache of decoded buffers keyed by asset URL.
pub struct BufferCache {
    loader: Arc<dyn AssetLoader>,
    entries: Mutex<HashMap<String, Slot>>,
}

impl BufferCache {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            loader,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Load `url`, returning the cached buffer when available.
    ///
    /// Fails with `SoundscapeError::Load` when fetching or decoding fails.
    pub async fn load(&self, url: &str) -> Result<Arc<AudioBuffer>> {
        let slot = Arc::clone(self.entries.lock().entry(url.to_string()).or_default());

        let outcome = slot.get_or_init(|| self.fetch(url)).await;
        match outcome {
            Ok(buffer) => Ok(Arc::clone(buffer)),
            Err(reason) => {
                self.evict(url, &slot);
                Err(SoundscapeError::load(url, reason))
            }
        }
    }

    async fn fetch(&self, url: &str) -> Outcome {
        let loader = Arc::clone(&self.loader);
        let owned = url.to_string();
        debug!(url = %url, "Loading asset");
        match tokio::task::spawn_blocking(move || loader.load(&owned)).await {
            Ok(Ok(buffer)) => Ok(Arc::new(buffer)),
            Ok(Err(SoundscapeError::Load { reason, .. })) => Err(reason),
            Ok(Err(other)) => Err(other.to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Drop a settled failure, unless a newer load already replaced it.
    fn evict(&self, url: &str, slot: &Slot) {
        let mut entries = self.entries.lock();
        if entries.get(url).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            entries.remove(url);
        }
    }

    /// Cached buffer for `url`, without loading.
    pub fn get(&self, url: &str) -> Option<Arc<AudioBuffer>> {
        self.entries
            .lock()
            .get(url)
            .and_then(|slot| slot.get().and_then(|outcome| outcome.as_ref().ok().cloned()))
    }

    /// Whether `url` has been decoded successfully.
    pub fn contains(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    /// Number of decoded buffers held.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|slot| matches!(slot.get(), Some(Ok(_))))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Warm the cache for a set of URLs, loading them concurrently.
    ///
    /// Returns the number of URLs available after the warm-up. Failures are
    /// logged and skipped.
    pub async fn preload<I, S>(self: &Arc<Self>, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tasks = JoinSet::new();
        for url in urls {
            let url = url.into();
            let cache = Arc::clone(self);
            tasks.spawn(async move {
                let result = cache.load(&url).await;
                (url, result)
            });
        }

        let mut loaded = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(_))) => loaded += 1,
                Ok((url, Err(e))) => warn!(url = %url, error = %e, "Preload failed"),
                Err(e) => warn!(error = %e, "Preload task aborted"),
            }
        }
        info!(loaded, "Preload finished");
        loaded
    }
}
