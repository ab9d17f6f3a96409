//! Bounded, content-keyed cache of built [`AnimationIndex`] values.
//!
//! Entries are keyed by the [`ContentKey`] of the document bytes, so the same
//! content at two paths shares one index and rewritten files miss.

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use lru::LruCache;
use parking_lot::Mutex;

use crate::config::Config;
use crate::index::AnimationIndex;
use crate::loader::{ContentKey, DocumentLoader, JsonFileLoader};
use crate::Result;

/// Composes a [`DocumentLoader`] with index construction behind an LRU.
pub struct IndexCache<L = JsonFileLoader> {
    loader: L,
    entries: Mutex<LruCache<ContentKey, Arc<AnimationIndex>>>,
}

impl<L: DocumentLoader> IndexCache<L> {
    pub fn new(loader: L, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            loader,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn with_config(loader: L, config: &Config) -> Self {
        Self::new(loader, config.cache_capacity)
    }

    #[inline]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Index for the document at `path`, built on first sight of its content.
    ///
    /// The document is read once per call and parsed only on a miss.
    pub fn get_or_build(&self, path: impl AsRef<Path>) -> Result<Arc<AnimationIndex>> {
        let path = path.as_ref();
        let bytes = self.loader.read(path)?;
        let key = ContentKey::of(&bytes);
        if let Some(index) = self.entries.lock().get(&key) {
            debug!("index cache hit for {}", path.display());
            return Ok(Arc::clone(index));
        }

        debug!("index cache miss for {}; building", path.display());
        let document = self.loader.parse(&bytes)?;
        let index = Arc::new(AnimationIndex::from_document(&document)?);

        let mut entries = self.entries.lock();
        if let Some((evicted, _)) = entries.push(key, Arc::clone(&index)) {
            if evicted != key {
                debug!("index cache full; evicted least recently used entry");
            }
        }
        Ok(index)
    }

    /// Whether the document currently at `path` already has a cached index.
    pub fn contains(&self, path: impl AsRef<Path>) -> Result<bool> {
        let key = self.loader.fingerprint(path.as_ref())?;
        Ok(self.entries.lock().contains(&key))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for IndexCache<JsonFileLoader> {
    fn default() -> Self {
        Self::with_config(JsonFileLoader::new(), &Config::default())
    }
}

impl<L> std::fmt::Debug for IndexCache<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexCache")
            .field("len", &self.entries.lock().len())
            .finish_non_exhaustive()
    }
}
