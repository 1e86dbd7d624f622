use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use lru::LruCache;
use profile::OwnerKind;
use semantic::EmbeddingVector;

pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

#[derive(Debug, Hash, PartialEq, Eq, Clone)]
struct CacheKey {
    kind: OwnerKind,
    owner_id: String,
    model_id: String,
    text_hash: u64,
}

impl CacheKey {
    fn new(kind: OwnerKind, owner_id: &str, model_id: &str, text: &str) -> Self {
        Self {
            kind,
            owner_id: owner_id.to_string(),
            model_id: model_id.to_string(),
            text_hash: fxhash::hash64(text),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Embeddings already computed, keyed by owner, model and summary text.
///
/// Editing a profile's summary or switching models changes the key, so a
/// stale vector is never returned. The cache is owned by whoever builds the
/// matcher; share it through an `Arc` to reuse vectors across runs.
#[derive(Debug)]
pub struct EmbeddingCache {
    entries: Mutex<LruCache<CacheKey, EmbeddingVector>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl EmbeddingCache {
    /// A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(
        &self,
        kind: OwnerKind,
        owner_id: &str,
        model_id: &str,
        text: &str,
    ) -> Option<EmbeddingVector> {
        let key = CacheKey::new(kind, owner_id, model_id, text);
        let found = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned();
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store `vector` as the embedding of `text`.
    pub fn insert(&self, text: &str, vector: EmbeddingVector) {
        let key = CacheKey::new(vector.owner_kind, &vector.owner_id, &vector.model_id, text);
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .put(key, vector);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}
