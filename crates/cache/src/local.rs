//! In-process dataset cache backed by DashMap.
//! Memoizes generator output per (kind, size) until the whole cache is invalidated.

use dashmap::DashMap;
use pulseboard_core::types::{Dataset, DatasetKind};
use pulseboard_generator::SyntheticMetricsGenerator;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: DatasetKind,
    pub size: i64,
}

impl CacheKey {
    /// Sizeless kinds share a single key regardless of the requested size.
    pub fn new(kind: DatasetKind, size: i64) -> Self {
        let size = if kind.takes_size() { size } else { 0 };
        Self { kind, size }
    }
}

/// Memoizing front for a [`SyntheticMetricsGenerator`].
pub struct DatasetCache {
    generator: SyntheticMetricsGenerator,
    store: DashMap<CacheKey, Arc<Dataset>>,
    max_entries: usize,
}

impl DatasetCache {
    pub fn new(generator: SyntheticMetricsGenerator, max_entries: usize) -> Self {
        Self {
            generator,
            store: DashMap::with_capacity(max_entries),
            max_entries,
        }
    }

    pub fn generator(&self) -> &SyntheticMetricsGenerator {
        &self.generator
    }

    /// Return the cached dataset for the key, computing and storing it on a miss.
    pub fn get_or_compute(&self, kind: DatasetKind, size: i64) -> Arc<Dataset> {
        let key = CacheKey::new(kind, size);

        if let Some(hit) = self.store.get(&key) {
            metrics::counter!("cache.dataset.hit").increment(1);
            debug!(kind = %kind, size = key.size, "Dataset cache hit");
            return Arc::clone(hit.value());
        }
        metrics::counter!("cache.dataset.miss").increment(1);

        let dataset = Arc::new(self.generator.generate(kind, key.size));

        // Full cache: serve the fresh value without storing it.
        if self.store.len() >= self.max_entries {
            debug!(kind = %kind, size = key.size, "Dataset cache full, not storing");
            return dataset;
        }

        Arc::clone(self.store.entry(key).or_insert(dataset).value())
    }

    /// Drop every entry. Returns how many were removed.
    pub fn invalidate_all(&self) -> usize {
        let removed = self.store.len();
        self.store.clear();
        metrics::counter!("cache.dataset.invalidated").increment(removed as u64);
        info!(removed = removed, "Dataset cache invalidated");
        removed
    }

    pub fn contains(&self, kind: DatasetKind, size: i64) -> bool {
        self.store.contains_key(&CacheKey::new(kind, size))
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
