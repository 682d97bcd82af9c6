//! The backend pool.
//!
//! Backends are expensive to construct and safe to share, so one is kept
//! per canvas geometry and engine version. The pool is bounded: when it
//! is full, the least-recently-used entry is dropped. Hits only take the
//! shared lock; recency is stamped through an atomic counter so a read
//! never needs to upgrade.

use crate::{BackendKey, RenderBackend, RenderError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

pub type BackendFactory =
    Box<dyn Fn(&BackendKey) -> Result<Arc<dyn RenderBackend>, RenderError> + Send + Sync>;

struct PoolEntry {
    backend: Arc<dyn RenderBackend>,
    last_used: AtomicU64,
}

pub struct BackendPool {
    factory: BackendFactory,
    capacity: usize,
    clock: AtomicU64,
    entries: RwLock<HashMap<BackendKey, PoolEntry>>,
}

impl BackendPool {
    /// `capacity` must be at least 1; smaller values are clamped.
    pub fn new(capacity: usize, factory: BackendFactory) -> Self {
        Self {
            factory,
            capacity: capacity.max(1),
            clock: AtomicU64::new(0),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The backend for `key`, building and caching one if needed.
    pub fn checkout(&self, key: &BackendKey) -> Result<Arc<dyn RenderBackend>, RenderError> {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = entries.get(key) {
                entry
                    .last_used
                    .store(self.clock.fetch_add(1, Ordering::Relaxed), Ordering::Relaxed);
                return Ok(Arc::clone(&entry.backend));
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        // Another writer may have built it while we waited for the lock.
        if let Some(entry) = entries.get(key) {
            entry
                .last_used
                .store(self.clock.fetch_add(1, Ordering::Relaxed), Ordering::Relaxed);
            return Ok(Arc::clone(&entry.backend));
        }

        log::debug!("building render backend for {:?}", key);
        let backend = (self.factory)(key)?;

        if entries.len() >= self.capacity {
            let stale = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                .map(|(key, _)| key.clone());
            if let Some(stale) = stale {
                log::debug!("evicting render backend {:?}", stale);
                entries.remove(&stale);
            }
        }

        entries.insert(
            key.clone(),
            PoolEntry {
                backend: Arc::clone(&backend),
                last_used: AtomicU64::new(self.clock.fetch_add(1, Ordering::Relaxed)),
            },
        );
        Ok(backend)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
