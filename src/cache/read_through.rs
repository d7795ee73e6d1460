use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::error::Result;

use super::memory::MemoryStore;
use super::origin::Origin;
use super::{AudioBytes, AudioStore};

/// Which tier answered a lookup.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CacheHit {
    Memory,
    Durable,
    Origin,
}

type PrefetchResult = (String, Result<Vec<u8>>);

/// A finished background fetch, as reported by
/// [`ReadThroughCache::poll_prefetches`]. On success the bytes are already
/// in the cache.
#[derive(Debug)]
pub struct Prefetched {
    pub key: String,
    pub result: Result<()>,
}

/// Memory tier, then the optional durable tier, then the origin.
pub struct ReadThroughCache {
    memory: MemoryStore,
    durable: Option<Box<dyn AudioStore>>,
    origin: Arc<dyn Origin>,
    in_flight: HashSet<String>,
    done_tx: Sender<PrefetchResult>,
    done_rx: Receiver<PrefetchResult>,
}

impl ReadThroughCache {
    /// `durable` is `None` when caching to disk is disabled or unavailable.
    pub fn new(durable: Option<Box<dyn AudioStore>>, origin: Arc<dyn Origin>) -> Self {
        let (done_tx, done_rx) = mpsc::channel();
        Self {
            memory: MemoryStore::new(),
            durable,
            origin,
            in_flight: HashSet::new(),
            done_tx,
            done_rx,
        }
    }

    #[cfg(test)]
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn has_durable_tier(&self) -> bool {
        self.durable.is_some()
    }

    /// Cached bytes for `key` without touching the origin.
    fn lookup(&mut self, key: &str) -> Option<(AudioBytes, CacheHit)> {
        if let Some(bytes) = self.memory.get(key) {
            return Some((bytes, CacheHit::Memory));
        }

        let bytes = self.durable.as_mut()?.get(key)?;
        // Promotion into memory cannot fail.
        let _ = self.memory.put(key, bytes.clone());
        Some((bytes, CacheHit::Durable))
    }

    /// Bytes for `key`, fetching from the origin and populating both tiers
    /// on a miss. Only an origin failure is returned as an error.
    pub fn load(&mut self, key: &str) -> Result<(AudioBytes, CacheHit)> {
        if let Some(found) = self.lookup(key) {
            tracing::debug!(key, tier = ?found.1, "audio cache hit");
            return Ok(found);
        }

        let bytes: AudioBytes = self.origin.fetch(key)?.into();
        tracing::debug!(key, len = bytes.len(), "fetched audio from origin");
        self.absorb(key, bytes.clone());
        Ok((bytes, CacheHit::Origin))
    }

    /// Like [`ReadThroughCache::load`], but a miss on a remote origin
    /// starts a background fetch and returns `Ok(None)` instead of
    /// blocking. The outcome is reported by `poll_prefetches`.
    pub fn try_load(&mut self, key: &str) -> Result<Option<(AudioBytes, CacheHit)>> {
        if let Some(found) = self.lookup(key) {
            tracing::debug!(key, tier = ?found.1, "audio cache hit");
            return Ok(Some(found));
        }
        if self.origin.is_remote(key) {
            self.prefetch(key);
            return Ok(None);
        }
        self.load(key).map(Some)
    }

    /// Store `bytes` in every tier. A failing durable tier is logged and
    /// disabled for the rest of the session.
    pub fn absorb(&mut self, key: &str, bytes: AudioBytes) {
        let _ = self.memory.put(key, bytes.clone());

        if let Some(durable) = self.durable.as_mut() {
            if let Err(e) = durable.put(key, bytes) {
                tracing::warn!(key, error = %e, "durable audio cache unavailable, continuing memory-only");
                self.durable = None;
            }
        }
    }

    /// Warm the cache for `key` in the background. Returns immediately;
    /// results are folded in by [`ReadThroughCache::poll_prefetches`].
    pub fn prefetch(&mut self, key: &str) {
        if self.lookup(key).is_some() || self.in_flight.contains(key) {
            return;
        }

        self.in_flight.insert(key.to_string());
        let origin = Arc::clone(&self.origin);
        let tx = self.done_tx.clone();
        let key = key.to_string();
        let spawned = thread::Builder::new()
            .name("nocturne-prefetch".into())
            .spawn({
                let key = key.clone();
                move || {
                    let result = origin.fetch(&key);
                    let _ = tx.send((key, result));
                }
            });

        if let Err(e) = spawned {
            tracing::warn!(key, error = %e, "could not start prefetch");
            self.in_flight.remove(&key);
        }
    }

    /// Absorb any finished prefetches and report each one.
    pub fn poll_prefetches(&mut self) -> Vec<Prefetched> {
        let mut done = Vec::new();
        while let Ok((key, result)) = self.done_rx.try_recv() {
            self.in_flight.remove(&key);
            let result = match result {
                Ok(bytes) => {
                    tracing::debug!(key, len = bytes.len(), "prefetch complete");
                    self.absorb(&key, bytes.into());
                    Ok(())
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "prefetch failed");
                    Err(e)
                }
            };
            done.push(Prefetched { key, result });
        }
        done
    }

    #[cfg(test)]
    pub fn prefetches_in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
