//! Two-tier read-through cache for encoded audio.
//!
//! Tier 1 is an in-memory map that lives as long as the process. Tier 2 is
//! a directory of blobs that survives restarts. Lookups go memory, then
//! disk, then the origin, and the first hit wins. Caching is best-effort:
//! a failing tier is logged and skipped, only an origin failure surfaces.

mod disk;
mod memory;
mod origin;
mod read_through;

use std::sync::Arc;

use crate::error::Result;

pub use disk::DiskStore;
pub use memory::MemoryStore;
pub use origin::{Origin, SourceOrigin};
pub use read_through::{CacheHit, Prefetched, ReadThroughCache};

/// Raw encoded audio, shared between tiers without copying.
pub type AudioBytes = Arc<[u8]>;

/// A keyed byte store used as one cache tier.
pub trait AudioStore {
    fn get(&mut self, key: &str) -> Option<AudioBytes>;
    fn put(&mut self, key: &str, bytes: AudioBytes) -> Result<()>;
}

#[cfg(test)]
mod tests;
