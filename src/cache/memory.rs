use std::collections::HashMap;

use crate::error::Result;

use super::{AudioBytes, AudioStore};

/// Volatile tier: dropped with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, AudioBytes>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AudioStore for MemoryStore {
    fn get(&mut self, key: &str) -> Option<AudioBytes> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, bytes: AudioBytes) -> Result<()> {
        self.entries.insert(key.to_string(), bytes);
        Ok(())
    }
}
