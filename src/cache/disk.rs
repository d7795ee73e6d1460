//! Durable tier backed by a directory of blobs.
//!
//! Each entry is stored as `<dir>/<blake3(key)>.bin`. Writes go through a
//! temporary file and a rename so readers never observe a partial blob.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{PlayerError, Result};

use super::{AudioBytes, AudioStore};

#[derive(Debug)]
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| PlayerError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        let hash = blake3::hash(key.as_bytes());
        self.dir.join(format!("{}.bin", hash.to_hex()))
    }
}

impl AudioStore for DiskStore {
    fn get(&mut self, key: &str) -> Option<AudioBytes> {
        let path = self.blob_path(key);
        match fs::read(&path) {
            Ok(bytes) if !bytes.is_empty() => Some(bytes.into()),
            Ok(_) => None,
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "disk cache read failed");
                None
            }
        }
    }

    fn put(&mut self, key: &str, bytes: AudioBytes) -> Result<()> {
        let path = self.blob_path(key);
        let tmp = path.with_extension("part");
        fs::write(&tmp, &bytes).map_err(|e| PlayerError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            PlayerError::io(&path, e)
        })
    }
}
