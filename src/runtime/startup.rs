use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::audio::{AudioOutput, ControllerOptions, NoOutput, PlaybackController, RodioOutput};
use crate::cache::{AudioStore, DiskStore, ReadThroughCache, SourceOrigin};
use crate::config::{self, Settings};
use crate::error::Result;
use crate::playlist::{self, Playlist};
use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};

/// Configured tracks win; otherwise scan `dir` for audio files.
pub fn build_playlist(settings: &Settings, dir: &Path) -> Playlist {
    if settings.playlist.tracks.is_empty() {
        playlist::scan(dir, &settings.playlist)
    } else {
        Playlist::from_settings(&settings.playlist)
    }
}

pub fn session_path(settings: &Settings) -> Option<PathBuf> {
    settings
        .session
        .path
        .clone()
        .or_else(|| config::default_data_dir().map(|d| d.join("session.toml")))
}

fn build_session(settings: &Settings) -> Box<dyn SessionStore> {
    match session_path(settings) {
        Some(path) => {
            let store = FileSessionStore::open(path);
            tracing::debug!(path = %store.path().display(), "session store");
            Box::new(store)
        }
        None => {
            tracing::warn!("no data directory, session will not persist");
            Box::new(MemorySessionStore::new())
        }
    }
}

fn build_cache(settings: &Settings) -> Result<ReadThroughCache> {
    let origin = Arc::new(SourceOrigin::new()?);
    let durable: Option<Box<dyn AudioStore>> = if settings.cache.enabled {
        let dir = settings.cache.dir.clone().or_else(config::default_cache_dir);
        match dir.map(DiskStore::open) {
            Some(Ok(store)) => {
                tracing::debug!(dir = %store.dir().display(), "durable cache");
                Some(Box::new(store))
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "durable cache unavailable, using memory only");
                None
            }
            None => None,
        }
    } else {
        None
    };
    let cache = ReadThroughCache::new(durable, origin);
    if !cache.has_durable_tier() {
        tracing::info!("audio cache is memory-only");
    }
    Ok(cache)
}

/// The default device, or a placeholder that parks the controller until one
/// shows up.
pub fn open_output() -> Box<dyn AudioOutput> {
    match RodioOutput::open_default() {
        Ok(out) => Box::new(out),
        Err(e) => {
            tracing::warn!(error = %e, "no audio output device");
            Box::new(NoOutput::new(e.to_string()))
        }
    }
}

pub fn reopen_output() -> Result<Box<dyn AudioOutput>> {
    Ok(Box::new(RodioOutput::open_default()?))
}

pub fn build_controller(settings: &Settings, dir: &Path, now: Instant) -> Result<PlaybackController> {
    let playlist = build_playlist(settings, dir);
    tracing::info!(tracks = playlist.len(), "playlist ready");
    Ok(PlaybackController::new(
        playlist,
        open_output(),
        build_cache(settings)?,
        build_session(settings),
        ControllerOptions::from(settings),
        now,
    ))
}
