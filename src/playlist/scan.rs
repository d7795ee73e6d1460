use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use walkdir::WalkDir;

use crate::config::PlaylistSettings;

use super::model::{Playlist, Track};

fn is_audio_file(path: &Path, settings: &PlaylistSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

/// Build a playlist from the audio files under `dir`.
///
/// Title and artist come from tags when present, otherwise the file stem is
/// the title. Tracks are ordered case-insensitively by their display string.
pub fn scan(dir: &Path, settings: &PlaylistSettings) -> Playlist {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if !settings.recursive {
        walker = walker.max_depth(1);
    }

    for entry in walker.into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let mut title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        let mut artist = String::new();
        let mut duration: Option<Duration> = None;

        if let Ok(tagged) = lofty::read_from_path(path) {
            let d = tagged.properties().duration();
            if !d.is_zero() {
                duration = Some(d);
            }

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.title().filter(|v| !v.trim().is_empty()) {
                    title = v.trim().to_string();
                }
                if let Some(v) = tag.artist().filter(|v| !v.trim().is_empty()) {
                    artist = v.trim().to_string();
                }
            }
        }

        tracks.push(Track {
            id: String::new(),
            title,
            artist,
            src: path.to_string_lossy().into_owned(),
            duration,
        });
    }

    tracks.sort_by_key(|t| t.display().to_lowercase());
    for (i, t) in tracks.iter_mut().enumerate() {
        t.id = (i + 1).to_string();
    }

    tracing::info!(dir = %dir.display(), count = tracks.len(), "scanned playlist directory");
    Playlist::new(tracks)
}
