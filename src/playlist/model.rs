use std::path::Path;
use std::time::Duration;

use crate::config::{PlaylistSettings, TrackSetting};

/// One playable audio item.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Resolved source locator: an HTTP(S) URL or a filesystem path.
    /// Doubles as the audio cache key.
    pub src: String,
    pub duration: Option<Duration>,
}

impl Track {
    /// "Artist - Title", or just the title when the artist is blank.
    pub fn display(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }
}

/// Ordered, immutable sequence of tracks.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Build a playlist from configured entries, resolving relative paths
    /// against `base_path`.
    pub fn from_settings(settings: &PlaylistSettings) -> Self {
        let tracks = settings
            .tracks
            .iter()
            .enumerate()
            .map(|(i, t)| track_from_setting(i, t, settings.base_path.as_deref()))
            .collect();
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Index after `index`, wrapping to the start.
    pub fn next_index(&self, index: usize) -> usize {
        if self.tracks.is_empty() {
            return 0;
        }
        (index + 1) % self.tracks.len()
    }

    /// Index before `index`, wrapping to the end.
    pub fn prev_index(&self, index: usize) -> usize {
        if self.tracks.is_empty() {
            return 0;
        }
        let len = self.tracks.len();
        (index % len + len - 1) % len
    }
}

fn track_from_setting(i: usize, t: &TrackSetting, base_path: Option<&Path>) -> Track {
    Track {
        id: t.id.clone().unwrap_or_else(|| (i + 1).to_string()),
        title: t.title.clone(),
        artist: t.artist.clone(),
        src: resolve_src(&t.src, base_path),
        duration: t
            .duration_secs
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(Duration::from_secs_f64),
    }
}

pub(super) fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// URLs and absolute paths pass through; relative paths are joined onto `base_path`.
pub(super) fn resolve_src(src: &str, base_path: Option<&Path>) -> String {
    let src = src.trim();
    if is_remote(src) {
        return src.to_string();
    }
    match base_path {
        Some(base) if Path::new(src).is_relative() => base
            .join(src.trim_start_matches("./"))
            .to_string_lossy()
            .into_owned(),
        _ => src.to_string(),
    }
}
