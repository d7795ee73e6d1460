use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/nocturne/config.toml` or `~/.config/nocturne/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `NOCTURNE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub session: SessionSettings,
    pub cache: CacheSettings,
    pub playlist: PlaylistSettings,
    pub starfield: StarfieldSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Volume used when nothing has been persisted yet (0.0 - 1.0).
    pub initial_volume: f32,
    /// Start the restored track automatically once it has loaded.
    /// When false, the start prompt gates first playback.
    pub autoplay: bool,
    /// Delay between loading a track and starting it (milliseconds).
    /// Gives the decoder time to settle before playback.
    pub autoplay_delay_ms: u64,
    /// Number of seconds to seek when pressing `H` / `L`.
    pub seek_seconds: u64,
    /// Volume change per `+` / `-` key press.
    pub volume_step: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            initial_volume: 0.5,
            autoplay: true,
            autoplay_delay_ms: 500,
            seek_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// How often the playback position is written while playing (seconds).
    pub position_save_secs: u64,
    /// Override for the session file location.
    pub path: Option<PathBuf>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            position_save_secs: 5,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Keep fetched audio on disk so later runs skip the network.
    /// When false only the in-memory tier is used.
    pub enabled: bool,
    /// Override for the on-disk cache directory.
    pub dir: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

/// One configured playlist entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackSetting {
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    /// HTTP(S) URL or filesystem path.
    pub src: String,
    /// Known duration in seconds, if any.
    pub duration_secs: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaylistSettings {
    /// Prefix applied to relative, non-URL `src` values.
    pub base_path: Option<PathBuf>,
    /// Static playlist. When empty, a directory is scanned at startup.
    pub tracks: Vec<TrackSetting>,
    /// File extensions to treat as audio when scanning (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            base_path: None,
            tracks: Vec::new(),
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            recursive: true,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizePolicySetting {
    #[serde(alias = "grow_only", alias = "grow")]
    GrowOnly,
    #[serde(alias = "trim_overflow", alias = "trim")]
    TrimOverflow,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StarfieldSettings {
    /// Viewport area (in pixels) per star.
    pub density: f64,
    /// What happens to the star set when the viewport changes size.
    pub resize_policy: ResizePolicySetting,
    /// Interval between meteor rolls (milliseconds).
    pub meteor_interval_ms: u64,
    /// Probability that a roll activates a meteor.
    pub meteor_probability: f64,
    /// Redraw interval for the animation (milliseconds).
    pub frame_ms: u64,
    /// Pixel size assumed for one terminal cell when the terminal does not
    /// report its pixel dimensions.
    pub cell_width_px: u16,
    pub cell_height_px: u16,
}

impl Default for StarfieldSettings {
    fn default() -> Self {
        Self {
            density: 600.0,
            resize_policy: ResizePolicySetting::GrowOnly,
            meteor_interval_ms: 3000,
            meteor_probability: 0.2,
            frame_ms: 50,
            cell_width_px: 8,
            cell_height_px: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered in the player panel title.
    pub header_text: String,
    /// Whether the playlist panel starts open.
    pub show_playlist: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " nocturne ".to_string(),
            show_playlist: false,
        }
    }
}
