//! Audio-related small types and the output seam.
//!
//! `AudioOutput` turns encoded bytes into a `Sound`; the controller only
//! ever talks to those two traits, so the real backend can be swapped for
//! a fake in tests.

use std::time::Duration;

use crate::cache::AudioBytes;
use crate::config::Settings;
use crate::error::Result;

/// A loaded, controllable audio instance. Created paused.
pub trait Sound {
    fn play(&mut self);
    fn pause(&mut self);
    /// Stop and release the decoder. The sound is unusable afterwards.
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn seek(&mut self, position: Duration) -> Result<()>;
    fn position(&self) -> Duration;
    /// Total length, when the container reports one.
    fn duration(&self) -> Option<Duration>;
    /// True once playback ran off the end of the source.
    fn is_finished(&self) -> bool;
}

pub trait AudioOutput {
    /// Decode `bytes` (fetched for `src`) into a paused sound at `volume`.
    fn open(&mut self, src: &str, bytes: AudioBytes, volume: f32) -> Result<Box<dyn Sound>>;
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Volume when nothing was persisted.
    pub initial_volume: f32,
    /// Start the restored track once it has loaded.
    pub autoplay: bool,
    /// Gap between loading a track and starting it.
    pub autoplay_delay: Duration,
    /// Position write interval while playing.
    pub position_save_interval: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            initial_volume: 0.5,
            autoplay: true,
            autoplay_delay: Duration::from_millis(500),
            position_save_interval: Duration::from_secs(5),
        }
    }
}

impl From<&Settings> for ControllerOptions {
    fn from(s: &Settings) -> Self {
        Self {
            initial_volume: s.audio.initial_volume,
            autoplay: s.audio.autoplay,
            autoplay_delay: Duration::from_millis(s.audio.autoplay_delay_ms),
            position_save_interval: Duration::from_secs(s.session.position_save_secs),
        }
    }
}

/// Snapshot of the transport, read by the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Index into the playlist.
    pub index: usize,
    pub playing: bool,
    /// `0.0..=1.0`
    pub volume: f32,
    /// Seconds, within `0..=duration`.
    pub position: f64,
    /// Seconds; zero until a track has loaded.
    pub duration: f64,
    /// Display-only approximation, `0..=100`.
    pub loaded_percentage: f32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            index: 0,
            playing: false,
            volume: 0.5,
            position: 0.0,
            duration: 0.0,
            loaded_percentage: 0.0,
        }
    }
}
