//! The playback controller.
//!
//! Single owner of the transport state. It is driven cooperatively: the
//! event loop calls transport methods in response to input and `tick` on
//! every frame. Nothing here blocks on the network: a remote track that is
//! not cached yet is fetched in the background and finishes loading in a
//! later `tick`.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cache::{AudioBytes, CacheHit, ReadThroughCache};
use crate::error::{PlayerError, Result};
use crate::playlist::Playlist;
use crate::session::{self, SessionStore};

use super::types::{AudioOutput, ControllerOptions, PlaybackState, Sound};

pub struct PlaybackController {
    playlist: Playlist,
    output: Box<dyn AudioOutput>,
    cache: ReadThroughCache,
    session: Box<dyn SessionStore>,
    options: ControllerOptions,
    state: PlaybackState,
    sound: Option<Box<dyn Sound>>,
    /// Source of the current track while its bytes are being fetched.
    pending_load: Option<String>,
    /// Deadline of the delayed auto-play. Fires once the sound is loaded.
    pending_play: Option<Instant>,
    last_position_save: Option<Instant>,
    /// Set once first playback has been started or scheduled.
    started: bool,
    /// The last load failed because no output device was available.
    output_missing: bool,
    /// Loads that failed in a row; a full lap of them stops the skipping.
    consecutive_failures: usize,
    rng: StdRng,
}

/// How far a load got.
enum Loaded {
    Ready,
    Fetching,
}

impl PlaybackController {
    /// Restore the persisted index and volume and load that track. When
    /// autoplay is on, playback starts once after the configured delay.
    pub fn new(
        playlist: Playlist,
        output: Box<dyn AudioOutput>,
        cache: ReadThroughCache,
        session: Box<dyn SessionStore>,
        options: ControllerOptions,
        now: Instant,
    ) -> Self {
        let index = session
            .get(session::CURRENT_SONG)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&i| i < playlist.len())
            .unwrap_or(0);
        let volume = session
            .get(session::VOLUME)
            .and_then(|v| v.trim().parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(options.initial_volume)
            .clamp(0.0, 1.0);

        let mut controller = Self {
            playlist,
            output,
            cache,
            session,
            options,
            state: PlaybackState {
                index,
                volume,
                ..PlaybackState::default()
            },
            sound: None,
            pending_load: None,
            pending_play: None,
            last_position_save: None,
            started: false,
            output_missing: false,
            consecutive_failures: 0,
            rng: StdRng::from_entropy(),
        };

        if controller.playlist.is_empty() {
            tracing::warn!("playlist is empty, nothing to play");
            return controller;
        }

        controller.persist_index();
        if controller.begin_load(now) && controller.options.autoplay {
            controller.started = true;
            controller.pending_play = Some(now + controller.options.autoplay_delay);
        }
        controller
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    #[cfg(test)]
    pub fn cache(&self) -> &ReadThroughCache {
        &self.cache
    }

    #[cfg(test)]
    pub fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.sound.is_some()
    }

    /// The current track's bytes are still on their way.
    pub fn is_fetching(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Whether first playback has begun (or is scheduled).
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// True when the current track could not load for lack of an output device.
    pub fn needs_output(&self) -> bool {
        self.output_missing
    }

    /// Flip play/pause on the loaded track. No-op when nothing is loaded.
    pub fn toggle_play(&mut self) {
        if self.sound.is_none() {
            return;
        }
        self.started = true;
        self.pending_play = None;
        if self.state.playing {
            self.pause_sound();
        } else {
            self.play_sound();
        }
    }

    /// Begin first playback: the user-facing "start" affordance for when
    /// autoplay is off or was blocked.
    pub fn start(&mut self, now: Instant) {
        if self.started && self.sound.is_some() {
            return;
        }
        self.started = true;
        if self.sound.is_none() && self.pending_load.is_none() && !self.playlist.is_empty() {
            self.begin_load(now);
        }
        if self.sound.is_some() {
            self.pending_play = None;
            self.play_sound();
        } else if self.pending_load.is_some() {
            // Play as soon as the fetch lands.
            self.pending_play = Some(now);
        }
    }

    pub fn play_next(&mut self, now: Instant) {
        if self.playlist.is_empty() {
            return;
        }
        let next = self.playlist.next_index(self.state.index);
        self.switch_to(next, now);
    }

    pub fn play_prev(&mut self, now: Instant) {
        if self.playlist.is_empty() {
            return;
        }
        let prev = self.playlist.prev_index(self.state.index);
        self.switch_to(prev, now);
    }

    /// Jump to `index`. No-op when `index` is already the active, playing
    /// track, or out of range.
    pub fn play_song(&mut self, index: usize, now: Instant) {
        if index >= self.playlist.len() {
            return;
        }
        if index == self.state.index && self.state.playing {
            return;
        }
        self.switch_to(index, now);
    }

    /// Clamp `volume` into `0.0..=1.0`, apply it live and persist it.
    pub fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        if let Some(sound) = self.sound.as_mut() {
            sound.set_volume(volume);
        }
        self.session.set(session::VOLUME, &volume.to_string());
    }

    /// Clamp `position` (seconds) into `0..=duration` and move there.
    pub fn seek(&mut self, position: f64) {
        if !position.is_finite() {
            return;
        }
        let position = position.clamp(0.0, self.state.duration.max(0.0));
        self.state.position = position;
        if let Some(sound) = self.sound.as_mut() {
            if let Err(e) = sound.seek(Duration::from_secs_f64(position)) {
                tracing::warn!(error = %e, "seek failed");
            }
        }
    }

    /// Seek relative to the current position.
    pub fn seek_by(&mut self, delta_secs: f64) {
        self.seek(self.state.position + delta_secs);
    }

    /// Swap in a new output device, reloading the current track if the
    /// previous one had none.
    pub fn set_output(&mut self, output: Box<dyn AudioOutput>, now: Instant) {
        self.output = output;
        if self.output_missing && !self.playlist.is_empty() {
            self.output_missing = false;
            if self.begin_load(now) && self.started {
                self.pending_play = Some(now + self.options.autoplay_delay);
            }
        }
    }

    /// Advance timers and the progress frame. Call once per UI frame.
    pub fn tick(&mut self, now: Instant) {
        for done in self.cache.poll_prefetches() {
            if self.pending_load.as_deref() != Some(done.key.as_str()) {
                continue;
            }
            self.pending_load = None;
            let resumed = match done.result {
                // The bytes are cached now, so this load completes inline.
                Ok(()) => self.load_skipping_failures(now),
                Err(e) => {
                    self.skip_failed(&e);
                    self.load_skipping_failures(now)
                }
            };
            if !resumed {
                self.pending_play = None;
            }
        }

        if let Some(deadline) = self.pending_play {
            if now >= deadline && self.sound.is_some() {
                self.pending_play = None;
                self.play_sound();
            }
        }

        if !self.state.playing {
            return;
        }

        let finished = self.sound.as_ref().is_some_and(|s| s.is_finished());
        if finished {
            tracing::debug!(index = self.state.index, "track ended, advancing");
            self.play_next(now);
            return;
        }

        self.update_progress();

        let due = self
            .last_position_save
            .is_none_or(|t| now.duration_since(t) >= self.options.position_save_interval);
        if due {
            self.persist_position();
            self.last_position_save = Some(now);
        }
    }

    /// Release the audio instance, cancel timers and write the final position.
    pub fn shutdown(&mut self) {
        self.pending_play = None;
        self.pending_load = None;
        if let Some(mut sound) = self.sound.take() {
            self.state.position = sound.position().as_secs_f64().min(self.state.duration);
            self.persist_position();
            sound.stop();
        }
        self.state.playing = false;
    }

    fn switch_to(&mut self, index: usize, now: Instant) {
        self.state.index = index;
        self.state.position = 0.0;
        self.state.loaded_percentage = 0.0;
        self.persist_index();

        self.started = true;
        self.pending_play = None;
        if self.begin_load(now) {
            self.pending_play = Some(now + self.options.autoplay_delay);
        }
    }

    /// Start loading the current index with a fresh failure budget. Returns
    /// whether a track is loaded or on its way.
    fn begin_load(&mut self, now: Instant) -> bool {
        self.consecutive_failures = 0;
        self.load_skipping_failures(now)
    }

    /// Load the current index, skipping forward past tracks that fail. Gives
    /// up after one full lap so an all-broken playlist idles instead of
    /// spinning.
    fn load_skipping_failures(&mut self, now: Instant) -> bool {
        while self.consecutive_failures < self.playlist.len() {
            match self.load_current() {
                Ok(Loaded::Ready) => {
                    self.consecutive_failures = 0;
                    self.prefetch_next();
                    self.last_position_save = Some(now);
                    return true;
                }
                Ok(Loaded::Fetching) => return true,
                Err(PlayerError::Output(reason)) => {
                    tracing::warn!(%reason, "no audio output, waiting for a device");
                    self.output_missing = true;
                    return false;
                }
                Err(e) => self.skip_failed(&e),
            }
        }
        tracing::error!("every track in the playlist failed to load");
        false
    }

    fn skip_failed(&mut self, error: &PlayerError) {
        tracing::error!(index = self.state.index, %error, "track failed to load, skipping");
        self.consecutive_failures += 1;
        self.state.index = self.playlist.next_index(self.state.index);
        self.state.position = 0.0;
        self.state.loaded_percentage = 0.0;
        self.persist_index();
    }

    /// Tear down the previous sound and load the track at `state.index`.
    /// A remote track that is not cached yet is left fetching.
    fn load_current(&mut self) -> Result<Loaded> {
        if let Some(mut old) = self.sound.take() {
            old.stop();
        }
        self.pending_load = None;
        self.state.playing = false;
        self.state.duration = 0.0;

        let Some(track) = self.playlist.get(self.state.index) else {
            return Ok(Loaded::Ready);
        };
        let src = track.src.clone();
        let known_duration = track.duration;

        match self.cache.try_load(&src)? {
            Some((bytes, hit)) => {
                self.open_sound(&src, bytes, hit, known_duration)?;
                Ok(Loaded::Ready)
            }
            None => {
                tracing::info!(index = self.state.index, src = %src, "fetching track");
                self.pending_load = Some(src);
                Ok(Loaded::Fetching)
            }
        }
    }

    fn open_sound(
        &mut self,
        src: &str,
        bytes: AudioBytes,
        hit: CacheHit,
        known_duration: Option<Duration>,
    ) -> Result<()> {
        let mut sound = self.output.open(src, bytes, self.state.volume)?;
        tracing::info!(index = self.state.index, src = %src, tier = ?hit, "loaded track");

        self.state.duration = sound
            .duration()
            .or(known_duration)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        let saved = self
            .session
            .get(session::PLAY_POSITION)
            .and_then(|v| v.trim().parse::<f64>().ok());
        match saved {
            Some(p) if should_restore(p, self.state.duration) => {
                if let Err(e) = sound.seek(Duration::from_secs_f64(p)) {
                    tracing::warn!(error = %e, "could not restore position");
                } else {
                    self.state.position = p;
                }
            }
            _ => self.state.position = 0.0,
        }

        self.sound = Some(sound);
        Ok(())
    }

    fn prefetch_next(&mut self) {
        let next = self.playlist.next_index(self.state.index);
        if next == self.state.index {
            return;
        }
        if let Some(track) = self.playlist.get(next) {
            let src = track.src.clone();
            self.cache.prefetch(&src);
        }
    }

    fn play_sound(&mut self) {
        if let Some(sound) = self.sound.as_mut() {
            sound.play();
            self.state.playing = true;
        }
    }

    fn pause_sound(&mut self) {
        if let Some(sound) = self.sound.as_mut() {
            sound.pause();
            self.state.playing = false;
            self.state.position = sound.position().as_secs_f64().min(self.state.duration);
        }
        self.persist_position();
    }

    fn update_progress(&mut self) {
        if let Some(sound) = self.sound.as_ref() {
            let pos = sound.position().as_secs_f64();
            self.state.position = if self.state.duration > 0.0 {
                pos.min(self.state.duration)
            } else {
                pos
            };
        }
        if self.state.loaded_percentage < 100.0 {
            let step: f32 = self.rng.gen_range(3.0..8.0);
            self.state.loaded_percentage = (self.state.loaded_percentage + step).min(100.0);
        }
    }

    fn persist_index(&mut self) {
        self.session
            .set(session::CURRENT_SONG, &self.state.index.to_string());
    }

    fn persist_position(&mut self) {
        self.session
            .set(session::PLAY_POSITION, &self.state.position.to_string());
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A persisted position applies only strictly inside the track.
pub(super) fn should_restore(position: f64, duration: f64) -> bool {
    position > 0.0 && position < duration
}

/// `m:ss`
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
