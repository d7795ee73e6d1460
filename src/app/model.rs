//! The `App` model.

use std::time::Instant;

use rand::Rng;

use crate::audio::{AudioOutput, PlaybackController};
use crate::config::UiSettings;
use crate::error::Result;
use crate::starfield::{Starfield, Viewport};

/// Opens the audio output again after startup found no device.
pub type OutputOpener = Box<dyn FnMut() -> Result<Box<dyn AudioOutput>>>;

pub struct App {
    pub controller: PlaybackController,
    pub starfield: Starfield,
    /// Playlist cursor; independent of the playing index.
    pub selected: usize,
    pub show_playlist: bool,
    /// One-time "press enter to start" overlay.
    pub start_gate: bool,
    open_output: OutputOpener,
}

impl App {
    /// The start gate is raised when nothing is scheduled to play: autoplay
    /// is off or the output device could not be opened.
    pub fn new(
        controller: PlaybackController,
        starfield: Starfield,
        ui: &UiSettings,
        open_output: OutputOpener,
    ) -> Self {
        let start_gate = !controller.playlist().is_empty()
            && (!controller.has_started() || controller.needs_output());
        let selected = controller.state().index;
        Self {
            controller,
            starfield,
            selected,
            show_playlist: ui.show_playlist,
            start_gate,
            open_output,
        }
    }

    /// Dismiss the start gate and begin playback, reopening the output
    /// first when the controller is waiting on a device. Without one the
    /// player stays silent. The gate never comes back either way.
    pub fn start(&mut self, now: Instant) {
        self.start_gate = false;
        if self.ensure_output(now) {
            self.controller.start(now);
        }
    }

    /// Try the opener if the controller has no device. Returns whether an
    /// output is in place.
    fn ensure_output(&mut self, now: Instant) -> bool {
        if !self.controller.needs_output() {
            return true;
        }
        match (self.open_output)() {
            Ok(output) => {
                self.controller.set_output(output, now);
                !self.controller.needs_output()
            }
            Err(e) => {
                tracing::warn!(error = %e, "audio output still unavailable");
                false
            }
        }
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) {
        self.controller.tick(now);
        self.starfield.tick(now, rng);
    }

    pub fn resize<R: Rng + ?Sized>(&mut self, viewport: Viewport, rng: &mut R) {
        if viewport != self.starfield.viewport() {
            self.starfield.resize(viewport, rng);
        }
    }

    pub fn toggle_playlist(&mut self) {
        self.show_playlist = !self.show_playlist;
        if self.show_playlist {
            self.selected = self.controller.state().index;
        }
    }

    /// Move the cursor down, wrapping at the end.
    pub fn next(&mut self) {
        self.selected = self.controller.playlist().next_index(self.selected);
    }

    /// Move the cursor up, wrapping at the start.
    pub fn prev(&mut self) {
        self.selected = self.controller.playlist().prev_index(self.selected);
    }

    /// Transport keys pressed at the start gate count as the start.
    pub fn play_selected(&mut self, now: Instant) {
        if self.start_gate {
            return self.start(now);
        }
        self.ensure_output(now);
        self.controller.play_song(self.selected, now);
    }

    pub fn play_next(&mut self, now: Instant) {
        if self.start_gate {
            return self.start(now);
        }
        self.ensure_output(now);
        self.controller.play_next(now);
        self.follow_playing();
    }

    pub fn play_prev(&mut self, now: Instant) {
        if self.start_gate {
            return self.start(now);
        }
        self.ensure_output(now);
        self.controller.play_prev(now);
        self.follow_playing();
    }

    /// Play/pause. Before first playback, or while the device is missing,
    /// this is `start`.
    pub fn toggle_play(&mut self, now: Instant) {
        if self.start_gate || !self.controller.has_started() || self.controller.needs_output() {
            self.start(now);
        } else {
            self.controller.toggle_play();
        }
    }

    pub fn change_volume(&mut self, delta: f32) {
        let volume = self.controller.state().volume + delta;
        self.controller.set_volume(volume);
    }

    pub fn shutdown(&mut self) {
        self.controller.shutdown();
    }

    fn follow_playing(&mut self) {
        if !self.show_playlist {
            self.selected = self.controller.state().index;
        }
    }
}
