//! `rodio` backend for the output seam.
//!
//! Sounds decode straight from the cached bytes, so a track that came out of
//! the cache never touches the network or the original file again.

use std::io::Cursor;
use std::time::Duration;

use lofty::prelude::*;
use lofty::probe::Probe;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::cache::AudioBytes;
use crate::error::{PlayerError, Result};

use super::types::{AudioOutput, Sound};

pub struct RodioOutput {
    stream: OutputStream,
}

impl RodioOutput {
    /// Open the default output device.
    pub fn open_default() -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

/// Stand-in used when no device could be opened. Every load reports
/// `PlayerError::Output`, which parks the controller until a real output is
/// swapped in.
pub struct NoOutput {
    reason: String,
}

impl NoOutput {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AudioOutput for NoOutput {
    fn open(&mut self, _src: &str, _bytes: AudioBytes, _volume: f32) -> Result<Box<dyn Sound>> {
        Err(PlayerError::Output(self.reason.clone()))
    }
}

/// Container-reported length, read from tags/headers without decoding.
fn probe_duration(bytes: &AudioBytes) -> Option<Duration> {
    let tagged = Probe::new(Cursor::new(bytes.clone()))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    let d = tagged.properties().duration();
    (!d.is_zero()).then_some(d)
}

impl AudioOutput for RodioOutput {
    fn open(&mut self, src: &str, bytes: AudioBytes, volume: f32) -> Result<Box<dyn Sound>> {
        let probed = probe_duration(&bytes);
        let source = Decoder::new(Cursor::new(bytes)).map_err(|e| PlayerError::Decode {
            src: src.to_string(),
            reason: e.to_string(),
        })?;
        let duration = probed.or_else(|| source.total_duration());

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(volume);
        sink.append(source);
        sink.pause();

        Ok(Box::new(RodioSound {
            sink,
            duration,
            src: src.to_string(),
        }))
    }
}

struct RodioSound {
    sink: Sink,
    duration: Option<Duration>,
    src: String,
}

impl Sound for RodioSound {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.sink
            .try_seek(position)
            .map_err(|e| PlayerError::Decode {
                src: self.src.clone(),
                reason: format!("seek failed: {e}"),
            })
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}
