//! Test doubles for the output seam, origin and session store.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::cache::{AudioBytes, Origin};
use crate::error::{PlayerError, Result};
use crate::session::{MemorySessionStore, SessionStore};

use super::types::{AudioOutput, Sound};

#[derive(Debug)]
pub(crate) struct FakeSoundState {
    pub(crate) src: String,
    pub(crate) playing: bool,
    pub(crate) volume: f32,
    pub(crate) position: Duration,
    pub(crate) duration: Option<Duration>,
    pub(crate) finished: bool,
    pub(crate) stopped: bool,
}

pub(crate) type SoundLog = Rc<RefCell<Vec<Rc<RefCell<FakeSoundState>>>>>;

pub(crate) struct FakeSound(pub(crate) Rc<RefCell<FakeSoundState>>);

impl Sound for FakeSound {
    fn play(&mut self) {
        self.0.borrow_mut().playing = true;
    }
    fn pause(&mut self) {
        self.0.borrow_mut().playing = false;
    }
    fn stop(&mut self) {
        let mut s = self.0.borrow_mut();
        s.playing = false;
        s.stopped = true;
    }
    fn set_volume(&mut self, volume: f32) {
        self.0.borrow_mut().volume = volume;
    }
    fn seek(&mut self, position: Duration) -> Result<()> {
        self.0.borrow_mut().position = position;
        Ok(())
    }
    fn position(&self) -> Duration {
        self.0.borrow().position
    }
    fn duration(&self) -> Option<Duration> {
        self.0.borrow().duration
    }
    fn is_finished(&self) -> bool {
        self.0.borrow().finished
    }
}

#[derive(Default)]
pub(crate) struct FakeOutput {
    pub(crate) sounds: SoundLog,
    pub(crate) durations: HashMap<String, Duration>,
    pub(crate) corrupt: Vec<String>,
    pub(crate) unavailable: bool,
}

impl AudioOutput for FakeOutput {
    fn open(&mut self, src: &str, _bytes: AudioBytes, volume: f32) -> Result<Box<dyn Sound>> {
        if self.unavailable {
            return Err(PlayerError::Output("no device".into()));
        }
        if self.corrupt.iter().any(|c| c == src) {
            return Err(PlayerError::Decode {
                src: src.into(),
                reason: "bad header".into(),
            });
        }
        let state = Rc::new(RefCell::new(FakeSoundState {
            src: src.to_string(),
            playing: false,
            volume,
            position: Duration::ZERO,
            duration: self.durations.get(src).copied(),
            finished: false,
            stopped: false,
        }));
        self.sounds.borrow_mut().push(state.clone());
        Ok(Box::new(FakeSound(state)))
    }
}

#[derive(Default)]
pub(crate) struct LoggingOrigin {
    pub(crate) fetched: Mutex<Vec<String>>,
}

impl Origin for LoggingOrigin {
    fn fetch(&self, src: &str) -> Result<Vec<u8>> {
        self.fetched.lock().unwrap().push(src.to_string());
        Ok(src.as_bytes().to_vec())
    }
}

/// A remote origin whose fetches can be held back per source.
#[derive(Default)]
pub(crate) struct GatedOrigin {
    pub(crate) blocked: Mutex<HashSet<String>>,
    pub(crate) missing: Vec<String>,
    pub(crate) released: Condvar,
}

impl GatedOrigin {
    pub(crate) fn blocking(srcs: &[&str]) -> Self {
        Self {
            blocked: Mutex::new(srcs.iter().map(|s| s.to_string()).collect()),
            ..Self::default()
        }
    }

    pub(crate) fn release(&self, src: &str) {
        self.blocked.lock().unwrap().remove(src);
        self.released.notify_all();
    }
}

impl Origin for GatedOrigin {
    fn fetch(&self, src: &str) -> Result<Vec<u8>> {
        let mut blocked = self.blocked.lock().unwrap();
        while blocked.contains(src) {
            blocked = self.released.wait(blocked).unwrap();
        }
        drop(blocked);
        if self.missing.iter().any(|m| m == src) {
            return Err(PlayerError::Fetch {
                src: src.into(),
                reason: "404".into(),
            });
        }
        Ok(src.as_bytes().to_vec())
    }

    fn is_remote(&self, _src: &str) -> bool {
        true
    }
}

#[derive(Clone, Default)]
pub(crate) struct SharedSession(pub(crate) Rc<RefCell<MemorySessionStore>>);

impl SharedSession {
    pub(crate) fn value(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key)
    }
}

impl SessionStore for SharedSession {
    fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key)
    }
    fn set(&mut self, key: &str, value: &str) {
        self.0.borrow_mut().set(key, value);
    }
}
