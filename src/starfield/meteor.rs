//! Meteors and the fixed pool they live in.
//!
//! The pool is an arena of `METEOR_SLOTS` descriptors with an active flag.
//! A slot goes inactive -> active when the timer roll succeeds and back to
//! inactive when its animation completes. An active slot is never picked
//! for activation.

use std::f64::consts::FRAC_PI_4;
use std::time::{Duration, Instant};

use rand::Rng;

pub const METEOR_SLOTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Meteor {
    pub id: usize,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    /// Seconds, `0.5..1.5`.
    pub duration: f64,
    /// Trail length in pixels, `50..150`.
    pub width: f64,
    pub active: bool,
    activated_at: Option<Instant>,
}

impl Meteor {
    fn idle(id: usize) -> Self {
        Self {
            id,
            start_x: 0.0,
            start_y: 0.0,
            end_x: 0.0,
            end_y: 0.0,
            duration: 0.0,
            width: 0.0,
            active: false,
            activated_at: None,
        }
    }

    fn launch<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) {
        let start_x = rng.gen_range(10.0..40.0);
        let start_y = rng.gen_range(0.0..20.0);
        let distance = rng.gen_range(20.0..60.0);
        // Diagonal, heading down and to the right: 45 to 90 degrees.
        let angle = FRAC_PI_4 + rng.gen_range(0.0..FRAC_PI_4);

        self.start_x = start_x;
        self.start_y = start_y;
        self.end_x = start_x + distance * angle.cos();
        self.end_y = start_y + distance * angle.sin();
        self.duration = rng.gen_range(0.5..1.5);
        self.width = rng.gen_range(50.0..150.0);
        self.active = true;
        self.activated_at = Some(now);
    }

    fn elapsed(&self, now: Instant) -> Option<Duration> {
        self.activated_at
            .filter(|_| self.active)
            .map(|t| now.saturating_duration_since(t))
    }

    /// Linear animation time in `0..=1`; zero for an inactive slot.
    pub fn progress_at(&self, now: Instant) -> f64 {
        match self.elapsed(now) {
            Some(e) if self.duration > 0.0 => (e.as_secs_f64() / self.duration).min(1.0),
            _ => 0.0,
        }
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        self.active && self.progress_at(now) >= 1.0
    }

    /// Head position (percent coordinates) with ease-out travel.
    pub fn head_at(&self, now: Instant) -> (f64, f64) {
        let t = self.progress_at(now);
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        (
            self.start_x + (self.end_x - self.start_x) * eased,
            self.start_y + (self.end_y - self.start_y) * eased,
        )
    }

    /// Fades in over the first half and out over the second.
    pub fn opacity_at(&self, now: Instant) -> f64 {
        if !self.active {
            return 0.0;
        }
        let t = self.progress_at(now);
        if t < 0.5 { t * 2.0 } else { (1.0 - t) * 2.0 }
    }
}

#[derive(Debug, Clone)]
pub struct MeteorPool {
    slots: [Meteor; METEOR_SLOTS],
}

impl Default for MeteorPool {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(Meteor::idle),
        }
    }
}

impl MeteorPool {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn slots(&self) -> &[Meteor] {
        &self.slots
    }

    pub fn active(&self) -> impl Iterator<Item = &Meteor> {
        self.slots.iter().filter(|m| m.active)
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Launch the first inactive slot. `None` when every slot is busy.
    pub fn activate<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> Option<usize> {
        let slot = self.slots.iter_mut().find(|m| !m.active)?;
        slot.launch(now, rng);
        Some(slot.id)
    }

    /// Animation-complete signal for slot `id`. Returns false if it was not active.
    pub fn complete(&mut self, id: usize) -> bool {
        match self.slots.get_mut(id) {
            Some(m) if m.active => {
                m.active = false;
                m.activated_at = None;
                true
            }
            _ => false,
        }
    }

    /// Deactivate every meteor whose animation has run its course.
    pub fn complete_finished(&mut self, now: Instant) -> usize {
        let done: Vec<usize> = self
            .slots
            .iter()
            .filter(|m| m.is_complete(now))
            .map(|m| m.id)
            .collect();
        for id in &done {
            self.complete(*id);
        }
        done.len()
    }
}
