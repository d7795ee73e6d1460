//! Procedural starfield: twinkling stars plus the occasional meteor.
//!
//! Purely decorative. The generator hands out descriptors; the renderer
//! decides how to draw them. Stars blink on their own randomized periods and
//! meteors come from a fixed pool driven by a periodic roll.

mod meteor;
mod star;

use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::{ResizePolicySetting, StarfieldSettings};

pub use meteor::{METEOR_SLOTS, Meteor, MeteorPool};
pub use star::Star;

/// Viewport size in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }
}

/// What a resize does to the star set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ResizePolicy {
    /// Add stars up to the new target, never remove any.
    #[default]
    GrowOnly,
    /// Like `GrowOnly`, but cut back to the target once the set exceeds
    /// 1.5x of it.
    TrimOverflow,
}

impl From<ResizePolicySetting> for ResizePolicy {
    fn from(s: ResizePolicySetting) -> Self {
        match s {
            ResizePolicySetting::GrowOnly => Self::GrowOnly,
            ResizePolicySetting::TrimOverflow => Self::TrimOverflow,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StarfieldOptions {
    /// Pixels of viewport area per star.
    pub density: f64,
    pub resize_policy: ResizePolicy,
    pub meteor_interval: Duration,
    pub meteor_probability: f64,
}

impl Default for StarfieldOptions {
    fn default() -> Self {
        Self {
            density: 600.0,
            resize_policy: ResizePolicy::GrowOnly,
            meteor_interval: Duration::from_secs(3),
            meteor_probability: 0.2,
        }
    }
}

impl From<&StarfieldSettings> for StarfieldOptions {
    fn from(s: &StarfieldSettings) -> Self {
        Self {
            density: s.density,
            resize_policy: s.resize_policy.into(),
            meteor_interval: Duration::from_millis(s.meteor_interval_ms),
            meteor_probability: s.meteor_probability,
        }
    }
}

/// `floor(area / density)`.
pub fn star_target(viewport: Viewport, density: f64) -> usize {
    if density.is_nan() || density <= 0.0 {
        return 0;
    }
    (viewport.area() / density).floor() as usize
}

pub struct Starfield {
    stars: Vec<Star>,
    meteors: MeteorPool,
    viewport: Viewport,
    options: StarfieldOptions,
    epoch: Instant,
    next_roll: Instant,
}

impl Starfield {
    pub fn new<R: Rng + ?Sized>(
        viewport: Viewport,
        options: StarfieldOptions,
        now: Instant,
        rng: &mut R,
    ) -> Self {
        let target = star_target(viewport, options.density);
        let stars = (0..target).map(|id| Star::random(id, rng)).collect();
        let next_roll = now + options.meteor_interval;
        Self {
            stars,
            meteors: MeteorPool::new(),
            viewport,
            options,
            epoch: now,
            next_roll,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn meteors(&self) -> &MeteorPool {
        &self.meteors
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Seconds since the field was created; the clock stars blink against.
    pub fn elapsed_secs(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.epoch).as_secs_f64()
    }

    /// Adapt the star set to a new viewport according to the resize policy.
    pub fn resize<R: Rng + ?Sized>(&mut self, viewport: Viewport, rng: &mut R) {
        self.viewport = viewport;
        let target = star_target(viewport, self.options.density);
        let have = self.stars.len();

        if have < target {
            self.stars.extend((have..target).map(|id| Star::random(id, rng)));
            tracing::debug!(from = have, to = target, "grew starfield");
        } else if self.options.resize_policy == ResizePolicy::TrimOverflow
            && have as f64 > target as f64 * 1.5
        {
            self.stars.truncate(target);
            tracing::debug!(from = have, to = target, "trimmed starfield");
        }
    }

    /// Retire finished meteors and, when the roll timer is due, maybe
    /// launch one.
    pub fn tick<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) {
        self.meteors.complete_finished(now);

        if now < self.next_roll {
            return;
        }
        // No catch-up burst after a stall: the next roll is one interval out.
        self.next_roll = now + self.options.meteor_interval;
        if rng.gen_bool(self.options.meteor_probability.clamp(0.0, 1.0)) {
            self.meteors.activate(now, rng);
        }
    }

    /// Animation-complete signal from the renderer.
    #[cfg(test)]
    pub fn complete_meteor(&mut self, id: usize) -> bool {
        self.meteors.complete(id)
    }
}
