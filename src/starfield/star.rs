use std::f64::consts::TAU;

use rand::Rng;

/// How far a star dims at the bottom of its blink.
const BLINK_FLOOR: f64 = 0.3;

/// One background star. Coordinates are percentages of the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    /// Diameter in pixels, `0.8..2.8`.
    pub size: f64,
    /// Peak opacity, `0.5..1.0`.
    pub opacity: f64,
    /// Seconds per blink cycle, `2..5`.
    pub blink_duration: f64,
    /// Offset into the cycle, `0..1`, so stars don't pulse in lockstep.
    phase: f64,
}

impl Star {
    pub fn random<R: Rng + ?Sized>(id: usize, rng: &mut R) -> Self {
        Self {
            id,
            x: rng.gen_range(0.0..100.0),
            y: rng.gen_range(0.0..100.0),
            size: rng.gen_range(0.8..2.8),
            opacity: rng.gen_range(0.5..1.0),
            blink_duration: rng.gen_range(2.0..5.0),
            phase: rng.gen_range(0.0..1.0),
        }
    }

    /// Opacity `secs` into the animation: `opacity -> 0.3*opacity -> opacity`
    /// once per `blink_duration`, eased in and out. Repeats forever.
    pub fn opacity_at(&self, secs: f64) -> f64 {
        let cycle = (secs / self.blink_duration + self.phase).rem_euclid(1.0);
        // Cosine gives the ease-in-out dip without a separate curve.
        let dip = (1.0 - (cycle * TAU).cos()) / 2.0;
        self.opacity * (1.0 - (1.0 - BLINK_FLOOR) * dip)
    }
}
