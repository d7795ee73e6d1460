//! Playback: the controller that owns "what is playing and how loud",
//! plus the output seam it plays through.

mod controller;
mod output;
mod types;

pub use controller::{PlaybackController, format_time};
pub use output::{NoOutput, RodioOutput};
pub use types::{AudioOutput, ControllerOptions, PlaybackState, Sound};

#[cfg(test)]
pub(crate) mod fake;
