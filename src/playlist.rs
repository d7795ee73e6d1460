//! The static playlist: track metadata and how it is assembled.
//!
//! A playlist comes from configuration, or from a one-off directory scan
//! when configuration lists no tracks. It never changes after startup.

mod model;
mod scan;

pub use model::{Playlist, Track};
pub use scan::scan;

#[cfg(test)]
mod tests;
