//! Application module: the page model the TUI draws and the runtime drives.
//!
//! `App` ties the playback controller to the starfield and keeps the bits of
//! view state (playlist cursor, overlays) that belong to neither.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
