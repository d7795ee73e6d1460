//! Durable key-value store for small bits of playback state.
//!
//! Values are plain strings, matching how they are shown to and read back
//! from the store. Writes are fire-and-forget: failures are logged, never
//! returned to the player.

mod store;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

/// Index of the active track.
pub const CURRENT_SONG: &str = "current_song";
/// Volume in `0.0..=1.0`.
pub const VOLUME: &str = "volume";
/// Last playback position, in seconds.
pub const PLAY_POSITION: &str = "play_position";
