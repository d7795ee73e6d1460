//! Error type shared by the player library modules.

use std::path::PathBuf;

/// Result alias carrying [`PlayerError`].
pub type Result<T> = std::result::Result<T, PlayerError>;

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// HTTP request for an audio asset failed or returned a non-success status.
    #[error("failed to fetch {src}: {reason}")]
    Fetch { src: String, reason: String },
    /// Reading or writing a local file failed.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The audio bytes could not be decoded into a playable sound.
    #[error("failed to decode {src}: {reason}")]
    Decode { src: String, reason: String },
    /// No audio output device is available.
    #[error("audio output unavailable: {0}")]
    Output(String),
    #[error("session store: {0}")]
    Session(String),
}

impl PlayerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
