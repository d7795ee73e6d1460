use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config;

/// Route `tracing` output to `$XDG_STATE_HOME/nocturne/nocturne.log`.
///
/// The terminal belongs to the TUI, so nothing is ever written to stderr
/// once this is installed. Returns the log path, or `None` when logging
/// could not be set up; the player runs either way.
pub fn init() -> Option<PathBuf> {
    let dir = config::default_state_dir()?;
    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("nocturne: logging disabled, cannot create {}: {e}", dir.display());
        return None;
    }
    let path = dir.join("nocturne.log");
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("nocturne: logging disabled, cannot open {}: {e}", path.display());
            return None;
        }
    };

    let filter = EnvFilter::try_from_env("NOCTURNE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(path)
}
