use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `NOCTURNE__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("NOCTURNE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.audio.initial_volume) {
            return Err("audio.initial_volume must be within 0.0..=1.0".to_string());
        }
        if !(self.audio.volume_step > 0.0 && self.audio.volume_step <= 1.0) {
            return Err("audio.volume_step must be within (0.0, 1.0]".to_string());
        }
        if self.session.position_save_secs == 0 {
            return Err("session.position_save_secs must be >= 1".to_string());
        }
        if self.starfield.density.is_nan() || self.starfield.density <= 0.0 {
            return Err("starfield.density must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.starfield.meteor_probability) {
            return Err("starfield.meteor_probability must be within 0.0..=1.0".to_string());
        }
        if self.starfield.meteor_interval_ms == 0 || self.starfield.frame_ms == 0 {
            return Err("starfield intervals must be >= 1ms".to_string());
        }
        if self.playlist.tracks.iter().any(|t| t.src.trim().is_empty()) {
            return Err("playlist.tracks entries need a non-empty src".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `NOCTURNE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("NOCTURNE_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/nocturne/config.toml`
/// or `~/.config/nocturne/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("nocturne").join("config.toml"))
}

/// Directory holding the session file (`$XDG_DATA_HOME/nocturne`).
pub fn default_data_dir() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", ".local/share").map(|d| d.join("nocturne"))
}

/// Directory holding cached audio (`$XDG_CACHE_HOME/nocturne/audio`).
pub fn default_cache_dir() -> Option<PathBuf> {
    xdg_dir("XDG_CACHE_HOME", ".cache").map(|d| d.join("nocturne").join("audio"))
}

/// Directory holding the log file (`$XDG_STATE_HOME/nocturne`).
pub fn default_state_dir() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("nocturne"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
