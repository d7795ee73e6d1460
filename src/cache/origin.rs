use std::fs;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{PlayerError, Result};

/// Where audio bytes come from when no cache tier has them.
pub trait Origin: Send + Sync {
    fn fetch(&self, src: &str) -> Result<Vec<u8>>;

    /// Whether fetching `src` leaves the machine. Remote fetches are never
    /// run on the caller's thread.
    fn is_remote(&self, src: &str) -> bool {
        let _ = src;
        false
    }
}

fn is_http(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// Fetches `http(s)://` locators with a plain GET and reads anything else
/// from the local filesystem.
pub struct SourceOrigin {
    client: Client,
}

impl SourceOrigin {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("nocturne/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlayerError::Fetch {
                src: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }

    fn fetch_http(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_err = |reason: String| PlayerError::Fetch {
            src: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_err(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_err(format!("HTTP status {}", response.status())));
        }

        let bytes = response.bytes().map_err(|e| fetch_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl Origin for SourceOrigin {
    fn fetch(&self, src: &str) -> Result<Vec<u8>> {
        if is_http(src) {
            self.fetch_http(src)
        } else {
            let path = src.strip_prefix("file://").unwrap_or(src);
            fs::read(path).map_err(|e| PlayerError::io(path, e))
        }
    }

    fn is_remote(&self, src: &str) -> bool {
        is_http(src)
    }
}
