//! Path utilities for arbrelay.
//!
//! All data lives under `~/.arbrelay/`:
//! - `~/.arbrelay/config.toml` - main configuration
//! - `~/.arbrelay/subscribers.json` - persisted subscriber list

use std::path::PathBuf;

/// Returns the arbrelay home directory (`~/.arbrelay/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".arbrelay")
}

/// Returns the default config file path (`~/.arbrelay/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

/// Returns the default subscriber file path (`~/.arbrelay/subscribers.json`).
pub fn default_subscribers() -> PathBuf {
    home_dir().join("subscribers.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_under_arbrelay_home() {
        assert!(home_dir().to_string_lossy().contains(".arbrelay"));
        assert!(default_config().ends_with(".arbrelay/config.toml"));
        assert!(default_subscribers().ends_with(".arbrelay/subscribers.json"));
    }
}
