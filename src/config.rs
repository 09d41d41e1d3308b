//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Default generation options (used when CLI flags are omitted).
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Directory for session and history state.
    #[serde(default)]
    pub state_dir: Option<String>,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<String>,
}

/// Default generation options from the config file.
#[derive(Debug, Deserialize)]
pub struct DefaultsConfig {
    /// Default model name.
    pub model: String,
    /// Default resolution tier.
    pub resolution: String,
    /// Default aspect-ratio preference.
    pub aspect_ratio: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-image".to_string(),
            resolution: "standard".to_string(),
            aspect_ratio: "auto".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the Gemini API key, preferring environment variable.
    #[must_use]
    pub fn gemini_key(&self) -> Option<String> {
        std::env::var("GEMINI_API_KEY").ok().or_else(|| self.keys.gemini.clone())
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `PHOTOBLEND_CONFIG` environment variable
/// 3. `~/.config/photoblend/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("PHOTOBLEND_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/photoblend/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/photoblend/config.toml")
    } else {
        PathBuf::from("photoblend.toml")
    }
}

/// Discover the state directory for sessions and history:
/// 1. `PHOTOBLEND_STATE_DIR` environment variable
/// 2. `state_dir` from the config file
/// 3. `~/.config/photoblend/state`
#[must_use]
pub fn discover_state_dir(config: &Config) -> PathBuf {
    if let Ok(p) = std::env::var("PHOTOBLEND_STATE_DIR") {
        return PathBuf::from(p);
    }
    if let Some(ref p) = config.state_dir {
        return PathBuf::from(p);
    }
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/photoblend/state")
    } else {
        PathBuf::from(".photoblend/state")
    }
}
