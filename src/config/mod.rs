// Configuration management for ocarina
// Loads settings from disk, falling back to sensible defaults when missing

use anyhow::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub audio: AudioConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Engine volume, 0.0 to 1.0.
    pub volume: f32,
    /// Keyboard seek increment in seconds.
    pub seek_step_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How often the progress indicator resyncs with the engine position.
    pub progress_sync_ms: u64,
    /// Event-loop tick cadence.
    pub tick_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 0.7,
            seek_step_secs: 5,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            progress_sync_ms: 500,
            tick_ms: 100,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;

        Ok(())
    }

    /// Directory holding the config file and the log file.
    pub fn app_dir() -> Result<PathBuf> {
        let dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("could not find config directory"))?
            .join("ocarina");
        Ok(dir)
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!((0.0..=1.0).contains(&config.audio.volume));
        assert!(config.ui.progress_sync_ms >= config.ui.tick_ms);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.audio.seek_step_secs, config.audio.seek_step_secs);
        assert_eq!(parsed.ui.progress_sync_ms, config.ui.progress_sync_ms);
    }
}
