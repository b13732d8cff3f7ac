/// CLI configuration
use anyhow::{bail, Context, Result};
use mediacore_playback::{PlaybackConfig, DEFAULT_LIBRARY_KEY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "mediacore.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Directory holding the persisted player state
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,

    /// Key of the liked-songs blob
    #[serde(default = "default_library_key")]
    pub library_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    /// Simulated clock speed; 10.0 plays ten seconds of media per second
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Length assumed for items the catalog gives no duration for
    #[serde(default = "default_track_seconds")]
    pub default_track_seconds: u64,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// `path` defaults to `mediacore.toml` in the working directory and may
    /// be missing. Environment variables override the file, e.g.
    /// `MEDIACORE_PLAYBACK__AUTO_ADVANCE=true`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    bail!("config file not found: {}", path.display());
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with MEDIACORE_)
        settings = settings.add_source(
            config::Environment::with_prefix("MEDIACORE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.engine.speed.is_finite() && self.engine.speed > 0.0) {
            bail!("engine.speed must be a positive number");
        }
        if self.playback.status_interval.is_zero() {
            bail!("playback.status_interval must be at least 1ms");
        }
        if self.playback.storage_key.is_empty() {
            bail!("playback.storage_key must not be empty");
        }
        if self.storage.library_key.is_empty() || self.storage.library_key == self.playback.storage_key {
            bail!("storage.library_key must be set and differ from playback.storage_key");
        }
        Ok(())
    }
}

// Default values
fn default_storage_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_library_key() -> String {
    DEFAULT_LIBRARY_KEY.to_string()
}

fn default_speed() -> f32 {
    1.0
}

fn default_track_seconds() -> u64 {
    30
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            library_key: default_library_key(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            default_track_seconds: default_track_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        let config = CliConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.dir, PathBuf::from("./data"));
        assert_eq!(config.playback.storage_key, "mediacore-player-storage");
        assert_eq!(config.storage.library_key, "library-storage");
    }

    #[test]
    fn rejects_shared_storage_keys() {
        let mut config = CliConfig::default();
        config.storage.library_key = config.playback.storage_key.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reads_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mediacore.toml");
        std::fs::write(
            &path,
            r#"
[storage]
dir = "/var/lib/mediacore"

[playback]
auto_advance = true
restart_threshold = 5000

[engine]
speed = 20.0
"#,
        )
        .unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.storage.dir, PathBuf::from("/var/lib/mediacore"));
        assert!(config.playback.auto_advance);
        assert_eq!(config.playback.restart_threshold, Duration::from_secs(5));
        assert_eq!(config.playback.history_size, 50);
        assert_eq!(config.engine.speed, 20.0);
        assert_eq!(config.engine.default_track_seconds, 30);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(CliConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn rejects_non_positive_speed() {
        let mut config = CliConfig::default();
        config.engine.speed = 0.0;
        assert!(config.validate().is_err());
    }
}
