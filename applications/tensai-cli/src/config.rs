/// Application configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tensai_playback::PlaybackConfig;

const ENV_PREFIX: &str = "TENSAI";
const DEFAULT_CONFIG_FILE: &str = "tensai.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub player: PlaybackConfig,

    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Directory holding the persisted library, playlists and settings
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// JSON manifest of tracks imported on start
    #[serde(default)]
    pub library_manifest: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// Without an explicit path, `tensai.toml` in the working directory is
    /// used when present. Environment variables such as
    /// `TENSAI__PLAYER__VOLUME` override file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub(crate) fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
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

        settings = settings.add_source(
            config::Environment::with_prefix(prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let volume = self.player.volume;
        if !(0.0..=1.0).contains(&volume) {
            return Err(CliError::Config(format!(
                "player.volume must be between 0 and 1, got {volume}"
            )));
        }

        if self.player.history_size == 0 {
            return Err(CliError::Config(
                "player.history_size must be at least 1".to_string(),
            ));
        }

        if let Some(manifest) = &self.storage.library_manifest {
            if !manifest.exists() {
                return Err(CliError::Config(format!(
                    "Library manifest not found at {:?}",
                    manifest
                )));
            }
        }

        Ok(())
    }
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            library_manifest: None,
        }
    }
}
