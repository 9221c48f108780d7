use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Store file name, relative to the config directory.
    pub store_file: String,
    pub probe_timeout_secs: u64,
    pub color: bool,
    pub log_level: String,
    /// Store left behind by the previous generation of the tool, imported once.
    pub legacy_store: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let legacy_store = dirs::home_dir()
            .map(|home| home.join(".ssh").join("ssha.json"))
            .map(|path| path.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            store_file: "aliases.json".to_string(),
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            color: true,
            log_level: "info".to_string(),
            legacy_store,
        }
    }
}

impl AppConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn legacy_store_path(&self) -> Option<PathBuf> {
        if self.legacy_store.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.legacy_store))
        }
    }
}

#[derive(Debug)]
pub struct ConfigManager {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join(env!("CARGO_PKG_NAME"));
        Self::with_dir(config_dir)
    }

    pub fn with_dir(config_dir: PathBuf) -> Result<Self> {
        // create_dir_all is a no-op when the directory is already there
        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        let config_file = config_dir.join("ssha.toml");

        Ok(Self {
            config_dir,
            config_file,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn log_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        // If config file doesn't exist, create it with default values
        if !self.config_file.exists() {
            let default_config = AppConfig::default();
            self.save_config(&default_config)?;
        }

        let content =
            fs::read_to_string(&self.config_file).context("Failed to read config file")?;

        let mut config: AppConfig =
            toml::from_str(&content).context("Failed to parse config file")?;

        if config.probe_timeout_secs == 0 {
            tracing::warn!(
                "probe_timeout_secs of 0 is not usable, falling back to {}",
                DEFAULT_PROBE_TIMEOUT_SECS
            );
            config.probe_timeout_secs = DEFAULT_PROBE_TIMEOUT_SECS;
        }

        if config.store_file.trim().is_empty() {
            config.store_file = AppConfig::default().store_file;
        }

        Ok(config)
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_file, toml).context("Failed to write config file")?;
        Ok(())
    }

    pub fn store_path(&self, config: &AppConfig) -> PathBuf {
        self.config_dir.join(&config.store_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_default_config_on_first_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path().join("ssha")).unwrap();

        let config = manager.load_config().unwrap();
        assert_eq!(config.probe_timeout_secs, DEFAULT_PROBE_TIMEOUT_SECS);
        assert_eq!(config.store_file, "aliases.json");
        assert!(dir.path().join("ssha").join("ssha.toml").exists());
    }

    #[test]
    fn with_dir_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ssha");
        ConfigManager::with_dir(path.clone()).unwrap();
        ConfigManager::with_dir(path).unwrap();
    }

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf()).unwrap();
        fs::write(
            dir.path().join("ssha.toml"),
            "probe_timeout_secs = 0\ncolor = false\n",
        )
        .unwrap();

        let config = manager.load_config().unwrap();
        assert_eq!(config.probe_timeout_secs, DEFAULT_PROBE_TIMEOUT_SECS);
        assert!(!config.color);
        assert_eq!(manager.store_path(&config), dir.path().join("aliases.json"));
    }
}
