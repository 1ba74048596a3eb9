use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{BuildOptions, ExtractOptions};
use crate::error::{Error, Result};

/// Configuration for docxtree
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Structure walk options
    pub extract: ExtractOptions,
    /// Reconstruction options
    pub build: BuildOptions,
    /// Process-wide engine setup
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Environment variable that must hold the engine license key, if any
    pub license_env: Option<String>,
}

impl Config {
    /// Load config from the config directory
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::get_config_path() {
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }

        // Return default config if no file found
        Ok(Config::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Save config to the config directory
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::get_config_path() {
            // Create config directory if it doesn't exist
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            let content =
                toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
            fs::write(&config_path, content)?;
        }

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docxtree").join("config.toml"))
    }

    /// Initialize default config file
    pub fn init_default() -> Result<()> {
        Config::default().save()
    }
}
