use std::path::PathBuf;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const API_KEY_VAR: &str = "YOUTUBE_API_KEY";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub default_lang: Option<String>,
    pub default_length: Option<usize>,
    pub expand_replies: Option<bool>,
}

impl Config {
    /// Load config from ~/.config/ytmeta/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path).map_err(|e| Error::Config(e.to_string()))?;
            let config: Config = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytmeta")
        .join("config.toml")
}

/// The `.env` file shared with fabric installs
pub fn fabric_env_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fabric")
        .join(".env")
}

/// Supplies the Data API key
pub trait CredentialProvider {
    fn api_key(&self) -> Result<String>;
}

/// Looks up the API key in the environment, then config.toml, then the
/// fabric `.env` file
pub struct DefaultCredentials<'a> {
    config: &'a Config,
    env_file: PathBuf,
}

impl<'a> DefaultCredentials<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            env_file: fabric_env_path(),
        }
    }

    pub fn with_env_file(mut self, path: PathBuf) -> Self {
        self.env_file = path;
        self
    }

    fn from_env_file(&self) -> Option<String> {
        let iter = match dotenv::from_path_iter(&self.env_file) {
            Ok(iter) => iter,
            Err(e) => {
                debug!("Skipping {}: {e}", self.env_file.display());
                return None;
            }
        };
        iter.filter_map(|item| item.ok())
            .find(|(key, _)| key == API_KEY_VAR)
            .map(|(_, value)| value)
    }
}

impl CredentialProvider for DefaultCredentials<'_> {
    fn api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var(API_KEY_VAR) {
            if !key.is_empty() {
                debug!("Using API key from {API_KEY_VAR}");
                return Ok(key);
            }
        }

        if let Some(key) = self.config.api_key.as_ref().filter(|k| !k.is_empty()) {
            debug!("Using API key from {}", config_path().display());
            return Ok(key.clone());
        }

        if let Some(key) = self.from_env_file().filter(|k| !k.is_empty()) {
            debug!("Using API key from {}", self.env_file.display());
            return Ok(key);
        }

        Err(Error::MissingApiKey {
            config: config_path().display().to_string(),
        })
    }
}
