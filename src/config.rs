//! Application configuration management.
//!
//! This module handles the persistent configuration for tapeloop: where the
//! app keeps its document storage (the recording and imported picks), which
//! directory the file picker opens in, and where the player writes its log
//! while the terminal is in raw mode. Configuration is stored in the user's
//! config directory (typically ~/.config/tapeloop/config.toml).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use crate::constants::{DEFAULT_LOG_FILE, INBOX_DIR_NAME, RECORDING_FILE_NAME};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_documents_dir")]
    pub documents_dir: String,
    #[serde(default = "default_browse_dir")]
    pub browse_dir: String,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_documents_dir() -> String {
    dirs::document_dir()
        .or_else(dirs::data_dir)
        .map(|dir| dir.join("tapeloop"))
        .unwrap_or_else(|| PathBuf::from("tapeloop"))
        .to_string_lossy()
        .to_string()
}

fn default_browse_dir() -> String {
    ".".to_string()
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            documents_dir: default_documents_dir(),
            browse_dir: default_browse_dir(),
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }

    pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
        // Check for XDG_CONFIG_HOME first (useful for testing)
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config).join("tapeloop")
        } else {
            dirs::config_dir()
                .ok_or("Unable to find config directory")?
                .join("tapeloop")
        };
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self, Box<dyn Error>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Default::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()?;
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        Ok(())
    }

    pub fn exists() -> Result<bool, Box<dyn Error>> {
        Ok(Self::config_path()?.exists())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        match key {
            "documents_dir" => self.documents_dir = value.to_string(),
            "browse_dir" => self.browse_dir = value.to_string(),
            "log_file" => self.log_file = value.to_string(),
            "log_level" => {
                let level = parse_log_level(value)?;
                self.log_level = level.to_string().to_lowercase();
            }
            _ => return Err(format!("Unknown configuration key: {key}").into()),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        parse_log_level(&self.log_level)
            .map_err(|e| format!("Invalid log_level in config: {e}"))?;
        Ok(())
    }

    /// Document storage with `~` expanded
    pub fn documents_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.documents_dir).as_ref())
    }

    pub fn browse_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.browse_dir).as_ref())
    }

    pub fn recording_path(&self) -> PathBuf {
        self.documents_path().join(RECORDING_FILE_NAME)
    }

    pub fn inbox_path(&self) -> PathBuf {
        self.documents_path().join(INBOX_DIR_NAME)
    }

    pub fn log_level_filter(&self) -> Result<log::LevelFilter, Box<dyn Error>> {
        parse_log_level(&self.log_level)
    }
}

fn parse_log_level(value: &str) -> Result<log::LevelFilter, Box<dyn Error>> {
    value.parse::<log::LevelFilter>().map_err(|_| {
        let message =
            format!("'{value}' is not a log level (off, error, warn, info, debug, trace)");
        Box::<dyn Error>::from(message)
    })
}
