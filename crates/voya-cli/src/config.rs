//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for voya
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Whether to use the streaming endpoint by default
    pub stream: Option<bool>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voya")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for VOYA_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("VOYA_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        let dir = path.parent().unwrap();
        fs::create_dir_all(dir)?;

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            base_url: Some("http://localhost:8000/api".to_string()),
            timeout_secs: Some(60),
            stream: Some(true),
        };

        default_config.save()?;
        Ok(path)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# voya configuration file
# Place at ~/.config/voya/config.toml (Linux/Mac) or %APPDATA%\voya\config.toml (Windows)

# Backend base URL
base_url = "http://localhost:8000/api"

# Request timeout in seconds (LLM-backed turns can be slow)
timeout_secs = 60

# Whether to use the streaming endpoint by default (true by default)
# Set to false to use the buffered /chat response
stream = true
"#
}
