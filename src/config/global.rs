//! Application configuration.
//!
//! Loaded from ~/.config/olive/olive.yml or .olive.yml

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::Encoding;

/// Configuration for Olive.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Document file settings.
    pub documents: DocumentsConfig,

    /// Initial window geometry.
    pub window: WindowConfig,

    /// Stored user preferences.
    pub preferences: PreferencesConfig,
}

impl Config {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .olive.yml in current directory
    /// 3. ~/.config/olive/olive.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(".olive.yml");
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from .olive.yml");
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load .olive.yml: {}", e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("olive").join("olive.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            eyre::bail!("window.width and window.height must be > 0");
        }
        if self.window.min_width == 0 {
            eyre::bail!("window.min-width must be > 0");
        }
        if self.window.min_width > self.window.width {
            eyre::bail!("window.min-width must not exceed window.width");
        }
        Ok(())
    }
}

/// Document file settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentsConfig {
    /// Write the compact (version 2) format on save.
    #[serde(rename = "compress-on-save")]
    pub compress_on_save: bool,

    /// Indent written JSON.
    pub pretty: bool,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            compress_on_save: true,
            pretty: false,
        }
    }
}

impl DocumentsConfig {
    /// Encoding used when saving.
    pub fn encoding(&self) -> Encoding {
        if self.compress_on_save {
            Encoding::Compact
        } else {
            Encoding::Verbose
        }
    }
}

/// Initial window geometry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,

    pub height: u32,

    #[serde(rename = "min-width")]
    pub min_width: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            min_width: 480,
        }
    }
}

/// Stored preferences location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PreferencesConfig {
    /// JSON file holding the user's preferences.
    pub path: PathBuf,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        let path = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("olive")
            .join("preferences.json");
        Self { path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.documents.compress_on_save);
        assert!(!config.documents.pretty);
        assert_eq!(config.window.width, 1200);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.window.min_width, 480);
        assert!(config.preferences.path.ends_with("olive/preferences.json"));
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = Config {
            window: WindowConfig {
                height: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            window: WindowConfig {
                width: 400,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
documents:
  compress-on-save: false
window:
  min-width: 600
preferences:
  path: /tmp/olive-prefs.json
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.documents.compress_on_save);
        assert_eq!(config.documents.encoding(), Encoding::Verbose);
        assert_eq!(config.window.min_width, 600);
        // Other fields should have defaults
        assert_eq!(config.window.width, 1200);
        assert_eq!(config.preferences.path, PathBuf::from("/tmp/olive-prefs.json"));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let missing = PathBuf::from("/nonexistent/olive.yml");
        assert!(Config::load(Some(&missing)).is_err());
    }
}
