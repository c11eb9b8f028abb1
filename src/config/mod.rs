//! Configuration system for Olive.
//!
//! A single YAML file (explicit path, `.olive.yml`, or
//! ~/.config/olive/olive.yml) with every section defaulted.

use eyre::Result;
use std::path::PathBuf;

pub use self::global::{Config, DocumentsConfig, PreferencesConfig, WindowConfig};

mod global;

/// Load configuration from the standard search paths.
pub fn load_config(explicit_path: Option<&PathBuf>) -> Result<Config> {
    let config = Config::load(explicit_path)?;
    config.validate()?;
    Ok(config)
}
