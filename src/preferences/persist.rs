//! Preferences blob persisted as a JSON file, cached in memory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::Value;

use crate::error::{OliveError, Result};

/// The stored preferences file.
///
/// The blob is opaque here: whatever a page last sent over `SETTINGS` is
/// written back verbatim.
#[derive(Debug)]
pub struct PreferenceFile {
    path: PathBuf,
    cache: RwLock<Option<Value>>,
}

impl PreferenceFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored blob, or an empty object when the file is missing or
    /// unreadable.
    pub fn get(&self) -> Value {
        if let Some(value) = self.cache.read().ok().and_then(|cache| cache.clone()) {
            return value;
        }

        let value = self.load().unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable preferences at {}: {}", self.path.display(), e);
            empty()
        });
        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(value.clone());
        }
        value
    }

    /// Replace the stored blob.
    pub fn set(&self, blob: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(blob)?)?;

        let mut cache = self.cache.write().map_err(|e| OliveError::Preferences(e.to_string()))?;
        *cache = Some(blob.clone());
        log::debug!("Stored preferences at {}", self.path.display());
        Ok(())
    }

    /// Delete the stored blob.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        let mut cache = self.cache.write().map_err(|e| OliveError::Preferences(e.to_string()))?;
        *cache = Some(empty());
        Ok(())
    }

    fn load(&self) -> Result<Value> {
        if !self.path.exists() {
            return Ok(empty());
        }
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn empty() -> Value {
    Value::Object(serde_json::Map::new())
}
