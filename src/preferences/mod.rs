//! User preferences and the in-process settings store.
//!
//! Preferences travel between host and pages as a [`PreferencesPatch`]: the
//! stored blob may be partial (older versions, hand edits), so every field
//! is optional on the wire and merged over the current value on receipt.

pub mod persist;

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OliveError, Result};
use crate::paper_color::ColorName;

pub use persist::PreferenceFile;

/// The user's stored settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Paper color for new pages; a random color is picked when unset
    pub default_paper_color: Option<ColorName>,
    /// Soften text and pen edges
    pub ink_bleed: bool,
    /// Show the paper edge markers
    pub page_markers: bool,
    /// Ring the bell near the end of a line
    pub bell_sound: bool,
    /// Typing and carriage sounds
    pub other_sounds: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_paper_color: None,
            ink_bleed: false,
            page_markers: true,
            bell_sound: true,
            other_sounds: true,
        }
    }
}

impl UserPreferences {
    /// Merge a patch in place. Missing fields keep their current value, so
    /// a patch can set `default_paper_color` but never clear it.
    pub fn apply(&mut self, patch: &PreferencesPatch) {
        if let Some(color) = patch.default_paper_color {
            self.default_paper_color = Some(color);
        }
        if let Some(v) = patch.ink_bleed {
            self.ink_bleed = v;
        }
        if let Some(v) = patch.page_markers {
            self.page_markers = v;
        }
        if let Some(v) = patch.bell_sound {
            self.bell_sound = v;
        }
        if let Some(v) = patch.other_sounds {
            self.other_sounds = v;
        }
    }

    /// A patch carrying every field.
    pub fn to_patch(&self) -> PreferencesPatch {
        PreferencesPatch {
            default_paper_color: self.default_paper_color,
            ink_bleed: Some(self.ink_bleed),
            page_markers: Some(self.page_markers),
            bell_sound: Some(self.bell_sound),
            other_sounds: Some(self.other_sounds),
        }
    }
}

/// A possibly partial preferences blob, as stored and as sent over
/// `SETTINGS`/`INITIAL_SETTINGS`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_paper_color: Option<ColorName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ink_bleed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_markers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bell_sound: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_sounds: Option<bool>,
}

/// Keys accepted by [`PreferencesPatch::set`].
pub const KEYS: [&str; 5] = ["defaultPaperColor", "inkBleed", "pageMarkers", "bellSound", "otherSounds"];

impl PreferencesPatch {
    /// Read a stored blob field by field. Fields that are missing or have
    /// the wrong type are left unset instead of failing the whole blob.
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).filter(|v| !v.is_null());
        let flag = |key: &str| field(key).and_then(Value::as_bool);
        Self {
            default_paper_color: field("defaultPaperColor")
                .and_then(Value::as_str)
                .and_then(ColorName::parse),
            ink_bleed: flag("inkBleed"),
            page_markers: flag("pageMarkers"),
            bell_sound: flag("bellSound"),
            other_sounds: flag("otherSounds"),
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set one field from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let flag = || {
            value
                .parse::<bool>()
                .map_err(|_| OliveError::Preferences(format!("{} expects true or false, got '{}'", key, value)))
        };
        match key {
            "defaultPaperColor" => {
                let color = ColorName::parse(value)
                    .ok_or_else(|| OliveError::Preferences(format!("Unknown paper color: {}", value)))?;
                self.default_paper_color = Some(color);
            }
            "inkBleed" => self.ink_bleed = Some(flag()?),
            "pageMarkers" => self.page_markers = Some(flag()?),
            "bellSound" => self.bell_sound = Some(flag()?),
            "otherSounds" => self.other_sounds = Some(flag()?),
            other => {
                return Err(OliveError::Preferences(format!(
                    "Unknown preference '{}' (expected one of: {})",
                    other,
                    KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Overlay `other` on top of this patch.
    pub fn merge(&mut self, other: &PreferencesPatch) {
        self.default_paper_color = other.default_paper_color.or(self.default_paper_color);
        self.ink_bleed = other.ink_bleed.or(self.ink_bleed);
        self.page_markers = other.page_markers.or(self.page_markers);
        self.bell_sound = other.bell_sound.or(self.bell_sound);
        self.other_sounds = other.other_sounds.or(self.other_sounds);
    }
}

type Subscriber = Box<dyn FnMut(&UserPreferences) + Send>;

struct StoreInner {
    current: UserPreferences,
    initialized: bool,
    subscribers: Vec<(u64, Subscriber)>,
    /// Subscribers currently running outside the lock
    notifying: Vec<u64>,
    /// Unsubscribed while running, removed once notification ends
    dropped: Vec<u64>,
    next_id: u64,
}

/// Shared, observable preferences for one page.
///
/// Cloning gives another handle to the same store.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(UserPreferences::default())
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("current", &self.current())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl SettingsStore {
    pub fn new(initial: UserPreferences) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                current: initial,
                initialized: false,
                subscribers: Vec::new(),
                notifying: Vec::new(),
                dropped: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Current preferences.
    pub fn current(&self) -> UserPreferences {
        self.inner.lock().map(|inner| inner.current).unwrap_or_default()
    }

    /// Whether the initial stored preferences have arrived.
    pub fn is_initialized(&self) -> bool {
        self.inner.lock().map(|inner| inner.initialized).unwrap_or(false)
    }

    /// Apply the stored preferences once. Later calls are ignored and
    /// return `false`.
    pub fn initialize(&self, patch: &PreferencesPatch) -> bool {
        {
            let Ok(mut inner) = self.inner.lock() else {
                return false;
            };
            if inner.initialized {
                log::debug!("Initial preferences already applied, ignoring");
                return false;
            }
            inner.initialized = true;
            let mut prefs = UserPreferences::default();
            prefs.apply(patch);
            inner.current = prefs;
        }
        self.notify();
        true
    }

    /// Merge a patch and notify subscribers, returning the new value.
    pub fn update(&self, patch: &PreferencesPatch) -> UserPreferences {
        {
            let Ok(mut inner) = self.inner.lock() else {
                return UserPreferences::default();
            };
            inner.current.apply(patch);
        }
        self.notify();
        self.current()
    }

    /// Call `callback` after every change. Returns an id for
    /// [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<F>(&self, callback: F) -> u64
    where
        F: FnMut(&UserPreferences) + Send + 'static,
    {
        let Ok(mut inner) = self.inner.lock() else {
            return 0;
        };
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: u64) -> bool {
        let Ok(mut inner) = self.inner.lock() else {
            return false;
        };
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        if inner.subscribers.len() != before {
            return true;
        }
        if inner.notifying.contains(&id) && !inner.dropped.contains(&id) {
            inner.dropped.push(id);
            return true;
        }
        false
    }

    // Subscribers run without the lock held so they may read or update
    // the store themselves.
    fn notify(&self) {
        let (current, mut subscribers) = {
            let Ok(mut inner) = self.inner.lock() else {
                return;
            };
            let subscribers = std::mem::take(&mut inner.subscribers);
            inner.notifying.extend(subscribers.iter().map(|(id, _)| *id));
            (inner.current, subscribers)
        };
        for (_, callback) in subscribers.iter_mut() {
            callback(&current);
        }
        if let Ok(mut inner) = self.inner.lock() {
            let ran: Vec<u64> = subscribers.iter().map(|(id, _)| *id).collect();
            let dropped = std::mem::take(&mut inner.dropped);
            subscribers.retain(|(id, _)| !dropped.contains(id));
            inner.dropped = dropped.into_iter().filter(|id| !ran.contains(id)).collect();
            inner.notifying.retain(|id| !ran.contains(id));
            subscribers.append(&mut inner.subscribers);
            inner.subscribers = subscribers;
        }
    }
}
