//! The application's channel namespace.
//!
//! Each concern gets exactly one declaration here; host and surfaces build
//! their handles from the same registry, so the message shape on both sides
//! comes from a single place.

use super::channel::{Channel, HostToUiOnly, TwoWay, UiToHostOnly};
use super::registry::ChannelRegistry;
use crate::document::VerboseDocument;
use crate::environment::OperatingSystem;
use crate::error::Result;
use crate::paper_color::ColorName;
use crate::preferences::PreferencesPatch;

/// Channel name constants
pub mod names {
    pub const INITIAL_SETTINGS: &str = "INITIAL_SETTINGS";
    pub const SETTINGS: &str = "SETTINGS";
    pub const SET_COLOR: &str = "SET_COLOR";
    pub const OPERATING_SYSTEM: &str = "OPERATING_SYSTEM";
    pub const FILE_CONTENT: &str = "FILE_CONTENT";
    pub const SAVE_REQUEST: &str = "SAVE_REQUEST";
    pub const ERASE_MODE: &str = "ERASE_MODE";
    pub const DISAPPEARING_MODE: &str = "DISAPPEARING_MODE";
    pub const CLOSE_MODEL: &str = "CLOSE_MODEL";
}

/// Handles for every channel the application uses.
#[derive(Debug, Clone)]
pub struct Channels {
    /// Stored preferences, sent once when a surface becomes ready
    pub initial_settings: Channel<PreferencesPatch, HostToUiOnly>,
    /// Preferences, sent on every change in either direction
    pub settings: Channel<PreferencesPatch, TwoWay>,
    /// Paper color chosen in the menu, or resolved by the page
    pub set_color: Channel<Option<ColorName>, TwoWay>,
    /// Host platform
    pub operating_system: Channel<OperatingSystem, HostToUiOnly>,
    /// Document loaded by the host, or handed over for saving
    pub file_content: Channel<VerboseDocument, TwoWay>,
    /// Ask the page for its document
    pub save_request: Channel<bool, HostToUiOnly>,
    /// Typing erases instead of printing
    pub erase_mode: Channel<bool, TwoWay>,
    /// Printed letters fade after a few seconds
    pub disappearing_mode: Channel<bool, HostToUiOnly>,
    /// Close the child page with this name
    pub close_model: Channel<String, UiToHostOnly>,
}

impl Channels {
    /// Declare every channel in `registry`.
    pub fn declare(registry: &ChannelRegistry) -> Result<Self> {
        Ok(Self {
            initial_settings: registry.declare(names::INITIAL_SETTINGS)?,
            settings: registry.declare(names::SETTINGS)?,
            set_color: registry.declare(names::SET_COLOR)?,
            operating_system: registry.declare(names::OPERATING_SYSTEM)?,
            file_content: registry.declare(names::FILE_CONTENT)?,
            save_request: registry.declare(names::SAVE_REQUEST)?,
            erase_mode: registry.declare(names::ERASE_MODE)?,
            disappearing_mode: registry.declare(names::DISAPPEARING_MODE)?,
            close_model: registry.declare(names::CLOSE_MODEL)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OliveError;
    use crate::ipc::channel::Direction;

    #[test]
    fn test_declares_full_namespace() {
        let registry = ChannelRegistry::new();
        let channels = Channels::declare(&registry).unwrap();
        assert_eq!(registry.len(), 9);
        assert_eq!(channels.close_model.name(), "CLOSE_MODEL");
        assert_eq!(registry.direction_of(names::INITIAL_SETTINGS), Some(Direction::HostToUi));
        assert_eq!(registry.direction_of(names::SETTINGS), Some(Direction::Bidirectional));
        assert_eq!(registry.direction_of(names::CLOSE_MODEL), Some(Direction::UiToHost));
        assert_eq!(registry.direction_of(names::DISAPPEARING_MODE), Some(Direction::HostToUi));
    }

    #[test]
    fn test_declare_twice_is_idempotent() {
        let registry = ChannelRegistry::new();
        Channels::declare(&registry).unwrap();
        Channels::declare(&registry).unwrap();
        assert_eq!(registry.len(), 9);
    }

    #[test]
    fn test_conflicting_prior_declaration_fails() {
        let registry = ChannelRegistry::new();
        registry.declare::<String, TwoWay>(names::SAVE_REQUEST).unwrap();
        let err = Channels::declare(&registry).unwrap_err();
        assert!(matches!(err, OliveError::ChannelConflict(_)));
    }
}
