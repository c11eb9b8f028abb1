//! Channel registry: the single source of truth for channel names, payload
//! types and directions.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::RwLock;

use super::channel::{Channel, ChannelDescriptor, ChannelDirection, Direction, Payload};
use crate::error::{OliveError, Result};

#[derive(Debug, Clone, Copy)]
struct Entry {
    direction: Direction,
    payload: TypeId,
    payload_name: &'static str,
}

/// Registry of declared channels, shared by the host and every surface.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    entries: RwLock<HashMap<String, Entry>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a channel, or get the existing handle for `name`.
    ///
    /// Re-declaring with the same payload type and direction returns an
    /// equivalent handle. A different payload type or direction is a
    /// `ChannelConflict`.
    pub fn declare<T: Payload, D: ChannelDirection>(&self, name: &str) -> Result<Channel<T, D>> {
        let requested = Entry {
            direction: D::DIRECTION,
            payload: TypeId::of::<T>(),
            payload_name: type_name::<T>(),
        };

        let mut entries = self.entries.write().map_err(|e| OliveError::Ipc(e.to_string()))?;
        if let Some(existing) = entries.get(name) {
            if existing.payload != requested.payload {
                return Err(OliveError::ChannelConflict(format!(
                    "{} already declared with payload {}, not {}",
                    name, existing.payload_name, requested.payload_name
                )));
            }
            if existing.direction != requested.direction {
                return Err(OliveError::ChannelConflict(format!(
                    "{} already declared {}, not {}",
                    name, existing.direction, requested.direction
                )));
            }
            return Ok(Channel::new(name));
        }

        log::debug!("Declared channel {} ({}, {})", name, requested.direction, requested.payload_name);
        entries.insert(name.to_string(), requested);
        Ok(Channel::new(name))
    }

    /// Direction of a declared channel, `None` if unknown.
    pub fn direction_of(&self, name: &str) -> Option<Direction> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(name).map(|e| e.direction))
    }

    /// All declared channels, sorted by name.
    pub fn descriptors(&self) -> Vec<ChannelDescriptor> {
        let Ok(entries) = self.entries.read() else {
            return Vec::new();
        };
        let mut descriptors: Vec<ChannelDescriptor> = entries
            .iter()
            .map(|(name, e)| ChannelDescriptor {
                name: name.clone(),
                direction: e.direction,
                payload_type: e.payload_name,
            })
            .collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Number of declared channels.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::channel::{HostToUiOnly, TwoWay, UiToHostOnly};

    #[test]
    fn test_declare_new_channel() {
        let registry = ChannelRegistry::new();
        let channel = registry.declare::<bool, TwoWay>("ERASE_MODE").unwrap();
        assert_eq!(channel.name(), "ERASE_MODE");
        assert_eq!(registry.direction_of("ERASE_MODE"), Some(Direction::Bidirectional));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_redeclare_same_shape_returns_handle() {
        let registry = ChannelRegistry::new();
        registry.declare::<String, UiToHostOnly>("CLOSE_MODEL").unwrap();
        let again = registry.declare::<String, UiToHostOnly>("CLOSE_MODEL").unwrap();
        assert_eq!(again.name(), "CLOSE_MODEL");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_conflicting_payload_type() {
        let registry = ChannelRegistry::new();
        registry.declare::<bool, HostToUiOnly>("SAVE_REQUEST").unwrap();
        let err = registry.declare::<String, HostToUiOnly>("SAVE_REQUEST").unwrap_err();
        assert!(matches!(err, OliveError::ChannelConflict(_)));
        assert!(err.to_string().contains("payload"));
    }

    #[test]
    fn test_conflicting_direction() {
        let registry = ChannelRegistry::new();
        registry.declare::<bool, HostToUiOnly>("DISAPPEARING_MODE").unwrap();
        let err = registry.declare::<bool, TwoWay>("DISAPPEARING_MODE").unwrap_err();
        assert!(matches!(err, OliveError::ChannelConflict(_)));
        assert!(err.to_string().contains("host-to-ui"));
    }

    #[test]
    fn test_unknown_channel_has_no_direction() {
        let registry = ChannelRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.direction_of("NOPE"), None);
    }

    #[test]
    fn test_descriptors_sorted() {
        let registry = ChannelRegistry::new();
        registry.declare::<bool, TwoWay>("b").unwrap();
        registry.declare::<String, UiToHostOnly>("a").unwrap();
        let descriptors = registry.descriptors();
        assert_eq!(descriptors[0].name, "a");
        assert_eq!(descriptors[0].direction, Direction::UiToHost);
        assert!(descriptors[0].payload_type.ends_with("String"));
        assert_eq!(descriptors[1].name, "b");
    }
}
