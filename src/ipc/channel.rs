//! Typed channel handles and direction markers.
//!
//! A channel's direction is carried in its type. The host can only send on
//! channels whose marker implements `HostSends`, a surface only on channels
//! whose marker implements `UiSends`, and listeners are only available on
//! the receiving side of each direction.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Which way messages may travel on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host to UI surfaces only
    HostToUi,
    /// UI surfaces to host only
    UiToHost,
    /// Both ways
    Bidirectional,
}

impl Direction {
    /// Whether the host may send on this channel.
    pub fn host_can_send(self) -> bool {
        matches!(self, Direction::HostToUi | Direction::Bidirectional)
    }

    /// Whether a UI surface may send on this channel.
    pub fn ui_can_send(self) -> bool {
        matches!(self, Direction::UiToHost | Direction::Bidirectional)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::HostToUi => "host-to-ui",
            Direction::UiToHost => "ui-to-host",
            Direction::Bidirectional => "bidirectional",
        };
        f.write_str(s)
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::HostToUiOnly {}
    impl Sealed for super::UiToHostOnly {}
    impl Sealed for super::TwoWay {}
}

/// Type-level direction of a channel.
pub trait ChannelDirection: sealed::Sealed + Send + Sync + 'static {
    const DIRECTION: Direction;
}

/// Marker: the host may send and surfaces may listen.
pub trait HostSends: ChannelDirection {}

/// Marker: surfaces may send and the host may listen.
pub trait UiSends: ChannelDirection {}

/// Messages from the host to surfaces only.
#[derive(Debug)]
pub enum HostToUiOnly {}

/// Messages from surfaces to the host only.
#[derive(Debug)]
pub enum UiToHostOnly {}

/// Messages in both directions.
#[derive(Debug)]
pub enum TwoWay {}

impl ChannelDirection for HostToUiOnly {
    const DIRECTION: Direction = Direction::HostToUi;
}
impl ChannelDirection for UiToHostOnly {
    const DIRECTION: Direction = Direction::UiToHost;
}
impl ChannelDirection for TwoWay {
    const DIRECTION: Direction = Direction::Bidirectional;
}

impl HostSends for HostToUiOnly {}
impl HostSends for TwoWay {}
impl UiSends for UiToHostOnly {}
impl UiSends for TwoWay {}

/// Anything that can travel over a channel: plain JSON data.
pub trait Payload: Serialize + DeserializeOwned + Send + 'static {}

impl<T> Payload for T where T: Serialize + DeserializeOwned + Send + 'static {}

/// Description of a registered channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDescriptor {
    /// Unique namespace key
    pub name: String,
    /// Fixed at declaration
    pub direction: Direction,
    /// Rust type name of the payload, for diagnostics
    pub payload_type: &'static str,
}

/// Handle to a declared channel carrying `T` in direction `D`.
///
/// Obtained from `ChannelRegistry::declare`; cheap to clone.
pub struct Channel<T, D> {
    name: Arc<str>,
    _marker: PhantomData<fn() -> (T, D)>,
}

impl<T, D: ChannelDirection> Channel<T, D> {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            _marker: PhantomData,
        }
    }

    /// The channel's namespace key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The channel's direction.
    pub fn direction(&self) -> Direction {
        D::DIRECTION
    }
}

impl<T, D> Clone for Channel<T, D> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            _marker: PhantomData,
        }
    }
}

impl<T, D: ChannelDirection> fmt::Debug for Channel<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("direction", &D::DIRECTION)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_permissions() {
        assert!(Direction::HostToUi.host_can_send());
        assert!(!Direction::HostToUi.ui_can_send());
        assert!(!Direction::UiToHost.host_can_send());
        assert!(Direction::UiToHost.ui_can_send());
        assert!(Direction::Bidirectional.host_can_send());
        assert!(Direction::Bidirectional.ui_can_send());
    }

    #[test]
    fn test_markers_map_to_directions() {
        assert_eq!(HostToUiOnly::DIRECTION, Direction::HostToUi);
        assert_eq!(UiToHostOnly::DIRECTION, Direction::UiToHost);
        assert_eq!(TwoWay::DIRECTION, Direction::Bidirectional);
    }

    #[test]
    fn test_channel_handle_clone_and_debug() {
        let channel: Channel<bool, TwoWay> = Channel::new("ERASE_MODE");
        let copy = channel.clone();
        assert_eq!(copy.name(), "ERASE_MODE");
        assert_eq!(copy.direction(), Direction::Bidirectional);
        assert!(format!("{:?}", channel).contains("ERASE_MODE"));
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::UiToHost.to_string(), "ui-to-host");
    }
}
