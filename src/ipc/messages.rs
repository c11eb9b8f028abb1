//! Message types carried between the host and UI surfaces.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of a UI surface (one window or child page).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// One message in flight: a channel name plus a JSON snapshot of the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Channel namespace key
    pub channel: String,
    /// Sending surface, `None` when sent by the host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<SurfaceId>,
    /// Deep-copied payload
    pub payload: Value,
}

impl Envelope {
    /// Message from the host.
    pub fn from_host(channel: impl Into<String>, payload: Value) -> Self {
        Self {
            channel: channel.into(),
            sender: None,
            payload,
        }
    }

    /// Message from a surface.
    pub fn from_surface(sender: SurfaceId, channel: impl Into<String>, payload: Value) -> Self {
        Self {
            channel: channel.into(),
            sender: Some(sender),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_surface_id_display() {
        assert_eq!(SurfaceId(3).to_string(), "surface-3");
    }

    #[test]
    fn test_envelope_constructors() {
        let host = Envelope::from_host("SAVE_REQUEST", json!(true));
        assert_eq!(host.sender, None);
        let ui = Envelope::from_surface(SurfaceId(2), "CLOSE_MODEL", json!("help"));
        assert_eq!(ui.sender, Some(SurfaceId(2)));
        assert_eq!(ui.channel, "CLOSE_MODEL");
    }

    #[test]
    fn test_envelope_serialization() {
        let event = Envelope::from_host("SET_COLOR", json!("red"));
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"channel":"SET_COLOR","payload":"red"}"#);
        let parsed: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
