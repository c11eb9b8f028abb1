//! Payload snapshots.
//!
//! Every payload crosses the boundary as a `serde_json::Value` produced by a
//! full serialize/deserialize round trip, so the receiver never shares
//! state with the sender and anything that cannot survive JSON is rejected
//! at the send site.

use serde_json::Value;

use super::channel::Payload;
use crate::error::{OliveError, Result};

/// Serialize a payload into a detached JSON snapshot.
///
/// Fails if the value does not serialize, or if the JSON produced cannot be
/// read back as the same type (non-finite floats, for example).
pub fn snapshot<T: Payload>(payload: &T) -> Result<Value> {
    let value = serde_json::to_value(payload).map_err(|e| OliveError::Serialization(e.to_string()))?;
    T::deserialize(&value).map_err(|e| {
        OliveError::Serialization(format!(
            "{} does not round-trip through JSON: {}",
            std::any::type_name::<T>(),
            e
        ))
    })?;
    Ok(value)
}

/// Decode a received snapshot into its payload type.
pub fn restore<T: Payload>(value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| OliveError::Serialization(e.to_string()))
}

/// Deep copy by round-tripping through JSON.
pub fn deep_clone<T: Payload>(payload: &T) -> Result<T> {
    restore(&snapshot(payload)?)
}
