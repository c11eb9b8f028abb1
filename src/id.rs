//! ID generation utilities for Olive
//!
//! Provides functions for generating unique identifiers for characters and surfaces.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

static CHARACTER_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Generate a unique character ID
///
/// Format: `{timestamp_ms}-{sequence_hex}-{random_hex}`
/// Example: `1738300800123-1f-a1b2`
///
/// The sequence makes IDs unique within the process even when thousands of
/// characters are regenerated in the same millisecond (loading a file).
pub fn generate_character_id() -> String {
    let timestamp = now_ms();
    let sequence = CHARACTER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let random: u16 = rand::rng().random();
    format!("{}-{:x}-{:04x}", timestamp, sequence, random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_now_ms_returns_reasonable_timestamp() {
        let ts = now_ms();
        // Should be after 2020-01-01 and before 2100-01-01
        assert!(ts > 1577836800000);
        assert!(ts < 4102444800000);
    }

    #[test]
    fn test_generate_character_id_format() {
        let id = generate_character_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].chars().all(|c| c.is_ascii_digit()));
        assert!(parts[1].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_character_id_uniqueness_in_bulk() {
        let ids: HashSet<String> = (0..10_000).map(|_| generate_character_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }
}
