//! Shared constants and utilities for the registry

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;

/// Get current unix timestamp in milliseconds
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

/// Compute the hex SHA-256 checksum of an asset's type name plus its
/// canonical payload JSON.
///
/// Canonical form relies on `serde_json`'s sorted object keys; the
/// `preserve_order` feature must stay disabled. Metadata is not part of the
/// digest, so tag or annotation edits leave the checksum untouched.
pub fn asset_checksum(asset_type: &str, payload: &serde_json::Value) -> Result<String> {
    let canonical = serde_json::to_string(payload)?;
    let mut hasher = Sha256::new();
    hasher.update(asset_type.as_bytes());
    hasher.update(b"\n");
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checksum_is_stable_across_key_order() {
        let a = json!({"name": "Emma", "age": 24});
        let b = json!({"age": 24, "name": "Emma"});
        assert_eq!(
            asset_checksum("character", &a).unwrap(),
            asset_checksum("character", &b).unwrap()
        );
    }

    #[test]
    fn test_checksum_changes_with_payload() {
        let a = json!({"name": "Emma", "age": 24});
        let b = json!({"name": "Emma", "age": 25});
        assert_ne!(
            asset_checksum("character", &a).unwrap(),
            asset_checksum("character", &b).unwrap()
        );
    }

    #[test]
    fn test_checksum_changes_with_type() {
        let payload = json!({"name": "Emma"});
        assert_ne!(
            asset_checksum("character", &payload).unwrap(),
            asset_checksum("personality", &payload).unwrap()
        );
    }
}
