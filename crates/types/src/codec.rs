// Path: crates/types/src/codec.rs

//! Canonical encodings for everything that is hashed or persisted.
//!
//! Two encodings are used and both are centralized here so that every replica
//! produces the same bytes for the same value:
//!
//! - SCALE (`parity-scale-codec`) for consensus-engine structures: header
//!   hashing, vote sign bytes, validator-set hashing and the persisted
//!   `LastBlock` record.
//! - Canonical JSON for links. Every object, structs included, is emitted with
//!   its keys sorted, so the output does not depend on field declaration order.

use parity_scale_codec::{Decode, DecodeAll, Encode};
use serde::Serialize;

/// Encodes a value into its deterministic SCALE representation.
pub fn to_bytes_canonical<T: Encode>(v: &T) -> Vec<u8> {
    v.encode()
}

/// Decodes a value from its SCALE representation.
///
/// Fails on trailing bytes as well as on truncated input, so a stored record
/// that was partially overwritten is never accepted.
pub fn from_bytes_canonical<T: Decode>(b: &[u8]) -> Result<T, String> {
    T::decode_all(&mut &*b).map_err(|e| format!("canonical decode failed: {}", e))
}

/// Serializes a value into canonical JSON bytes.
pub fn to_canonical_json<T: Serialize>(v: &T) -> Result<Vec<u8>, String> {
    // `Value` objects are BTreeMap-backed: the round trip sorts every level.
    let value = serde_json::to_value(v).map_err(|e| format!("canonical json failed: {}", e))?;
    serde_json::to_vec(&value).map_err(|e| format!("canonical json failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Encode, Decode, Debug, PartialEq, Eq)]
    struct Record {
        height: u64,
        name: String,
        hash: Vec<u8>,
    }

    #[test]
    fn scale_decode_rejects_truncated_input() {
        let record = Record {
            height: 7,
            name: "block".to_string(),
            hash: vec![1, 2, 3, 4],
        };
        let mut encoded = to_bytes_canonical(&record);
        encoded.pop();

        let err = from_bytes_canonical::<Record>(&encoded).unwrap_err();
        assert!(err.contains("canonical decode failed"));
    }

    #[test]
    fn scale_decode_rejects_trailing_bytes() {
        let mut encoded = to_bytes_canonical(&42u64);
        encoded.push(0);
        assert!(from_bytes_canonical::<u64>(&encoded).is_err());
    }

    #[test]
    fn canonical_json_sorts_object_keys() {
        let a = json!({"b": 1, "a": {"z": true, "y": [1, 2]}});
        let b = json!({"a": {"y": [1, 2], "z": true}, "b": 1});
        assert_eq!(to_canonical_json(&a).unwrap(), to_canonical_json(&b).unwrap());
        assert_eq!(
            String::from_utf8(to_canonical_json(&a).unwrap()).unwrap(),
            r#"{"a":{"y":[1,2],"z":true},"b":1}"#
        );
    }
}
