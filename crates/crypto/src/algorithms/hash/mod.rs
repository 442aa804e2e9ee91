// Path: crates/crypto/src/algorithms/hash/mod.rs
//! SHA-256 helpers.

use sha2::{Digest, Sha256};

pub use tmpop_types::hash::sha256;

/// Size of a SHA-256 digest in bytes.
pub const DIGEST_SIZE: usize = 32;

/// Hashes the concatenation of `parts` without allocating the joined buffer.
pub fn sha256_concat(parts: &[&[u8]]) -> [u8; DIGEST_SIZE] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
