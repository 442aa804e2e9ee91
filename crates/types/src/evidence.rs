// Path: crates/types/src/evidence.rs

//! Evidence and the `TendermintProof` it carries.
//!
//! A proof states that a link hash was part of the state committed at
//! `block_height`, attested by a quorum of two consecutive validator sets.
//! Verification lives in `tmpop-consensus`; these are the plain value types
//! stored next to segments and returned by queries.

use crate::hash::hex_bytes;
use crate::tendermint::{Header, ValidatorSet, Vote};
use serde::{Deserialize, Serialize};

/// Backend name written into every evidence produced by this application.
pub const EVIDENCE_BACKEND: &str = "TMPop";

/// One step of a merkle path: a pair of siblings and their parent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct HashTriplet {
    /// Left child.
    #[serde(with = "hex_bytes")]
    pub left: Vec<u8>,
    /// Right child.
    #[serde(with = "hex_bytes")]
    pub right: Vec<u8>,
    /// `SHA256(left ‖ right)`.
    #[serde(with = "hex_bytes")]
    pub parent: Vec<u8>,
}

/// Ordered steps from a leaf up to the merkle root. Empty for a single-leaf tree.
pub type MerklePath = Vec<HashTriplet>;

/// A vote together with the public key that signed it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct TendermintVote {
    /// Ed25519 public key of the signer.
    #[serde(with = "hex_bytes")]
    pub pub_key: Vec<u8>,
    /// The signed vote. A missing body never verifies.
    pub vote: Option<Vote>,
}

/// Proof that a link was included in the state committed at `block_height`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct TendermintProof {
    /// Height of the block whose transactions contained the link.
    pub block_height: u64,
    /// Merkle root over the block's delivered link hashes.
    #[serde(with = "hex_bytes")]
    pub root: Vec<u8>,
    /// Position of the link among the block's delivered links.
    pub leaf_index: u64,
    /// Number of links delivered in the block.
    pub leaf_count: u64,
    /// Path from the link hash to `root`. Its shape follows from
    /// `leaf_index` and `leaf_count`.
    pub path: MerklePath,
    /// Hash of the content ruleset active at `block_height`; empty if none.
    #[serde(with = "hex_bytes")]
    pub validations_hash: Vec<u8>,
    /// Header of `block_height`. Its `app_hash` is the previous state commitment.
    pub header: Header,
    /// Precommits for `header`.
    pub header_votes: Vec<TendermintVote>,
    /// Validator set that signed `header`.
    pub header_validator_set: ValidatorSet,
    /// Header of `block_height + 1`. Its `app_hash` commits to the link.
    pub next_header: Header,
    /// Precommits for `next_header`.
    pub next_header_votes: Vec<TendermintVote>,
    /// Validator set that signed `next_header`.
    pub next_header_validator_set: ValidatorSet,
}

/// A proof attached to a segment, tagged with who produced it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    /// The producing backend (`TMPop`).
    pub backend: String,
    /// The producer instance, the chain id for this backend.
    pub provider: String,
    /// The inclusion proof.
    pub proof: TendermintProof,
}

impl Evidence {
    /// Wraps a proof produced on `chain_id`.
    pub fn tendermint(chain_id: impl Into<String>, proof: TendermintProof) -> Self {
        Self {
            backend: EVIDENCE_BACKEND.to_string(),
            provider: chain_id.into(),
            proof,
        }
    }

    /// Two evidences are duplicates when the same backend and provider produced them.
    pub fn same_origin(&self, other: &Evidence) -> bool {
        self.backend == other.backend && self.provider == other.provider
    }
}
