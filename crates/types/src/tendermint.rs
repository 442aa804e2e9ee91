// Path: crates/types/src/tendermint.rs

//! Value types mirrored from the BFT consensus engine.
//!
//! These are the pieces of the engine's block structure that evidence needs:
//! headers, precommit votes and validator sets. They are plain immutable
//! values; all hashing goes through the canonical SCALE encoding so that a
//! proof built on one machine verifies byte for byte on any other.

use crate::codec;
use crate::hash::{hex_bytes, sha256};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Length of a validator address, taken from the front of `SHA256(pub_key)`.
pub const ADDRESS_LEN: usize = 20;

/// A block header as produced by the consensus engine.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    /// The chain this block belongs to. Part of every vote's sign bytes.
    pub chain_id: String,
    /// The block height.
    pub height: u64,
    /// Block time in milliseconds since the Unix epoch.
    pub time: u64,
    /// Number of transactions in the block.
    pub num_txs: u64,
    /// Hash of the previous block header.
    #[serde(with = "hex_bytes")]
    pub last_block_hash: Vec<u8>,
    /// Hash of the block's transactions.
    #[serde(with = "hex_bytes")]
    pub data_hash: Vec<u8>,
    /// Hash of the validator set that signs this block.
    #[serde(with = "hex_bytes")]
    pub validators_hash: Vec<u8>,
    /// The application state commitment after executing the previous block.
    #[serde(with = "hex_bytes")]
    pub app_hash: Vec<u8>,
}

impl Header {
    /// The block hash votes refer to: `SHA256(SCALE(header))`.
    pub fn hash(&self) -> [u8; 32] {
        sha256(&codec::to_bytes_canonical(self))
    }
}

/// The consensus step a vote was cast in.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteType {
    /// First voting round.
    #[codec(index = 1)]
    Prevote,
    /// Second voting round; a quorum of precommits finalizes the block.
    #[codec(index = 2)]
    Precommit,
}

/// A signed vote from one validator for one block.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    /// The voting step.
    pub vote_type: VoteType,
    /// Height of the voted block.
    pub height: u64,
    /// Consensus round within the height.
    pub round: u32,
    /// Hash of the voted block header.
    #[serde(with = "hex_bytes")]
    pub block_hash: Vec<u8>,
    /// Vote time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Address of the signing validator.
    #[serde(with = "hex_bytes")]
    pub validator_address: Vec<u8>,
    /// Position of the signing validator in the height's validator set.
    pub validator_index: u32,
    /// Ed25519 signature over `sign_bytes(chain_id)`.
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Encode)]
struct CanonicalVote<'a> {
    chain_id: &'a str,
    vote_type: VoteType,
    height: u64,
    round: u32,
    block_hash: &'a [u8],
    timestamp: u64,
}

impl Vote {
    /// The bytes a validator signs: every vote field except the signer
    /// identity and the signature itself, bound to the chain id.
    pub fn sign_bytes(&self, chain_id: &str) -> Vec<u8> {
        CanonicalVote {
            chain_id,
            vote_type: self.vote_type,
            height: self.height,
            round: self.round,
            block_hash: &self.block_hash,
            timestamp: self.timestamp,
        }
        .encode()
    }
}

/// A consensus-engine node eligible to sign blocks.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    /// `SHA256(pub_key)[..20]`.
    #[serde(with = "hex_bytes")]
    pub address: Vec<u8>,
    /// Ed25519 public key.
    #[serde(with = "hex_bytes")]
    pub pub_key: Vec<u8>,
    /// Voting weight of this validator.
    pub voting_power: u64,
}

impl Validator {
    /// Builds a validator entry, deriving its address from the public key.
    pub fn new(pub_key: Vec<u8>, voting_power: u64) -> Self {
        Self {
            address: address_from_pub_key(&pub_key),
            pub_key,
            voting_power,
        }
    }
}

/// Derives a validator address from its public key.
pub fn address_from_pub_key(pub_key: &[u8]) -> Vec<u8> {
    sha256(pub_key).iter().take(ADDRESS_LEN).copied().collect()
}

/// The validators eligible to sign a given height, in index order.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatorSet {
    /// Validators, addressed by their position in this list.
    pub validators: Vec<Validator>,
}

impl ValidatorSet {
    /// Wraps a validator list.
    pub fn new(validators: Vec<Validator>) -> Self {
        Self { validators }
    }

    /// The hash headers commit to in `validators_hash`.
    pub fn hash(&self) -> [u8; 32] {
        sha256(&codec::to_bytes_canonical(self))
    }

    /// Sum of all voting power, widened so it cannot overflow.
    pub fn total_voting_power(&self) -> u128 {
        self.validators
            .iter()
            .map(|v| u128::from(v.voting_power))
            .sum()
    }

    /// Looks up a validator by index.
    pub fn get_by_index(&self, index: u32) -> Option<&Validator> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.validators.get(i))
    }
}

/// The precommits that finalized a block, as carried by the next block.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct Commit {
    /// Hash of the committed block.
    #[serde(with = "hex_bytes")]
    pub block_hash: Vec<u8>,
    /// The precommits, in validator index order.
    pub precommits: Vec<Vote>,
}

/// A finalized block as returned by the engine's block endpoint.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    /// The block header.
    pub header: Header,
    /// The precommits for the previous height.
    pub last_commit: Commit,
}
