// Path: crates/test_utils/src/chain.rs

//! A deterministic, in-process stand-in for the BFT consensus engine.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock};
use tmpop_api::consensus::BlockSource;
use tmpop_crypto::sign::eddsa::Ed25519KeyPair;
use tmpop_types::error::EvidenceError;
use tmpop_types::evidence::TendermintVote;
use tmpop_types::tendermint::{Block, Commit, Header, Validator, ValidatorSet, Vote, VoteType};

/// Block time step between consecutive test headers, in milliseconds.
pub const BLOCK_TIME_MS: u64 = 1_000;

/// A simulated chain signed by deterministic ed25519 validators.
///
/// Headers are appended with `push_header`; each pushed block carries the
/// precommits of all validators for the previous height, the way the real
/// engine's block endpoint does.
pub struct TestChain {
    chain_id: String,
    keys: Vec<Ed25519KeyPair>,
    validators: ValidatorSet,
    blocks: RwLock<BTreeMap<u64, Block>>,
    unavailable: RwLock<BTreeSet<u64>>,
}

impl TestChain {
    /// A chain with `count` validators of voting power 10 each.
    pub fn new(chain_id: &str, count: u8) -> Self {
        Self::with_powers(chain_id, &vec![10; usize::from(count)])
    }

    /// A chain with one validator per entry of `powers`.
    pub fn with_powers(chain_id: &str, powers: &[u64]) -> Self {
        let keys: Vec<Ed25519KeyPair> = (0..powers.len())
            .map(|i| Ed25519KeyPair::from_seed(&[u8::try_from(i + 1).unwrap_or(u8::MAX); 32]))
            .collect();
        let validators = ValidatorSet::new(
            keys.iter()
                .zip(powers)
                .map(|(k, p)| Validator::new(k.public_key(), *p))
                .collect(),
        );
        Self {
            chain_id: chain_id.to_string(),
            keys,
            validators,
            blocks: RwLock::new(BTreeMap::new()),
            unavailable: RwLock::new(BTreeSet::new()),
        }
    }

    /// The chain id all votes are bound to.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// The validator set, identical at every height.
    pub fn validator_set(&self) -> &ValidatorSet {
        &self.validators
    }

    /// The validators' signing keys, in index order.
    pub fn keys(&self) -> &[Ed25519KeyPair] {
        &self.keys
    }

    /// Height of the last pushed header, or 0.
    pub fn tip(&self) -> u64 {
        self.read_blocks().keys().next_back().copied().unwrap_or(0)
    }

    /// The pushed header at `height`, if any.
    pub fn header(&self, height: u64) -> Option<Header> {
        self.read_blocks().get(&height).map(|b| b.header.clone())
    }

    /// Builds the header following the tip, carrying `app_hash`.
    pub fn next_header(&self, app_hash: Vec<u8>, num_txs: u64) -> Header {
        let height = self.tip() + 1;
        let last_block_hash = self
            .header(height - 1)
            .map(|h| h.hash().to_vec())
            .unwrap_or_default();
        Header {
            chain_id: self.chain_id.clone(),
            height,
            time: height * BLOCK_TIME_MS,
            num_txs,
            last_block_hash,
            data_hash: Vec::new(),
            validators_hash: self.validators.hash().to_vec(),
            app_hash,
        }
    }

    /// Appends a block for `header`, whose last commit holds every
    /// validator's precommit for the previous height.
    pub fn push_header(&self, header: Header) {
        let last_commit = match self.header(header.height.saturating_sub(1)) {
            Some(prev) => Commit {
                block_hash: prev.hash().to_vec(),
                precommits: self.precommits(&prev),
            },
            None => Commit::default(),
        };
        self.blocks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(header.height, Block { header, last_commit });
    }

    /// Builds the next header for `app_hash`, pushes it and returns it.
    pub fn advance(&self, app_hash: Vec<u8>, num_txs: u64) -> Header {
        let header = self.next_header(app_hash, num_txs);
        self.push_header(header.clone());
        header
    }

    /// Every validator's signed precommit for `header`.
    pub fn precommits(&self, header: &Header) -> Vec<Vote> {
        self.keys
            .iter()
            .zip(&self.validators.validators)
            .enumerate()
            .map(|(index, (key, validator))| {
                let mut vote = Vote {
                    vote_type: VoteType::Precommit,
                    height: header.height,
                    round: 0,
                    block_hash: header.hash().to_vec(),
                    timestamp: header.time,
                    validator_address: validator.address.clone(),
                    validator_index: u32::try_from(index).unwrap_or(u32::MAX),
                    signature: Vec::new(),
                };
                vote.signature = key.sign(&vote.sign_bytes(&header.chain_id));
                vote
            })
            .collect()
    }

    /// `precommits` paired with their signers' public keys, as evidence carries them.
    pub fn tendermint_votes(&self, header: &Header) -> Vec<TendermintVote> {
        self.precommits(header)
            .into_iter()
            .zip(&self.keys)
            .map(|(vote, key)| TendermintVote {
                pub_key: key.public_key(),
                vote: Some(vote),
            })
            .collect()
    }

    /// Makes the block endpoint fail for `height` until `restore` is called.
    pub fn make_unavailable(&self, height: u64) {
        self.unavailable
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(height);
    }

    /// Undoes `make_unavailable`.
    pub fn restore(&self, height: u64) {
        self.unavailable
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&height);
    }

    fn read_blocks(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<u64, Block>> {
        self.blocks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self, height: u64) -> Result<(), EvidenceError> {
        let unavailable = self.unavailable.read().unwrap_or_else(PoisonError::into_inner);
        if unavailable.contains(&height) {
            return Err(EvidenceError::Source {
                height,
                reason: "block endpoint unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl BlockSource for TestChain {
    fn block(&self, height: u64) -> Result<Block, EvidenceError> {
        self.check_available(height)?;
        self.read_blocks()
            .get(&height)
            .cloned()
            .ok_or_else(|| EvidenceError::Source {
                height,
                reason: "no such block".to_string(),
            })
    }

    fn validators(&self, height: u64) -> Result<ValidatorSet, EvidenceError> {
        self.check_available(height)?;
        if height == 0 || height > self.tip() {
            return Err(EvidenceError::Source {
                height,
                reason: "no validator set for height".to_string(),
            });
        }
        Ok(self.validators.clone())
    }
}
