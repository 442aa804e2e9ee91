// Path: crates/consensus/src/builder.rs

//! Assembly of inclusion proofs from the engine's finalized blocks.

use crate::proof::VerifyEvidence;
use std::sync::Arc;
use tmpop_api::consensus::BlockSource;
use tmpop_crypto::merkle::StaticTree;
use tmpop_types::error::EvidenceError;
use tmpop_types::evidence::{Evidence, TendermintProof, TendermintVote};
use tmpop_types::tendermint::{Block, Commit, Header, ValidatorSet};
use tmpop_types::LinkHash;

/// Number of blocks after `N` that must be final before evidence for `N` is
/// attempted: block `N+2` carries the precommits for `N+1`.
pub const EVIDENCE_LAG: u64 = 3;

/// Links committed at one height that still lack evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingHeight {
    /// The committed height.
    pub height: u64,
    /// The delivered link hashes, in delivery order.
    pub link_hashes: Vec<LinkHash>,
    /// The ruleset hash folded into that height's AppHash.
    pub ruleset_hash: Vec<u8>,
}

impl PendingHeight {
    /// Whether evidence can be attempted at `current` height.
    pub fn is_ready(&self, current: u64) -> bool {
        self.height.saturating_add(EVIDENCE_LAG) <= current
    }
}

/// Builds `TendermintProof`s by calling back into the consensus engine.
#[derive(Clone)]
pub struct EvidenceBuilder {
    source: Arc<dyn BlockSource>,
}

impl EvidenceBuilder {
    /// Creates a builder reading from `source`.
    pub fn new(source: Arc<dyn BlockSource>) -> Self {
        Self { source }
    }

    /// Builds one verified evidence per link of `pending`.
    ///
    /// Source failures are transient and the height may be retried. An
    /// `Unverifiable` error means the chain disagrees with what this node
    /// committed and retrying will not help.
    pub fn build(&self, pending: &PendingHeight) -> Result<Vec<(LinkHash, Evidence)>, EvidenceError> {
        let height = pending.height;
        let next_height = height.saturating_add(1);

        let block = self.fetch_block(height)?;
        let next_block = self.fetch_block(next_height)?;
        let after_next = self.fetch_block(height.saturating_add(2))?;
        let header_set = self.source.validators(height)?;
        let next_header_set = self.source.validators(next_height)?;

        let header_votes = votes_for(&block.header, &next_block.last_commit, &header_set);
        let next_header_votes = votes_for(&next_block.header, &after_next.last_commit, &next_header_set);

        let tree = StaticTree::new(pending.link_hashes.iter().map(|h| h.0).collect());
        let root = tree.root_bytes();
        let leaf_count = pending.link_hashes.len() as u64;

        let mut out = Vec::with_capacity(pending.link_hashes.len());
        for (index, link_hash) in pending.link_hashes.iter().enumerate() {
            let path = tree.path(index).ok_or_else(|| {
                EvidenceError::Merkle(format!("no path for leaf {} at height {}", index, height))
            })?;
            let proof = TendermintProof {
                block_height: height,
                root: root.clone(),
                leaf_index: index as u64,
                leaf_count,
                path,
                validations_hash: pending.ruleset_hash.clone(),
                header: block.header.clone(),
                header_votes: header_votes.clone(),
                header_validator_set: header_set.clone(),
                next_header: next_block.header.clone(),
                next_header_votes: next_header_votes.clone(),
                next_header_validator_set: next_header_set.clone(),
            };
            let evidence = Evidence::tendermint(block.header.chain_id.clone(), proof);
            if !evidence.verify(link_hash) {
                return Err(EvidenceError::Unverifiable(height));
            }
            out.push((*link_hash, evidence));
        }

        tracing::debug!(target: "evidence", height, links = out.len(), "evidence built");
        Ok(out)
    }

    fn fetch_block(&self, height: u64) -> Result<Block, EvidenceError> {
        let block = self.source.block(height)?;
        if block.header.height != height {
            return Err(EvidenceError::HeightMismatch {
                expected: height,
                got: block.header.height,
            });
        }
        Ok(block)
    }
}

/// Pairs the commit's precommits for `header` with their signers' keys.
/// Votes for another block or from unknown validators are left out.
fn votes_for(header: &Header, commit: &Commit, validators: &ValidatorSet) -> Vec<TendermintVote> {
    let block_hash = header.hash();
    commit
        .precommits
        .iter()
        .filter(|v| v.block_hash.as_slice() == block_hash.as_slice())
        .filter_map(|vote| {
            validators
                .get_by_index(vote.validator_index)
                .map(|validator| TendermintVote {
                    pub_key: validator.pub_key.clone(),
                    vote: Some(vote.clone()),
                })
        })
        .collect()
}
