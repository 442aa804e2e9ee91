// Path: crates/consensus/src/proof.rs

//! Offline verification of inclusion proofs.
//!
//! Verification is binary and pure. Every input is adversarial: nothing here
//! indexes unchecked, panics or performs I/O.

use std::collections::BTreeSet;
use tmpop_crypto::algorithms::hash::sha256_concat;
use tmpop_crypto::merkle::validate_path;
use tmpop_crypto::sign::eddsa::verify_signature;
use tmpop_types::evidence::{Evidence, TendermintProof, TendermintVote, EVIDENCE_BACKEND};
use tmpop_types::tendermint::{Header, ValidatorSet, VoteType};
use tmpop_types::LinkHash;

/// Checks that a proof commits to a link hash.
pub trait VerifyEvidence {
    /// Returns `true` only if every check passes.
    fn verify(&self, link_hash: &LinkHash) -> bool;
}

impl VerifyEvidence for TendermintProof {
    fn verify(&self, link_hash: &LinkHash) -> bool {
        if !headers_are_consecutive(self) {
            tracing::debug!(target: "evidence", "proof headers are not consecutive");
            return false;
        }

        let candidate = sha256_concat(&[
            self.header.app_hash.as_slice(),
            self.validations_hash.as_slice(),
            self.root.as_slice(),
        ]);
        if candidate.as_slice() != self.next_header.app_hash.as_slice() {
            tracing::debug!(target: "evidence", "app hash chain mismatch");
            return false;
        }

        if !validate_path(
            &self.path,
            self.leaf_index,
            self.leaf_count,
            link_hash.as_bytes(),
            &self.root,
        ) {
            tracing::debug!(target: "evidence", "merkle path does not lead to root");
            return false;
        }

        if self.header_validator_set.hash().as_slice() != self.header.validators_hash.as_slice()
            || self.next_header_validator_set.hash().as_slice()
                != self.next_header.validators_hash.as_slice()
        {
            tracing::debug!(target: "evidence", "validator set hash mismatch");
            return false;
        }

        has_quorum(&self.header, &self.header_votes, &self.header_validator_set)
            && has_quorum(
                &self.next_header,
                &self.next_header_votes,
                &self.next_header_validator_set,
            )
    }
}

impl VerifyEvidence for Evidence {
    fn verify(&self, link_hash: &LinkHash) -> bool {
        self.backend == EVIDENCE_BACKEND
            && self.provider == self.proof.header.chain_id
            && self.proof.verify(link_hash)
    }
}

fn headers_are_consecutive(proof: &TendermintProof) -> bool {
    proof.header.height == proof.block_height
        && proof.block_height.checked_add(1) == Some(proof.next_header.height)
        && proof.header.chain_id == proof.next_header.chain_id
}

/// Checks that `votes` are valid precommits for `header` carrying more than
/// two thirds of the voting power of `validators`.
///
/// A single invalid vote fails the whole set. A validator index counts once.
pub fn has_quorum(header: &Header, votes: &[TendermintVote], validators: &ValidatorSet) -> bool {
    if votes.is_empty() {
        return false;
    }
    let block_hash = header.hash();
    let mut counted = BTreeSet::new();
    let mut power: u128 = 0;

    for tv in votes {
        let Some(vote) = &tv.vote else {
            return false;
        };
        if tv.pub_key.is_empty() {
            return false;
        }
        if vote.vote_type != VoteType::Precommit
            || vote.height != header.height
            || vote.block_hash.as_slice() != block_hash.as_slice()
        {
            return false;
        }
        let Some(validator) = validators.get_by_index(vote.validator_index) else {
            return false;
        };
        if validator.address != vote.validator_address || validator.pub_key != tv.pub_key {
            return false;
        }
        if !verify_signature(&tv.pub_key, &vote.sign_bytes(&header.chain_id), &vote.signature) {
            return false;
        }
        if counted.insert(vote.validator_index) {
            power = power.saturating_add(u128::from(validator.voting_power));
        }
    }

    power.saturating_mul(3) > validators.total_voting_power().saturating_mul(2)
}
