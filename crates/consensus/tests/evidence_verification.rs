// Path: crates/consensus/tests/evidence_verification.rs

use std::sync::Arc;
use tmpop_consensus::{EvidenceBuilder, PendingHeight, VerifyEvidence};
use tmpop_crypto::algorithms::hash::sha256_concat;
use tmpop_crypto::merkle::StaticTree;
use tmpop_test_utils::fixtures::links_in_map;
use tmpop_test_utils::TestChain;
use tmpop_types::evidence::{Evidence, TendermintProof};
use tmpop_types::LinkHash;

/// Simulates links committed at height 1 followed by two empty blocks, then
/// builds the evidence for height 1.
fn committed(count: usize, ruleset_hash: Vec<u8>) -> (Vec<LinkHash>, Vec<Evidence>) {
    let chain = Arc::new(TestChain::new("tamper-chain", 4));
    let hashes: Vec<LinkHash> = links_in_map("proc", "map", count)
        .iter()
        .map(|l| l.hash().unwrap())
        .collect();
    let root = StaticTree::new(hashes.iter().map(|h| h.0).collect()).root_bytes();
    let genesis: &[u8] = &[];
    let app_hash_1 = sha256_concat(&[genesis, ruleset_hash.as_slice(), root.as_slice()]).to_vec();

    chain.advance(Vec::new(), count as u64);
    chain.advance(app_hash_1.clone(), 0);
    chain.advance(app_hash_1, 0);

    let builder = EvidenceBuilder::new(chain);
    let built = builder
        .build(&PendingHeight {
            height: 1,
            link_hashes: hashes.clone(),
            ruleset_hash,
        })
        .unwrap();
    assert_eq!(built.len(), count);
    let evidences = built.into_iter().map(|(_, e)| e).collect();
    (hashes, evidences)
}

fn proof_for_third_link() -> (LinkHash, TendermintProof) {
    let (hashes, evidences) = committed(4, vec![7; 32]);
    (hashes[2], evidences[2].proof.clone())
}

#[test]
fn every_built_evidence_verifies() {
    for count in 1..=5 {
        let (hashes, evidences) = committed(count, Vec::new());
        for (hash, evidence) in hashes.iter().zip(&evidences) {
            assert!(evidence.verify(hash), "count {}", count);
        }
        // Evidence for one link never vouches for another.
        if count > 1 {
            assert!(!evidences[0].verify(&hashes[1]));
        }
    }
}

#[test]
fn single_leaf_proof_has_empty_path() {
    let (hashes, evidences) = committed(1, Vec::new());
    let proof = &evidences[0].proof;
    assert!(proof.path.is_empty());
    assert_eq!(proof.root, hashes[0].0.to_vec());
    assert!(proof.verify(&hashes[0]));
    assert!(!proof.verify(&LinkHash([3; 32])));
}

#[test]
fn tampered_hashes_fail() {
    let (hash, proof) = proof_for_third_link();
    assert!(proof.verify(&hash));

    let mut p = proof.clone();
    p.validations_hash = vec![8; 32];
    assert!(!p.verify(&hash));

    let mut p = proof.clone();
    p.root = vec![0; 32];
    assert!(!p.verify(&hash));

    let mut p = proof.clone();
    p.header.app_hash = vec![1; 32];
    assert!(!p.verify(&hash));
}

#[test]
fn moved_leaf_position_fails() {
    let (hashes, evidences) = committed(4, Vec::new());
    assert!(evidences[1].verify(&hashes[1]));

    // Leaf 0's proof claiming another position no longer vouches for it.
    let mut p = evidences[0].proof.clone();
    p.leaf_index = 1;
    assert!(!p.verify(&hashes[0]));

    let mut p = evidences[1].proof.clone();
    p.leaf_count = 5;
    assert!(!p.verify(&hashes[1]));
}

#[test]
fn cleared_votes_fail() {
    let (hash, mut proof) = proof_for_third_link();
    proof.header_votes.clear();
    assert!(!proof.verify(&hash));
}

#[test]
fn substituted_public_key_fails() {
    let (hash, mut proof) = proof_for_third_link();
    proof.header_votes[0].pub_key = proof.header_votes[1].pub_key.clone();
    assert!(!proof.verify(&hash));
}

#[test]
fn swapped_vote_signatures_fail() {
    let (hash, mut proof) = proof_for_third_link();
    for (a, b) in proof
        .header_votes
        .iter_mut()
        .zip(proof.next_header_votes.iter_mut())
    {
        if let (Some(va), Some(vb)) = (a.vote.as_mut(), b.vote.as_mut()) {
            std::mem::swap(&mut va.signature, &mut vb.signature);
        }
    }
    assert!(!proof.verify(&hash));
}

#[test]
fn insufficient_power_fails() {
    let (hash, proof) = proof_for_third_link();

    let mut p = proof.clone();
    p.header_votes.truncate(2);
    assert!(!p.verify(&hash));

    // Three of four equal validators is a supermajority.
    let mut p = proof;
    p.next_header_votes.truncate(3);
    assert!(p.verify(&hash));
}

#[test]
fn substituted_validator_set_fails() {
    let (hash, mut proof) = proof_for_third_link();
    proof.header_validator_set.validators.pop();
    assert!(!proof.verify(&hash));
}

#[test]
fn foreign_backend_is_rejected() {
    let (hashes, mut evidences) = committed(2, Vec::new());
    evidences[0].backend = "other".into();
    assert!(!evidences[0].verify(&hashes[0]));
}
