// Path: crates/state/src/app_hash.rs

//! The AppHash commitment: `SHA256(previousAppHash ‖ rulesetHash ‖ merkleRoot)`.

use tmpop_crypto::algorithms::hash::sha256_concat;
use tmpop_crypto::merkle::StaticTree;
use tmpop_types::LinkHash;

/// Builds the merkle tree over link hashes, in the given order.
pub fn link_tree(link_hashes: &[LinkHash]) -> StaticTree {
    StaticTree::new(link_hashes.iter().map(|h| h.0).collect())
}

/// Merkle root over link hashes in delivery order; empty if there are none.
pub fn merkle_root(link_hashes: &[LinkHash]) -> Vec<u8> {
    link_tree(link_hashes).root_bytes()
}

/// Computes the AppHash for a block. Pure: same inputs, same bytes.
///
/// Empty components contribute nothing to the hashed input.
pub fn compute_app_hash(previous: &[u8], ruleset_hash: &[u8], link_hashes: &[LinkHash]) -> Vec<u8> {
    let root = merkle_root(link_hashes);
    sha256_concat(&[previous, ruleset_hash, root.as_slice()]).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tmpop_crypto::algorithms::hash::sha256;

    fn hashes(seeds: &[u8]) -> Vec<LinkHash> {
        seeds.iter().map(|s| LinkHash(sha256(&[*s]))).collect()
    }

    #[test]
    fn single_link_root_is_the_link_hash() {
        let h = hashes(&[1]);
        assert_eq!(merkle_root(&h), h[0].0.to_vec());
        assert!(merkle_root(&[]).is_empty());
    }

    #[test]
    fn app_hash_matches_formula() {
        let prev = vec![7u8; 32];
        let rules = vec![8u8; 32];
        let h = hashes(&[1, 2]);
        let root = merkle_root(&h);
        let expected = sha256(&[prev.clone(), rules.clone(), root].concat()).to_vec();
        assert_eq!(compute_app_hash(&prev, &rules, &h), expected);
    }

    proptest! {
        #[test]
        fn app_hash_is_deterministic(
            prev in proptest::collection::vec(any::<u8>(), 0..33),
            rules in proptest::collection::vec(any::<u8>(), 0..33),
            seeds in proptest::collection::vec(any::<u8>(), 0..16),
        ) {
            let h = hashes(&seeds);
            prop_assert_eq!(compute_app_hash(&prev, &rules, &h), compute_app_hash(&prev, &rules, &h));
        }

        #[test]
        fn app_hash_depends_on_previous(seeds in proptest::collection::vec(any::<u8>(), 1..8)) {
            let h = hashes(&seeds);
            prop_assert_ne!(compute_app_hash(&[1], &[], &h), compute_app_hash(&[2], &[], &h));
        }
    }
}
