// Path: crates/crypto/src/merkle/mod.rs
//! A static binary merkle tree over 32-byte leaves.
//!
//! Each parent is `SHA256(left ‖ right)`. A node without a sibling at the
//! end of a level is promoted to the next level unchanged, so the root of a
//! single-leaf tree is that leaf and promoted nodes add no path step.

use crate::algorithms::hash::sha256_concat;
use tmpop_types::evidence::{HashTriplet, MerklePath};

type Digest = [u8; 32];

/// A fully materialized merkle tree. Level 0 holds the leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticTree {
    levels: Vec<Vec<Digest>>,
}

impl StaticTree {
    /// Builds the tree over `leaves`, in the given order.
    pub fn new(leaves: Vec<Digest>) -> Self {
        let mut levels = vec![leaves];
        while let Some(level) = levels.last().filter(|l| l.len() > 1) {
            let next: Vec<Digest> = level
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => sha256_concat(&[left.as_slice(), right.as_slice()]),
                    [single] => *single,
                    _ => Digest::default(),
                })
                .collect();
            levels.push(next);
        }
        Self { levels }
    }

    /// Number of leaves.
    pub fn leaves_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// The root, or `None` for an empty tree.
    pub fn root(&self) -> Option<Digest> {
        self.levels.last().and_then(|l| l.first()).copied()
    }

    /// The root as bytes; empty for an empty tree.
    pub fn root_bytes(&self) -> Vec<u8> {
        self.root().map(|r| r.to_vec()).unwrap_or_default()
    }

    /// The path from leaf `index` to the root, or `None` if out of range.
    pub fn path(&self, index: usize) -> Option<MerklePath> {
        if index >= self.leaves_count() {
            return None;
        }
        let mut path = MerklePath::new();
        let mut idx = index;
        for (level, parents) in self.levels.iter().zip(self.levels.iter().skip(1)) {
            let sibling = idx ^ 1;
            if let Some(sib) = level.get(sibling) {
                let node = level.get(idx)?;
                let (left, right) = if idx % 2 == 0 { (node, sib) } else { (sib, node) };
                path.push(HashTriplet {
                    left: left.to_vec(),
                    right: right.to_vec(),
                    parent: parents.get(idx / 2)?.to_vec(),
                });
            }
            idx /= 2;
        }
        Some(path)
    }
}

/// The side of the running hash at each path step for leaf `index` of a
/// `count`-leaf tree, `true` meaning right. `None` if `index` is out of range.
fn step_sides(index: u64, count: u64) -> Option<Vec<bool>> {
    if index >= count {
        return None;
    }
    let mut sides = Vec::new();
    let (mut idx, mut width) = (index, count);
    while width > 1 {
        let promoted = width % 2 == 1 && idx == width - 1;
        if !promoted {
            sides.push(idx % 2 == 1);
        }
        idx /= 2;
        width = width / 2 + width % 2;
    }
    Some(sides)
}

/// Checks that `path` links `leaf`, at position `index` of a `count`-leaf
/// tree, to `root`.
///
/// The position fixes the shape of the path: its length and, at every step,
/// which side holds the running hash. Each step must hash to its declared
/// parent and the last parent must be `root`. An empty path only validates
/// a single-leaf tree, where `leaf == root`.
pub fn validate_path(path: &[HashTriplet], index: u64, count: u64, leaf: &[u8], root: &[u8]) -> bool {
    let Some(sides) = step_sides(index, count) else {
        return false;
    };
    if sides.len() != path.len() {
        return false;
    }
    let mut current = leaf;
    for (step, on_right) in path.iter().zip(sides) {
        let own = if on_right { &step.right } else { &step.left };
        if own.as_slice() != current {
            return false;
        }
        if sha256_concat(&[step.left.as_slice(), step.right.as_slice()]).as_slice() != step.parent.as_slice() {
            return false;
        }
        current = step.parent.as_slice();
    }
    current == root
}
