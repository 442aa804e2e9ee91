// Path: crates/api/src/consensus/mod.rs

//! Read access to the consensus engine's finalized blocks.

use tmpop_types::error::EvidenceError;
use tmpop_types::tendermint::{Block, ValidatorSet};

/// The engine endpoints evidence construction calls back into.
///
/// Calls are blocking and run under the engine client's own timeout policy.
/// A failure only delays evidence for the affected height.
pub trait BlockSource: Send + Sync {
    /// Returns the finalized block at `height`, including the precommits for
    /// `height - 1` in its last commit.
    fn block(&self, height: u64) -> Result<Block, EvidenceError>;

    /// Returns the validator set that signed `height`.
    fn validators(&self, height: u64) -> Result<ValidatorSet, EvidenceError>;
}
