// Path: crates/consensus/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]
//! # TMPop Consensus Evidence
//!
//! Turns the consensus engine's finality into portable inclusion proofs.
//!
//! `EvidenceBuilder` assembles a `TendermintProof` for every link committed at
//! a height once the two following blocks are final. `VerifyEvidence` checks
//! such a proof offline: hash chain, merkle path, validator-set integrity and
//! a BFT supermajority of valid precommits on both headers.

pub mod builder;
pub mod proof;

pub use builder::{EvidenceBuilder, PendingHeight};
pub use proof::VerifyEvidence;
