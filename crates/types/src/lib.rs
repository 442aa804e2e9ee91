// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]

//! # TMPop Types
//!
//! This crate is the foundational library for TMPop, containing the link and
//! segment data model, the consensus-engine value types carried inside
//! evidence, error enums and configuration objects.
//!
//! ## Architectural Role
//!
//! As the base crate, `tmpop-types` has minimal dependencies and is itself a
//! dependency for every other crate in the workspace. This prevents circular
//! dependencies and gives a single canonical definition for shared types like
//! `Link`, `Header`, `TendermintProof` and the error enums.

/// Application-level records: `LastBlock`, `Info` and store events.
pub mod app;
/// The canonical, deterministic binary codec for consensus-critical data.
pub mod codec;
/// Configuration structures loaded from TOML.
pub mod config;
/// A unified set of all error types used across the workspace.
pub mod error;
/// Evidence and `TendermintProof` value types.
pub mod evidence;
/// The `LinkHash` identifier and hex serialization helpers.
pub mod hash;
/// Links, segments and the store's query filters.
pub mod link;
/// Value types mirrored from the BFT consensus engine (headers, votes, validator sets).
pub mod tendermint;

pub use hash::LinkHash;
pub use link::{Link, LinkMeta, Segment};
