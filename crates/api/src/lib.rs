// Path: crates/api/src/lib.rs

//! # TMPop API Crate Lints
//!
//! This crate enforces a strict set of lints to ensure panic-free code.
//! Panics are disallowed in non-test code to promote robust error handling.
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
//! # TMPop API
//!
//! Core traits and interfaces for TMPop. This crate defines the stable
//! contract between the ABCI application and its collaborators: the storage
//! adapter, the content ruleset and the consensus engine.

/// ABCI-style request/response types and the `Application` trait.
pub mod abci;
/// The `BlockSource` trait the application calls back into the engine with.
pub mod consensus;
/// Re-exports all core error types from the central `tmpop-types` crate.
pub mod error;
/// The storage contract: `LinkReader`, `Adapter`, `Batch` and `KeyValueStore`.
pub mod storage;
/// The hot-swappable content ruleset contract.
pub mod validation;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::abci::Application;
    pub use crate::consensus::BlockSource;
    pub use crate::error::{ErrorCode, FatalError, LinkError, StateError, StoreError};
    pub use crate::storage::{Adapter, Batch, KeyValueStore, LinkReader};
    pub use crate::validation::{LinkValidator, RulesetUpdate, ValidatorSource};
}
