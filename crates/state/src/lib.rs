// Path: crates/state/src/lib.rs
//! # TMPop State Crate Lints
//!
//! This crate enforces a strict set of lints to ensure panic-free code.
//! Panics are disallowed in non-test code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
//! # TMPop State
//!
//! The staged-commit link state. `State` owns two independent batches over
//! the same store: the *checked* batch answers mempool admission and the
//! *delivered* batch accumulates the block being executed. Only the delivered
//! batch is ever flushed, at Commit, together with the AppHash that commits
//! to it.

pub mod app_hash;
pub mod batch;
pub mod state;

pub use app_hash::{compute_app_hash, merkle_root};
pub use batch::LinkBatch;
pub use state::{Committed, State};
