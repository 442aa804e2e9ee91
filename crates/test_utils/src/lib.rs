// Path: crates/test_utils/src/lib.rs
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

//! # TMPop Test Utilities
//!
//! A simulated consensus engine (`TestChain`), link fixtures and a failing
//! link store shared by the workspace's tests.

pub mod chain;
pub mod fixtures;
pub mod store;

pub use chain::TestChain;
pub use fixtures::LinkBuilder;
pub use store::FailingStore;
