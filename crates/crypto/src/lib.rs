// Path: crates/crypto/src/lib.rs
//! # TMPop Crypto Crate Lints
//!
//! This crate enforces a strict set of lints to ensure panic-free code.
//! Evidence verification runs on adversarial input, so nothing here may
//! panic or index unchecked.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
//! # TMPop Cryptography
//!
//! SHA-256 hashing, ed25519 vote signatures and the binary merkle tree the
//! AppHash and inclusion proofs are built on.

pub mod algorithms;
pub mod merkle;
pub mod sign;
