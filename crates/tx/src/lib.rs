// Path: crates/tx/src/lib.rs
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

//! Transactions carried in blocks and submitted to the mempool.
//!
//! On the wire a transaction is a JSON envelope `{type, link, linkhash}`.
//! `type` selects a decoder from a dispatch table, so adding a variant means
//! adding one enum case and one table row.

pub mod transaction;

pub use transaction::{decode, encode, Transaction, TxType};
