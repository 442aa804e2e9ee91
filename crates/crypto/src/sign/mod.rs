// Path: crates/crypto/src/sign/mod.rs
//! Digital signatures used by consensus votes.

pub mod eddsa;
