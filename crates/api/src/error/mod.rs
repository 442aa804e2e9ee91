// Path: crates/api/src/error/mod.rs
//! Re-exports all core error types from the central `tmpop-types` crate.

pub use tmpop_types::error::*;
