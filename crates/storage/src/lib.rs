// Path: crates/storage/src/lib.rs
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

//! Storage backends for TMPop.
//!
//! `MemoryStore` is a complete in-process link store (segments, evidences and
//! a key/value area). `BufferedBatch` is the pending-write overlay handed out
//! by `Adapter::new_batch`. `RedbKvStore` persists the application's own
//! bookkeeping on disk with redb.

pub mod batch;
pub mod memory;
pub mod redb_kv_store;

pub use batch::BufferedBatch;
pub use memory::MemoryStore;
pub use redb_kv_store::RedbKvStore;

use tmpop_types::error::StoreError;

pub(crate) fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("store lock poisoned".to_string())
}
