// Path: crates/api/src/storage/mod.rs

//! API for the link store consumed by the application.
//!
//! The contract is split by capability. `LinkReader` is the read side shared
//! by the store and its batches. `Adapter` adds durable writes and evidence
//! handling. `Batch` is the pending-write overlay the dual-batch state is
//! built from. `KeyValueStore` backs the application's own bookkeeping
//! (the persisted `LastBlock`).

use std::sync::Arc;
use tmpop_types::error::StoreError;
use tmpop_types::evidence::Evidence;
use tmpop_types::link::{Link, MapFilter, PaginatedSegments, Segment, SegmentFilter};
use tmpop_types::LinkHash;

/// Read access to segments.
pub trait LinkReader: Send + Sync {
    /// Returns the segment for a link hash, if it exists.
    fn get_segment(&self, link_hash: &LinkHash) -> Result<Option<Segment>, StoreError>;

    /// Returns one page of segments matching `filter`, sorted by descending
    /// priority then link hash.
    fn find_segments(&self, filter: &SegmentFilter) -> Result<PaginatedSegments, StoreError>;

    /// Returns one page of distinct map ids matching `filter`, sorted ascending.
    fn get_map_ids(&self, filter: &MapFilter) -> Result<Vec<String>, StoreError>;
}

/// The durable link store.
///
/// Implementations must be safe to read from query threads while the
/// consensus thread writes, hence `Send + Sync` and `&self` receivers.
pub trait Adapter: LinkReader {
    /// Describes the adapter for the `GetInfo` query.
    fn info(&self) -> Result<serde_json::Value, StoreError>;

    /// Stores a link and returns its hash. Storing an existing link is a no-op.
    fn create_link(&self, link: &Link) -> Result<LinkHash, StoreError>;

    /// Attaches evidence to a link. Evidence from the same backend and
    /// provider replaces the previous one.
    fn add_evidence(&self, link_hash: &LinkHash, evidence: &Evidence) -> Result<(), StoreError>;

    /// Returns every evidence attached to a link.
    fn get_evidences(&self, link_hash: &LinkHash) -> Result<Vec<Evidence>, StoreError>;

    /// Opens a pending-write batch reading through to this store.
    fn new_batch(self: Arc<Self>) -> Result<Box<dyn Batch>, StoreError>;
}

/// A pending-write overlay over a store.
///
/// Links created in the batch are visible to the batch's own reads
/// immediately and to nobody else until `write` succeeds.
pub trait Batch: LinkReader {
    /// Records a link in the batch and returns its hash.
    fn create_link(&mut self, link: &Link) -> Result<LinkHash, StoreError>;

    /// Flushes the recorded links to the underlying store, in creation order.
    /// Stops at the first failing write.
    fn write(self: Box<Self>) -> Result<(), StoreError>;
}

/// A minimal durable key/value store.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    fn get_value(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Writes a value. Must be durable when this returns `Ok`.
    fn set_value(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Deletes a value and returns the previous one.
    fn delete_value(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
}
