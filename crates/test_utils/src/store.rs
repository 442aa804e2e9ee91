// Path: crates/test_utils/src/store.rs

//! A link store that fails on demand.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tmpop_api::storage::{Adapter, Batch, LinkReader};
use tmpop_storage::{BufferedBatch, MemoryStore};
use tmpop_types::error::StoreError;
use tmpop_types::evidence::Evidence;
use tmpop_types::link::{Link, MapFilter, PaginatedSegments, Segment, SegmentFilter};
use tmpop_types::LinkHash;

/// A `MemoryStore` whose `fail_at`-th `create_link` call (1-based) fails.
///
/// Batches opened on it replay through `create_link`, so the failure also
/// interrupts a batch flush part way.
pub struct FailingStore {
    inner: MemoryStore,
    fail_at: usize,
    attempts: AtomicUsize,
}

impl FailingStore {
    /// A store failing on the `fail_at`-th write.
    pub fn new(fail_at: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_at,
            attempts: AtomicUsize::new(0),
        }
    }

    /// Number of `create_link` calls made so far, including the failed one.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// The wrapped store, holding only the successful writes.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl LinkReader for FailingStore {
    fn get_segment(&self, link_hash: &LinkHash) -> Result<Option<Segment>, StoreError> {
        self.inner.get_segment(link_hash)
    }

    fn find_segments(&self, filter: &SegmentFilter) -> Result<PaginatedSegments, StoreError> {
        self.inner.find_segments(filter)
    }

    fn get_map_ids(&self, filter: &MapFilter) -> Result<Vec<String>, StoreError> {
        self.inner.get_map_ids(filter)
    }
}

impl Adapter for FailingStore {
    fn info(&self) -> Result<serde_json::Value, StoreError> {
        self.inner.info()
    }

    fn create_link(&self, link: &Link) -> Result<LinkHash, StoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        if attempt == self.fail_at {
            return Err(StoreError::Backend(format!("write {} refused", attempt)));
        }
        self.inner.create_link(link)
    }

    fn add_evidence(&self, link_hash: &LinkHash, evidence: &Evidence) -> Result<(), StoreError> {
        self.inner.add_evidence(link_hash, evidence)
    }

    fn get_evidences(&self, link_hash: &LinkHash) -> Result<Vec<Evidence>, StoreError> {
        self.inner.get_evidences(link_hash)
    }

    fn new_batch(self: Arc<Self>) -> Result<Box<dyn Batch>, StoreError> {
        Ok(Box::new(BufferedBatch::new(self)))
    }
}
