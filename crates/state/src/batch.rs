// Path: crates/state/src/batch.rs

//! A `Batch` wrapper that remembers what was written through it.

use std::sync::Arc;
use tmpop_api::storage::{Adapter, Batch, LinkReader};
use tmpop_types::error::StoreError;
use tmpop_types::link::{Link, MapFilter, PaginatedSegments, Segment, SegmentFilter};
use tmpop_types::LinkHash;

/// A store batch that records the links created through it, in order.
///
/// The recorded hashes are the AppHash merkle leaves; the recorded links are
/// what Commit reports as saved.
pub struct LinkBatch {
    inner: Box<dyn Batch>,
    links: Vec<Link>,
    hashes: Vec<LinkHash>,
}

impl LinkBatch {
    /// Opens a fresh batch on `store`.
    pub fn open(store: Arc<dyn Adapter>) -> Result<Self, StoreError> {
        Ok(Self {
            inner: store.new_batch()?,
            links: Vec::new(),
            hashes: Vec::new(),
        })
    }

    /// Creates a link in the underlying batch and records it. A link already
    /// recorded in this batch is not recorded twice.
    pub fn create_link(&mut self, link: &Link) -> Result<LinkHash, StoreError> {
        let hash = self.inner.create_link(link)?;
        if !self.hashes.contains(&hash) {
            self.links.push(link.clone());
            self.hashes.push(hash);
        }
        Ok(hash)
    }

    /// Links created so far, in creation order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Hashes of the links created so far, in creation order.
    pub fn link_hashes(&self) -> &[LinkHash] {
        &self.hashes
    }

    /// Flushes the underlying batch and hands back the recorded links.
    pub fn write(self) -> Result<(Vec<Link>, Vec<LinkHash>), StoreError> {
        self.inner.write()?;
        Ok((self.links, self.hashes))
    }
}

impl LinkReader for LinkBatch {
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
