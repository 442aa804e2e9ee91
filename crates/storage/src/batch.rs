// Path: crates/storage/src/batch.rs

//! A pending-write overlay over any `Adapter`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tmpop_api::storage::{Adapter, Batch, LinkReader};
use tmpop_types::error::StoreError;
use tmpop_types::link::{
    compare_segments, Link, MapFilter, PaginatedSegments, Pagination, Segment, SegmentFilter,
};
use tmpop_types::LinkHash;

/// An in-memory overlay of created links on top of a base store.
///
/// Reads check the pending links first and fall through to `base`. Nothing
/// reaches `base` until `write`, which replays the links in creation order.
pub struct BufferedBatch {
    base: Arc<dyn Adapter>,
    pending: BTreeMap<LinkHash, Link>,
    order: Vec<LinkHash>,
}

impl BufferedBatch {
    /// Opens an empty overlay on `base`.
    pub fn new(base: Arc<dyn Adapter>) -> Self {
        Self {
            base,
            pending: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    /// Number of links created in this batch.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no link was created in this batch.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // The base window must cover everything the merged page could need.
    fn widened(pagination: Pagination) -> Pagination {
        Pagination {
            offset: 0,
            limit: pagination.offset.saturating_add(pagination.limit),
        }
    }
}

impl LinkReader for BufferedBatch {
    fn get_segment(&self, link_hash: &LinkHash) -> Result<Option<Segment>, StoreError> {
        if let Some(link) = self.pending.get(link_hash) {
            return Ok(Some(link.segmentify()?));
        }
        self.base.get_segment(link_hash)
    }

    fn find_segments(&self, filter: &SegmentFilter) -> Result<PaginatedSegments, StoreError> {
        let mut base_filter = filter.clone();
        base_filter.pagination = Self::widened(filter.pagination);
        let base = self.base.find_segments(&base_filter)?;

        let mut added = 0;
        let mut segments = base.segments;
        for link in self.pending.values() {
            let segment = link.segmentify()?;
            if !filter.matches(&segment) {
                continue;
            }
            // A link both pending and stored is counted once.
            if self.base.get_segment(&segment.meta.link_hash)?.is_some() {
                continue;
            }
            added += 1;
            segments.push(segment);
        }
        segments.sort_by(compare_segments);
        Ok(PaginatedSegments {
            segments: filter.pagination.paginate(segments),
            total_count: base.total_count + added,
        })
    }

    fn get_map_ids(&self, filter: &MapFilter) -> Result<Vec<String>, StoreError> {
        let mut base_filter = filter.clone();
        base_filter.pagination = Self::widened(filter.pagination);
        let mut ids: BTreeSet<String> = self.base.get_map_ids(&base_filter)?.into_iter().collect();
        ids.extend(
            self.pending
                .values()
                .filter(|l| filter.matches(l))
                .map(|l| l.meta.map_id.clone()),
        );
        Ok(filter.pagination.paginate(ids.into_iter().collect()))
    }
}

impl Batch for BufferedBatch {
    fn create_link(&mut self, link: &Link) -> Result<LinkHash, StoreError> {
        let hash = link.hash()?;
        if self.pending.insert(hash, link.clone()).is_none() {
            self.order.push(hash);
        }
        Ok(hash)
    }

    fn write(self: Box<Self>) -> Result<(), StoreError> {
        let BufferedBatch {
            base,
            mut pending,
            order,
        } = *self;
        let total = order.len();
        for (written, hash) in order.iter().enumerate() {
            let Some(link) = pending.remove(hash) else {
                continue;
            };
            if let Err(e) = base.create_link(&link) {
                tracing::error!(
                    target: "storage",
                    written,
                    total,
                    error = %e,
                    "batch write aborted"
                );
                return Err(e);
            }
        }
        tracing::debug!(target: "storage", total, "batch written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde_json::json;

    fn store_with(maps: &[&str]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for m in maps {
            store.create_link(&Link::new("p", *m, json!(m))).unwrap();
        }
        store
    }

    #[test]
    fn pending_links_are_readable_before_write() {
        let store = store_with(&[]);
        let mut batch = BufferedBatch::new(store.clone());
        let link = Link::new("p", "m", json!(1));
        let hash = batch.create_link(&link).unwrap();

        assert!(batch.get_segment(&hash).unwrap().is_some());
        assert!(store.get_segment(&hash).unwrap().is_none());

        Box::new(batch).write().unwrap();
        assert!(store.get_segment(&hash).unwrap().is_some());
    }

    #[test]
    fn find_merges_pending_and_base() {
        let store = store_with(&["a", "b"]);
        let mut batch = BufferedBatch::new(store.clone());
        let mut top = Link::new("p", "c", json!(3));
        top.meta.priority = 10.0;
        batch.create_link(&top).unwrap();
        // Already stored: must not be double counted.
        batch.create_link(&Link::new("p", "a", json!("a"))).unwrap();

        let page = batch
            .find_segments(&SegmentFilter {
                pagination: Pagination { offset: 0, limit: 2 },
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.segments.len(), 2);
        assert_eq!(page.segments[0].link, top);
    }

    #[test]
    fn map_ids_include_pending() {
        let store = store_with(&["b"]);
        let mut batch = BufferedBatch::new(store);
        batch.create_link(&Link::new("p", "a", json!(null))).unwrap();
        assert_eq!(
            batch.get_map_ids(&MapFilter::default()).unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn write_preserves_creation_order_and_dedups() {
        let store = store_with(&[]);
        let mut batch = BufferedBatch::new(store.clone());
        let l1 = Link::new("p", "m", json!(1));
        let l2 = Link::new("p", "m", json!(2));
        batch.create_link(&l1).unwrap();
        batch.create_link(&l2).unwrap();
        batch.create_link(&l1).unwrap();
        assert_eq!(batch.len(), 2);
        Box::new(batch).write().unwrap();
        assert_eq!(store.len().unwrap(), 2);
    }
}
