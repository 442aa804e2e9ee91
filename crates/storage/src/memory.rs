// Path: crates/storage/src/memory.rs

//! An in-process link store.

use crate::batch::BufferedBatch;
use crate::poisoned;
use ahash::AHashMap;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};
use tmpop_api::storage::{Adapter, Batch, KeyValueStore, LinkReader};
use tmpop_types::error::StoreError;
use tmpop_types::evidence::Evidence;
use tmpop_types::link::{
    compare_segments, Link, MapFilter, PaginatedSegments, Segment, SegmentFilter, SegmentMeta,
};
use tmpop_types::LinkHash;

#[derive(Default)]
struct Inner {
    // BTreeMap keeps scans in hash order, independent of insertion history.
    links: BTreeMap<LinkHash, Link>,
    evidences: AHashMap<LinkHash, Vec<Evidence>>,
    values: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl Inner {
    fn segment(&self, link_hash: &LinkHash, link: &Link) -> Segment {
        Segment {
            link: link.clone(),
            meta: SegmentMeta {
                link_hash: *link_hash,
                evidences: self.evidences.get(link_hash).cloned().unwrap_or_default(),
            },
        }
    }
}

/// A link store held entirely in memory.
///
/// Readers and the single writer share one `RwLock`; every call takes the
/// lock for its own duration only.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().map_err(poisoned)?.links.len())
    }

    /// Whether the store holds no link.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl LinkReader for MemoryStore {
    fn get_segment(&self, link_hash: &LinkHash) -> Result<Option<Segment>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .links
            .get(link_hash)
            .map(|link| inner.segment(link_hash, link)))
    }

    fn find_segments(&self, filter: &SegmentFilter) -> Result<PaginatedSegments, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut segments: Vec<Segment> = inner
            .links
            .iter()
            .map(|(hash, link)| inner.segment(hash, link))
            .filter(|s| filter.matches(s))
            .collect();
        segments.sort_by(compare_segments);
        let total_count = segments.len();
        Ok(PaginatedSegments {
            segments: filter.pagination.paginate(segments),
            total_count,
        })
    }

    fn get_map_ids(&self, filter: &MapFilter) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        let ids: BTreeSet<&str> = inner
            .links
            .values()
            .filter(|l| filter.matches(l))
            .map(|l| l.meta.map_id.as_str())
            .collect();
        Ok(filter
            .pagination
            .paginate(ids.into_iter().map(str::to_string).collect()))
    }
}

impl Adapter for MemoryStore {
    fn info(&self) -> Result<serde_json::Value, StoreError> {
        Ok(json!({
            "name": "memory",
            "description": "In-memory link store",
            "version": env!("CARGO_PKG_VERSION"),
        }))
    }

    fn create_link(&self, link: &Link) -> Result<LinkHash, StoreError> {
        let hash = link.hash()?;
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.links.entry(hash).or_insert_with(|| link.clone());
        Ok(hash)
    }

    fn add_evidence(&self, link_hash: &LinkHash, evidence: &Evidence) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let list = inner.evidences.entry(*link_hash).or_default();
        match list.iter_mut().find(|e| e.same_origin(evidence)) {
            Some(existing) => *existing = evidence.clone(),
            None => list.push(evidence.clone()),
        }
        Ok(())
    }

    fn get_evidences(&self, link_hash: &LinkHash) -> Result<Vec<Evidence>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.evidences.get(link_hash).cloned().unwrap_or_default())
    }

    fn new_batch(self: Arc<Self>) -> Result<Box<dyn Batch>, StoreError> {
        Ok(Box::new(BufferedBatch::new(self)))
    }
}

impl KeyValueStore for MemoryStore {
    fn get_value(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.read().map_err(poisoned)?.values.get(key).cloned())
    }

    fn set_value(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.inner
            .write()
            .map_err(poisoned)?
            .values
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete_value(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.write().map_err(poisoned)?.values.remove(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmpop_types::evidence::TendermintProof;
    use tmpop_types::link::Pagination;

    fn link(map: &str, priority: f64) -> Link {
        let mut l = Link::new("proc", map, json!({"p": priority}));
        l.meta.priority = priority;
        l
    }

    #[test]
    fn create_is_idempotent() {
        let store = MemoryStore::new();
        let l = link("m", 1.0);
        let a = store.create_link(&l).unwrap();
        let b = store.create_link(&l).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get_segment(&a).unwrap().unwrap().link, l);
    }

    #[test]
    fn find_sorts_by_priority_and_pages() {
        let store = MemoryStore::new();
        for p in [1.0, 3.0, 2.0] {
            store.create_link(&link("m", p)).unwrap();
        }
        let page = store
            .find_segments(&SegmentFilter {
                pagination: Pagination { offset: 1, limit: 1 },
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.segments.len(), 1);
        assert_eq!(page.segments[0].link.meta.priority, 2.0);
    }

    #[test]
    fn map_ids_are_distinct_and_sorted() {
        let store = MemoryStore::new();
        for (m, p) in [("b", 1.0), ("a", 2.0), ("b", 3.0)] {
            store.create_link(&link(m, p)).unwrap();
        }
        let ids = store.get_map_ids(&MapFilter::default()).unwrap();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn evidence_from_same_origin_is_replaced() {
        let store = MemoryStore::new();
        let hash = store.create_link(&link("m", 0.0)).unwrap();
        let first = Evidence::tendermint("chain", TendermintProof::default());
        let mut second = first.clone();
        second.proof.block_height = 9;
        let other = Evidence::tendermint("other-chain", TendermintProof::default());

        store.add_evidence(&hash, &first).unwrap();
        store.add_evidence(&hash, &other).unwrap();
        store.add_evidence(&hash, &second).unwrap();

        let evidences = store.get_evidences(&hash).unwrap();
        assert_eq!(evidences, vec![second, other]);
        assert_eq!(store.get_segment(&hash).unwrap().unwrap().meta.evidences.len(), 2);
    }

    #[test]
    fn key_value_area() {
        let store = MemoryStore::new();
        assert_eq!(store.get_value(b"k").unwrap(), None);
        store.set_value(b"k", b"v1").unwrap();
        store.set_value(b"k", b"v2").unwrap();
        assert_eq!(store.get_value(b"k").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(store.delete_value(b"k").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(store.get_value(b"k").unwrap(), None);
    }
}
