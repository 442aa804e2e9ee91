// Path: crates/types/src/link.rs

//! Links, segments and the store's query filters.
//!
//! A `Link` is immutable once hashed: any field change produces a different
//! `LinkHash`. Segments are the store's view of a link, carrying the evidences
//! accumulated for it after it was committed.

use crate::codec;
use crate::error::LinkError;
use crate::evidence::Evidence;
use crate::hash::{sha256, LinkHash};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The link format version written by this crate.
pub const LINK_VERSION: &str = "1.0.0";

/// Default page size for segment and map-id queries.
pub const DEFAULT_LIMIT: usize = 20;
/// Upper bound on the page size a query may request.
pub const MAX_LIMIT: usize = 200;

/// An immutable, content-addressed application record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Link {
    /// The link format version.
    pub version: String,
    /// The opaque application payload.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Metadata the store indexes and the ruleset validates.
    pub meta: LinkMeta,
}

/// Indexed metadata attached to every link.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct LinkMeta {
    /// The process this link belongs to.
    pub process: String,
    /// The map (process instance) this link belongs to.
    pub map_id: String,
    /// The application-defined link type (e.g. `init`, `update`).
    #[serde(rename = "type", default)]
    pub link_type: String,
    /// The parent link, if any. Must resolve to an existing link before acceptance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_link_hash: Option<LinkHash>,
    /// Ordering hint used when listing segments (higher first).
    #[serde(default)]
    pub priority: f64,
    /// Free-form tags used for filtering.
    #[serde(default)]
    pub tags: Vec<String>,
    /// References to other links, possibly in other processes.
    #[serde(default)]
    pub refs: Vec<LinkReference>,
    /// Maximum number of children this link accepts, if the creator declared one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_degree: Option<u32>,
}

/// A reference from one link to another.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    /// The referenced link.
    pub link_hash: LinkHash,
    /// The process of the referenced link.
    pub process: String,
}

impl Link {
    /// Creates a link with default metadata for the given process and map.
    pub fn new(process: impl Into<String>, map_id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            version: LINK_VERSION.to_string(),
            data,
            meta: LinkMeta {
                process: process.into(),
                map_id: map_id.into(),
                ..LinkMeta::default()
            },
        }
    }

    /// Computes the content address of the link.
    pub fn hash(&self) -> Result<LinkHash, LinkError> {
        let bytes = codec::to_canonical_json(self).map_err(LinkError::Encode)?;
        Ok(LinkHash(sha256(&bytes)))
    }

    /// Checks the fields that can be validated without reading the store.
    pub fn check_fields(&self) -> Result<(), LinkError> {
        if self.version.is_empty() {
            return Err(LinkError::MissingField("version"));
        }
        if self.meta.process.is_empty() {
            return Err(LinkError::MissingField("meta.process"));
        }
        if self.meta.map_id.is_empty() {
            return Err(LinkError::MissingField("meta.map_id"));
        }
        if self.meta.refs.iter().any(|r| r.process.is_empty()) {
            return Err(LinkError::MissingField("meta.refs.process"));
        }
        Ok(())
    }

    /// Wraps the link into a segment with no evidence.
    pub fn segmentify(&self) -> Result<Segment, LinkError> {
        Ok(Segment {
            link: self.clone(),
            meta: SegmentMeta {
                link_hash: self.hash()?,
                evidences: Vec::new(),
            },
        })
    }
}

/// A link together with its hash and accumulated evidences.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Segment {
    /// The stored link.
    pub link: Link,
    /// Store-maintained metadata.
    pub meta: SegmentMeta,
}

/// Store-maintained segment metadata.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SegmentMeta {
    /// The hash of `link`.
    pub link_hash: LinkHash,
    /// Evidences proving the link's inclusion, in insertion order.
    #[serde(default)]
    pub evidences: Vec<Evidence>,
}

impl Segment {
    /// The hash of the wrapped link.
    pub fn link_hash(&self) -> LinkHash {
        self.meta.link_hash
    }
}

/// Orders segments by descending priority, then ascending link hash.
pub fn compare_segments(a: &Segment, b: &Segment) -> Ordering {
    b.link
        .meta
        .priority
        .total_cmp(&a.link.meta.priority)
        .then_with(|| a.meta.link_hash.cmp(&b.meta.link_hash))
}

/// Offset/limit pagination shared by all list queries.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of matching items to skip.
    #[serde(default)]
    pub offset: usize,
    /// Maximum number of items to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Applies the window to an already sorted list.
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }

    /// Caps the limit at `MAX_LIMIT`. Applied to every externally supplied filter.
    pub fn clamped(self) -> Self {
        Self {
            offset: self.offset,
            limit: self.limit.min(MAX_LIMIT),
        }
    }
}

/// Filter for `FindSegments`. Empty fields match everything.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SegmentFilter {
    /// Result window.
    #[serde(default)]
    pub pagination: Pagination,
    /// Match any of these maps.
    #[serde(default)]
    pub map_ids: Vec<String>,
    /// Match this process only.
    #[serde(default)]
    pub process: Option<String>,
    /// Match any of these link hashes.
    #[serde(default)]
    pub link_hashes: Vec<LinkHash>,
    /// Match children of this link only.
    #[serde(default)]
    pub prev_link_hash: Option<LinkHash>,
    /// Match links carrying all of these tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SegmentFilter {
    /// Reports whether a segment satisfies every non-empty criterion.
    pub fn matches(&self, segment: &Segment) -> bool {
        let meta = &segment.link.meta;
        if !self.map_ids.is_empty() && !self.map_ids.contains(&meta.map_id) {
            return false;
        }
        if let Some(process) = &self.process {
            if &meta.process != process {
                return false;
            }
        }
        if !self.link_hashes.is_empty() && !self.link_hashes.contains(&segment.meta.link_hash) {
            return false;
        }
        if let Some(prev) = &self.prev_link_hash {
            if meta.prev_link_hash.as_ref() != Some(prev) {
                return false;
            }
        }
        self.tags.iter().all(|t| meta.tags.contains(t))
    }
}

/// Filter for `GetMapIDs`. Empty fields match everything.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MapFilter {
    /// Result window.
    #[serde(default)]
    pub pagination: Pagination,
    /// Match maps of this process only.
    #[serde(default)]
    pub process: Option<String>,
    /// Match map ids starting with this prefix.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Match map ids ending with this suffix.
    #[serde(default)]
    pub suffix: Option<String>,
}

impl MapFilter {
    /// Reports whether a link's map satisfies every non-empty criterion.
    pub fn matches(&self, link: &Link) -> bool {
        let meta = &link.meta;
        if let Some(process) = &self.process {
            if &meta.process != process {
                return false;
            }
        }
        if let Some(prefix) = &self.prefix {
            if !meta.map_id.starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(suffix) = &self.suffix {
            if !meta.map_id.ends_with(suffix.as_str()) {
                return false;
            }
        }
        true
    }
}

/// One page of `FindSegments` results.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PaginatedSegments {
    /// The segments in the requested window.
    pub segments: Vec<Segment>,
    /// Number of segments matching the filter, ignoring pagination.
    pub total_count: usize,
}
