// Path: crates/test_utils/src/fixtures.rs

//! Link fixtures for reproducible tests.

use serde_json::{json, Value};
use tmpop_types::link::{Link, LinkReference};
use tmpop_types::LinkHash;

/// Builder for test links.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    link: Link,
}

impl LinkBuilder {
    /// A link in `process`/`map_id` with an empty object payload.
    pub fn new(process: &str, map_id: &str) -> Self {
        Self {
            link: Link::new(process, map_id, json!({})),
        }
    }

    /// Sets the payload.
    pub fn data(mut self, data: Value) -> Self {
        self.link.data = data;
        self
    }

    /// Sets `meta.type`.
    pub fn link_type(mut self, link_type: &str) -> Self {
        self.link.meta.link_type = link_type.to_string();
        self
    }

    /// Sets the parent link.
    pub fn parent(mut self, parent: LinkHash) -> Self {
        self.link.meta.prev_link_hash = Some(parent);
        self
    }

    /// Adds a reference to another link.
    pub fn reference(mut self, link_hash: LinkHash, process: &str) -> Self {
        self.link.meta.refs.push(LinkReference {
            link_hash,
            process: process.to_string(),
        });
        self
    }

    /// Sets the listing priority.
    pub fn priority(mut self, priority: f64) -> Self {
        self.link.meta.priority = priority;
        self
    }

    /// Adds a tag.
    pub fn tag(mut self, tag: &str) -> Self {
        self.link.meta.tags.push(tag.to_string());
        self
    }

    /// Declares an out-degree.
    pub fn out_degree(mut self, out_degree: u32) -> Self {
        self.link.meta.out_degree = Some(out_degree);
        self
    }

    /// Finishes the link.
    pub fn build(self) -> Link {
        self.link
    }
}

/// `count` distinct links in one map, distinguished by their payload.
pub fn links_in_map(process: &str, map_id: &str, count: usize) -> Vec<Link> {
    (0..count)
        .map(|i| LinkBuilder::new(process, map_id).data(json!({ "seq": i })).build())
        .collect()
}
