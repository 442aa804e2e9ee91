// Path: crates/state/src/state.rs

use crate::app_hash::compute_app_hash;
use crate::batch::LinkBatch;
use std::sync::Arc;
use tmpop_api::storage::{Adapter, LinkReader};
use tmpop_api::validation::LinkValidator;
use tmpop_types::error::{LinkError, StateError, StoreError};
use tmpop_types::link::Link;
use tmpop_types::LinkHash;

/// The result of a successful `State::commit`.
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
    /// The new AppHash.
    pub app_hash: Vec<u8>,
    /// The ruleset hash folded into `app_hash`; empty if no ruleset was active.
    pub ruleset_hash: Vec<u8>,
    /// The flushed links, in delivery order.
    pub links: Vec<Link>,
    /// Hashes of `links`, the merkle leaves of this block.
    pub link_hashes: Vec<LinkHash>,
}

/// The dual-batch link state.
///
/// Owned by a single caller and driven sequentially; nothing here locks.
pub struct State {
    store: Arc<dyn Adapter>,
    checked: LinkBatch,
    delivered: LinkBatch,
    validator: Option<Arc<dyn LinkValidator>>,
    previous_app_hash: Vec<u8>,
    committed_ruleset_hash: Vec<u8>,
}

impl State {
    /// Opens the state on `store`, resuming after a commit that produced
    /// `last_app_hash` with the ruleset hash `last_ruleset_hash`.
    ///
    /// No ruleset is active until `set_validator` is called.
    pub fn new(
        store: Arc<dyn Adapter>,
        last_app_hash: Vec<u8>,
        last_ruleset_hash: Vec<u8>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            checked: LinkBatch::open(store.clone())?,
            delivered: LinkBatch::open(store.clone())?,
            store,
            validator: None,
            previous_app_hash: last_app_hash,
            committed_ruleset_hash: last_ruleset_hash,
        })
    }

    /// Admits a link into the mempool view. Never reaches the store.
    pub fn check(&mut self, link: &Link) -> Result<LinkHash, StateError> {
        admit(&mut self.checked, self.validator.as_deref(), link)
    }

    /// Executes a link as part of the current block.
    pub fn deliver(&mut self, link: &Link) -> Result<LinkHash, StateError> {
        let hash = admit(&mut self.delivered, self.validator.as_deref(), link)?;
        tracing::debug!(target: "state", link_hash = %hash, "link delivered");
        Ok(hash)
    }

    /// Computes the AppHash, flushes the delivered links and resets both
    /// batches.
    ///
    /// A flush error leaves the store partially written and must be treated
    /// as fatal by the caller.
    pub fn commit(&mut self) -> Result<Committed, StateError> {
        let ruleset_hash = self.ruleset_hash();
        let app_hash = if self.delivered.link_hashes().is_empty()
            && ruleset_hash == self.committed_ruleset_hash
        {
            self.previous_app_hash.clone()
        } else {
            compute_app_hash(
                &self.previous_app_hash,
                &ruleset_hash,
                self.delivered.link_hashes(),
            )
        };

        let fresh = LinkBatch::open(self.store.clone())?;
        let delivered = std::mem::replace(&mut self.delivered, fresh);
        let total = delivered.link_hashes().len();
        let (links, link_hashes) = delivered
            .write()
            .map_err(|source| StateError::Flush { total, source })?;
        self.checked = LinkBatch::open(self.store.clone())?;

        self.previous_app_hash = app_hash.clone();
        self.committed_ruleset_hash = ruleset_hash.clone();
        tracing::info!(
            target: "state",
            links = total,
            app_hash = %hex::encode(&app_hash),
            "state committed"
        );
        Ok(Committed {
            app_hash,
            ruleset_hash,
            links,
            link_hashes,
        })
    }

    /// Replaces or clears the active ruleset. Takes effect for the next link.
    pub fn set_validator(&mut self, validator: Option<Arc<dyn LinkValidator>>) {
        self.validator = validator;
    }

    /// The active ruleset, if any.
    pub fn validator(&self) -> Option<&Arc<dyn LinkValidator>> {
        self.validator.as_ref()
    }

    /// Hash of the active ruleset; empty if none.
    pub fn ruleset_hash(&self) -> Vec<u8> {
        ruleset_hash_of(self.validator.as_deref())
    }

    /// Sets the AppHash the next Commit chains from.
    pub fn set_previous_app_hash(&mut self, app_hash: Vec<u8>) {
        self.previous_app_hash = app_hash;
    }

    /// The AppHash the next Commit chains from.
    pub fn previous_app_hash(&self) -> &[u8] {
        &self.previous_app_hash
    }

    /// Read access to the pending delivered batch.
    pub fn delivered(&self) -> &LinkBatch {
        &self.delivered
    }

    /// Read access to the pending checked batch.
    pub fn checked(&self) -> &LinkBatch {
        &self.checked
    }
}

fn ruleset_hash_of(validator: Option<&dyn LinkValidator>) -> Vec<u8> {
    validator.map(|v| v.hash().to_vec()).unwrap_or_default()
}

/// Runs the admission pipeline against `batch` and records the link on success.
fn admit(
    batch: &mut LinkBatch,
    validator: Option<&dyn LinkValidator>,
    link: &Link,
) -> Result<LinkHash, StateError> {
    if link.meta.out_degree.is_some() {
        return Err(LinkError::OutDegreeUnsupported.into());
    }
    link.check_fields()?;
    check_structure(&*batch, link)?;
    if let Some(validator) = validator {
        validator.validate(&*batch, link)?;
    }
    Ok(batch.create_link(link)?)
}

fn check_structure(reader: &dyn LinkReader, link: &Link) -> Result<(), StateError> {
    if let Some(prev) = &link.meta.prev_link_hash {
        let parent = reader
            .get_segment(prev)?
            .ok_or(LinkError::ParentNotFound(*prev))?;
        if parent.link.meta.map_id != link.meta.map_id {
            return Err(LinkError::ParentMapMismatch {
                parent: parent.link.meta.map_id,
                link: link.meta.map_id.clone(),
            }
            .into());
        }
    }
    for reference in &link.meta.refs {
        let target = reader
            .get_segment(&reference.link_hash)?
            .ok_or(LinkError::RefNotFound(reference.link_hash))?;
        if target.link.meta.process != reference.process {
            return Err(LinkError::RefProcessMismatch(reference.link_hash).into());
        }
    }
    Ok(())
}
