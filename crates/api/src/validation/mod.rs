// Path: crates/api/src/validation/mod.rs

//! The pluggable content ruleset.
//!
//! Not to be confused with the consensus engine's validator set: a
//! `LinkValidator` decides whether a link is acceptable content, and its hash
//! is folded into every AppHash so the active governance rules are provable.

use crate::storage::LinkReader;
use std::fmt::Debug;
use std::sync::Arc;
use tmpop_types::error::LinkError;
use tmpop_types::link::Link;

/// A content ruleset applied to every link before it enters a batch.
pub trait LinkValidator: Debug + Send + Sync {
    /// Accepts or rejects a link. `reader` sees the batch the link is being
    /// added to, including its pending links.
    ///
    /// Must be deterministic: every replica evaluates the same link against
    /// the same ruleset and has to reach the same outcome.
    fn validate(&self, reader: &dyn LinkReader, link: &Link) -> Result<(), LinkError>;

    /// A digest identifying this ruleset.
    fn hash(&self) -> [u8; 32];
}

/// Outcome of polling a `ValidatorSource`.
#[derive(Debug, Clone)]
pub enum RulesetUpdate {
    /// The active ruleset is still current.
    Unchanged,
    /// A new ruleset replaces the active one.
    Set(Arc<dyn LinkValidator>),
    /// No ruleset is active anymore.
    Cleared,
}

/// A source of ruleset updates, polled by the application at BeginBlock only.
pub trait ValidatorSource: Send {
    /// Returns the update since the previous poll.
    fn poll(&mut self) -> RulesetUpdate;
}
