// Path: crates/abci/src/rules/mod.rs

//! The process ruleset: which link types each process accepts.
//!
//! A rules document is a JSON object mapping a process name to its allowed
//! link types:
//!
//! ```json
//! { "auction": ["init", "bid", "close"], "notes": [] }
//! ```
//!
//! An empty list allows any type. A process missing from the document is
//! rejected outright.

mod source;

pub use source::{channel, ChannelValidatorSource, RulesFileSource};

use std::collections::BTreeMap;
use std::path::Path;
use tmpop_api::storage::LinkReader;
use tmpop_api::validation::LinkValidator;
use tmpop_crypto::algorithms::hash::sha256;
use tmpop_types::error::{ConfigError, LinkError};
use tmpop_types::link::Link;

/// A `LinkValidator` restricting link types per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRules {
    rules: BTreeMap<String, Vec<String>>,
    hash: [u8; 32],
}

impl ProcessRules {
    /// Builds the ruleset from a process to types mapping.
    pub fn new(rules: BTreeMap<String, Vec<String>>) -> Result<Self, ConfigError> {
        // BTreeMap keys serialize sorted, which makes this the canonical form.
        let canonical = serde_json::to_vec(&rules)?;
        Ok(Self {
            hash: sha256(&canonical),
            rules,
        })
    }

    /// Parses a JSON rules document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        Self::new(serde_json::from_slice(bytes)?)
    }

    /// Reads and parses a JSON rules file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&bytes)
    }

    /// The processes this ruleset knows about.
    pub fn processes(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

impl LinkValidator for ProcessRules {
    fn validate(&self, _reader: &dyn LinkReader, link: &Link) -> Result<(), LinkError> {
        let meta = &link.meta;
        let Some(types) = self.rules.get(&meta.process) else {
            return Err(LinkError::Validation(format!(
                "process '{}' is not governed by the active rules",
                meta.process
            )));
        };
        if types.is_empty() || types.contains(&meta.link_type) {
            Ok(())
        } else {
            Err(LinkError::Validation(format!(
                "type '{}' is not allowed in process '{}'",
                meta.link_type, meta.process
            )))
        }
    }

    fn hash(&self) -> [u8; 32] {
        self.hash
    }
}
