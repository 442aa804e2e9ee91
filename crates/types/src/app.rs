// Path: crates/types/src/app.rs

//! Application-level records shared by the ABCI application and its clients.

use crate::evidence::Evidence;
use crate::hash::{hex_bytes, LinkHash};
use crate::link::Link;
use crate::tendermint::Header;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The single key under which `LastBlock` is persisted.
pub const LAST_BLOCK_KEY: &[u8] = b"tmpop:last-block";

/// The last state this application committed, used for the engine's handshake.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct LastBlock {
    /// The AppHash returned by the last Commit. Empty at genesis.
    #[serde(with = "hex_bytes")]
    pub app_hash: Vec<u8>,
    /// The height of the last Commit. Zero at genesis.
    pub height: u64,
    /// The header received in the BeginBlock of that height.
    pub last_header: Option<Header>,
    /// The ruleset hash folded into `app_hash`. Empty if no ruleset was active.
    #[serde(with = "hex_bytes", default)]
    pub ruleset_hash: Vec<u8>,
}

/// Static description returned by the `GetInfo` query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Info {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Human-readable description.
    pub description: String,
    /// Description of the storage adapter.
    pub adapter_info: serde_json::Value,
}

/// Notifications collected for the `PendingEvents` query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum StoreEvent {
    /// Links flushed to the store by a Commit, in delivery order.
    SavedLinks(Vec<Link>),
    /// Evidences produced for previously committed links.
    SavedEvidences(BTreeMap<LinkHash, Evidence>),
}
