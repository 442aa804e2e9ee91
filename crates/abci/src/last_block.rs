// Path: crates/abci/src/last_block.rs

//! Persistence of the last committed `LastBlock`.

use std::sync::Arc;
use tmpop_api::storage::KeyValueStore;
use tmpop_types::app::{LastBlock, LAST_BLOCK_KEY};
use tmpop_types::codec;
use tmpop_types::error::FatalError;

/// Reads and writes `LastBlock` under its fixed key.
///
/// Every failure is fatal: a replica that cannot record what it committed
/// cannot answer the engine's handshake truthfully.
#[derive(Clone)]
pub struct LastBlockStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LastBlockStore {
    /// Wraps a key/value store.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Reads the persisted record, if any.
    pub fn load(&self) -> Result<Option<LastBlock>, FatalError> {
        let Some(bytes) = self
            .kv
            .get_value(LAST_BLOCK_KEY)
            .map_err(FatalError::Persistence)?
        else {
            return Ok(None);
        };
        codec::from_bytes_canonical(&bytes)
            .map(Some)
            .map_err(FatalError::Corrupted)
    }

    /// Durably writes `last_block`.
    pub fn save(&self, last_block: &LastBlock) -> Result<(), FatalError> {
        self.kv
            .set_value(LAST_BLOCK_KEY, &codec::to_bytes_canonical(last_block))
            .map_err(FatalError::Persistence)
    }

    /// Reads the persisted record, or persists and returns the genesis record
    /// `{height: 0, app_hash: empty}` on first start.
    pub fn load_or_init(&self) -> Result<LastBlock, FatalError> {
        if let Some(last_block) = self.load()? {
            return Ok(last_block);
        }
        let genesis = LastBlock::default();
        self.save(&genesis)?;
        tracing::info!(target: "abci", "initialized genesis last block");
        Ok(genesis)
    }
}
