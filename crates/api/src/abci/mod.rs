// Path: crates/api/src/abci/mod.rs

//! The narrow request/response protocol between the consensus engine and
//! the application state machine.
//!
//! The engine drives every lifecycle method on a single instance, strictly
//! sequentially. Only `query` may be served concurrently, which is why it is
//! the one method taking `&self`.

use serde::{Deserialize, Serialize};
use tmpop_types::error::FatalError;
use tmpop_types::tendermint::Header;

/// Result codes carried by `CheckTx`, `DeliverTx` and `Query` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum Code {
    /// Success.
    Ok = 0,
    /// An unexpected internal failure, typically a store error.
    InternalError = 1,
    /// The request payload could not be decoded.
    BadRequest = 2,
    /// The request names an unsupported operation or height.
    NotImplemented = 3,
    /// The link was rejected by the admission pipeline.
    Rejected = 4,
}

impl Code {
    /// The numeric code sent on the wire.
    pub fn value(self) -> u32 {
        self as u32
    }
}

/// Handshake request sent by the engine on (re)connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    /// The engine's version string.
    pub version: String,
}

/// The application's last committed state, used by the engine to decide how
/// many blocks to replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseInfo {
    /// Free-form application description.
    pub data: String,
    /// Application version.
    pub version: String,
    /// Height of the last Commit.
    pub last_block_height: u64,
    /// AppHash returned by the last Commit.
    pub last_block_app_hash: Vec<u8>,
}

/// A key/value option pushed by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSetOption {
    /// Option name.
    pub key: String,
    /// Option value.
    pub value: String,
}

/// Result of `set_option`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseSetOption {
    /// Result code.
    pub code: u32,
    /// Human-readable log.
    pub log: String,
}

/// Start of a new block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestBeginBlock {
    /// Hash of the block being executed.
    pub hash: Vec<u8>,
    /// Header of the block being executed.
    pub header: Header,
}

/// Result of `begin_block`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseBeginBlock {}

/// Mempool admission request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCheckTx {
    /// Encoded transaction.
    pub tx: Vec<u8>,
}

/// Result of `check_tx`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseCheckTx {
    /// Result code.
    pub code: u32,
    /// Human-readable log.
    pub log: String,
    /// Result payload; the link hash on success.
    pub data: Vec<u8>,
}

/// Block execution request for one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDeliverTx {
    /// Encoded transaction.
    pub tx: Vec<u8>,
}

/// Result of `deliver_tx`. Must be identical on every replica.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseDeliverTx {
    /// Result code.
    pub code: u32,
    /// Human-readable log.
    pub log: String,
    /// Result payload; the link hash on success.
    pub data: Vec<u8>,
}

/// Result of `commit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseCommit {
    /// The new AppHash.
    pub data: Vec<u8>,
}

/// A read-only query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestQuery {
    /// JSON payload.
    pub data: Vec<u8>,
    /// Query name, e.g. `GetSegment`.
    pub path: String,
    /// Requested height; 0 means latest.
    pub height: u64,
    /// Whether a proof is requested. Proofs are not produced for queries.
    pub prove: bool,
}

/// Result of `query`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseQuery {
    /// Result code.
    pub code: u32,
    /// Human-readable log.
    pub log: String,
    /// JSON result.
    pub value: Vec<u8>,
    /// Height the query was answered at.
    pub height: u64,
}

impl ResponseQuery {
    /// Whether the query succeeded.
    pub fn is_ok(&self) -> bool {
        self.code == Code::Ok.value()
    }
}

/// The application side of the consensus protocol.
pub trait Application {
    /// Reports the last committed height and AppHash.
    fn info(&self, req: RequestInfo) -> ResponseInfo;

    /// Applies a non-consensus option.
    fn set_option(&mut self, req: RequestSetOption) -> ResponseSetOption;

    /// Signals the start of a block.
    fn begin_block(&mut self, req: RequestBeginBlock) -> ResponseBeginBlock;

    /// Validates a transaction for mempool admission.
    fn check_tx(&mut self, req: RequestCheckTx) -> ResponseCheckTx;

    /// Executes a transaction as part of the current block.
    fn deliver_tx(&mut self, req: RequestDeliverTx) -> ResponseDeliverTx;

    /// Persists the block's state and returns the new AppHash.
    ///
    /// An `Err` is fatal: the host must stop the process without answering
    /// the engine.
    fn commit(&mut self) -> Result<ResponseCommit, FatalError>;

    /// Answers a read-only query against the latest committed state.
    fn query(&self, req: RequestQuery) -> ResponseQuery;
}
