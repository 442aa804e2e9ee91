// Path: crates/types/src/error/mod.rs
//! Core error types for TMPop.
//!
//! The enums follow the propagation classes of the application:
//! - `LinkError`: a link was *rejected*. Deterministic across replicas.
//! - `StoreError`: the storage backend failed. Transient on reads.
//! - `FatalError`: the application can no longer vouch for its own commitment.
//! - `EvidenceError`: evidence could not be produced this time; retried later.

use crate::hash::LinkHash;
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Reasons a link is rejected by the admission pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The link could not be serialized for hashing.
    #[error("Link encode error: {0}")]
    Encode(String),
    /// A mandatory field is empty.
    #[error("Missing link field: {0}")]
    MissingField(&'static str),
    /// The declared parent does not resolve to a stored or pending link.
    #[error("Parent link {0} not found")]
    ParentNotFound(LinkHash),
    /// The declared parent lives in another map.
    #[error("Parent link is in map '{parent}', link is in map '{link}'")]
    ParentMapMismatch {
        /// Map id of the parent.
        parent: String,
        /// Map id of the rejected link.
        link: String,
    },
    /// A reference does not resolve to a stored or pending link.
    #[error("Referenced link {0} not found")]
    RefNotFound(LinkHash),
    /// A reference names a process that differs from the referenced link's.
    #[error("Referenced link {0} belongs to another process")]
    RefProcessMismatch(LinkHash),
    /// The link declares an out-degree constraint, which the store cannot enforce.
    #[error("Out-degree constraints are not supported by this store")]
    OutDegreeUnsupported,
    /// The active content ruleset refused the link.
    #[error("Link rejected by ruleset: {0}")]
    Validation(String),
}

impl ErrorCode for LinkError {
    fn code(&self) -> &'static str {
        match self {
            Self::Encode(_) => "LINK_ENCODE_FAILED",
            Self::MissingField(_) => "LINK_MISSING_FIELD",
            Self::ParentNotFound(_) => "LINK_PARENT_NOT_FOUND",
            Self::ParentMapMismatch { .. } => "LINK_PARENT_MAP_MISMATCH",
            Self::RefNotFound(_) => "LINK_REF_NOT_FOUND",
            Self::RefProcessMismatch(_) => "LINK_REF_PROCESS_MISMATCH",
            Self::OutDegreeUnsupported => "LINK_OUT_DEGREE_UNSUPPORTED",
            Self::Validation(_) => "LINK_VALIDATION_FAILED",
        }
    }
}

/// Represents errors that can occur within the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A generic error originating from the underlying backend.
    #[error("backend error: {0}")]
    Backend(String),
    /// An error occurred while serializing data for storage.
    #[error("encode error: {0}")]
    Encode(String),
    /// An error occurred while deserializing data from storage.
    #[error("decode error: {0}")]
    Decode(String),
    /// The link to write could not be hashed.
    #[error("invalid link: {0}")]
    Link(#[from] LinkError),
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Backend(_) => "STORE_BACKEND_ERROR",
            Self::Encode(_) => "STORE_ENCODE_ERROR",
            Self::Decode(_) => "STORE_DECODE_ERROR",
            Self::Link(_) => "STORE_INVALID_LINK",
        }
    }
}

/// Errors from the transaction codec.
#[derive(Debug, Error)]
pub enum TxError {
    /// The payload is not a well-formed transaction envelope.
    #[error("Malformed transaction: {0}")]
    Decode(String),
    /// The discriminant does not name a known transaction type.
    #[error("Unknown transaction type {0}")]
    UnknownType(u8),
    /// A CreateLink transaction without a link.
    #[error("Transaction carries no link")]
    MissingLink,
    /// The declared link hash does not match the link's content.
    #[error("Declared link hash {declared} does not match computed {computed}")]
    LinkHashMismatch {
        /// Hash sent by the client.
        declared: LinkHash,
        /// Hash of the link's canonical form.
        computed: LinkHash,
    },
    /// The link inside the transaction could not be hashed.
    #[error(transparent)]
    Link(#[from] LinkError),
}

impl ErrorCode for TxError {
    fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "TX_DECODE_FAILED",
            Self::UnknownType(_) => "TX_UNKNOWN_TYPE",
            Self::MissingLink => "TX_MISSING_LINK",
            Self::LinkHashMismatch { .. } => "TX_LINK_HASH_MISMATCH",
            Self::Link(_) => "TX_INVALID_LINK",
        }
    }
}

/// Errors from the dual-batch state.
#[derive(Debug, Error)]
pub enum StateError {
    /// The link was rejected; the outcome is deterministic.
    #[error(transparent)]
    Rejected(#[from] LinkError),
    /// A store read or write failed.
    #[error("State store error: {0}")]
    Store(#[from] StoreError),
    /// Flushing the delivered batch to the store failed.
    #[error("Flush of {total} delivered links failed: {source}")]
    Flush {
        /// Links in the batch.
        total: usize,
        /// The failing write.
        #[source]
        source: StoreError,
    },
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            Self::Rejected(e) => e.code(),
            Self::Store(e) => e.code(),
            Self::Flush { .. } => "STATE_FLUSH_FAILED",
        }
    }
}

/// Errors while assembling evidence. Never affect consensus processing.
#[derive(Debug, Error)]
pub enum EvidenceError {
    /// The consensus engine could not serve a block or validator set.
    #[error("Block source error at height {height}: {reason}")]
    Source {
        /// The requested height.
        height: u64,
        /// Description of the failure.
        reason: String,
    },
    /// The engine returned a block at a different height than requested.
    #[error("Block source returned height {got}, expected {expected}")]
    HeightMismatch {
        /// The requested height.
        expected: u64,
        /// The height in the returned header.
        got: u64,
    },
    /// The merkle path for a leaf could not be built.
    #[error("Merkle path error: {0}")]
    Merkle(String),
    /// The assembled proof does not verify, so retrying cannot help.
    #[error("Evidence for height {0} does not verify")]
    Unverifiable(u64),
    /// Storing the evidence failed.
    #[error("Evidence store error: {0}")]
    Store(#[from] StoreError),
}

impl ErrorCode for EvidenceError {
    fn code(&self) -> &'static str {
        match self {
            Self::Source { .. } => "EVIDENCE_SOURCE_ERROR",
            Self::HeightMismatch { .. } => "EVIDENCE_HEIGHT_MISMATCH",
            Self::Merkle(_) => "EVIDENCE_MERKLE_ERROR",
            Self::Unverifiable(_) => "EVIDENCE_UNVERIFIABLE",
            Self::Store(_) => "EVIDENCE_STORE_ERROR",
        }
    }
}

/// Errors returned through the query surface.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The path is not one of the supported query paths.
    #[error("Unknown query path '{0}'")]
    UnknownPath(String),
    /// Only the latest committed height can be queried.
    #[error("Query height {requested} not supported, latest is {latest}")]
    UnsupportedHeight {
        /// Height in the request.
        requested: u64,
        /// Latest committed height.
        latest: u64,
    },
    /// The JSON payload could not be decoded.
    #[error("Bad query payload: {0}")]
    BadRequest(String),
    /// The response could not be encoded.
    #[error("Response encode error: {0}")]
    Encode(String),
    /// The store failed to answer.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for QueryError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownPath(_) => "QUERY_UNKNOWN_PATH",
            Self::UnsupportedHeight { .. } => "QUERY_UNSUPPORTED_HEIGHT",
            Self::BadRequest(_) => "QUERY_BAD_REQUEST",
            Self::Encode(_) => "QUERY_ENCODE_ERROR",
            Self::Store(e) => e.code(),
        }
    }
}

/// Errors loading configuration or rules files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The file path.
        path: String,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The TOML document is invalid.
    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
    /// The JSON document is invalid.
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "CONFIG_IO_ERROR",
            Self::Toml(_) => "CONFIG_INVALID_TOML",
            Self::Json(_) => "CONFIG_INVALID_JSON",
        }
    }
}

/// Errors after which the hosting process must abort.
///
/// Returned by startup initialization and Commit. Continuing would let this
/// replica report an AppHash it has not durably recorded, or diverge from its
/// peers after a partial flush.
#[derive(Debug, Error)]
pub enum FatalError {
    /// `LastBlock` could not be read or written.
    #[error("Last block persistence failed: {0}")]
    Persistence(#[source] StoreError),
    /// The delivered batch could not be flushed to the store.
    #[error("Commit flush failed: {0}")]
    Flush(#[source] StateError),
    /// A persisted record is unreadable.
    #[error("Corrupted persisted state: {0}")]
    Corrupted(String),
}

impl ErrorCode for FatalError {
    fn code(&self) -> &'static str {
        match self {
            Self::Persistence(_) => "FATAL_PERSISTENCE",
            Self::Flush(_) => "FATAL_FLUSH",
            Self::Corrupted(_) => "FATAL_CORRUPTED_STATE",
        }
    }
}
