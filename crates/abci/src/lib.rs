// Path: crates/abci/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]
//! # TMPop Consensus Application
//!
//! The application state machine driven by a BFT consensus engine through
//! the `Application` trait.
//!
//! ## Lifecycle
//!
//! `BeginBlock` produces evidence for links committed three or more heights
//! earlier and refreshes the content ruleset. `CheckTx` and `DeliverTx` run
//! the admission pipeline against the checked and delivered batches.
//! `Commit` flushes the delivered links, persists `LastBlock` and returns the
//! AppHash. Persistence failures there are fatal and reported as
//! `FatalError` for the host to abort on.
//!
//! ## Queries
//!
//! `QueryRouter` answers the read-only query paths. It is cheap to clone and
//! may serve RPC threads while the consensus thread executes blocks.

pub mod app;
pub mod events;
pub mod last_block;
pub mod query;
pub mod rules;

pub use app::ConsensusApplication;
pub use events::EventsManager;
pub use last_block::LastBlockStore;
pub use query::QueryRouter;
pub use rules::{ChannelValidatorSource, ProcessRules, RulesFileSource};
