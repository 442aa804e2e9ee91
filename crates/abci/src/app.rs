// Path: crates/abci/src/app.rs

//! The consensus application state machine.

use crate::events::EventsManager;
use crate::last_block::LastBlockStore;
use crate::query::QueryRouter;
use crate::rules::RulesFileSource;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tmpop_api::abci::{
    Application, Code, RequestBeginBlock, RequestCheckTx, RequestDeliverTx, RequestInfo,
    RequestQuery, RequestSetOption, ResponseBeginBlock, ResponseCheckTx, ResponseCommit,
    ResponseDeliverTx, ResponseInfo, ResponseQuery, ResponseSetOption,
};
use tmpop_api::consensus::BlockSource;
use tmpop_api::storage::{Adapter, KeyValueStore};
use tmpop_api::validation::{RulesetUpdate, ValidatorSource};
use tmpop_consensus::{EvidenceBuilder, PendingHeight};
use tmpop_state::State;
use tmpop_tx::Transaction;
use tmpop_types::app::LastBlock;
use tmpop_types::config::TmpopConfig;
use tmpop_types::error::{ErrorCode, EvidenceError, FatalError, StateError};
use tmpop_types::evidence::Evidence;
use tmpop_types::tendermint::Header;
use tmpop_types::LinkHash;

/// The TMPop application: stores links delivered by the consensus engine and
/// anchors each block's links in the AppHash.
///
/// Driven strictly sequentially by the engine. Concurrent reads go through
/// `query_router()`.
pub struct ConsensusApplication {
    config: TmpopConfig,
    store: Arc<dyn Adapter>,
    last_block_store: LastBlockStore,
    last_block: LastBlock,
    state: State,
    router: QueryRouter,
    events: EventsManager,
    evidence: Option<EvidenceBuilder>,
    pending: VecDeque<PendingHeight>,
    validator_source: Option<Box<dyn ValidatorSource>>,
    current_header: Option<Header>,
}

impl ConsensusApplication {
    /// Opens the application, initializing `LastBlock` on first start.
    ///
    /// Without an explicit `validator_source`, a configured
    /// `validation.rules_path` is watched instead. Evidence is produced only
    /// when enabled in `config` and a `block_source` is given.
    pub fn new(
        config: TmpopConfig,
        store: Arc<dyn Adapter>,
        kv: Arc<dyn KeyValueStore>,
        block_source: Option<Arc<dyn BlockSource>>,
        validator_source: Option<Box<dyn ValidatorSource>>,
    ) -> Result<Self, FatalError> {
        let last_block_store = LastBlockStore::new(kv);
        let last_block = last_block_store.load_or_init()?;

        let state = State::new(
            store.clone(),
            last_block.app_hash.clone(),
            last_block.ruleset_hash.clone(),
        )
        .map_err(FatalError::Persistence)?;

        let validator_source = validator_source.or_else(|| {
            config
                .validation
                .rules_path
                .as_ref()
                .map(|path| Box::new(RulesFileSource::new(path)) as Box<dyn ValidatorSource>)
        });

        let events = EventsManager::new(config.events.max_buffered);
        let router = QueryRouter::new(
            store.clone(),
            events.clone(),
            last_block.height,
            config.name.clone(),
            config.version.clone(),
            config.description.clone(),
        );

        let evidence = match block_source {
            Some(source) if config.evidence.enabled => Some(EvidenceBuilder::new(source)),
            _ => None,
        };

        tracing::info!(
            target: "abci",
            height = last_block.height,
            app_hash = %hex::encode(&last_block.app_hash),
            evidence = evidence.is_some(),
            "application ready"
        );

        let mut app = Self {
            config,
            store,
            last_block_store,
            last_block,
            state,
            router,
            events,
            evidence,
            pending: VecDeque::new(),
            validator_source,
            current_header: None,
        };
        app.refresh_validator();
        Ok(app)
    }

    /// A handle for serving queries from other threads.
    pub fn query_router(&self) -> QueryRouter {
        self.router.clone()
    }

    /// The shared events buffer.
    pub fn events(&self) -> &EventsManager {
        &self.events
    }

    /// The last committed block.
    pub fn last_block(&self) -> &LastBlock {
        &self.last_block
    }

    /// The link state, for inspection.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Committed heights still waiting for evidence, oldest first.
    pub fn pending_evidence_heights(&self) -> Vec<u64> {
        self.pending.iter().map(|p| p.height).collect()
    }

    fn refresh_validator(&mut self) {
        let Some(source) = self.validator_source.as_mut() else {
            return;
        };
        match source.poll() {
            RulesetUpdate::Unchanged => {}
            RulesetUpdate::Set(validator) => {
                tracing::info!(
                    target: "abci",
                    ruleset_hash = %hex::encode(validator.hash()),
                    "ruleset activated"
                );
                self.state.set_validator(Some(validator));
            }
            RulesetUpdate::Cleared => {
                tracing::info!(target: "abci", "ruleset cleared");
                self.state.set_validator(None);
            }
        }
    }

    fn produce_evidence(&mut self, current: u64) {
        let Some(builder) = self.evidence.as_ref() else {
            return;
        };
        let mut saved = BTreeMap::new();
        let mut remaining = VecDeque::with_capacity(self.pending.len());

        for pending in self.pending.drain(..) {
            if !pending.is_ready(current) {
                remaining.push_back(pending);
                continue;
            }
            match store_evidence(builder, self.store.as_ref(), &pending) {
                Ok(evidences) => saved.extend(evidences),
                Err(EvidenceError::Unverifiable(height)) => {
                    tracing::error!(
                        target: "evidence",
                        height,
                        "chain disagrees with committed links, dropping height"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        target: "evidence",
                        height = pending.height,
                        code = e.code(),
                        error = %e,
                        "evidence not produced, will retry"
                    );
                    remaining.push_back(pending);
                }
            }
        }

        self.pending = remaining;
        if !saved.is_empty() {
            tracing::info!(target: "evidence", links = saved.len(), "evidence saved");
            self.events.push_evidences(saved);
        }
    }

    fn enqueue_evidence(&mut self, pending: PendingHeight) {
        if self.evidence.is_none() {
            return;
        }
        self.pending.push_back(pending);
        while self.pending.len() > self.config.evidence.max_pending_heights {
            if let Some(dropped) = self.pending.pop_front() {
                tracing::warn!(
                    target: "evidence",
                    height = dropped.height,
                    links = dropped.link_hashes.len(),
                    "too many heights waiting for evidence, dropping oldest"
                );
            }
        }
    }
}

fn store_evidence(
    builder: &EvidenceBuilder,
    store: &dyn Adapter,
    pending: &PendingHeight,
) -> Result<BTreeMap<LinkHash, Evidence>, EvidenceError> {
    let mut saved = BTreeMap::new();
    for (link_hash, evidence) in builder.build(pending)? {
        store.add_evidence(&link_hash, &evidence)?;
        saved.insert(link_hash, evidence);
    }
    Ok(saved)
}

fn decode_tx(tx: &[u8]) -> Result<Transaction, (Code, String)> {
    tmpop_tx::decode(tx).map_err(|e| (Code::BadRequest, e.to_string()))
}

fn state_failure(e: &StateError) -> (Code, String) {
    let code = match e {
        StateError::Rejected(_) => Code::Rejected,
        StateError::Store(_) | StateError::Flush { .. } => Code::InternalError,
    };
    (code, e.to_string())
}

impl Application for ConsensusApplication {
    fn info(&self, req: RequestInfo) -> ResponseInfo {
        tracing::debug!(target: "abci", engine_version = %req.version, "info");
        ResponseInfo {
            data: self.config.description.clone(),
            version: self.config.version.clone(),
            last_block_height: self.last_block.height,
            last_block_app_hash: self.last_block.app_hash.clone(),
        }
    }

    fn set_option(&mut self, req: RequestSetOption) -> ResponseSetOption {
        tracing::debug!(target: "abci", key = %req.key, "option ignored");
        ResponseSetOption {
            code: Code::Ok.value(),
            log: String::new(),
        }
    }

    fn begin_block(&mut self, req: RequestBeginBlock) -> ResponseBeginBlock {
        let header = req.header;
        if header.app_hash == self.last_block.app_hash {
            self.produce_evidence(header.height);
        } else {
            tracing::warn!(
                target: "abci",
                height = header.height,
                header_app_hash = %hex::encode(&header.app_hash),
                last_app_hash = %hex::encode(&self.last_block.app_hash),
                "header app hash differs from last commit, skipping evidence"
            );
        }

        self.refresh_validator();
        self.state.set_previous_app_hash(header.app_hash.clone());
        tracing::debug!(target: "abci", height = header.height, "begin block");
        self.current_header = Some(header);
        ResponseBeginBlock {}
    }

    fn check_tx(&mut self, req: RequestCheckTx) -> ResponseCheckTx {
        let result = decode_tx(&req.tx).and_then(|tx| match tx {
            Transaction::CreateLink { link, .. } => {
                self.state.check(&link).map_err(|e| state_failure(&e))
            }
        });
        match result {
            Ok(hash) => ResponseCheckTx {
                code: Code::Ok.value(),
                log: String::new(),
                data: hash.as_bytes().to_vec(),
            },
            Err((code, log)) => {
                tracing::debug!(target: "abci", ?code, %log, "check tx refused");
                ResponseCheckTx {
                    code: code.value(),
                    log,
                    data: Vec::new(),
                }
            }
        }
    }

    fn deliver_tx(&mut self, req: RequestDeliverTx) -> ResponseDeliverTx {
        let result = decode_tx(&req.tx).and_then(|tx| match tx {
            Transaction::CreateLink { link, .. } => {
                self.state.deliver(&link).map_err(|e| state_failure(&e))
            }
        });
        match result {
            Ok(hash) => ResponseDeliverTx {
                code: Code::Ok.value(),
                log: String::new(),
                data: hash.as_bytes().to_vec(),
            },
            Err((code, log)) => {
                tracing::info!(target: "abci", ?code, %log, "deliver tx refused");
                ResponseDeliverTx {
                    code: code.value(),
                    log,
                    data: Vec::new(),
                }
            }
        }
    }

    fn commit(&mut self) -> Result<ResponseCommit, FatalError> {
        let committed = self.state.commit().map_err(FatalError::Flush)?;
        let height = self
            .current_header
            .as_ref()
            .map(|h| h.height)
            .unwrap_or_else(|| self.last_block.height.saturating_add(1));

        let last_block = LastBlock {
            app_hash: committed.app_hash.clone(),
            height,
            last_header: self.current_header.clone(),
            ruleset_hash: committed.ruleset_hash.clone(),
        };
        self.last_block_store.save(&last_block)?;
        self.last_block = last_block;
        self.router.set_height(height);

        if !committed.link_hashes.is_empty() {
            self.enqueue_evidence(PendingHeight {
                height,
                link_hashes: committed.link_hashes,
                ruleset_hash: committed.ruleset_hash,
            });
            self.events.push_links(committed.links);
        }

        tracing::info!(
            target: "abci",
            height,
            app_hash = %hex::encode(&committed.app_hash),
            "block committed"
        );
        Ok(ResponseCommit {
            data: committed.app_hash,
        })
    }

    fn query(&self, req: RequestQuery) -> ResponseQuery {
        self.router.query(&req)
    }
}
