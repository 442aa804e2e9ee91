// Path: crates/abci/tests/common/mod.rs

//! A minimal engine loop driving `ConsensusApplication` over a `TestChain`.

#![allow(dead_code)]

use std::sync::Arc;
use tmpop_abci::ConsensusApplication;
use tmpop_api::abci::{Application, RequestBeginBlock, RequestDeliverTx, ResponseDeliverTx};
use tmpop_api::storage::KeyValueStore;
use tmpop_api::validation::ValidatorSource;
use tmpop_storage::MemoryStore;
use tmpop_test_utils::TestChain;
use tmpop_tx::Transaction;
use tmpop_types::config::TmpopConfig;
use tmpop_types::link::Link;

pub struct Harness {
    pub chain: Arc<TestChain>,
    pub store: Arc<MemoryStore>,
    pub kv: Arc<dyn KeyValueStore>,
    pub app: ConsensusApplication,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(TmpopConfig::default(), Arc::new(MemoryStore::new()), None)
    }

    pub fn with(
        config: TmpopConfig,
        kv: Arc<dyn KeyValueStore>,
        validator_source: Option<Box<dyn ValidatorSource>>,
    ) -> Self {
        let chain = Arc::new(TestChain::new("tmpop-test", 4));
        let store = Arc::new(MemoryStore::new());
        let app = ConsensusApplication::new(
            config,
            store.clone(),
            kv.clone(),
            Some(chain.clone()),
            validator_source,
        )
        .unwrap();
        Self { chain, store, kv, app }
    }

    /// Runs one full block and returns the DeliverTx responses and AppHash.
    pub fn run_block(&mut self, links: &[Link]) -> (Vec<ResponseDeliverTx>, Vec<u8>) {
        let header = self
            .chain
            .advance(self.app.last_block().app_hash.clone(), links.len() as u64);
        self.app.begin_block(RequestBeginBlock {
            hash: header.hash().to_vec(),
            header,
        });
        let responses = links
            .iter()
            .map(|link| self.app.deliver_tx(RequestDeliverTx { tx: tx_bytes(link) }))
            .collect();
        let app_hash = self.app.commit().unwrap().data;
        (responses, app_hash)
    }
}

pub fn tx_bytes(link: &Link) -> Vec<u8> {
    tmpop_tx::encode(&Transaction::create_link(link.clone()).unwrap()).unwrap()
}
