// Path: crates/abci/tests/evidence.rs

mod common;

use common::Harness;
use std::sync::Arc;
use tmpop_api::abci::{Application, RequestBeginBlock, RequestQuery};
use tmpop_api::storage::{Adapter, LinkReader};
use tmpop_consensus::VerifyEvidence;
use tmpop_storage::MemoryStore;
use tmpop_test_utils::fixtures::links_in_map;
use tmpop_types::app::StoreEvent;
use tmpop_types::config::TmpopConfig;
use tmpop_types::LinkHash;

fn hashes(links: &[tmpop_types::Link]) -> Vec<LinkHash> {
    links.iter().map(|l| l.hash().unwrap()).collect()
}

#[test]
fn committed_links_get_one_verifying_evidence() {
    let mut h = Harness::new();
    let links = links_in_map("proc", "map", 3);
    h.run_block(&links);
    assert_eq!(h.app.pending_evidence_heights(), vec![1]);

    // Heights 2 and 3 are not enough: block 3 only becomes final at 4.
    h.run_block(&[]);
    h.run_block(&[]);
    assert_eq!(h.app.pending_evidence_heights(), vec![1]);
    h.run_block(&[]);
    assert!(h.app.pending_evidence_heights().is_empty());

    for hash in hashes(&links) {
        let evidences = h.store.get_evidences(&hash).unwrap();
        assert_eq!(evidences.len(), 1);
        assert!(evidences[0].verify(&hash));
        assert_eq!(evidences[0].provider, "tmpop-test");
        assert_eq!(evidences[0].proof.block_height, 1);

        let segment = h.store.get_segment(&hash).unwrap().unwrap();
        assert_eq!(segment.meta.evidences, evidences);
    }

    // Another round of blocks does not duplicate anything.
    h.run_block(&[]);
    for hash in hashes(&links) {
        assert_eq!(h.store.get_evidences(&hash).unwrap().len(), 1);
    }

    let events = h.app.events().drain();
    let saved = events
        .iter()
        .find_map(|e| match e {
            StoreEvent::SavedEvidences(map) => Some(map),
            StoreEvent::SavedLinks(_) => None,
        })
        .unwrap();
    assert_eq!(saved.len(), 3);
}

#[test]
fn evidence_for_later_heights_chains_from_earlier_app_hashes() {
    let mut h = Harness::new();
    let first = links_in_map("p", "a", 2);
    let second = links_in_map("p", "b", 1);
    h.run_block(&first);
    h.run_block(&second);
    for _ in 0..3 {
        h.run_block(&[]);
    }
    assert!(h.app.pending_evidence_heights().is_empty());

    let second_hash = second[0].hash().unwrap();
    let evidence = h.store.get_evidences(&second_hash).unwrap().remove(0);
    assert_eq!(evidence.proof.block_height, 2);
    assert!(evidence.proof.path.is_empty());
    assert!(evidence.verify(&second_hash));
    assert!(!evidence.verify(&first[0].hash().unwrap()));
}

#[test]
fn unavailable_blocks_are_retried() {
    let mut h = Harness::new();
    let links = links_in_map("p", "m", 2);
    h.run_block(&links);
    h.chain.make_unavailable(2);
    for _ in 0..3 {
        h.run_block(&[]);
    }
    assert_eq!(h.app.pending_evidence_heights(), vec![1]);
    assert!(h.store.get_evidences(&links[0].hash().unwrap()).unwrap().is_empty());

    h.chain.restore(2);
    h.run_block(&[]);
    assert!(h.app.pending_evidence_heights().is_empty());
    assert_eq!(h.store.get_evidences(&links[0].hash().unwrap()).unwrap().len(), 1);
}

#[test]
fn mismatched_header_skips_evidence() {
    let mut h = Harness::new();
    h.run_block(&links_in_map("p", "m", 1));
    for _ in 0..2 {
        h.run_block(&[]);
    }

    // A header disagreeing with our last commit: no evidence this block.
    let header = h.chain.advance(vec![0xee; 32], 0);
    h.app.begin_block(RequestBeginBlock {
        hash: header.hash().to_vec(),
        header,
    });
    assert_eq!(h.app.pending_evidence_heights(), vec![1]);
}

#[test]
fn pending_heights_are_bounded() {
    let mut config = TmpopConfig::default();
    config.evidence.max_pending_heights = 2;
    let mut h = Harness::with(config, Arc::new(MemoryStore::new()), None);
    h.chain.make_unavailable(1);

    for map in ["a", "b", "c"] {
        h.run_block(&links_in_map("p", map, 1));
    }
    assert_eq!(h.app.pending_evidence_heights(), vec![2, 3]);
}

#[test]
fn disabled_evidence_keeps_nothing_pending() {
    let mut config = TmpopConfig::default();
    config.evidence.enabled = false;
    let mut h = Harness::with(config, Arc::new(MemoryStore::new()), None);
    let links = links_in_map("p", "m", 1);
    h.run_block(&links);
    for _ in 0..3 {
        h.run_block(&[]);
    }
    assert!(h.app.pending_evidence_heights().is_empty());
    assert!(h.store.get_evidences(&links[0].hash().unwrap()).unwrap().is_empty());
}

#[test]
fn evidence_is_served_by_queries() {
    let mut h = Harness::new();
    let links = links_in_map("p", "m", 1);
    h.run_block(&links);
    for _ in 0..3 {
        h.run_block(&[]);
    }
    let hash = links[0].hash().unwrap();
    let res = h.app.query(RequestQuery {
        path: "GetEvidences".into(),
        data: serde_json::to_vec(&hash).unwrap(),
        ..RequestQuery::default()
    });
    assert!(res.is_ok(), "{}", res.log);
    let evidences: Vec<tmpop_types::evidence::Evidence> =
        serde_json::from_slice(&res.value).unwrap();
    assert_eq!(evidences.len(), 1);
    assert!(evidences[0].verify(&hash));

    // AddEvidence with the same origin replaces rather than appends.
    let res = h.app.query(RequestQuery {
        path: "AddEvidence".into(),
        data: serde_json::to_vec(&serde_json::json!({
            "link_hash": hash,
            "evidence": evidences[0],
        }))
        .unwrap(),
        ..RequestQuery::default()
    });
    assert!(res.is_ok(), "{}", res.log);
    assert_eq!(h.store.get_evidences(&hash).unwrap().len(), 1);
}
