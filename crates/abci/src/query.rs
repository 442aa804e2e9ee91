// Path: crates/abci/src/query.rs

//! The read-only query surface.
//!
//! Queries observe only the persisted store, the latest committed height and
//! the events buffer. They never see a block that is still being executed.

use crate::events::EventsManager;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tmpop_api::abci::{Code, RequestQuery, ResponseQuery};
use tmpop_api::storage::Adapter;
use tmpop_types::app::Info;
use tmpop_types::error::{ErrorCode, QueryError};
use tmpop_types::evidence::Evidence;
use tmpop_types::link::{MapFilter, SegmentFilter};
use tmpop_types::LinkHash;

/// Returns the application and adapter description.
pub const GET_INFO: &str = "GetInfo";
/// Returns one segment by link hash, or `null`.
pub const GET_SEGMENT: &str = "GetSegment";
/// Returns the evidences stored for a link hash.
pub const GET_EVIDENCES: &str = "GetEvidences";
/// Attaches an externally produced evidence to a link.
pub const ADD_EVIDENCE: &str = "AddEvidence";
/// Returns one page of segments matching a filter.
pub const FIND_SEGMENTS: &str = "FindSegments";
/// Returns one page of map ids matching a filter.
pub const GET_MAP_IDS: &str = "GetMapIDs";
/// Drains the buffered store events.
pub const PENDING_EVENTS: &str = "PendingEvents";

/// Payload of `AddEvidence`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AddEvidenceRequest {
    /// The link the evidence is for.
    pub link_hash: LinkHash,
    /// The evidence to store.
    pub evidence: Evidence,
}

/// Dispatches queries by path. Cheap to clone and safe to share with RPC
/// threads.
#[derive(Clone)]
pub struct QueryRouter {
    store: Arc<dyn Adapter>,
    events: EventsManager,
    height: Arc<AtomicU64>,
    name: String,
    version: String,
    description: String,
}

impl QueryRouter {
    /// Creates a router answering at `height`.
    pub fn new(
        store: Arc<dyn Adapter>,
        events: EventsManager,
        height: u64,
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            store,
            events,
            height: Arc::new(AtomicU64::new(height)),
            name: name.into(),
            version: version.into(),
            description: description.into(),
        }
    }

    /// Publishes a newly committed height to every clone of the router.
    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::Release);
    }

    /// The latest committed height.
    pub fn height(&self) -> u64 {
        self.height.load(Ordering::Acquire)
    }

    /// Answers a query. Failures are reported through the response code.
    pub fn query(&self, req: &RequestQuery) -> ResponseQuery {
        let height = self.height();
        match self.dispatch(req, height) {
            Ok(value) => ResponseQuery {
                code: Code::Ok.value(),
                log: String::new(),
                value,
                height,
            },
            Err(e) => {
                tracing::debug!(
                    target: "abci",
                    path = %req.path,
                    code = e.code(),
                    error = %e,
                    "query failed"
                );
                ResponseQuery {
                    code: code_for(&e).value(),
                    log: e.to_string(),
                    value: Vec::new(),
                    height,
                }
            }
        }
    }

    fn dispatch(&self, req: &RequestQuery, latest: u64) -> Result<Vec<u8>, QueryError> {
        if req.height != 0 && req.height != latest {
            return Err(QueryError::UnsupportedHeight {
                requested: req.height,
                latest,
            });
        }

        match req.path.as_str() {
            GET_INFO => {
                let info = Info {
                    name: self.name.clone(),
                    version: self.version.clone(),
                    description: self.description.clone(),
                    adapter_info: self.store.info()?,
                };
                to_json(&info)
            }
            GET_SEGMENT => {
                let link_hash: LinkHash = parse(&req.data)?;
                to_json(&self.store.get_segment(&link_hash)?)
            }
            GET_EVIDENCES => {
                let link_hash: LinkHash = parse(&req.data)?;
                to_json(&self.store.get_evidences(&link_hash)?)
            }
            ADD_EVIDENCE => {
                let add: AddEvidenceRequest = parse(&req.data)?;
                self.store.add_evidence(&add.link_hash, &add.evidence)?;
                tracing::info!(target: "abci", link_hash = %add.link_hash, "evidence added by query");
                to_json(&add.link_hash)
            }
            FIND_SEGMENTS => {
                let mut filter: SegmentFilter = parse_or_default(&req.data)?;
                filter.pagination = filter.pagination.clamped();
                to_json(&self.store.find_segments(&filter)?)
            }
            GET_MAP_IDS => {
                let mut filter: MapFilter = parse_or_default(&req.data)?;
                filter.pagination = filter.pagination.clamped();
                to_json(&self.store.get_map_ids(&filter)?)
            }
            PENDING_EVENTS => to_json(&self.events.drain()),
            other => Err(QueryError::UnknownPath(other.to_string())),
        }
    }
}

fn code_for(e: &QueryError) -> Code {
    match e {
        QueryError::UnknownPath(_) | QueryError::UnsupportedHeight { .. } => Code::NotImplemented,
        QueryError::BadRequest(_) => Code::BadRequest,
        QueryError::Encode(_) | QueryError::Store(_) => Code::InternalError,
    }
}

fn parse<T: DeserializeOwned>(data: &[u8]) -> Result<T, QueryError> {
    serde_json::from_slice(data).map_err(|e| QueryError::BadRequest(e.to_string()))
}

fn parse_or_default<T: DeserializeOwned + Default>(data: &[u8]) -> Result<T, QueryError> {
    if data.is_empty() {
        return Ok(T::default());
    }
    parse(data)
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, QueryError> {
    serde_json::to_vec(value).map_err(|e| QueryError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmpop_storage::MemoryStore;
    use tmpop_test_utils::fixtures::links_in_map;
    use tmpop_types::link::{PaginatedSegments, Segment, MAX_LIMIT};

    fn router() -> (Arc<MemoryStore>, QueryRouter) {
        let store = Arc::new(MemoryStore::new());
        let router = QueryRouter::new(store.clone(), EventsManager::default(), 4, "tmpop", "0.1.0", "test");
        (store, router)
    }

    fn request(path: &str, data: Vec<u8>) -> RequestQuery {
        RequestQuery {
            data,
            path: path.to_string(),
            height: 0,
            prove: false,
        }
    }

    #[test]
    fn get_info_reports_adapter() {
        let (_, router) = router();
        let res = router.query(&request(GET_INFO, Vec::new()));
        assert!(res.is_ok(), "{}", res.log);
        assert_eq!(res.height, 4);
        let info: Info = serde_json::from_slice(&res.value).unwrap();
        assert_eq!(info.name, "tmpop");
        assert_eq!(info.adapter_info["name"], "memory");
    }

    #[test]
    fn get_segment_found_and_missing() {
        let (store, router) = router();
        let link = links_in_map("p", "m", 1).remove(0);
        let hash = store.create_link(&link).unwrap();

        let res = router.query(&request(GET_SEGMENT, serde_json::to_vec(&hash).unwrap()));
        let segment: Option<Segment> = serde_json::from_slice(&res.value).unwrap();
        assert_eq!(segment.unwrap().link, link);

        let missing = LinkHash([0; 32]);
        let res = router.query(&request(GET_SEGMENT, serde_json::to_vec(&missing).unwrap()));
        assert!(res.is_ok());
        assert_eq!(res.value, b"null");
    }

    #[test]
    fn find_segments_accepts_empty_payload_and_clamps() {
        let (store, router) = router();
        for link in links_in_map("p", "m", 3) {
            store.create_link(&link).unwrap();
        }
        let res = router.query(&request(FIND_SEGMENTS, Vec::new()));
        let page: PaginatedSegments = serde_json::from_slice(&res.value).unwrap();
        assert_eq!(page.total_count, 3);

        let mut filter = SegmentFilter::default();
        filter.pagination.limit = MAX_LIMIT * 10;
        let res = router.query(&request(FIND_SEGMENTS, serde_json::to_vec(&filter).unwrap()));
        assert!(res.is_ok(), "{}", res.log);
    }

    #[test]
    fn get_map_ids_lists_maps() {
        let (store, router) = router();
        for link in links_in_map("p", "b", 1).into_iter().chain(links_in_map("p", "a", 1)) {
            store.create_link(&link).unwrap();
        }
        let res = router.query(&request(GET_MAP_IDS, b"{}".to_vec()));
        let ids: Vec<String> = serde_json::from_slice(&res.value).unwrap();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn error_codes() {
        let (_, router) = router();
        let res = router.query(&request("Nope", Vec::new()));
        assert_eq!(res.code, Code::NotImplemented.value());

        let res = router.query(&request(GET_SEGMENT, b"not json".to_vec()));
        assert_eq!(res.code, Code::BadRequest.value());

        let mut req = request(GET_INFO, Vec::new());
        req.height = 3;
        let res = router.query(&req);
        assert_eq!(res.code, Code::NotImplemented.value());
        req.height = 4;
        assert!(router.query(&req).is_ok());
    }

    #[test]
    fn height_is_shared_between_clones() {
        let (_, router) = router();
        let clone = router.clone();
        router.set_height(9);
        assert_eq!(clone.height(), 9);
    }
}
