// Path: crates/abci/src/events.rs

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tmpop_types::app::StoreEvent;
use tmpop_types::evidence::Evidence;
use tmpop_types::link::Link;
use tmpop_types::LinkHash;

/// Buffers store events until a client drains them with `PendingEvents`.
///
/// Shared between the consensus thread, which pushes, and query threads,
/// which drain. At most `max_buffered` events are kept; the oldest go first.
#[derive(Clone)]
pub struct EventsManager {
    events: Arc<Mutex<VecDeque<StoreEvent>>>,
    max_buffered: usize,
}

impl Default for EventsManager {
    fn default() -> Self {
        Self::new(tmpop_types::config::EventsConfig::default().max_buffered)
    }
}

impl EventsManager {
    /// Creates an empty buffer holding at most `max_buffered` events.
    pub fn new(max_buffered: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
            max_buffered,
        }
    }

    /// Records the links flushed by a Commit.
    pub fn push_links(&self, links: Vec<Link>) {
        if links.is_empty() {
            return;
        }
        self.push(StoreEvent::SavedLinks(links));
    }

    /// Records freshly produced evidences.
    pub fn push_evidences(&self, evidences: BTreeMap<LinkHash, Evidence>) {
        if evidences.is_empty() {
            return;
        }
        self.push(StoreEvent::SavedEvidences(evidences));
    }

    /// Removes and returns every buffered event, oldest first.
    pub fn drain(&self) -> Vec<StoreEvent> {
        self.lock().drain(..).collect()
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no event is buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, event: StoreEvent) {
        let mut events = self.lock();
        events.push_back(event);
        let mut dropped = 0usize;
        while events.len() > self.max_buffered {
            events.pop_front();
            dropped += 1;
        }
        if dropped > 0 {
            tracing::warn!(
                target: "abci",
                dropped,
                max_buffered = self.max_buffered,
                "events not drained, dropping oldest"
            );
        }
    }

    // A panic while holding the lock cannot leave a half-pushed event behind.
    fn lock(&self) -> MutexGuard<'_, VecDeque<StoreEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
