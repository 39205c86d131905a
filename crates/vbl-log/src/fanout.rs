use std::sync::RwLock;

use tokio::sync::broadcast;

use vbl_types::BlobId;

use crate::error::LogResult;
use crate::event::{BlobEvent, EventKind};
use crate::traits::EventLog;

/// Filter for subscribing to a subset of lifecycle events.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    /// If set, only events for these blobs are delivered.
    pub blobs: Option<Vec<BlobId>>,
    /// If set, only events of these kinds are delivered.
    pub kinds: Option<Vec<EventKind>>,
}

impl EventFilter {
    /// Returns `true` if the given event matches this filter.
    pub fn matches(&self, event: &BlobEvent) -> bool {
        if let Some(ref blobs) = self.blobs {
            if !blobs.contains(&event.blob) {
                return false;
            }
        }
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&event.kind) {
                return false;
            }
        }
        true
    }
}

/// A broadcast channel receiver for lifecycle events.
pub type EventStream = broadcast::Receiver<BlobEvent>;

/// Internal subscriber: a filter paired with a broadcast sender.
struct Subscriber {
    filter: EventFilter,
    sender: broadcast::Sender<BlobEvent>,
}

/// Log decorator that fans appended events out to live subscribers.
///
/// Appends go to the inner log first (write-ahead); only events the inner
/// log accepted are broadcast. Reads delegate to the inner log.
pub struct FanoutLog<L> {
    inner: L,
    subscribers: RwLock<Vec<Subscriber>>,
    channel_capacity: usize,
}

impl<L: EventLog> FanoutLog<L> {
    /// Wrap `inner` with the default per-subscriber channel capacity.
    pub fn new(inner: L) -> Self {
        Self::with_capacity(inner, 1024)
    }

    /// Wrap `inner` with an explicit per-subscriber channel capacity.
    pub fn with_capacity(inner: L, channel_capacity: usize) -> Self {
        Self {
            inner,
            subscribers: RwLock::new(Vec::new()),
            channel_capacity,
        }
    }

    /// Subscribe to events matching the given filter.
    pub fn subscribe(&self, filter: EventFilter) -> EventStream {
        let (tx, rx) = broadcast::channel(self.channel_capacity);
        self.subscribers
            .write()
            .expect("fanout lock poisoned")
            .push(Subscriber { filter, sender: tx });
        rx
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .expect("fanout lock poisoned")
            .len()
    }

    /// The wrapped log.
    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Route an event to all matching subscribers.
    /// Subscribers whose channels are closed are pruned.
    fn route(&self, event: &BlobEvent) {
        let mut subs = self.subscribers.write().expect("fanout lock poisoned");
        subs.retain(|sub| {
            if sub.filter.matches(event) {
                // If send fails (no receivers), the subscriber is stale.
                sub.sender.send(event.clone()).is_ok()
            } else {
                // Keep non-matching subscribers; they may match future events.
                // Only prune if the channel itself is closed.
                sub.sender.receiver_count() > 0
            }
        });
    }
}

impl<L: EventLog> EventLog for FanoutLog<L> {
    fn append(&self, event: &BlobEvent) -> LogResult<()> {
        self.inner.append(event)?;
        self.route(event);
        Ok(())
    }

    fn read_blob(&self, blob: &BlobId) -> LogResult<Vec<BlobEvent>> {
        self.inner.read_blob(blob)
    }

    fn read_all(&self) -> LogResult<Vec<BlobEvent>> {
        self.inner.read_all()
    }

    fn len(&self) -> LogResult<u64> {
        self.inner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventPayload;
    use crate::memory::InMemoryEventLog;

    fn blob(seed: u8) -> BlobId {
        BlobId::from_raw([seed; 32])
    }

    fn event(seed: u8, kind: EventKind) -> BlobEvent {
        BlobEvent::new(blob(seed), 1, kind, EventPayload::Empty)
    }

    #[test]
    fn subscriber_receives_matching_events() {
        let log = FanoutLog::new(InMemoryEventLog::new());
        let filter = EventFilter {
            kinds: Some(vec![EventKind::BlobRetracted]),
            ..Default::default()
        };
        let mut stream = log.subscribe(filter);
        assert_eq!(log.subscriber_count(), 1);

        log.append(&event(1, EventKind::BlobRetracted)).unwrap();
        log.append(&event(1, EventKind::OwnershipRenounced)).unwrap();

        let received = stream.try_recv().unwrap();
        assert_eq!(received.kind, EventKind::BlobRetracted);
        assert!(stream.try_recv().is_err());
    }

    #[test]
    fn subscriber_blob_filter() {
        let log = FanoutLog::new(InMemoryEventLog::new());
        let filter = EventFilter {
            blobs: Some(vec![blob(1)]),
            ..Default::default()
        };
        let mut stream = log.subscribe(filter);

        log.append(&event(1, EventKind::ContentPublished)).unwrap();
        log.append(&event(2, EventKind::ContentPublished)).unwrap();

        let received = stream.try_recv().unwrap();
        assert_eq!(received.blob, blob(1));
        assert!(stream.try_recv().is_err());
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = EventFilter::default();
        assert!(filter.matches(&event(7, EventKind::RevisionsEnforced)));
    }

    #[test]
    fn reads_delegate_to_inner_log() {
        let log = FanoutLog::new(InMemoryEventLog::new());
        log.append(&event(1, EventKind::ContentPublished)).unwrap();
        log.append(&event(2, EventKind::ContentPublished)).unwrap();

        assert_eq!(log.len().unwrap(), 2);
        assert_eq!(log.read_all().unwrap().len(), 2);
        assert_eq!(log.read_blob(&blob(1)).unwrap().len(), 1);
        assert_eq!(log.inner().len().unwrap(), 2);
    }
}
