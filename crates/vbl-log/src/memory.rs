use std::collections::HashMap;
use std::sync::RwLock;

use vbl_types::BlobId;

use crate::error::LogResult;
use crate::event::BlobEvent;
use crate::traits::EventLog;

/// In-memory, Vec-backed event log.
///
/// Intended for tests and embedding. Events are held in append order behind
/// a `RwLock`, with a per-blob index for filtered reads.
pub struct InMemoryEventLog {
    inner: RwLock<LogState>,
}

#[derive(Default)]
struct LogState {
    events: Vec<BlobEvent>,
    by_blob: HashMap<BlobId, Vec<usize>>,
}

impl InMemoryEventLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LogState::default()),
        }
    }
}

impl Default for InMemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog for InMemoryEventLog {
    fn append(&self, event: &BlobEvent) -> LogResult<()> {
        let mut state = self.inner.write().expect("log lock poisoned");
        let position = state.events.len();
        state.events.push(event.clone());
        state.by_blob.entry(event.blob).or_default().push(position);
        Ok(())
    }

    fn read_blob(&self, blob: &BlobId) -> LogResult<Vec<BlobEvent>> {
        let state = self.inner.read().expect("log lock poisoned");
        let events = state
            .by_blob
            .get(blob)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&position| state.events[position].clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(events)
    }

    fn read_all(&self) -> LogResult<Vec<BlobEvent>> {
        let state = self.inner.read().expect("log lock poisoned");
        Ok(state.events.clone())
    }

    fn len(&self) -> LogResult<u64> {
        let state = self.inner.read().expect("log lock poisoned");
        Ok(state.events.len() as u64)
    }
}

impl std::fmt::Debug for InMemoryEventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.inner.read().expect("log lock poisoned").events.len();
        f.debug_struct("InMemoryEventLog")
            .field("event_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, EventPayload};

    fn blob(seed: u8) -> BlobId {
        BlobId::from_raw([seed; 32])
    }

    fn content_event(seed: u8, block: u32) -> BlobEvent {
        BlobEvent::new(
            blob(seed),
            block,
            EventKind::ContentPublished,
            EventPayload::Content {
                revision: 0,
                bytes: vec![seed],
            },
        )
    }

    #[test]
    fn append_preserves_order() {
        let log = InMemoryEventLog::new();
        log.append(&content_event(1, 10)).unwrap();
        log.append(&content_event(2, 11)).unwrap();
        log.append(&content_event(1, 12)).unwrap();

        let all = log.read_all().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].block, 10);
        assert_eq!(all[2].block, 12);
    }

    #[test]
    fn read_blob_filters_by_blob() {
        let log = InMemoryEventLog::new();
        log.append(&content_event(1, 10)).unwrap();
        log.append(&content_event(2, 11)).unwrap();
        log.append(&content_event(1, 12)).unwrap();

        let one = log.read_blob(&blob(1)).unwrap();
        assert_eq!(one.len(), 2);
        assert!(one.iter().all(|e| e.blob == blob(1)));

        assert!(log.read_blob(&blob(9)).unwrap().is_empty());
    }

    #[test]
    fn len_and_is_empty() {
        let log = InMemoryEventLog::new();
        assert!(log.is_empty().unwrap());
        log.append(&content_event(1, 1)).unwrap();
        assert_eq!(log.len().unwrap(), 1);
        assert!(!log.is_empty().unwrap());
    }

    #[test]
    fn concurrent_appends_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let log = Arc::new(InMemoryEventLog::new());
        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for block in 0..25 {
                        log.append(&content_event(i, block)).unwrap();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(log.len().unwrap(), 100);
    }
}
