use vbl_types::BlobId;

use crate::error::LogResult;
use crate::event::BlobEvent;

/// Append-only sink for blob lifecycle events.
///
/// All implementations must satisfy these invariants:
/// - Events are immutable once appended; there is no update or delete.
/// - Append order is preserved: `read_all` returns events exactly as they
///   were appended.
/// - An `Err` from `append` means the event was not recorded; callers treat
///   this as an abort signal and roll nothing forward.
/// - Concurrent appends are safe (`Send + Sync`).
pub trait EventLog: Send + Sync {
    /// Append one event to the log.
    fn append(&self, event: &BlobEvent) -> LogResult<()>;

    /// All events for one blob, in append order.
    fn read_blob(&self, blob: &BlobId) -> LogResult<Vec<BlobEvent>>;

    /// The full log, in append order.
    fn read_all(&self) -> LogResult<Vec<BlobEvent>>;

    /// Number of events appended.
    fn len(&self) -> LogResult<u64>;

    /// Returns `true` if nothing has been appended.
    fn is_empty(&self) -> LogResult<bool> {
        Ok(self.len()? == 0)
    }
}
