//! Append-only lifecycle log for the Versioned Blob Ledger (VBL).
//!
//! Every successful engine operation emits exactly one [`BlobEvent`] to an
//! [`EventLog`]. The log is the system's external observation surface:
//! content bytes travel only here, never through the record store, and
//! nothing appended is ever rewritten.
//!
//! Implementations:
//! - [`InMemoryEventLog`] for tests and embedding
//! - [`FileEventLog`] — crash-recoverable single-segment file log
//! - [`FanoutLog`] — decorator broadcasting appended events to subscribers

pub mod error;
pub mod event;
pub mod fanout;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{LogError, LogResult};
pub use event::{BlobEvent, EventId, EventKind, EventPayload};
pub use fanout::{EventFilter, EventStream, FanoutLog};
pub use file::{FileEventLog, FileLogConfig, SyncMode};
pub use memory::InMemoryEventLog;
pub use traits::EventLog;
