//! The blob engine for the Versioned Blob Ledger (VBL).
//!
//! [`BlobEngine`] orchestrates every public operation on versioned blobs:
//! creation, revision append and in-place replacement, retraction, the
//! two-phase ownership handshake, and the monotonic flag setters. Each
//! operation is atomic: guard checks run first, the lifecycle event is
//! appended to the log, and only then is state mutated. A failed guard or a
//! failed append leaves everything untouched.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use vbl_engine::{BlobEngine, InMemoryDirectory, ManualBlockClock};
//! use vbl_log::InMemoryEventLog;
//! use vbl_types::{BlobFlags, Principal};
//!
//! let engine = BlobEngine::new(
//!     Principal::from_raw([7u8; 32]),
//!     Arc::new(ManualBlockClock::new(1, [0u8; 32])),
//!     Arc::new(InMemoryDirectory::new()),
//!     Arc::new(InMemoryEventLog::new()),
//! );
//!
//! let alice = Principal::from_raw([1u8; 32]);
//! let blob = engine
//!     .create(alice, b"v0".to_vec(), 1, BlobFlags::permissive(), false)
//!     .unwrap();
//! assert_eq!(engine.revision_count(&blob).unwrap(), 1);
//! assert_eq!(engine.owner(&blob).unwrap(), Some(alice));
//! ```

pub mod chain;
pub mod directory;
pub mod error;

mod engine;
mod guards;
mod query;
mod state;
mod transfer;

pub use chain::{BlockClock, ManualBlockClock};
pub use directory::{InMemoryDirectory, InstanceDirectory};
pub use engine::BlobEngine;
pub use error::{EngineError, EngineResult};
