//! Foundation types for the Versioned Blob Ledger (VBL).
//!
//! This crate provides the identity and record types used throughout the VBL
//! system. Every other VBL crate depends on `vbl-types`.
//!
//! # Key Types
//!
//! - [`Principal`] — Opaque authenticated caller identity
//! - [`InstanceId`] — 96-bit store-instance identity fixed at construction
//! - [`BlobId`] — 256-bit globally unique blob identifier
//! - [`BlobRecord`] / [`BlobEntry`] — Authoritative per-blob metadata
//! - [`BlobFlags`] — Owner-controlled mutability flags (monotonic)
//! - [`BlobInfo`] — Read-model snapshot of one blob

pub mod error;
pub mod identity;
pub mod record;

pub use error::TypeError;
pub use identity::{BlobId, InstanceId, Principal};
pub use record::{BlobEntry, BlobFlags, BlobInfo, BlobRecord};

/// Block numbers are 32-bit: the packed revision index stores eight of them
/// per 256-bit slot.
pub type BlockNumber = u32;

/// Revision identifiers are dense indices starting at 0.
pub type RevisionId = u32;
