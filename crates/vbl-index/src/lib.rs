//! Packed revision index for the Versioned Blob Ledger (VBL).
//!
//! Per-revision creation block numbers are kept storage-dense: one 256-bit
//! slot holds eight 32-bit block numbers. Revision 0's block number lives in
//! the blob record itself, so revision `r > 0` maps to slot `(r - 1) / 8`,
//! field `(r - 1) % 8`.
//!
//! The raw bit arithmetic is confined to [`slot`]; everything else addresses
//! the index by revision number.

pub mod slot;

mod index;

pub use index::{occupied_slots, PackedRevisionIndex};
