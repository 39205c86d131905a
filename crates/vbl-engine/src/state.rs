//! Mutable engine state: the record table, the packed revision index, and
//! the transfer-consent table.
//!
//! All access is serialized by the engine's single lock, reproducing the
//! ledger's one-operation-at-a-time execution model.

use std::collections::{HashMap, HashSet};

use vbl_index::PackedRevisionIndex;
use vbl_types::{BlobEntry, BlobId, BlobRecord, Principal};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Default)]
pub(crate) struct EngineState {
    /// Authoritative entry per claimed blob id (live or tombstoned).
    pub records: HashMap<BlobId, BlobEntry>,
    /// Packed per-revision creation block numbers.
    pub index: PackedRevisionIndex,
    /// Recorded transfer consents: (blob, prospective recipient).
    pub consents: HashSet<(BlobId, Principal)>,
}

impl EngineState {
    /// The live record for `blob`.
    ///
    /// Unknown and tombstoned ids both report [`EngineError::NotFound`]:
    /// once retracted, an id is gone for good.
    pub fn live(&self, blob: &BlobId) -> EngineResult<&BlobRecord> {
        match self.records.get(blob) {
            Some(BlobEntry::Live(record)) => Ok(record),
            _ => Err(EngineError::NotFound),
        }
    }

    /// Mutable access to the live record for `blob`.
    pub fn live_mut(&mut self, blob: &BlobId) -> EngineResult<&mut BlobRecord> {
        match self.records.get_mut(blob) {
            Some(BlobEntry::Live(record)) => Ok(record),
            _ => Err(EngineError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbl_types::BlobFlags;

    fn blob(seed: u8) -> BlobId {
        BlobId::from_raw([seed; 32])
    }

    #[test]
    fn live_rejects_unknown_and_tombstoned() {
        let mut state = EngineState::default();
        assert_eq!(state.live(&blob(1)), Err(EngineError::NotFound));

        state.records.insert(blob(1), BlobEntry::Retracted);
        assert_eq!(state.live(&blob(1)), Err(EngineError::NotFound));
        assert_eq!(state.live_mut(&blob(1)), Err(EngineError::NotFound));
    }

    #[test]
    fn live_returns_record() {
        let mut state = EngineState::default();
        let record = BlobRecord::new(BlobFlags::permissive(), None, 5);
        state.records.insert(blob(2), BlobEntry::Live(record.clone()));

        assert_eq!(state.live(&blob(2)), Ok(&record));
        state.live_mut(&blob(2)).unwrap().revision_count = 2;
        assert_eq!(state.live(&blob(2)).unwrap().revision_count, 2);
    }
}
