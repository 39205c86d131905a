//! Composable precondition guards.
//!
//! Every mutating operation runs an ordered subset of these checks before
//! touching state; the first failure aborts the whole operation with that
//! error alone. Existence is always checked first — the engine obtains the
//! live record via [`EngineState::live`](crate::state::EngineState) before
//! any other guard runs.

use vbl_types::{BlobId, BlobRecord, Principal, RevisionId};

use crate::error::{EngineError, EngineResult};
use crate::state::EngineState;

/// The caller is the blob's current owner.
///
/// An ownerless record (anonymous or disowned) matches no caller, so such
/// blobs permanently fail every owner-gated operation.
pub(crate) fn owned_by(record: &BlobRecord, caller: &Principal) -> EngineResult<()> {
    if record.owner.as_ref() == Some(caller) {
        Ok(())
    } else {
        Err(EngineError::NotOwner)
    }
}

/// The blob still accepts revision changes.
pub(crate) fn updatable(record: &BlobRecord) -> EngineResult<()> {
    if record.flags.updatable {
        Ok(())
    } else {
        Err(EngineError::NotUpdatable)
    }
}

/// Revisions are not enforced; in-place replacement is still allowed.
pub(crate) fn revisions_not_enforced(record: &BlobRecord) -> EngineResult<()> {
    if record.flags.enforce_revisions {
        Err(EngineError::EnforcesRevisions)
    } else {
        Ok(())
    }
}

/// The blob may be permanently retracted.
pub(crate) fn retractable(record: &BlobRecord) -> EngineResult<()> {
    if record.flags.retractable {
        Ok(())
    } else {
        Err(EngineError::NotRetractable)
    }
}

/// Ownership of the blob may still move.
pub(crate) fn transferable(record: &BlobRecord) -> EngineResult<()> {
    if record.flags.transferable {
        Ok(())
    } else {
        Err(EngineError::NotTransferable)
    }
}

/// Consent is currently recorded for (blob, recipient).
pub(crate) fn transfer_enabled(
    state: &EngineState,
    blob: &BlobId,
    recipient: &Principal,
) -> EngineResult<()> {
    if state.consents.contains(&(*blob, *recipient)) {
        Ok(())
    } else {
        Err(EngineError::TransferNotEnabled)
    }
}

/// The blob has at least one revision beyond revision 0.
pub(crate) fn has_additional_revisions(record: &BlobRecord) -> EngineResult<()> {
    if record.revision_count > 1 {
        Ok(())
    } else {
        Err(EngineError::NoAdditionalRevisions)
    }
}

/// `revision` indexes an existing revision of the blob.
pub(crate) fn revision_in_range(record: &BlobRecord, revision: RevisionId) -> EngineResult<()> {
    if revision < record.revision_count {
        Ok(())
    } else {
        Err(EngineError::RevisionOutOfRange {
            revision,
            count: record.revision_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbl_types::BlobFlags;

    fn record(owner: Option<Principal>, flags: BlobFlags) -> BlobRecord {
        BlobRecord::new(flags, owner, 1)
    }

    fn caller(seed: u8) -> Principal {
        Principal::from_raw([seed; 32])
    }

    #[test]
    fn owned_by_matches_owner_only() {
        let r = record(Some(caller(1)), BlobFlags::permissive());
        assert_eq!(owned_by(&r, &caller(1)), Ok(()));
        assert_eq!(owned_by(&r, &caller(2)), Err(EngineError::NotOwner));
    }

    #[test]
    fn ownerless_record_matches_nobody() {
        let r = record(None, BlobFlags::permissive());
        assert_eq!(owned_by(&r, &caller(1)), Err(EngineError::NotOwner));
    }

    #[test]
    fn flag_guards() {
        let mut flags = BlobFlags::permissive();
        let r = record(None, flags);
        assert_eq!(updatable(&r), Ok(()));
        assert_eq!(revisions_not_enforced(&r), Ok(()));
        assert_eq!(retractable(&r), Ok(()));
        assert_eq!(transferable(&r), Ok(()));

        flags.updatable = false;
        flags.enforce_revisions = true;
        flags.retractable = false;
        flags.transferable = false;
        let r = record(None, flags);
        assert_eq!(updatable(&r), Err(EngineError::NotUpdatable));
        assert_eq!(revisions_not_enforced(&r), Err(EngineError::EnforcesRevisions));
        assert_eq!(retractable(&r), Err(EngineError::NotRetractable));
        assert_eq!(transferable(&r), Err(EngineError::NotTransferable));
    }

    #[test]
    fn transfer_enabled_reads_consent_table() {
        let mut state = EngineState::default();
        let blob = BlobId::from_raw([9; 32]);

        assert_eq!(
            transfer_enabled(&state, &blob, &caller(1)),
            Err(EngineError::TransferNotEnabled)
        );
        state.consents.insert((blob, caller(1)));
        assert_eq!(transfer_enabled(&state, &blob, &caller(1)), Ok(()));
        // Consent is per-recipient.
        assert_eq!(
            transfer_enabled(&state, &blob, &caller(2)),
            Err(EngineError::TransferNotEnabled)
        );
    }

    #[test]
    fn additional_revisions_requires_more_than_one() {
        let mut r = record(None, BlobFlags::permissive());
        assert_eq!(
            has_additional_revisions(&r),
            Err(EngineError::NoAdditionalRevisions)
        );
        r.revision_count = 2;
        assert_eq!(has_additional_revisions(&r), Ok(()));
    }

    #[test]
    fn revision_in_range_bounds_by_count() {
        let mut r = record(None, BlobFlags::permissive());
        r.revision_count = 3;
        assert_eq!(revision_in_range(&r, 0), Ok(()));
        assert_eq!(revision_in_range(&r, 2), Ok(()));
        assert_eq!(
            revision_in_range(&r, 3),
            Err(EngineError::RevisionOutOfRange {
                revision: 3,
                count: 3
            })
        );
    }
}
