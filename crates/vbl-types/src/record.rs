use serde::{Deserialize, Serialize};

use crate::identity::Principal;
use crate::{BlockNumber, RevisionId};

/// Owner-controlled mutability flags.
///
/// All four are monotonic: `updatable`, `retractable`, and `transferable`
/// only ever move true → false; `enforce_revisions` only false → true. The
/// engine's setters drive each flag to its terminal value and nothing in the
/// system moves one back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobFlags {
    /// New revisions may be appended and, while revisions are not enforced,
    /// the latest replaced or retracted.
    pub updatable: bool,
    /// Once set, the latest revision may be neither replaced nor retracted:
    /// every further change must be a new appended revision.
    pub enforce_revisions: bool,
    /// The blob may be permanently retracted.
    pub retractable: bool,
    /// Ownership may be transferred or renounced.
    pub transferable: bool,
}

impl BlobFlags {
    /// Every freedom granted, nothing enforced.
    pub fn permissive() -> Self {
        Self {
            updatable: true,
            enforce_revisions: false,
            retractable: true,
            transferable: true,
        }
    }
}

/// Authoritative metadata for one live blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRecord {
    /// Mutability flags.
    pub flags: BlobFlags,
    /// Current owner; `None` for anonymous or disowned blobs.
    pub owner: Option<Principal>,
    /// Number of live revisions; at least 1 while the blob is live.
    pub revision_count: RevisionId,
    /// Block in which revision 0 was last published.
    pub creation_block: BlockNumber,
}

impl BlobRecord {
    /// A fresh record with a single revision published at `creation_block`.
    pub fn new(flags: BlobFlags, owner: Option<Principal>, creation_block: BlockNumber) -> Self {
        Self {
            flags,
            owner,
            revision_count: 1,
            creation_block,
        }
    }

    /// Revision id of the current latest revision.
    pub fn latest_revision(&self) -> RevisionId {
        self.revision_count - 1
    }
}

/// State of a blob id in the record table.
///
/// An id absent from the table was never created. Retraction leaves a
/// permanent tombstone so the id can never be reused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlobEntry {
    /// The blob exists and may be operated on.
    Live(BlobRecord),
    /// The blob was retracted; the id remains permanently claimed.
    Retracted,
}

impl BlobEntry {
    /// The live record, if any.
    pub fn as_live(&self) -> Option<&BlobRecord> {
        match self {
            Self::Live(record) => Some(record),
            Self::Retracted => None,
        }
    }

    /// Mutable access to the live record, if any.
    pub fn as_live_mut(&mut self) -> Option<&mut BlobRecord> {
        match self {
            Self::Live(record) => Some(record),
            Self::Retracted => None,
        }
    }

    /// Returns `true` for a tombstone.
    pub fn is_retracted(&self) -> bool {
        matches!(self, Self::Retracted)
    }
}

/// Read-model snapshot of one blob, as returned by the engine's `info`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobInfo {
    /// Current owner, if any.
    pub owner: Option<Principal>,
    /// Mutability flags.
    pub flags: BlobFlags,
    /// Number of live revisions.
    pub revision_count: RevisionId,
    /// Block numbers for revisions `0..revision_count`, in revision order.
    pub revision_blocks: Vec<BlockNumber>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_one_revision() {
        let record = BlobRecord::new(BlobFlags::permissive(), None, 77);
        assert_eq!(record.revision_count, 1);
        assert_eq!(record.latest_revision(), 0);
        assert_eq!(record.creation_block, 77);
        assert!(record.owner.is_none());
    }

    #[test]
    fn entry_accessors() {
        let mut live = BlobEntry::Live(BlobRecord::new(
            BlobFlags::permissive(),
            Some(Principal::from_raw([1; 32])),
            5,
        ));
        assert!(live.as_live().is_some());
        assert!(!live.is_retracted());

        live.as_live_mut().unwrap().revision_count = 3;
        assert_eq!(live.as_live().unwrap().latest_revision(), 2);

        let mut tomb = BlobEntry::Retracted;
        assert!(tomb.as_live().is_none());
        assert!(tomb.as_live_mut().is_none());
        assert!(tomb.is_retracted());
    }

    #[test]
    fn permissive_flags() {
        let flags = BlobFlags::permissive();
        assert!(flags.updatable);
        assert!(!flags.enforce_revisions);
        assert!(flags.retractable);
        assert!(flags.transferable);
    }

    #[test]
    fn serde_roundtrip() {
        let entry = BlobEntry::Live(BlobRecord::new(
            BlobFlags {
                updatable: true,
                enforce_revisions: true,
                retractable: false,
                transferable: false,
            },
            Some(Principal::from_raw([9; 32])),
            12,
        ));
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: BlobEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, parsed);
    }
}
