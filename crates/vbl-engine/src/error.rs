use vbl_types::RevisionId;

/// Errors produced by engine operations.
///
/// Guards run before any mutation, so every error here means the operation
/// had no effect: records, packed slots, consents, and the log are exactly
/// as they were before the attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The blob was never created, or was retracted.
    #[error("blob not found")]
    NotFound,

    /// The caller is not the blob's current owner.
    #[error("caller is not the owner")]
    NotOwner,

    /// The blob's `updatable` flag is cleared.
    #[error("blob is not updatable")]
    NotUpdatable,

    /// The blob enforces revisions; its latest revision can be neither
    /// replaced nor retracted in place.
    #[error("blob enforces revisions")]
    EnforcesRevisions,

    /// The blob's `retractable` flag is cleared.
    #[error("blob is not retractable")]
    NotRetractable,

    /// The blob's `transferable` flag is cleared.
    #[error("blob is not transferable")]
    NotTransferable,

    /// No transfer consent is recorded for the recipient.
    #[error("transfer not enabled for recipient")]
    TransferNotEnabled,

    /// The blob has only revision 0; there is nothing to retract.
    #[error("no additional revisions")]
    NoAdditionalRevisions,

    /// The requested revision does not exist.
    #[error("revision {revision} out of range; blob has {count} revisions")]
    RevisionOutOfRange {
        revision: RevisionId,
        count: RevisionId,
    },

    /// A blob already claims the id this nonce derives.
    #[error("duplicate blob id")]
    DuplicateId,

    /// The lifecycle log rejected the append; the operation was aborted
    /// before any state change.
    #[error("log append failed: {0}")]
    Log(String),
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
