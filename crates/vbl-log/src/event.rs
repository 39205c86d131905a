use serde::{Deserialize, Serialize};

use vbl_types::{BlobId, BlockNumber, Principal, RevisionId};

/// Unique identifier for a lifecycle event.
///
/// A BLAKE3 hash of the event content, making events content-addressable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    /// Content hash of the event (BLAKE3).
    pub hash: [u8; 32],
}

impl EventId {
    /// Create an `EventId` from a raw hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self { hash }
    }

    /// Short hex representation (first 8 hex chars).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.hash[..4])
    }

    /// Full hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "evt:{}", self.short_hex())
    }
}

/// Classification of blob lifecycle events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Content was published for a revision (creation, append, replacement,
    /// or restart).
    ContentPublished,
    /// The latest revision was retracted.
    RevisionRetracted,
    /// The whole blob was permanently retracted.
    BlobRetracted,
    /// Ownership moved to a consenting recipient.
    OwnershipTransferred,
    /// The owner renounced ownership.
    OwnershipRenounced,
    /// The `updatable` flag reached its terminal value.
    UpdatableCleared,
    /// The `enforce_revisions` flag reached its terminal value.
    RevisionsEnforced,
    /// The `retractable` flag reached its terminal value.
    RetractableCleared,
    /// The `transferable` flag reached its terminal value.
    TransferableCleared,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ContentPublished => "ContentPublished",
            Self::RevisionRetracted => "RevisionRetracted",
            Self::BlobRetracted => "BlobRetracted",
            Self::OwnershipTransferred => "OwnershipTransferred",
            Self::OwnershipRenounced => "OwnershipRenounced",
            Self::UpdatableCleared => "UpdatableCleared",
            Self::RevisionsEnforced => "RevisionsEnforced",
            Self::RetractableCleared => "RetractableCleared",
            Self::TransferableCleared => "TransferableCleared",
        };
        write!(f, "{s}")
    }
}

/// Payload data carried by a lifecycle event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    /// Empty payload (the event kind is self-describing).
    Empty,
    /// Published content for one revision.
    Content {
        revision: RevisionId,
        bytes: Vec<u8>,
    },
    /// A revision reference without content.
    Revision { revision: RevisionId },
    /// The recipient of an ownership transfer.
    Recipient { recipient: Principal },
}

/// A single event in the lifecycle log.
///
/// Every event carries the blob it pertains to, the block number of the
/// transaction that produced it, a classification kind, a payload, and a
/// BLAKE3 integrity hash over the serialized core fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobEvent {
    /// Unique event identifier (content-addressed).
    pub id: EventId,
    /// The blob this event pertains to.
    pub blob: BlobId,
    /// Block number of the transaction that emitted the event.
    pub block: BlockNumber,
    /// Classification of this event.
    pub kind: EventKind,
    /// Event-specific payload data.
    pub payload: EventPayload,
    /// BLAKE3 integrity hash over (blob, block, kind, payload).
    pub integrity_hash: [u8; 32],
}

impl BlobEvent {
    /// Build a new `BlobEvent`, computing its integrity hash and event ID.
    pub fn new(blob: BlobId, block: BlockNumber, kind: EventKind, payload: EventPayload) -> Self {
        let integrity_hash = Self::compute_integrity(&blob, block, &kind, &payload);
        let id = EventId::from_hash(integrity_hash);
        Self {
            id,
            blob,
            block,
            kind,
            payload,
            integrity_hash,
        }
    }

    /// Verify the event's integrity hash matches its content.
    pub fn verify_integrity(&self) -> bool {
        let expected = Self::compute_integrity(&self.blob, self.block, &self.kind, &self.payload);
        self.integrity_hash == expected
    }

    /// Compute the BLAKE3 integrity hash over the event's core fields.
    fn compute_integrity(
        blob: &BlobId,
        block: BlockNumber,
        kind: &EventKind,
        payload: &EventPayload,
    ) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"vbl-event-v1:");

        hasher.update(blob.as_bytes());
        hasher.update(&block.to_le_bytes());

        // Hash the kind via bincode
        if let Ok(kind_bytes) = bincode::serialize(kind) {
            hasher.update(&kind_bytes);
        }

        // Hash the payload via bincode
        if let Ok(payload_bytes) = bincode::serialize(payload) {
            hasher.update(&payload_bytes);
        }

        *hasher.finalize().as_bytes()
    }
}
