//! Read-only queries over engine state.

use vbl_types::{BlobId, BlobInfo, BlockNumber, Principal, RevisionId};

use crate::engine::BlobEngine;
use crate::error::EngineResult;
use crate::guards;

impl BlobEngine {
    /// Whether `blob` currently exists (created and not retracted).
    pub fn exists(&self, blob: &BlobId) -> bool {
        let state = self.state.read().expect("engine lock poisoned");
        state.live(blob).is_ok()
    }

    /// Full read-model snapshot of one blob.
    pub fn info(&self, blob: &BlobId) -> EngineResult<BlobInfo> {
        let state = self.state.read().expect("engine lock poisoned");
        let record = state.live(blob)?;

        let mut revision_blocks = Vec::with_capacity(record.revision_count as usize);
        revision_blocks.push(record.creation_block);
        revision_blocks.extend(state.index.blocks(blob, record.revision_count));

        Ok(BlobInfo {
            owner: record.owner,
            flags: record.flags,
            revision_count: record.revision_count,
            revision_blocks,
        })
    }

    /// The blob's current owner, `None` for anonymous or disowned blobs.
    pub fn owner(&self, blob: &BlobId) -> EngineResult<Option<Principal>> {
        let state = self.state.read().expect("engine lock poisoned");
        Ok(state.live(blob)?.owner)
    }

    /// Number of live revisions.
    pub fn revision_count(&self, blob: &BlobId) -> EngineResult<RevisionId> {
        let state = self.state.read().expect("engine lock poisoned");
        Ok(state.live(blob)?.revision_count)
    }

    /// Block number in which `revision` was last published.
    pub fn revision_block_number(
        &self,
        blob: &BlobId,
        revision: RevisionId,
    ) -> EngineResult<BlockNumber> {
        let state = self.state.read().expect("engine lock poisoned");
        let record = state.live(blob)?;
        guards::revision_in_range(record, revision)?;

        if revision == 0 {
            Ok(record.creation_block)
        } else {
            Ok(state.index.lookup(blob, revision))
        }
    }

    /// Block numbers for every live revision, in revision order.
    pub fn all_revision_block_numbers(&self, blob: &BlobId) -> EngineResult<Vec<BlockNumber>> {
        Ok(self.info(blob)?.revision_blocks)
    }

    /// Whether the blob still accepts revision changes.
    pub fn is_updatable(&self, blob: &BlobId) -> EngineResult<bool> {
        let state = self.state.read().expect("engine lock poisoned");
        Ok(state.live(blob)?.flags.updatable)
    }

    /// Whether the blob forbids in-place revision changes.
    pub fn enforces_revisions(&self, blob: &BlobId) -> EngineResult<bool> {
        let state = self.state.read().expect("engine lock poisoned");
        Ok(state.live(blob)?.flags.enforce_revisions)
    }

    /// Whether the blob may be permanently retracted.
    pub fn is_retractable(&self, blob: &BlobId) -> EngineResult<bool> {
        let state = self.state.read().expect("engine lock poisoned");
        Ok(state.live(blob)?.flags.retractable)
    }

    /// Whether ownership of the blob may still move.
    pub fn is_transferable(&self, blob: &BlobId) -> EngineResult<bool> {
        let state = self.state.read().expect("engine lock poisoned");
        Ok(state.live(blob)?.flags.transferable)
    }

    /// Whether `recipient` currently consents to receive `blob`.
    pub fn transfer_enabled(&self, blob: &BlobId, recipient: &Principal) -> bool {
        let state = self.state.read().expect("engine lock poisoned");
        state.consents.contains(&(*blob, *recipient))
    }
}
