use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use vbl_index::slot::FIELDS_PER_SLOT;
use vbl_log::{BlobEvent, EventKind, EventLog, EventPayload};
use vbl_types::{
    BlobEntry, BlobFlags, BlobId, BlobRecord, BlockNumber, InstanceId, Principal, RevisionId,
};

use crate::chain::BlockClock;
use crate::directory::InstanceDirectory;
use crate::error::{EngineError, EngineResult};
use crate::guards;
use crate::state::EngineState;

/// Transactionally-serialized engine over versioned blob records.
///
/// One lock spans the whole mutable state (records, packed index, consents),
/// so operations apply one at a time in a total order — the same guarantee
/// the ledger's execution model provides. Within an operation the lifecycle
/// event is appended before any state mutation; since mutations cannot fail
/// after the guards pass, either everything commits or nothing does.
pub struct BlobEngine {
    instance: InstanceId,
    pub(crate) clock: Arc<dyn BlockClock>,
    log: Arc<dyn EventLog>,
    pub(crate) state: RwLock<EngineState>,
}

impl BlobEngine {
    /// Construct the engine.
    ///
    /// The instance identity is derived from `address` and the previous
    /// block's hash, then registered with `directory` so identities stay
    /// globally unique across deployed instances.
    pub fn new(
        address: Principal,
        clock: Arc<dyn BlockClock>,
        directory: Arc<dyn InstanceDirectory>,
        log: Arc<dyn EventLog>,
    ) -> Self {
        let instance = InstanceId::derive(&address, &clock.parent_hash());
        directory.register(instance);
        info!(instance = %instance, "blob engine constructed");

        Self {
            instance,
            clock,
            log,
            state: RwLock::new(EngineState::default()),
        }
    }

    /// The 96-bit identity embedded in every id this engine mints.
    pub fn instance_id(&self) -> InstanceId {
        self.instance
    }

    pub(crate) fn append_event(
        &self,
        blob: BlobId,
        block: BlockNumber,
        kind: EventKind,
        payload: EventPayload,
    ) -> EngineResult<()> {
        let event = BlobEvent::new(blob, block, kind, payload);
        self.log
            .append(&event)
            .map_err(|e| EngineError::Log(e.to_string()))
    }

    /// Create a new blob under a caller-chosen nonce.
    ///
    /// Fails with [`EngineError::DuplicateId`] when the derived id was ever
    /// claimed before — including by a since-retracted blob, whose tombstone
    /// keeps the id out of circulation forever.
    pub fn create(
        &self,
        caller: Principal,
        content: Vec<u8>,
        nonce: u64,
        flags: BlobFlags,
        anonymous: bool,
    ) -> EngineResult<BlobId> {
        let blob = BlobId::mint(&self.instance, &caller, nonce);
        let block = self.clock.block_number();

        let mut state = self.state.write().expect("engine lock poisoned");
        if state.records.contains_key(&blob) {
            return Err(EngineError::DuplicateId);
        }

        self.append_event(
            blob,
            block,
            EventKind::ContentPublished,
            EventPayload::Content {
                revision: 0,
                bytes: content,
            },
        )?;

        let owner = if anonymous { None } else { Some(caller) };
        state
            .records
            .insert(blob, BlobEntry::Live(BlobRecord::new(flags, owner, block)));

        debug!(blob = %blob, block, anonymous, "blob created");
        Ok(blob)
    }

    /// Append a new revision, returning its revision id.
    pub fn create_new_revision(
        &self,
        caller: Principal,
        blob: BlobId,
        content: Vec<u8>,
    ) -> EngineResult<RevisionId> {
        let block = self.clock.block_number();
        let mut state = self.state.write().expect("engine lock poisoned");

        let record = state.live(&blob)?;
        guards::owned_by(record, &caller)?;
        guards::updatable(record)?;
        let revision = record.revision_count;

        self.append_event(
            blob,
            block,
            EventKind::ContentPublished,
            EventPayload::Content {
                revision,
                bytes: content,
            },
        )?;

        state.index.record(blob, revision, block);
        state.live_mut(&blob)?.revision_count += 1;

        debug!(blob = %blob, revision, block, "revision appended");
        Ok(revision)
    }

    /// Replace the latest revision's content in place.
    ///
    /// The revision keeps its id; only its recorded block number moves to
    /// the current block. The revision count is unchanged.
    pub fn update_latest_revision(
        &self,
        caller: Principal,
        blob: BlobId,
        content: Vec<u8>,
    ) -> EngineResult<()> {
        let block = self.clock.block_number();
        let mut state = self.state.write().expect("engine lock poisoned");

        let record = state.live(&blob)?;
        guards::owned_by(record, &caller)?;
        guards::updatable(record)?;
        guards::revisions_not_enforced(record)?;
        let revision = record.latest_revision();

        self.append_event(
            blob,
            block,
            EventKind::ContentPublished,
            EventPayload::Content {
                revision,
                bytes: content,
            },
        )?;

        if revision == 0 {
            state.live_mut(&blob)?.creation_block = block;
        } else {
            state.index.record(blob, revision, block);
        }

        debug!(blob = %blob, revision, block, "latest revision replaced");
        Ok(())
    }

    /// Retract the latest revision, forgetting its block pointer.
    ///
    /// Revision 0 can never be retracted this way. The log entry that
    /// carried the content remains — logs are immutable — only the pointer
    /// is dropped.
    pub fn retract_latest_revision(&self, caller: Principal, blob: BlobId) -> EngineResult<()> {
        let block = self.clock.block_number();
        let mut state = self.state.write().expect("engine lock poisoned");

        let record = state.live(&blob)?;
        guards::owned_by(record, &caller)?;
        guards::updatable(record)?;
        guards::revisions_not_enforced(record)?;
        guards::has_additional_revisions(record)?;
        let removed = record.latest_revision();

        self.append_event(
            blob,
            block,
            EventKind::RevisionRetracted,
            EventPayload::Revision { revision: removed },
        )?;

        let record = state.live_mut(&blob)?;
        record.revision_count -= 1;
        let remaining = record.revision_count;

        if remaining % FIELDS_PER_SLOT == 1 {
            // The removed revision was alone in its slot; reclaim the slot.
            state.index.release_slot(&blob, removed);
        } else {
            state.index.erase(&blob, removed);
        }

        debug!(blob = %blob, revision = removed, "latest revision retracted");
        Ok(())
    }

    /// Discard all revision history and publish `content` as a fresh
    /// revision 0, keeping the same id, owner, and flags.
    pub fn restart(&self, caller: Principal, blob: BlobId, content: Vec<u8>) -> EngineResult<()> {
        let block = self.clock.block_number();
        let mut state = self.state.write().expect("engine lock poisoned");

        let record = state.live(&blob)?;
        guards::owned_by(record, &caller)?;
        guards::updatable(record)?;
        guards::revisions_not_enforced(record)?;
        let count = record.revision_count;

        self.append_event(
            blob,
            block,
            EventKind::ContentPublished,
            EventPayload::Content {
                revision: 0,
                bytes: content,
            },
        )?;

        state.index.clear(&blob, count);
        let record = state.live_mut(&blob)?;
        record.revision_count = 1;
        record.creation_block = block;

        info!(blob = %blob, block, "blob restarted");
        Ok(())
    }

    /// Permanently retract the blob, tombstoning its id.
    ///
    /// Terminal: the existence guard treats the tombstone as missing, so no
    /// later operation on this id ever succeeds.
    pub fn retract(&self, caller: Principal, blob: BlobId) -> EngineResult<()> {
        let block = self.clock.block_number();
        let mut state = self.state.write().expect("engine lock poisoned");

        let record = state.live(&blob)?;
        guards::owned_by(record, &caller)?;
        guards::retractable(record)?;
        let count = record.revision_count;

        self.append_event(blob, block, EventKind::BlobRetracted, EventPayload::Empty)?;

        state.index.clear(&blob, count);
        state.records.insert(blob, BlobEntry::Retracted);

        info!(blob = %blob, "blob retracted");
        Ok(())
    }
}
