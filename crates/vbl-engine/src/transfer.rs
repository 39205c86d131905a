//! Ownership handshake and the monotonic flag setters.

use tracing::{debug, info};

use vbl_log::{EventKind, EventPayload};
use vbl_types::{BlobFlags, BlobId, Principal};

use crate::engine::BlobEngine;
use crate::error::{EngineError, EngineResult};
use crate::guards;

impl BlobEngine {
    /// Record the caller's consent to receive ownership of `blob`.
    ///
    /// Deliberately unguarded: consent may be recorded before the blob
    /// exists or becomes transferable, and is validated only when the owner
    /// calls [`transfer`](BlobEngine::transfer).
    pub fn transfer_enable(&self, caller: Principal, blob: BlobId) -> EngineResult<()> {
        let mut state = self.state.write().expect("engine lock poisoned");
        state.consents.insert((blob, caller));
        debug!(blob = %blob, recipient = %caller, "transfer enabled");
        Ok(())
    }

    /// Withdraw a previously recorded consent.
    pub fn transfer_disable(&self, caller: Principal, blob: BlobId) -> EngineResult<()> {
        let mut state = self.state.write().expect("engine lock poisoned");
        if !state.consents.remove(&(blob, caller)) {
            return Err(EngineError::TransferNotEnabled);
        }
        debug!(blob = %blob, recipient = %caller, "transfer disabled");
        Ok(())
    }

    /// Transfer ownership to a consenting recipient.
    ///
    /// The consent entry is consumed: a second transfer to the same
    /// recipient needs a fresh [`transfer_enable`](BlobEngine::transfer_enable).
    pub fn transfer(
        &self,
        caller: Principal,
        blob: BlobId,
        recipient: Principal,
    ) -> EngineResult<()> {
        let block = self.clock.block_number();
        let mut state = self.state.write().expect("engine lock poisoned");

        let record = state.live(&blob)?;
        guards::owned_by(record, &caller)?;
        guards::transferable(record)?;
        guards::transfer_enabled(&state, &blob, &recipient)?;

        self.append_event(
            blob,
            block,
            EventKind::OwnershipTransferred,
            EventPayload::Recipient { recipient },
        )?;

        state.consents.remove(&(blob, recipient));
        state.live_mut(&blob)?.owner = Some(recipient);

        info!(blob = %blob, recipient = %recipient, "ownership transferred");
        Ok(())
    }

    /// Renounce ownership of `blob`.
    ///
    /// Irreversible: an ownerless record matches no caller, so the blob
    /// stays ownerless for good.
    pub fn disown(&self, caller: Principal, blob: BlobId) -> EngineResult<()> {
        let block = self.clock.block_number();
        let mut state = self.state.write().expect("engine lock poisoned");

        let record = state.live(&blob)?;
        guards::owned_by(record, &caller)?;
        guards::transferable(record)?;

        self.append_event(blob, block, EventKind::OwnershipRenounced, EventPayload::Empty)?;

        state.live_mut(&blob)?.owner = None;

        info!(blob = %blob, "ownership renounced");
        Ok(())
    }

    /// Permanently clear the `updatable` flag. Idempotent.
    pub fn set_not_updatable(&self, caller: Principal, blob: BlobId) -> EngineResult<()> {
        self.set_flag(caller, blob, EventKind::UpdatableCleared, |flags| {
            flags.updatable = false;
        })
    }

    /// Permanently set the `enforce_revisions` flag. Idempotent.
    pub fn set_enforce_revisions(&self, caller: Principal, blob: BlobId) -> EngineResult<()> {
        self.set_flag(caller, blob, EventKind::RevisionsEnforced, |flags| {
            flags.enforce_revisions = true;
        })
    }

    /// Permanently clear the `retractable` flag. Idempotent.
    pub fn set_not_retractable(&self, caller: Principal, blob: BlobId) -> EngineResult<()> {
        self.set_flag(caller, blob, EventKind::RetractableCleared, |flags| {
            flags.retractable = false;
        })
    }

    /// Permanently clear the `transferable` flag. Idempotent.
    pub fn set_not_transferable(&self, caller: Principal, blob: BlobId) -> EngineResult<()> {
        self.set_flag(caller, blob, EventKind::TransferableCleared, |flags| {
            flags.transferable = false;
        })
    }

    /// Shared flag-setter body: owner-gated, unconditionally drives the flag
    /// to its terminal value, emits the dedicated event either way.
    fn set_flag(
        &self,
        caller: Principal,
        blob: BlobId,
        kind: EventKind,
        apply: fn(&mut BlobFlags),
    ) -> EngineResult<()> {
        let block = self.clock.block_number();
        let mut state = self.state.write().expect("engine lock poisoned");

        let record = state.live(&blob)?;
        guards::owned_by(record, &caller)?;

        self.append_event(blob, block, kind, EventPayload::Empty)?;

        apply(&mut state.live_mut(&blob)?.flags);

        debug!(blob = %blob, event = %kind, "flag driven to terminal value");
        Ok(())
    }
}
