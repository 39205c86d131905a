use std::collections::HashMap;

use primitive_types::U256;

use vbl_types::{BlobId, BlockNumber, RevisionId};

use crate::slot::{self, FIELDS_PER_SLOT};

/// Number of slots occupied by a blob with `revision_count` revisions.
///
/// Revision 0 is stored outside the index, so the count is
/// `ceil((revision_count - 1) / 8)`.
pub fn occupied_slots(revision_count: RevisionId) -> usize {
    if revision_count == 0 {
        return 0;
    }
    ((revision_count - 1) as usize).div_ceil(FIELDS_PER_SLOT as usize)
}

/// Bit-packed storage mapping (blob, revision > 0) to creation block number.
///
/// The index is plain owned state: the engine serializes all access behind
/// its own lock, so there is no interior locking here.
#[derive(Clone, Debug, Default)]
pub struct PackedRevisionIndex {
    slots: HashMap<BlobId, Vec<U256>>,
}

impl PackedRevisionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot index and field index for `revision`.
    fn position(revision: RevisionId) -> (usize, u32) {
        debug_assert!(revision > 0, "revision 0 lives in the blob record");
        let offset = revision - 1;
        ((offset / FIELDS_PER_SLOT) as usize, offset % FIELDS_PER_SLOT)
    }

    /// Record the creation block for `revision` of `blob`.
    pub fn record(&mut self, blob: BlobId, revision: RevisionId, block: BlockNumber) {
        let (slot_idx, field) = Self::position(revision);
        let slots = self.slots.entry(blob).or_default();
        if slots.len() <= slot_idx {
            slots.resize(slot_idx + 1, U256::zero());
        }
        slots[slot_idx] = slot::set_field(slots[slot_idx], field, block);
    }

    /// Look up the creation block recorded for `revision` of `blob`.
    ///
    /// Returns 0 when nothing was recorded; callers bound revisions by the
    /// blob's revision count before asking.
    pub fn lookup(&self, blob: &BlobId, revision: RevisionId) -> BlockNumber {
        let (slot_idx, field) = Self::position(revision);
        self.slots
            .get(blob)
            .and_then(|slots| slots.get(slot_idx))
            .map(|s| slot::get_field(*s, field))
            .unwrap_or(0)
    }

    /// Zero the field for `revision`, keeping its slot allocated.
    pub fn erase(&mut self, blob: &BlobId, revision: RevisionId) {
        let (slot_idx, field) = Self::position(revision);
        if let Some(slots) = self.slots.get_mut(blob) {
            if let Some(s) = slots.get_mut(slot_idx) {
                *s = slot::clear_field(*s, field);
            }
        }
    }

    /// Drop the slot containing `revision`, reclaiming its storage.
    ///
    /// Callers invoke this only when `revision` was the slot's sole remaining
    /// occupant; anything else in that slot is discarded with it.
    pub fn release_slot(&mut self, blob: &BlobId, revision: RevisionId) {
        let (slot_idx, _field) = Self::position(revision);
        if let Some(slots) = self.slots.get_mut(blob) {
            slots.truncate(slot_idx);
            if slots.is_empty() {
                self.slots.remove(blob);
            }
        }
    }

    /// Remove every packed slot for `blob`.
    ///
    /// `revision_count` is the blob's current revision count; it bounds the
    /// allocation at [`occupied_slots`] slots, which is everything stored
    /// for the blob.
    pub fn clear(&mut self, blob: &BlobId, revision_count: RevisionId) {
        debug_assert!(self.slot_count(blob) <= occupied_slots(revision_count));
        self.slots.remove(blob);
    }

    /// Collect the block numbers for revisions `1..revision_count`, in order.
    pub fn blocks(&self, blob: &BlobId, revision_count: RevisionId) -> Vec<BlockNumber> {
        (1..revision_count).map(|r| self.lookup(blob, r)).collect()
    }

    /// Number of slots currently allocated for `blob`.
    pub fn slot_count(&self, blob: &BlobId) -> usize {
        self.slots.get(blob).map_or(0, Vec::len)
    }
}
