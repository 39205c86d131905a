//! Block context abstraction.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use vbl_types::BlockNumber;

/// Source of the current block number and the previous block's hash.
///
/// The engine reads the block number when stamping revisions and events, and
/// the parent hash once at construction to derive its instance identity.
/// Ledger runtimes adapt their own environment; [`ManualBlockClock`] serves
/// tests and embedded use.
pub trait BlockClock: Send + Sync {
    /// Number of the block currently being executed.
    fn block_number(&self) -> BlockNumber;

    /// Hash of the block immediately preceding the current one.
    fn parent_hash(&self) -> [u8; 32];
}

/// Manually advanced block clock for tests and embedding.
pub struct ManualBlockClock {
    number: AtomicU32,
    parent_hash: Mutex<[u8; 32]>,
}

impl ManualBlockClock {
    /// Create a clock positioned at `number` with the given parent hash.
    pub fn new(number: BlockNumber, parent_hash: [u8; 32]) -> Self {
        Self {
            number: AtomicU32::new(number),
            parent_hash: Mutex::new(parent_hash),
        }
    }

    /// Advance to the next block, returning the new block number.
    pub fn advance(&self) -> BlockNumber {
        self.number.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Jump to an arbitrary block number.
    pub fn set_block(&self, number: BlockNumber) {
        self.number.store(number, Ordering::SeqCst);
    }

    /// Replace the parent hash.
    pub fn set_parent_hash(&self, hash: [u8; 32]) {
        *self.parent_hash.lock().expect("clock mutex poisoned") = hash;
    }
}

impl BlockClock for ManualBlockClock {
    fn block_number(&self) -> BlockNumber {
        self.number.load(Ordering::SeqCst)
    }

    fn parent_hash(&self) -> [u8; 32] {
        *self.parent_hash.lock().expect("clock mutex poisoned")
    }
}
