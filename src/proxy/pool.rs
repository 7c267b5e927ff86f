//! Fixed-size message pools with loan semantics.

use super::bitmap::SlotBitmap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Number of slots in the auxiliary pool; effectively the maximal number of
/// live components per session.
pub const AUX_POOL_SLOTS: usize = 16;

/// Size of one auxiliary message in bytes.
pub const AUX_POOL_MSG_LENGTH: usize = 256;

/// What a pool's buffers are used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    /// Buffers flowing into a DSP component.
    Input,
    /// Buffers produced by a DSP component.
    Output,
    /// Small control messages exchanged with the proxy.
    Auxiliary,
}

/// Shape of a pool to allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of slots.
    pub slots: usize,
    /// Size of each slot in bytes.
    pub slot_size: usize,
    /// Pool kind.
    pub kind: PoolKind,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::auxiliary()
    }
}

impl PoolConfig {
    /// The auxiliary control-message pool: 16 slots of 256 bytes.
    pub fn auxiliary() -> Self {
        Self {
            slots: AUX_POOL_SLOTS,
            slot_size: AUX_POOL_MSG_LENGTH,
            kind: PoolKind::Auxiliary,
        }
    }

    /// Set the number of slots.
    pub fn with_slots(mut self, slots: usize) -> Self {
        self.slots = slots;
        self
    }

    /// Set the slot size.
    pub fn with_slot_size(mut self, slot_size: usize) -> Self {
        self.slot_size = slot_size;
        self
    }

    /// Total bytes backing the pool.
    pub fn total_size(&self) -> usize {
        self.slots * self.slot_size
    }
}

/// A pool of equally sized message buffers.
///
/// Slots are loaned with [`MessagePool::loan`] and returned to the pool when
/// the [`AuxBuffer`] is dropped.
pub struct MessagePool {
    kind: PoolKind,
    slot_size: usize,
    slots: Box<[Mutex<Box<[u8]>>]>,
    occupancy: SlotBitmap,
}

impl MessagePool {
    /// Allocate a heap-backed pool with the given shape.
    ///
    /// Returns `None` for a zero-sized configuration.
    pub fn new(config: PoolConfig) -> Option<Self> {
        if config.slots == 0 || config.slot_size == 0 {
            return None;
        }

        let slots = (0..config.slots)
            .map(|_| Mutex::new(vec![0u8; config.slot_size].into_boxed_slice()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Some(Self {
            kind: config.kind,
            slot_size: config.slot_size,
            slots,
            occupancy: SlotBitmap::new(config.slots),
        })
    }

    /// Loan a free slot, or `None` if the pool is exhausted.
    pub fn loan(self: &Arc<Self>) -> Option<AuxBuffer> {
        let slot = self.occupancy.acquire()?;
        Some(AuxBuffer {
            pool: Arc::clone(self),
            slot,
        })
    }

    /// Pool kind.
    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    /// Size of each slot in bytes.
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.occupancy.capacity()
    }

    /// Number of slots not currently loaned.
    pub fn available(&self) -> usize {
        self.occupancy.free()
    }
}

impl std::fmt::Debug for MessagePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagePool")
            .field("kind", &self.kind)
            .field("slot_size", &self.slot_size)
            .field("capacity", &self.capacity())
            .field("available", &self.available())
            .finish()
    }
}

/// A slot loaned from a [`MessagePool`].
///
/// The slot goes back to its pool on drop.
pub struct AuxBuffer {
    pool: Arc<MessagePool>,
    slot: usize,
}

impl AuxBuffer {
    /// Index of the slot within its pool.
    pub fn slot_index(&self) -> usize {
        self.slot
    }

    /// Size of the slot in bytes.
    pub fn len(&self) -> usize {
        self.pool.slot_size
    }

    /// Always false for a valid pool.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lock the slot's bytes for reading or writing.
    pub fn bytes(&self) -> MutexGuard<'_, Box<[u8]>> {
        self.pool.slots[self.slot]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy `data` to the start of the slot, returning the number of bytes
    /// written. Data beyond the slot size is truncated.
    pub fn write(&self, data: &[u8]) -> usize {
        let mut bytes = self.bytes();
        let n = data.len().min(bytes.len());
        bytes[..n].copy_from_slice(&data[..n]);
        n
    }

    /// The pool this slot belongs to.
    pub fn pool(&self) -> &Arc<MessagePool> {
        &self.pool
    }
}

impl Drop for AuxBuffer {
    fn drop(&mut self) {
        debug_assert!(self.pool.occupancy.is_taken(self.slot));
        self.pool.occupancy.release(self.slot);
    }
}

impl std::fmt::Debug for AuxBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuxBuffer")
            .field("slot", &self.slot)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auxiliary_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.slots, 16);
        assert_eq!(config.slot_size, 256);
        assert_eq!(config.kind, PoolKind::Auxiliary);
        assert_eq!(config.total_size(), 4096);
    }

    #[test]
    fn test_zero_sized_pool_rejected() {
        assert!(MessagePool::new(PoolConfig::auxiliary().with_slots(0)).is_none());
        assert!(MessagePool::new(PoolConfig::auxiliary().with_slot_size(0)).is_none());
    }

    #[test]
    fn test_loan_and_return() {
        let pool = Arc::new(MessagePool::new(PoolConfig::auxiliary().with_slots(2)).unwrap());
        assert_eq!(pool.capacity(), 2);

        let a = pool.loan().unwrap();
        let b = pool.loan().unwrap();
        assert_ne!(a.slot_index(), b.slot_index());
        assert!(pool.loan().is_none());

        drop(a);
        assert_eq!(pool.available(), 1);
        assert!(pool.loan().is_some());
    }

    #[test]
    fn test_write_truncates_to_slot() {
        let pool = Arc::new(MessagePool::new(PoolConfig::auxiliary().with_slot_size(4)).unwrap());
        let buf = pool.loan().unwrap();
        assert_eq!(buf.write(b"abcdef"), 4);
        assert_eq!(&buf.bytes()[..], b"abcd");
    }
}
