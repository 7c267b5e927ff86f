//! Lock-free slot occupancy tracking for message pools.

use std::sync::atomic::{AtomicU64, Ordering};

const BITS: usize = u64::BITS as usize;

/// One bit per pool slot: set while the slot is loaned out.
pub(crate) struct SlotBitmap {
    words: Box<[AtomicU64]>,
    slots: usize,
}

impl SlotBitmap {
    /// Create a bitmap with `slots` free slots.
    pub(crate) fn new(slots: usize) -> Self {
        let words = (0..slots.div_ceil(BITS))
            .map(|_| AtomicU64::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { words, slots }
    }

    /// Mark the lowest free slot as taken and return its index.
    pub(crate) fn acquire(&self) -> Option<usize> {
        for (w, word) in self.words.iter().enumerate() {
            let valid = self.valid_mask(w);
            let taken = word.fetch_update(Ordering::AcqRel, Ordering::Relaxed, |bits| {
                let free = !bits & valid;
                (free != 0).then(|| bits | (1u64 << free.trailing_zeros()))
            });
            if let Ok(before) = taken {
                let bit = (!before & valid).trailing_zeros() as usize;
                return Some(w * BITS + bit);
            }
        }
        None
    }

    /// Return a slot to the free set.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    pub(crate) fn release(&self, slot: usize) {
        assert!(slot < self.slots, "slot {slot} out of range");
        self.words[slot / BITS].fetch_and(!(1u64 << (slot % BITS)), Ordering::Release);
    }

    /// Snapshot of whether `slot` is loaned out.
    pub(crate) fn is_taken(&self, slot: usize) -> bool {
        slot < self.slots
            && self.words[slot / BITS].load(Ordering::Acquire) & (1u64 << (slot % BITS)) != 0
    }

    /// Snapshot of the number of free slots.
    pub(crate) fn free(&self) -> usize {
        let taken: u32 = self
            .words
            .iter()
            .enumerate()
            .map(|(w, word)| (word.load(Ordering::Acquire) & self.valid_mask(w)).count_ones())
            .sum();
        self.slots - taken as usize
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots
    }

    fn valid_mask(&self, word: usize) -> u64 {
        let remaining = self.slots - word * BITS;
        if remaining >= BITS {
            u64::MAX
        } else {
            (1u64 << remaining) - 1
        }
    }
}
