//! A single reserved region and its bump bookkeeping.
//!
//! ```text
//!   base                     cursor                        base + capacity
//!    │                         │                                 │
//!    ▼                         ▼                                 ▼
//!    ┌─────────────────────────┬─────────────────────────────────┐
//!    │        used (size)      │          remaining              │
//!    └─────────────────────────┴─────────────────────────────────┘
//! ```
//!
//! Bookkeeping is kept out of line, so the whole region is usable and an
//! empty block has `size == HEADER_SIZE == 0`. Blocks never release their own
//! memory; the owning arena hands the region back to its store.

use std::ptr::NonNull;

/// Bytes of every block consumed by bookkeeping.
pub const HEADER_SIZE: usize = 0;

/// One region of an arena's chain.
#[derive(Debug)]
pub struct Block {
    /// Start of the region.
    base: NonNull<u8>,
    /// Reserved bytes, fixed at creation.
    capacity: usize,
    /// Used bytes; the cursor is `base + size`.
    size: usize,
}

impl Block {
    /// Wraps a freshly reserved region as an empty block.
    pub(crate) fn new(base: NonNull<u8>, capacity: usize) -> Self {
        debug_assert!(capacity > HEADER_SIZE);
        Self {
            base,
            capacity,
            size: HEADER_SIZE,
        }
    }

    /// Start of the region.
    #[must_use]
    pub fn base(&self) -> NonNull<u8> {
        self.base
    }

    /// Total bytes reserved for this block.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently in use.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Bytes still available for bumping.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.size
    }

    /// True when nothing is allocated in this block.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == HEADER_SIZE
    }

    /// True when every byte is in use.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.size == self.capacity
    }

    /// Address of the next free byte.
    #[must_use]
    pub fn cursor(&self) -> NonNull<u8> {
        self.at(self.size)
    }

    /// One past the last byte of the region.
    pub(crate) fn end(&self) -> NonNull<u8> {
        self.at(self.capacity)
    }

    /// Address `offset` bytes into the region, `offset <= capacity`.
    pub(crate) fn at(&self, offset: usize) -> NonNull<u8> {
        debug_assert!(offset <= self.capacity);
        // SAFETY: offset stays within the reservation or one past its end.
        unsafe { self.base.add(offset) }
    }

    /// Whether `addr` lies in `base..=base + capacity`.
    #[must_use]
    pub fn contains(&self, addr: *const u8) -> bool {
        let addr = addr.addr();
        let start = self.base.as_ptr().addr();
        addr >= start && addr - start <= self.capacity
    }

    /// Offset of `addr` from the base; `addr` must be contained.
    pub(crate) fn offset_of(&self, addr: *const u8) -> usize {
        debug_assert!(self.contains(addr));
        addr.addr() - self.base.as_ptr().addr()
    }

    /// Bytes needed to bring the cursor to a multiple of `align`.
    ///
    /// Computed against the real address, so a block whose base is not
    /// itself aligned still yields aligned pointers. `align == 0` means no
    /// alignment.
    pub(crate) fn padding_for(&self, align: usize) -> usize {
        if align == 0 {
            return 0;
        }
        match self.cursor().as_ptr().addr() % align {
            0 => 0,
            rem => align - rem,
        }
    }

    /// Advances the cursor by `bytes`, returning where it was.
    pub(crate) fn bump(&mut self, bytes: usize) -> NonNull<u8> {
        debug_assert!(bytes <= self.remaining());
        let start = self.cursor();
        self.size += bytes;
        start
    }

    /// Moves the cursor back by up to `bytes`, returning how far it moved.
    pub(crate) fn retreat(&mut self, bytes: usize) -> usize {
        let popped = bytes.min(self.size - HEADER_SIZE);
        self.size -= popped;
        popped
    }

    /// Marks the unused tail as used so nothing is ever placed before a
    /// newer block. Returns the number of bytes absorbed.
    pub(crate) fn absorb_remainder(&mut self) -> usize {
        let absorbed = self.remaining();
        self.size = self.capacity;
        absorbed
    }

    /// Resets the block to empty without touching its memory.
    pub(crate) fn vacate(&mut self) {
        self.size = HEADER_SIZE;
    }
}
