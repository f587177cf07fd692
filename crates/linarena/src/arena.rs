//! The chained linear arena.
//!
//! An [`Arena`] owns an append-only chain of [`Block`]s. Allocation bumps a
//! cursor through the tail block; when the tail cannot hold a request the
//! arena moves on to the next block, reserving a new one of at least twice
//! the previous capacity if none is left. Memory is never freed per object.
//! Instead callers record a [`Checkpoint`] with [`Arena::position`] and later
//! [`Arena::pop_to`] it, releasing everything allocated in between.
//!
//! ```text
//!   blocks[0]            blocks[1]                 blocks[2]
//!   ┌──────────────┐     ┌─────────────────────┐   ┌──────────────────────────┐
//!   │##############│ ──▶ │########░░░░░░░░░░░░░│──▶│░░░░░░░░░░░░░░░░░░░░░░░░░░│
//!   └──────────────┘     └─────────────────────┘   └──────────────────────────┘
//!     full (absorbed)        tail    ▲ cursor         vacated, reused first
//! ```
//!
//! Invariants kept by every operation:
//!
//! - blocks before the tail are full, blocks after it are empty;
//! - an allocation never spans two blocks;
//! - block memory is only returned to the store on release.
//!
//! # Examples
//!
//! ```
//! use linarena::Arena;
//!
//! let mut arena = Arena::new(1024);
//! arena.set_auto_align(16);
//!
//! let frame = arena.position();
//! let node = arena.alloc(42u64).unwrap();
//! let name = arena.alloc_str("root").unwrap();
//!
//! unsafe {
//!     assert_eq!(*node.as_ptr(), 42);
//!     assert_eq!(name.as_ref(), "root");
//! }
//!
//! // Drop everything allocated since `frame`.
//! arena.pop_to(frame);
//! assert_eq!(arena.position(), frame);
//! ```

use std::alloc::Layout;
use std::mem;
use std::ptr::{self, NonNull};

use linarena_log::{debug, error, trace, warn};

use crate::block::Block;
use crate::config::{ArenaConfig, Growth, OnExhaustion, assert_valid_alignment};
use crate::error::{Error, Result};
use crate::scope::ArenaScope;
use crate::store::{BackingStore, HeapStore};

/// A saved arena position.
///
/// Obtained from [`Arena::position`] and handed back to [`Arena::pop_to`].
/// Checkpoints order the same way positions do along the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checkpoint {
    block: usize,
    offset: usize,
}

impl Checkpoint {
    /// Index of the block this checkpoint points into.
    #[must_use]
    pub const fn block(&self) -> usize {
        self.block
    }

    /// Byte offset from the block's base.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// The checkpoint `bytes` earlier in the same block, if there is one.
    #[must_use]
    pub const fn rewind(self, bytes: usize) -> Option<Self> {
        match self.offset.checked_sub(bytes) {
            Some(offset) => Some(Self {
                block: self.block,
                offset,
            }),
            None => None,
        }
    }
}

/// Occupancy summary of an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Bytes in use across all blocks, padding and absorbed remainders
    /// included.
    pub used: usize,
    /// Number of blocks in the chain.
    pub block_count: usize,
    /// Sum of all block capacities.
    pub total_capacity: usize,
}

/// A growable chain of bump-allocated blocks.
///
/// Pushes return raw, uninitialised memory that stays valid until a pop,
/// [`pop_to`](Arena::pop_to), [`clear`](Arena::clear) or release reaches
/// it. The arena never runs destructors for values placed in it.
///
/// `Arena` is single-threaded: it is neither `Send` nor `Sync`.
pub struct Arena<S: BackingStore = HeapStore> {
    /// The chain; index 0 is the head.
    blocks: Vec<Block>,
    /// Index of the block currently bumped into.
    tail: usize,
    /// Alignment applied by `push`; 0 for none.
    alignment: usize,
    growth: Growth,
    on_exhaustion: OnExhaustion,
    store: S,
}

impl Arena<HeapStore> {
    /// Creates a growable heap-backed arena whose first block holds
    /// `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. Aborts if the first block cannot be
    /// reserved.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        match Self::with_config(ArenaConfig::new(capacity)) {
            Ok(arena) => arena,
            Err(err) => panic!("failed to create arena: {err}"),
        }
    }

    /// Creates a heap-backed arena from `config`.
    pub fn with_config(config: ArenaConfig) -> Result<Self> {
        Self::with_store(config, HeapStore)
    }
}

impl<S: BackingStore> Arena<S> {
    /// Creates an arena from `config`, reserving its blocks from `store`.
    pub fn with_store(config: ArenaConfig, store: S) -> Result<Self> {
        config.validate()?;

        let mut arena = Self {
            blocks: Vec::new(),
            tail: 0,
            alignment: config.alignment(),
            growth: config.growth(),
            on_exhaustion: config.exhaustion(),
            store,
        };

        let head = arena.reserve_block(config.capacity(), None)?;
        arena.blocks.push(head);

        debug!(
            "created {:?} arena: {} bytes, alignment {}, on exhaustion {:?}",
            arena.growth,
            config.capacity(),
            arena.alignment,
            arena.on_exhaustion
        );
        Ok(arena)
    }

    /// Sets the alignment applied by [`push`](Arena::push) and by new
    /// blocks. 0 disables it.
    ///
    /// # Panics
    ///
    /// Panics unless `alignment` is 0 or a multiple of 8.
    #[track_caller]
    pub fn set_auto_align(&mut self, alignment: usize) {
        assert_valid_alignment(alignment);
        self.alignment = alignment;
    }

    /// Current auto-alignment.
    #[must_use]
    pub fn auto_align(&self) -> usize {
        self.alignment
    }

    /// The current cursor as a checkpoint.
    #[must_use]
    pub fn position(&self) -> Checkpoint {
        Checkpoint {
            block: self.tail,
            offset: self.tail_block().size(),
        }
    }

    /// Pushes `size` bytes after applying the auto-alignment.
    ///
    /// The memory is not zeroed.
    pub fn push(&mut self, size: usize) -> Result<NonNull<u8>> {
        self.bump(size, self.alignment)
    }

    /// Pushes `size` bytes at the cursor as is, without alignment.
    ///
    /// The memory is not zeroed.
    pub fn push_raw(&mut self, size: usize) -> Result<NonNull<u8>> {
        self.bump(size, 0)
    }

    /// Pads the cursor to a multiple of `alignment` and returns it.
    ///
    /// # Panics
    ///
    /// Panics unless `alignment` is 0 or a multiple of 8.
    #[track_caller]
    pub fn push_aligner(&mut self, alignment: usize) -> Result<NonNull<u8>> {
        assert_valid_alignment(alignment);
        self.bump(0, alignment)
    }

    /// Like [`push`](Arena::push), then fills the bytes with zeroes.
    pub fn push_zeroed(&mut self, size: usize) -> Result<NonNull<u8>> {
        let ptr = self.push(size)?;
        // SAFETY: `size` bytes at `ptr` were just reserved in the tail block.
        unsafe { ptr.as_ptr().write_bytes(0, size) };
        Ok(ptr)
    }

    /// Moves `value` into the arena.
    ///
    /// The pointer is aligned for `T` and for the auto-alignment. `value` is
    /// never dropped by the arena.
    pub fn alloc<T>(&mut self, value: T) -> Result<NonNull<T>> {
        let align = self.type_alignment(mem::align_of::<T>());
        let ptr = self.bump(mem::size_of::<T>(), align)?.cast::<T>();

        // SAFETY: the slot is fresh, sized and aligned for `T`.
        unsafe { ptr.as_ptr().write(value) };
        Ok(ptr)
    }

    /// Copies `src` into the arena.
    pub fn alloc_slice_copy<T: Copy>(&mut self, src: &[T]) -> Result<NonNull<[T]>> {
        let align = self.type_alignment(mem::align_of::<T>());
        let ptr = self.bump(mem::size_of_val(src), align)?.cast::<T>();

        // SAFETY: the destination holds `src.len()` elements of `T` and
        // cannot overlap `src`, which the arena did not hand out mutably.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), ptr.as_ptr(), src.len());
        }
        Ok(NonNull::slice_from_raw_parts(ptr, src.len()))
    }

    /// Copies `s` into the arena.
    pub fn alloc_str(&mut self, s: &str) -> Result<NonNull<str>> {
        let bytes = self.alloc_slice_copy(s.as_bytes())?;
        let raw = bytes.as_ptr() as *mut str;

        // SAFETY: non-null, and holds a copy of valid UTF-8.
        Ok(unsafe { NonNull::new_unchecked(raw) })
    }

    /// Releases the last `amount` bytes, walking back across blocks.
    ///
    /// Popping more than is in use empties the arena.
    pub fn pop(&mut self, amount: usize) {
        let mut remaining = amount;

        loop {
            remaining -= self.blocks[self.tail].retreat(remaining);
            if remaining == 0 || self.tail == 0 {
                break;
            }
            // The tail is empty and there is more to pop.
            self.tail -= 1;
        }

        trace!(
            "popped {} of {} bytes, position {:?}",
            amount - remaining,
            amount,
            self.position()
        );
    }

    /// Restores the arena to `checkpoint`.
    ///
    /// Every block after the checkpoint's block is emptied and the cursor
    /// goes back to the checkpoint's offset. A checkpoint ahead of the cursor
    /// is left alone.
    pub fn pop_to(&mut self, checkpoint: Checkpoint) {
        if checkpoint.block >= self.blocks.len() {
            warn!(
                "ignoring {:?}: arena has {} blocks",
                checkpoint,
                self.blocks.len()
            );
            return;
        }
        if checkpoint.block > self.tail {
            return;
        }

        for block in &mut self.blocks[checkpoint.block + 1..] {
            block.vacate();
        }
        self.tail = checkpoint.block;

        let residual =
            self.tail_block().size().saturating_sub(checkpoint.offset);
        self.pop(residual);
    }

    /// Empties every block, keeping all of them for reuse.
    pub fn clear(&mut self) {
        for block in &mut self.blocks {
            block.vacate();
        }
        self.tail = 0;
        trace!("cleared {} blocks", self.blocks.len());
    }

    /// Returns every block to the backing store.
    ///
    /// Pointers obtained from this arena dangle afterwards. Dropping the
    /// arena has the same effect.
    pub fn release(mut self) {
        self.release_blocks();
    }

    /// Records the position and restores it when the guard drops.
    pub fn scope(&mut self) -> ArenaScope<'_, S> {
        ArenaScope::new(self)
    }

    /// The address `checkpoint` refers to.
    #[must_use]
    pub fn address_of(&self, checkpoint: Checkpoint) -> Option<NonNull<u8>> {
        self.blocks
            .get(checkpoint.block)
            .filter(|block| checkpoint.offset <= block.capacity())
            .map(|block| block.at(checkpoint.offset))
    }

    /// The checkpoint for an address inside the chain, found by walking the
    /// blocks from the head.
    ///
    /// Passing the pointer of an earlier push to [`pop_to`](Arena::pop_to)
    /// releases that allocation and everything after it.
    #[must_use]
    pub fn checkpoint_at(&self, addr: *const u8) -> Option<Checkpoint> {
        self.blocks
            .iter()
            .enumerate()
            .find(|(_, block)| block.contains(addr))
            .map(|(index, block)| Checkpoint {
                block: index,
                offset: block.offset_of(addr),
            })
    }

    /// The blocks of the chain, head first.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Bytes in use across the chain.
    #[must_use]
    pub fn used(&self) -> usize {
        self.blocks.iter().map(Block::size).sum()
    }

    /// Occupancy summary.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            used: self.used(),
            block_count: self.blocks.len(),
            total_capacity: self.blocks.iter().map(Block::capacity).sum(),
        }
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn tail_block(&self) -> &Block {
        &self.blocks[self.tail]
    }

    /// Alignment for a typed allocation: a multiple of both the type's
    /// alignment and the auto-alignment.
    fn type_alignment(&self, align: usize) -> usize {
        if self.alignment == 0 {
            return align;
        }
        let (mut a, mut b) = (self.alignment, align);
        while b != 0 {
            (a, b) = (b, a % b);
        }
        self.alignment / a * align
    }

    /// Pads to `align` and reserves `size` bytes in the tail, moving to a
    /// later block when the tail is too small.
    ///
    /// A failed push restores the position it started from, undoing any
    /// remainders absorbed on the way.
    fn bump(&mut self, size: usize, align: usize) -> Result<NonNull<u8>> {
        let start = self.position();
        loop {
            let block = &mut self.blocks[self.tail];
            let padding = block.padding_for(align);

            match padding.checked_add(size) {
                Some(needed) if needed <= block.remaining() => {
                    block.bump(padding);
                    return Ok(block.bump(size));
                }
                needed => {
                    if let Err(err) =
                        self.advance_tail(needed.unwrap_or(usize::MAX))
                    {
                        // Blocks skipped on the way were empty before.
                        self.pop_to(start);
                        return Err(err);
                    }
                }
            }
        }
    }

    /// Moves the tail past a block that cannot hold `requested` bytes.
    fn advance_tail(&mut self, requested: usize) -> Result<()> {
        let next = self.tail + 1;

        if next < self.blocks.len() {
            // Reuse an emptied block; if it is too small the next round
            // absorbs it too.
            self.blocks[self.tail].absorb_remainder();
            self.tail = next;
            return Ok(());
        }

        match self.growth {
            Growth::Chained => self.grow(requested),
            Growth::Fixed => {
                let available = self.tail_block().remaining();
                Err(self.exhausted(
                    Error::ArenaFull {
                        requested,
                        available,
                    },
                    requested,
                ))
            }
        }
    }

    /// Appends a block of `max(last capacity, requested) * 2` bytes.
    #[cold]
    fn grow(&mut self, requested: usize) -> Result<()> {
        let last = self.tail_block();
        let Some(capacity) = last.capacity().max(requested).checked_mul(2)
        else {
            return Err(
                self.exhausted(Error::CapacityOverflow { requested }, requested)
            );
        };
        let hint = Some(last.end());

        let mut block = self.reserve_block(capacity, hint)?;

        let padding = block.padding_for(self.alignment);
        if padding <= block.remaining() {
            block.bump(padding);
        }

        let absorbed = self.blocks[self.tail].absorb_remainder();
        self.blocks.push(block);
        self.tail = self.blocks.len() - 1;

        debug!(
            "grew to {} blocks: {} bytes for a {}-byte request, {} bytes absorbed",
            self.blocks.len(),
            capacity,
            requested,
            absorbed
        );
        Ok(())
    }

    fn reserve_block(
        &mut self,
        capacity: usize,
        hint: Option<NonNull<u8>>,
    ) -> Result<Block> {
        match self.store.reserve(capacity, hint) {
            Ok(base) => {
                debug!(
                    "reserved block {} at {:p}: {} bytes",
                    self.blocks.len(),
                    base,
                    capacity
                );
                Ok(Block::new(base, capacity))
            }
            Err(err) => Err(self.exhausted(err, capacity)),
        }
    }

    /// Applies the exhaustion policy. Only returns under
    /// [`OnExhaustion::Error`].
    #[cold]
    fn exhausted(&self, err: Error, size: usize) -> Error {
        match self.on_exhaustion {
            OnExhaustion::Error => {
                debug!("arena exhausted: {err}");
                err
            }
            OnExhaustion::Abort => {
                error!("arena exhausted: {err}");
                let layout = Layout::from_size_align(size, 1)
                    .unwrap_or_else(|_| Layout::new::<u8>());
                std::alloc::handle_alloc_error(layout)
            }
        }
    }

    fn release_blocks(&mut self) {
        if self.blocks.is_empty() {
            return;
        }

        debug!(
            "releasing {} blocks ({} bytes)",
            self.blocks.len(),
            self.blocks.iter().map(Block::capacity).sum::<usize>()
        );
        for block in self.blocks.drain(..) {
            // SAFETY: every block was reserved from `self.store` with its
            // capacity, and draining hands each one out exactly once.
            unsafe { self.store.release(block.base(), block.capacity()) };
        }
        self.tail = 0;
    }
}

impl<S: BackingStore> Drop for Arena<S> {
    fn drop(&mut self) {
        self.release_blocks();
    }
}

impl<S: BackingStore> std::fmt::Debug for Arena<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("position", &self.position())
            .field("alignment", &self.alignment)
            .field("growth", &self.growth)
            .field("on_exhaustion", &self.on_exhaustion)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
