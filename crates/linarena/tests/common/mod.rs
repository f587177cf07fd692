// Shared helpers for linarena integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::ptr::NonNull;
use std::rc::Rc;

use linarena::{Arena, BackingStore, HeapStore, Result};

/// What a [`TrackingStore`] saw, as `(address, size)` pairs.
#[derive(Debug, Default)]
pub struct StoreLog {
    pub reserved: Vec<(usize, usize)>,
    pub released: Vec<(usize, usize)>,
    pub hints: Vec<Option<usize>>,
}

impl StoreLog {
    pub fn outstanding(&self) -> usize {
        self.reserved.len() - self.released.len()
    }
}

/// Heap store that records every reservation and release.
#[derive(Debug, Clone, Default)]
pub struct TrackingStore {
    inner: HeapStore,
    log: Rc<RefCell<StoreLog>>,
}

impl TrackingStore {
    pub fn new() -> (Self, Rc<RefCell<StoreLog>>) {
        let store = Self::default();
        let log = Rc::clone(&store.log);
        (store, log)
    }
}

impl BackingStore for TrackingStore {
    fn reserve(
        &mut self,
        size: usize,
        hint: Option<NonNull<u8>>,
    ) -> Result<NonNull<u8>> {
        let base = self.inner.reserve(size, hint)?;
        let mut log = self.log.borrow_mut();
        log.reserved.push((base.as_ptr().addr(), size));
        log.hints.push(hint.map(|h| h.as_ptr().addr()));
        Ok(base)
    }

    unsafe fn release(&mut self, base: NonNull<u8>, size: usize) {
        self.log
            .borrow_mut()
            .released
            .push((base.as_ptr().addr(), size));
        unsafe { self.inner.release(base, size) };
    }
}

/// Address of the arena's cursor.
pub fn cursor_addr<S: BackingStore>(arena: &Arena<S>) -> usize {
    arena
        .address_of(arena.position())
        .map(|ptr| ptr.as_ptr().addr())
        .unwrap()
}

/// Per-block sizes, head first.
pub fn block_sizes<S: BackingStore>(arena: &Arena<S>) -> Vec<usize> {
    arena.blocks().iter().map(|block| block.size()).collect()
}

/// Small deterministic generator so property loops are reproducible.
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform-ish value in `lo..hi`.
    pub fn range(&mut self, lo: usize, hi: usize) -> usize {
        lo + (self.next_u64() % (hi - lo) as u64) as usize
    }
}
