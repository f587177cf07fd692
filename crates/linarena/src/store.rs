//! Backing stores that hand raw regions to the arena.
//!
//! A [`BackingStore`] reserves one contiguous region per block and gets it
//! back exactly once when the arena is released. The arena never touches the
//! memory through the store; it only needs a base address that stays valid
//! until the matching [`BackingStore::release`].
//!
//! - [`HeapStore`]: the global allocator, with page alignment.
//! - [`MmapStore`]: anonymous private mappings (Unix only).
//! - [`BudgetStore`]: caps the total bytes another store may hand out.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use linarena_log::debug;

use crate::error::{Error, Result};

/// Alignment of every region reserved by [`HeapStore`], one page.
pub const BLOCK_ALIGN: usize = 4096;

/// Source of raw memory regions for arena blocks.
pub trait BackingStore {
    /// Reserves a region of at least `size` bytes.
    ///
    /// `hint` is the address the arena would like the region to start at
    /// (the end of the previous block). Stores are free to ignore it.
    fn reserve(
        &mut self,
        size: usize,
        hint: Option<NonNull<u8>>,
    ) -> Result<NonNull<u8>>;

    /// Returns a region to the store.
    ///
    /// # Safety
    ///
    /// `base` and `size` must come from a successful [`reserve`] on this
    /// store, and the region must not be released twice or used afterwards.
    ///
    /// [`reserve`]: BackingStore::reserve
    unsafe fn release(&mut self, base: NonNull<u8>, size: usize);
}

/// Reserves blocks from the global allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapStore;

impl HeapStore {
    fn layout(size: usize) -> Result<Layout> {
        if size == 0 {
            return Err(Error::InvalidCapacity { capacity: size });
        }
        Layout::from_size_align(size, BLOCK_ALIGN)
            .map_err(|_| Error::ReservationFailed { size })
    }
}

impl BackingStore for HeapStore {
    fn reserve(
        &mut self,
        size: usize,
        _hint: Option<NonNull<u8>>,
    ) -> Result<NonNull<u8>> {
        let layout = Self::layout(size)?;

        // SAFETY: `layout` has a non-zero size.
        let base = unsafe { alloc::alloc(layout) };
        NonNull::new(base).ok_or(Error::ReservationFailed { size })
    }

    unsafe fn release(&mut self, base: NonNull<u8>, size: usize) {
        // The same size produced a valid layout in `reserve`.
        if let Ok(layout) = Self::layout(size) {
            // SAFETY: the caller guarantees `base` came from `reserve(size)`.
            unsafe { alloc::dealloc(base.as_ptr(), layout) };
        }
    }
}

/// Reserves blocks as anonymous private mappings.
///
/// The arena's hint is forwarded to `mmap(2)` without `MAP_FIXED`, so the
/// kernel places consecutive blocks next to each other when it can.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct MmapStore;

#[cfg(unix)]
impl BackingStore for MmapStore {
    fn reserve(
        &mut self,
        size: usize,
        hint: Option<NonNull<u8>>,
    ) -> Result<NonNull<u8>> {
        use libc::{MAP_ANON, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE};

        if size == 0 {
            return Err(Error::InvalidCapacity { capacity: size });
        }

        let hint = hint.map_or(std::ptr::null_mut(), |addr| {
            addr.as_ptr().cast::<libc::c_void>()
        });

        // SAFETY: an anonymous mapping without MAP_FIXED never replaces an
        // existing mapping; the hint is advisory.
        let addr = unsafe {
            libc::mmap(
                hint,
                size,
                PROT_READ | PROT_WRITE,
                MAP_PRIVATE | MAP_ANON,
                -1,
                0,
            )
        };

        if addr == MAP_FAILED {
            return Err(Error::ReservationFailed { size });
        }
        NonNull::new(addr.cast::<u8>()).ok_or(Error::ReservationFailed { size })
    }

    unsafe fn release(&mut self, base: NonNull<u8>, size: usize) {
        // SAFETY: the caller guarantees this is a live mapping of `size` bytes.
        let rc = unsafe { libc::munmap(base.as_ptr().cast(), size) };
        if rc != 0 {
            linarena_log::error!(
                "munmap({:p}, {}) failed: {}",
                base,
                size,
                std::io::Error::last_os_error()
            );
        }
    }
}

/// Wraps another store and refuses reservations past a byte budget.
///
/// Useful for giving a subsystem a hard memory ceiling while keeping the
/// arena growable up to it.
#[derive(Debug, Clone)]
pub struct BudgetStore<S = HeapStore> {
    inner: S,
    budget: usize,
    reserved: usize,
}

impl<S: BackingStore> BudgetStore<S> {
    /// Allows at most `budget` bytes to be reserved from `inner` at once.
    pub fn new(inner: S, budget: usize) -> Self {
        Self {
            inner,
            budget,
            reserved: 0,
        }
    }

    /// Bytes currently reserved through this store.
    #[must_use]
    pub fn reserved(&self) -> usize {
        self.reserved
    }

    /// Bytes that can still be reserved.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.budget - self.reserved
    }
}

impl<S: BackingStore> BackingStore for BudgetStore<S> {
    fn reserve(
        &mut self,
        size: usize,
        hint: Option<NonNull<u8>>,
    ) -> Result<NonNull<u8>> {
        if size > self.remaining() {
            debug!(
                "budget refuses {} bytes ({} of {} reserved)",
                size, self.reserved, self.budget
            );
            return Err(Error::ReservationFailed { size });
        }

        let base = self.inner.reserve(size, hint)?;
        self.reserved += size;
        Ok(base)
    }

    unsafe fn release(&mut self, base: NonNull<u8>, size: usize) {
        // SAFETY: forwarded from our caller.
        unsafe { self.inner.release(base, size) };
        self.reserved -= size;
    }
}
