//! Construction-time configuration for arenas.
//!
//! An [`ArenaConfig`] is a small `Copy` value, so a subsystem can keep one
//! around and stamp out identically configured arenas whenever it needs a
//! fresh one, per frame or per request.
//!
//! # Examples
//!
//! ```
//! use linarena::{ArenaConfig, OnExhaustion};
//!
//! // A 4 KiB scratch arena that never grows and reports exhaustion.
//! let config = ArenaConfig::new(4096)
//!     .with_alignment(16)
//!     .fixed()
//!     .on_exhaustion(OnExhaustion::Error);
//!
//! let mut arena = config.build().unwrap();
//! assert!(arena.push(4096).is_ok());
//! assert!(arena.push(1).is_err());
//! ```

use crate::arena::Arena;
use crate::block::HEADER_SIZE;
use crate::error::{Error, Result};
use crate::store::{BackingStore, HeapStore};

/// Whether the arena may reserve blocks beyond the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Growth {
    /// Append geometrically larger blocks when the tail is full.
    #[default]
    Chained,
    /// Keep the single initial block; running out is exhaustion.
    Fixed,
}

/// What happens when the arena cannot satisfy a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnExhaustion {
    /// Log and abort through [`std::alloc::handle_alloc_error`].
    #[default]
    Abort,
    /// Return the error to the caller and leave the arena untouched.
    Error,
}

/// Returns true for 0 (no alignment) and multiples of 8.
#[must_use]
pub const fn is_valid_alignment(alignment: usize) -> bool {
    alignment % 8 == 0
}

/// Panics unless `alignment` passes [`is_valid_alignment`].
#[track_caller]
pub(crate) fn assert_valid_alignment(alignment: usize) {
    assert!(
        is_valid_alignment(alignment),
        "arena alignment must be 0 or a multiple of 8, got {alignment}"
    );
}

/// Settings used to create an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
    capacity: usize,
    alignment: usize,
    growth: Growth,
    on_exhaustion: OnExhaustion,
}

impl ArenaConfig {
    /// Capacity used by [`ArenaConfig::default`].
    pub const DEFAULT_CAPACITY: usize = 64 * 1024;

    /// A growable, unaligned, aborting configuration whose first block holds
    /// `capacity` bytes.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            alignment: 0,
            growth: Growth::Chained,
            on_exhaustion: OnExhaustion::Abort,
        }
    }

    /// Sets the auto-alignment applied by [`Arena::push`].
    #[must_use]
    pub const fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    /// Restricts the arena to its first block.
    #[must_use]
    pub const fn fixed(mut self) -> Self {
        self.growth = Growth::Fixed;
        self
    }

    /// Lets the arena chain new blocks (the default).
    #[must_use]
    pub const fn growable(mut self) -> Self {
        self.growth = Growth::Chained;
        self
    }

    /// Chooses the exhaustion policy.
    #[must_use]
    pub const fn on_exhaustion(mut self, policy: OnExhaustion) -> Self {
        self.on_exhaustion = policy;
        self
    }

    /// Capacity of the first block in bytes.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Auto-alignment, 0 for none.
    #[must_use]
    pub const fn alignment(&self) -> usize {
        self.alignment
    }

    /// Whether the arena may chain new blocks.
    #[must_use]
    pub const fn growth(&self) -> Growth {
        self.growth
    }

    /// The exhaustion policy.
    #[must_use]
    pub const fn exhaustion(&self) -> OnExhaustion {
        self.on_exhaustion
    }

    /// Checks capacity and alignment without reserving anything.
    pub fn validate(&self) -> Result<()> {
        if self.capacity <= HEADER_SIZE {
            return Err(Error::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        if !is_valid_alignment(self.alignment) {
            return Err(Error::InvalidAlignment {
                alignment: self.alignment,
            });
        }
        Ok(())
    }

    /// Creates an arena backed by the global allocator.
    pub fn build(self) -> Result<Arena> {
        Arena::with_config(self)
    }

    /// Creates an arena backed by `store`.
    pub fn build_with<S: BackingStore>(self, store: S) -> Result<Arena<S>> {
        Arena::with_store(self, store)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
