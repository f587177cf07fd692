//! Scoped checkpoints.
//!
//! [`ArenaScope`] records the arena position when it is created and pops back
//! to it when dropped, so temporary allocations cannot outlive the block of
//! code that made them. Scopes nest: a scope dereferences to the arena, so
//! calling [`Arena::scope`] through it opens an inner scope.
//!
//! ```
//! use linarena::Arena;
//!
//! let mut arena = Arena::new(1024);
//! arena.push(16).unwrap();
//!
//! {
//!     let mut scratch = arena.scope();
//!     scratch.push(512).unwrap();
//!     assert_eq!(scratch.used(), 528);
//! }
//!
//! assert_eq!(arena.used(), 16);
//! ```

use std::ops::{Deref, DerefMut};

use crate::arena::{Arena, Checkpoint};
use crate::store::{BackingStore, HeapStore};

/// Restores an arena to a saved position on drop.
pub struct ArenaScope<'a, S: BackingStore = HeapStore> {
    arena: &'a mut Arena<S>,
    checkpoint: Checkpoint,
}

impl<'a, S: BackingStore> ArenaScope<'a, S> {
    pub(crate) fn new(arena: &'a mut Arena<S>) -> Self {
        Self {
            checkpoint: arena.position(),
            arena,
        }
    }

    /// Where the arena goes back to when the scope ends.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        self.checkpoint
    }
}

impl<S: BackingStore> Deref for ArenaScope<'_, S> {
    type Target = Arena<S>;

    fn deref(&self) -> &Self::Target {
        self.arena
    }
}

impl<S: BackingStore> DerefMut for ArenaScope<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.arena
    }
}

impl<S: BackingStore> Drop for ArenaScope<'_, S> {
    fn drop(&mut self) {
        self.arena.pop_to(self.checkpoint);
    }
}
