//! Chained linear arena allocator.
//!
//! `linarena` hands out memory by bumping a cursor through a chain of
//! reserved blocks and takes it back in bulk by restoring an earlier cursor.
//! It suits memory whose lifetime follows a phase of the program: a frame, a
//! request, a parse.
//!
//! - **O(1) pushes**: a bounds check and an add on the tail block
//! - **Geometric growth**: each new block is at least twice the last one
//! - **Checkpoints**: [`Arena::position`] / [`Arena::pop_to`] release
//!   everything allocated since a saved point
//! - **Pluggable backing**: heap, `mmap(2)`, or a byte budget on top of either
//! - **Selectable exhaustion policy**: abort, or return an [`Error`]
//!
//! # Crate Structure
//!
//! ```text
//!   linarena
//!   ├── arena   - Arena, Checkpoint, ArenaStats
//!   ├── block   - one reserved region and its cursor
//!   ├── config  - ArenaConfig, Growth, OnExhaustion
//!   ├── error   - Error, Result
//!   ├── scope   - ArenaScope (restore on drop)
//!   └── store   - BackingStore, HeapStore, MmapStore, BudgetStore
//! ```
//!
//! # Quick Start
//!
//! ```
//! use linarena::ArenaConfig;
//!
//! let mut arena = ArenaConfig::new(1024).with_alignment(32).build().unwrap();
//!
//! let ptr = arena.push(32 * 4 - 8).unwrap();
//! assert_eq!(ptr.as_ptr().addr() % 32, 0);
//!
//! let pos = arena.position();
//! let addr = arena.address_of(pos).unwrap().as_ptr().addr();
//! assert_eq!(addr % 32, 24);
//!
//! arena.pop(1 << 16);
//! assert_eq!(arena.used(), 0);
//! ```
//!
//! # Safety
//!
//! Pushes return raw pointers to uninitialised memory. Reading or writing
//! through them is `unsafe`, and they dangle once a pop, clear or release
//! reaches them; the arena does not track outstanding pointers.

pub mod arena;
pub mod block;
pub mod config;
pub mod error;
pub mod scope;
pub mod store;

pub use arena::{Arena, ArenaStats, Checkpoint};
pub use block::Block;
pub use config::{ArenaConfig, Growth, OnExhaustion};
pub use error::{Error, Result};
pub use scope::ArenaScope;
#[cfg(unix)]
pub use store::MmapStore;
pub use store::{BackingStore, BudgetStore, HeapStore};
