// Checkpoint, growth and release scenarios for the chained arena.

mod common;

use common::{TrackingStore, block_sizes, cursor_addr};
use linarena::{Arena, ArenaConfig, OnExhaustion};

const ALIGNMENT: usize = 32;

#[test]
fn test_aligned_push_pop_to_and_over_pop() {
    let mut arena = Arena::new(1024);
    arena.set_auto_align(ALIGNMENT);

    let ptr = arena.push(ALIGNMENT * 4 - 8).unwrap();
    assert_eq!(ptr.as_ptr().addr() % ALIGNMENT, 0);

    let pos = arena.position();
    assert_eq!(cursor_addr(&arena) % ALIGNMENT, ALIGNMENT - 8);

    arena.pop_to(pos.rewind(2).unwrap());
    assert_eq!(cursor_addr(&arena) % ALIGNMENT, ALIGNMENT - 10);

    arena.pop(1 << 16);
    assert_eq!(arena.used(), 0);
    assert_eq!(
        arena.address_of(arena.position()),
        Some(arena.blocks()[0].base())
    );

    arena.release();
}

#[test]
fn test_overflowing_push_appends_exactly_one_block() {
    let mut arena = Arena::new(256);
    arena.push_raw(200).unwrap();
    assert_eq!(arena.blocks().len(), 1);

    arena.push_raw(100).unwrap();

    let blocks = arena.blocks();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].size(), blocks[0].capacity());
    assert_eq!(blocks[1].size(), 100);
}

#[test]
fn test_new_block_is_aligned_at_its_base() {
    let mut arena = ArenaConfig::new(100).with_alignment(64).build().unwrap();
    arena.push(90).unwrap();

    let ptr = arena.push(40).unwrap();
    assert_eq!(arena.blocks().len(), 2);
    assert_eq!(ptr.as_ptr().addr() % 64, 0);
}

#[test]
fn test_growth_is_geometric() {
    let mut arena = Arena::new(64);
    let mut previous = 64;

    for request in [50, 100, 10, 700, 30, 3000] {
        let before = arena.blocks().len();
        arena.push_raw(request).unwrap();

        if arena.blocks().len() > before {
            let block = arena.blocks().last().unwrap();
            assert!(block.capacity() >= 2 * request);
            assert!(block.capacity() >= previous);
            previous = block.capacity();
        }
    }
}

#[test]
fn test_pop_to_discards_later_blocks_without_releasing() {
    let (store, log) = TrackingStore::new();
    let mut arena = ArenaConfig::new(128).build_with(store).unwrap();

    arena.push_raw(64).unwrap();
    let mark = arena.position();
    for _ in 0..16 {
        arena.push_raw(96).unwrap();
    }
    let reserved = log.borrow().reserved.len();
    assert!(reserved > 2);

    arena.pop_to(mark);

    assert_eq!(arena.position(), mark);
    assert_eq!(block_sizes(&arena)[0], 64);
    assert!(block_sizes(&arena)[1..].iter().all(|&size| size == 0));
    assert!(log.borrow().released.is_empty());

    // Refilling reuses the kept blocks.
    for _ in 0..16 {
        arena.push_raw(96).unwrap();
    }
    assert_eq!(log.borrow().reserved.len(), reserved);
}

#[test]
fn test_checkpoint_from_pointer_releases_that_allocation() {
    let mut arena = Arena::new(64);
    let keep = arena.alloc(1u64).unwrap();
    let first_dropped = arena.alloc([0u8; 40]).unwrap();
    arena.alloc([0u8; 200]).unwrap();

    let checkpoint = arena
        .checkpoint_at(first_dropped.as_ptr().cast::<u8>())
        .unwrap();
    arena.pop_to(checkpoint);

    assert_eq!(arena.used(), 8);
    unsafe { assert_eq!(*keep.as_ptr(), 1) };
}

#[test]
fn test_release_returns_blocks_in_chain_order() {
    let (store, log) = TrackingStore::new();
    let mut arena = ArenaConfig::new(64).build_with(store).unwrap();
    for size in [60, 100, 300, 900] {
        arena.push_raw(size).unwrap();
    }

    arena.release();

    let log = log.borrow();
    assert_eq!(log.outstanding(), 0);
    assert_eq!(log.reserved, log.released);
}

#[test]
fn test_drop_releases_like_release() {
    let (store, log) = TrackingStore::new();
    {
        let mut arena = ArenaConfig::new(64).build_with(store).unwrap();
        arena.push_raw(500).unwrap();
    }
    assert_eq!(log.borrow().outstanding(), 0);
    assert_eq!(log.borrow().released.len(), 2);
}

#[test]
fn test_growth_hints_previous_block_end() {
    let (store, log) = TrackingStore::new();
    let mut arena = ArenaConfig::new(64).build_with(store).unwrap();
    arena.push_raw(100).unwrap();

    let log = log.borrow();
    assert_eq!(log.hints[0], None);
    let (head, head_size) = log.reserved[0];
    assert_eq!(log.hints[1], Some(head + head_size));
}

#[test]
fn test_recoverable_exhaustion_keeps_arena_usable() {
    let mut arena = ArenaConfig::new(128)
        .fixed()
        .on_exhaustion(OnExhaustion::Error)
        .build()
        .unwrap();

    let mark = arena.position();
    arena.push_raw(100).unwrap();
    assert!(arena.push_raw(100).is_err());

    arena.pop_to(mark);
    assert!(arena.push_raw(128).is_ok());
}
