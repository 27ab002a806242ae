#![no_main]

use libfuzzer_sys::fuzz_target;

use segfit_memory::{ArenaError, BlockHandle, SegregatedArena};

fuzz_target!(|data: &[u8]| {
    let mut arena = SegregatedArena::default();
    let total = arena.partition().len();
    let mut held: Vec<BlockHandle> = Vec::new();
    let mut released: Vec<BlockHandle> = Vec::new();

    // Each byte is one operation: low two bits pick the kind, the rest pick
    // a size or an index.
    for &byte in data {
        let arg = usize::from(byte >> 2);
        match byte & 0b11 {
            0 => match arena.allocate(if arg % 2 == 0 { 15 } else { 180 }) {
                Ok(h) => {
                    assert!(held.iter().all(|other| !other.overlaps(&h)));
                    held.push(h);
                }
                Err(ArenaError::OutOfMemory { .. }) => {}
                Err(e) => panic!("unexpected error: {e}"),
            },
            1 if !held.is_empty() => {
                let h = held.swap_remove(arg % held.len());
                arena.release(h).unwrap();
                released.push(h);
            }
            2 if !released.is_empty() => {
                let h = released[arg % released.len()];
                assert!(arena.release(h).is_err());
            }
            3 => match arena.allocate(arg) {
                Ok(h) => held.push(h),
                Err(ArenaError::InvalidSize { .. }) => assert_ne!(arg, 15),
                Err(e) => assert!(arg == 15 && matches!(e, ArenaError::OutOfMemory { .. })),
            },
            _ => {}
        }
        assert_eq!(arena.free_blocks() + held.len(), total);
    }

    // Should not panic
    arena.check_integrity().unwrap();
});
