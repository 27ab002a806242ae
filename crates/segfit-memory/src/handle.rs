//! Capability handles for allocated blocks.
//!
//! A [`BlockHandle`] names one allocation of one block in one arena. The
//! generation it carries is compared with the block header on every use, so a
//! handle outliving its allocation is rejected instead of corrupting the free
//! list.

use std::fmt;
use std::ops::Range;

use crate::constants::HEADER_SIZE;

/// Opaque token returned by `allocate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct BlockHandle {
    pub(crate) arena_id: u32,
    pub(crate) offset: u32,
    pub(crate) payload_size: u8,
    pub(crate) generation: u32,
}

impl BlockHandle {
    pub(crate) fn new(arena_id: u32, offset: u32, payload_size: u8, generation: u32) -> Self {
        Self {
            arena_id,
            offset,
            payload_size,
            generation,
        }
    }

    /// Offset of the block header within the arena.
    pub fn block_offset(&self) -> u32 {
        self.offset
    }

    /// Offset of the first payload byte within the arena.
    pub fn payload_offset(&self) -> usize {
        self.offset as usize + HEADER_SIZE
    }

    /// Payload capacity in bytes.
    pub fn payload_size(&self) -> u8 {
        self.payload_size
    }

    /// Arena byte range covered by the payload.
    pub fn payload_range(&self) -> Range<usize> {
        let start = self.payload_offset();
        start..start + usize::from(self.payload_size)
    }

    /// Allocation generation of the block when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether two handles' payloads share any byte.
    pub fn overlaps(&self, other: &Self) -> bool {
        let a = self.payload_range();
        let b = other.payload_range();
        self.arena_id == other.arena_id && a.start < b.end && b.start < a.end
    }
}

impl fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BlockHandle(arena={}, off={}, size={}, gen={})",
            self.arena_id, self.offset, self.payload_size, self.generation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_follows_header() {
        let h = BlockHandle::new(1, 196, 180, 3);
        assert_eq!(h.block_offset(), 196);
        assert_eq!(h.payload_offset(), 212);
        assert_eq!(h.payload_range(), 212..392);
        assert_eq!(h.payload_size(), 180);
        assert_eq!(h.generation(), 3);
    }

    #[test]
    fn adjacent_blocks_do_not_overlap() {
        let a = BlockHandle::new(1, 0, 180, 1);
        let b = BlockHandle::new(1, 196, 180, 1);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&a));
    }

    #[test]
    fn handles_from_different_arenas_never_overlap() {
        let a = BlockHandle::new(1, 0, 15, 1);
        let b = BlockHandle::new(2, 0, 15, 1);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn display_names_every_field() {
        let h = BlockHandle::new(4, 3920, 15, 2);
        assert_eq!(h.to_string(), "BlockHandle(arena=4, off=3920, size=15, gen=2)");
    }
}
