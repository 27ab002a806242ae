//! In-place block header codec.
//!
//! Every block starts with a [`HEADER_SIZE`]-byte header stored in the arena
//! itself. Layout, little-endian:
//!
//! ```text
//! 0..4   next free block offset (u32::MAX = end of list)
//! 4      payload size
//! 5      state tag
//! 6..8   reserved
//! 8..12  generation
//! 12..16 reserved
//! ```
//!
//! Allocation only flips the state tag and bumps the generation. The `next`
//! bytes of an allocated block keep whatever link it had while free and are
//! meaningless until the block is released and relinked.

use crate::constants::HEADER_SIZE;

/// Sentinel `next` value marking the free-list tail.
pub(crate) const NIL: u32 = u32::MAX;

const NEXT: usize = 0;
const SIZE: usize = 4;
const STATE: usize = 5;
const GENERATION: usize = 8;

const FREE_TAG: u8 = 0xF5;
const ALLOCATED_TAG: u8 = 0xA1;

/// Whether a block is on the free list or held by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// Linked into the free list.
    Free,
    /// Handed out by `allocate`.
    Allocated,
}

impl BlockState {
    fn tag(self) -> u8 {
        match self {
            Self::Free => FREE_TAG,
            Self::Allocated => ALLOCATED_TAG,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            FREE_TAG => Some(Self::Free),
            ALLOCATED_TAG => Some(Self::Allocated),
            _ => None,
        }
    }
}

/// Decoded copy of one block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockHeader {
    pub next: Option<u32>,
    pub payload_size: u8,
    pub state: BlockState,
    pub generation: u32,
}

impl BlockHeader {
    /// Header of a freshly carved block.
    pub fn carved(payload_size: u8, next: Option<u32>) -> Self {
        Self {
            next,
            payload_size,
            state: BlockState::Free,
            generation: 0,
        }
    }

    /// Decode the header at `at`. `None` if the state tag is unknown.
    pub fn read(arena: &[u8], at: usize) -> Option<Self> {
        let bytes = &arena[at..at + HEADER_SIZE];
        let state = BlockState::from_tag(bytes[STATE])?;
        Some(Self {
            next: decode_next(read_u32(bytes, NEXT)),
            payload_size: bytes[SIZE],
            state,
            generation: read_u32(bytes, GENERATION),
        })
    }

    /// Encode this header at `at`, clearing the reserved bytes.
    pub fn write(&self, arena: &mut [u8], at: usize) {
        let bytes = &mut arena[at..at + HEADER_SIZE];
        bytes.fill(0);
        write_u32(bytes, NEXT, self.next.unwrap_or(NIL));
        bytes[SIZE] = self.payload_size;
        bytes[STATE] = self.state.tag();
        write_u32(bytes, GENERATION, self.generation);
    }
}

/// Read only the `next` link of the header at `at`.
pub(crate) fn read_next(arena: &[u8], at: usize) -> Option<u32> {
    decode_next(read_u32(&arena[at..at + HEADER_SIZE], NEXT))
}

/// Rewrite only the `next` link of the header at `at`.
pub(crate) fn write_next(arena: &mut [u8], at: usize, next: Option<u32>) {
    write_u32(&mut arena[at..at + HEADER_SIZE], NEXT, next.unwrap_or(NIL));
}

/// Read only the payload size of the header at `at`.
pub(crate) fn read_payload_size(arena: &[u8], at: usize) -> u8 {
    arena[at + SIZE]
}

fn decode_next(raw: u32) -> Option<u32> {
    (raw != NIL).then_some(raw)
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn write_u32(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let mut arena = vec![0u8; 64];
        let header = BlockHeader {
            next: Some(32),
            payload_size: 15,
            state: BlockState::Allocated,
            generation: 7,
        };
        header.write(&mut arena, 16);
        assert_eq!(BlockHeader::read(&arena, 16), Some(header));
        assert_eq!(read_next(&arena, 16), Some(32));
        assert_eq!(read_payload_size(&arena, 16), 15);
    }

    #[test]
    fn tail_link_is_nil() {
        let mut arena = vec![0u8; HEADER_SIZE];
        BlockHeader::carved(180, None).write(&mut arena, 0);
        assert_eq!(&arena[0..4], &NIL.to_le_bytes());
        assert_eq!(read_next(&arena, 0), None);
    }

    #[test]
    fn next_link_updates_in_place() {
        let mut arena = vec![0u8; HEADER_SIZE];
        BlockHeader::carved(15, None).write(&mut arena, 0);
        write_next(&mut arena, 0, Some(4044));
        let header = BlockHeader::read(&arena, 0).unwrap();
        assert_eq!(header.next, Some(4044));
        assert_eq!(header.payload_size, 15);
        assert_eq!(header.state, BlockState::Free);
    }

    #[test]
    fn zeroed_bytes_are_not_a_header() {
        let arena = vec![0u8; HEADER_SIZE];
        assert_eq!(BlockHeader::read(&arena, 0), None);
    }
}
