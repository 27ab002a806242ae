//! Greedy largest-first partitioning of the arena into blocks.

use serde::Serialize;

use crate::config::{block_size, ArenaConfig};
use crate::constants::HEADER_SIZE;

/// Position and class of one carved block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockInfo {
    /// Offset of the block header within the arena.
    pub offset: u32,
    /// Payload capacity of the block.
    pub payload_size: u8,
}

impl BlockInfo {
    /// Offset of the first payload byte.
    pub fn payload_offset(&self) -> usize {
        self.offset as usize + HEADER_SIZE
    }

    /// One past the last payload byte.
    pub fn end(&self) -> usize {
        self.payload_offset() + usize::from(self.payload_size)
    }
}

/// The fixed block layout of an arena, in carve order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    capacity: usize,
    blocks: Vec<BlockInfo>,
}

impl Partition {
    /// Carve `config.capacity()` bytes from offset 0.
    ///
    /// At each position the largest class whose header and payload still fit is
    /// carved. Carving stops at the first position where no class fits; the
    /// remaining bytes are tail padding.
    #[allow(clippy::cast_possible_truncation)]
    pub fn compute(config: &ArenaConfig) -> Self {
        let capacity = config.capacity();
        let mut blocks = Vec::new();
        let mut cursor = 0usize;

        while let Some(&payload_size) = config
            .size_classes()
            .iter()
            .find(|&&class| cursor + block_size(class) <= capacity)
        {
            // capacity <= MAX_ARENA_CAPACITY, so offsets fit in u32.
            blocks.push(BlockInfo {
                offset: cursor as u32,
                payload_size,
            });
            cursor += block_size(payload_size);
        }

        Self { capacity, blocks }
    }

    /// All blocks in carve (address) order.
    pub fn blocks(&self) -> &[BlockInfo] {
        &self.blocks
    }

    /// Number of carved blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no block was carved.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of blocks of the given class.
    pub fn count_of(&self, payload_size: u8) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.payload_size == payload_size)
            .count()
    }

    /// Bytes covered by carved blocks.
    pub fn used_bytes(&self) -> usize {
        self.blocks.last().map_or(0, BlockInfo::end)
    }

    /// Trailing bytes too small for any class.
    pub fn tail_padding(&self) -> usize {
        self.capacity - self.used_bytes()
    }

    /// Total arena capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Carve-order index of the block whose header starts at `offset`.
    pub fn index_of(&self, offset: u32) -> Option<usize> {
        self.blocks.binary_search_by_key(&offset, |b| b.offset).ok()
    }

    /// The block whose header starts at `offset`, if any.
    pub fn find(&self, offset: u32) -> Option<&BlockInfo> {
        self.index_of(offset).map(|i| &self.blocks[i])
    }
}
