//! Serializable reports and their text rendering.

use std::fmt;

use serde::Serialize;
use segfit_memory::constants::HEADER_SIZE;
use segfit_memory::{AllocStats, BlockInfo, SegregatedArena};

/// Blocks carved for one size class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassSummary {
    /// Payload size in bytes.
    pub payload_size: u8,
    /// Header plus payload bytes.
    pub block_size: usize,
    /// Number of blocks of this class.
    pub count: usize,
}

/// The partition of an arena.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport {
    /// Arena capacity in bytes.
    pub capacity: usize,
    /// In-place header size in bytes.
    pub header_size: usize,
    /// Blocks per class, largest first.
    pub classes: Vec<ClassSummary>,
    /// Every block in carve order.
    pub blocks: Vec<BlockInfo>,
    /// Unusable bytes at the end of the arena.
    pub tail_padding: usize,
    /// Header offset of the first free block.
    pub free_list_head: Option<u32>,
}

impl LayoutReport {
    /// Describe the partition of `arena`.
    pub fn from_arena(arena: &SegregatedArena) -> Self {
        let partition = arena.partition();
        let classes = arena
            .config()
            .size_classes()
            .iter()
            .map(|&payload_size| ClassSummary {
                payload_size,
                block_size: HEADER_SIZE + usize::from(payload_size),
                count: partition.count_of(payload_size),
            })
            .collect();
        Self {
            capacity: partition.capacity(),
            header_size: HEADER_SIZE,
            classes,
            blocks: partition.blocks().to_vec(),
            tail_padding: partition.tail_padding(),
            free_list_head: arena.free_list().next().map(|b| b.offset),
        }
    }
}

impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Arena: {} bytes, {}-byte headers",
            self.capacity, self.header_size
        )?;
        for class in &self.classes {
            writeln!(
                f,
                "  class {:>3}: {:>4} blocks of {} bytes",
                class.payload_size, class.count, class.block_size
            )?;
        }
        writeln!(f, "  tail padding: {} bytes", self.tail_padding)?;
        match self.free_list_head {
            Some(head) => writeln!(f, "  free list head: offset {head}")?,
            None => writeln!(f, "  free list head: none")?,
        }
        writeln!(f, "Blocks (carve order):")?;
        for block in &self.blocks {
            writeln!(
                f,
                "  {:>6}  payload {:>3} @ {}",
                block.offset,
                block.payload_size,
                block.payload_offset()
            )?;
        }
        Ok(())
    }
}

/// Outcome of the allocate/release/reuse demo.
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    /// Payload offset of the first small allocation.
    pub small_offset: usize,
    /// Payload offset of the large allocation.
    pub large_offset: usize,
    /// Payload offset of the small allocation made after both releases.
    pub reallocated_offset: usize,
    /// Whether the reallocation returned the first small block.
    pub reused: bool,
    /// Allocator counters at the end of the run.
    pub stats: AllocStats,
}

impl fmt::Display for DemoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "allocate(small) -> payload @ {}", self.small_offset)?;
        writeln!(f, "allocate(large) -> payload @ {}", self.large_offset)?;
        writeln!(f, "release both")?;
        writeln!(
            f,
            "allocate(small) -> payload @ {} ({})",
            self.reallocated_offset,
            if self.reused { "reused" } else { "new block" }
        )
    }
}

/// Outcome of exhausting one size class.
#[derive(Debug, Clone, Serialize)]
pub struct ExhaustReport {
    /// Exhausted payload size.
    pub size: u8,
    /// Blocks allocated before `OutOfMemory`.
    pub allocated: usize,
    /// For every other class, whether one more allocation still succeeded.
    pub others_available: Vec<(u8, bool)>,
    /// Allocator counters at the end of the run.
    pub stats: AllocStats,
}

impl fmt::Display for ExhaustReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "class {}: {} blocks allocated, then out of memory",
            self.size, self.allocated
        )?;
        if self.others_available.is_empty() {
            return Ok(());
        }
        write!(f, "other classes:")?;
        for (size, ok) in &self.others_available {
            write!(f, " {size}={}", if *ok { "available" } else { "exhausted" })?;
        }
        writeln!(f)
    }
}
