//! Fixed-capacity segregated-fit arena.
//!
//! The arena is one owned byte buffer carved at construction into blocks of the
//! configured size classes. Free blocks form a singly linked list whose links
//! live in the block headers; allocation takes the first free block whose
//! payload size equals the request, release pushes the block back on the head.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{debug, trace};

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::handle::BlockHandle;
use crate::header::{self, BlockHeader, BlockState};
use crate::layout::{BlockInfo, Partition};
use crate::stats::{AllocStats, AtomicAllocStats};

static NEXT_ARENA_ID: AtomicU32 = AtomicU32::new(1);

/// Segregated-fit allocator over a single fixed byte arena.
pub struct SegregatedArena {
    id: u32,
    config: ArenaConfig,
    storage: Box<[u8]>,
    partition: Partition,
    head: Option<u32>,
    stats: AtomicAllocStats,
}

impl SegregatedArena {
    /// Build the arena and carve it into blocks.
    ///
    /// Blocks are pushed onto the free list in carve order, so the list starts
    /// with the block nearest the end of the arena.
    pub fn new(config: ArenaConfig) -> Self {
        let partition = Partition::compute(&config);
        let mut storage = vec![0u8; config.capacity()].into_boxed_slice();

        let mut head = None;
        for block in partition.blocks() {
            BlockHeader::carved(block.payload_size, head).write(&mut storage, block.offset as usize);
            head = Some(block.offset);
        }

        let id = NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed);
        debug!(
            arena = id,
            capacity = config.capacity(),
            blocks = partition.len(),
            tail_padding = partition.tail_padding(),
            "arena partitioned"
        );

        Self {
            id,
            config,
            storage,
            partition,
            head,
            stats: AtomicAllocStats::new(),
        }
    }

    /// Allocate a block whose payload is exactly `size` bytes.
    pub fn allocate(&mut self, size: usize) -> Result<BlockHandle, ArenaError> {
        let Some(class) = self.config.class_for(size) else {
            self.stats.record_rejected();
            return Err(ArenaError::InvalidSize { requested: size });
        };

        let mut prev: Option<u32> = None;
        let mut cursor = self.head;
        while let Some(offset) = cursor {
            let at = offset as usize;
            let next = header::read_next(&self.storage, at);
            if header::read_payload_size(&self.storage, at) == class {
                let mut block = self.header(offset)?;
                match prev {
                    None => self.head = next,
                    Some(p) => header::write_next(&mut self.storage, p as usize, next),
                }
                block.state = BlockState::Allocated;
                block.generation = block.generation.wrapping_add(1);
                block.write(&mut self.storage, at);

                self.stats.record_allocation();
                trace!(arena = self.id, offset, size = class, generation = block.generation, "allocate");
                return Ok(BlockHandle::new(self.id, offset, class, block.generation));
            }
            prev = cursor;
            cursor = next;
        }

        self.stats.record_out_of_memory();
        Err(ArenaError::OutOfMemory { size: class })
    }

    /// Return a block to the head of the free list.
    ///
    /// Handles from another arena, stale handles and repeated releases are
    /// rejected and leave the free list untouched.
    pub fn release(&mut self, handle: BlockHandle) -> Result<(), ArenaError> {
        let result = self.try_release(handle);
        if result.is_err() {
            self.stats.record_rejected();
        }
        result
    }

    /// Release an optional handle; `None` is a no-op.
    pub fn release_opt(&mut self, handle: Option<BlockHandle>) -> Result<(), ArenaError> {
        match handle {
            Some(handle) => self.release(handle),
            None => Ok(()),
        }
    }

    fn try_release(&mut self, handle: BlockHandle) -> Result<(), ArenaError> {
        let offset = handle.offset;
        let mut block = self.resolve(&handle)?;
        if block.state == BlockState::Free {
            return Err(ArenaError::DoubleFree { offset });
        }

        block.state = BlockState::Free;
        block.next = self.head;
        block.write(&mut self.storage, offset as usize);
        self.head = Some(offset);

        self.stats.record_release();
        trace!(arena = self.id, offset, size = block.payload_size, "release");
        Ok(())
    }

    /// Borrow the payload of an allocated block.
    pub fn payload(&self, handle: &BlockHandle) -> Result<&[u8], ArenaError> {
        self.check_allocated(handle)?;
        Ok(&self.storage[handle.payload_range()])
    }

    /// Mutably borrow the payload of an allocated block.
    pub fn payload_mut(&mut self, handle: &BlockHandle) -> Result<&mut [u8], ArenaError> {
        self.check_allocated(handle)?;
        Ok(&mut self.storage[handle.payload_range()])
    }

    fn check_allocated(&self, handle: &BlockHandle) -> Result<(), ArenaError> {
        match self.resolve(handle)?.state {
            BlockState::Allocated => Ok(()),
            BlockState::Free => Err(ArenaError::UseAfterFree {
                offset: handle.offset,
            }),
        }
    }

    /// Check that a handle names a carved block of this arena at its current
    /// generation, and return that block's header.
    fn resolve(&self, handle: &BlockHandle) -> Result<BlockHeader, ArenaError> {
        let offset = handle.offset;
        let carved = self.partition.find(offset);
        if handle.arena_id != self.id
            || carved.map(|b| b.payload_size) != Some(handle.payload_size)
        {
            return Err(ArenaError::ForeignHandle { offset });
        }

        let block = self.header(offset)?;
        if block.generation != handle.generation {
            return Err(ArenaError::StaleHandle {
                offset,
                handle_generation: handle.generation,
                block_generation: block.generation,
            });
        }
        Ok(block)
    }

    fn header(&self, offset: u32) -> Result<BlockHeader, ArenaError> {
        BlockHeader::read(&self.storage, offset as usize).ok_or(ArenaError::CorruptHeader { offset })
    }

    /// Walk the free list from head to tail.
    pub fn free_list(&self) -> FreeList<'_> {
        FreeList {
            storage: &self.storage,
            cursor: self.head,
            remaining: self.partition.len(),
        }
    }

    /// Number of free blocks of the given class.
    pub fn free_count(&self, payload_size: u8) -> usize {
        self.free_list()
            .filter(|b| b.payload_size == payload_size)
            .count()
    }

    /// Number of free blocks across all classes.
    pub fn free_blocks(&self) -> usize {
        self.free_list().count()
    }

    /// Number of blocks currently held by callers.
    pub fn allocated_blocks(&self) -> usize {
        self.partition.len() - self.free_blocks()
    }

    /// State of the block whose header starts at `offset`.
    pub fn block_state(&self, offset: u32) -> Option<BlockState> {
        self.partition.find(offset)?;
        BlockHeader::read(&self.storage, offset as usize).map(|h| h.state)
    }

    /// Verify the free list against the partition.
    ///
    /// Every list node must be a distinct carved block marked free with the
    /// size recorded in the partition, and every block off the list must be
    /// marked allocated.
    pub fn check_integrity(&self) -> Result<(), ArenaError> {
        let blocks = self.partition.blocks();
        let mut on_list = vec![false; blocks.len()];

        let mut cursor = self.head;
        while let Some(offset) = cursor {
            let corrupt = ArenaError::CorruptHeader { offset };
            let index = self.partition.index_of(offset).ok_or(corrupt.clone())?;
            if on_list[index] {
                return Err(corrupt);
            }
            on_list[index] = true;

            let block = self.header(offset)?;
            if block.state != BlockState::Free || block.payload_size != blocks[index].payload_size {
                return Err(corrupt);
            }
            cursor = block.next;
        }

        for (info, &listed) in blocks.iter().zip(&on_list) {
            if !listed && self.header(info.offset)?.state != BlockState::Allocated {
                return Err(ArenaError::CorruptHeader {
                    offset: info.offset,
                });
            }
        }
        Ok(())
    }

    /// The block layout fixed at construction.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// The configuration this arena was built from.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Identifier stamped into every handle this arena issues.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Snapshot of the allocation counters.
    pub fn stats(&self) -> AllocStats {
        self.stats.snapshot()
    }

    /// Reset the allocation counters.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }
}

impl Default for SegregatedArena {
    fn default() -> Self {
        Self::new(ArenaConfig::reference())
    }
}

impl fmt::Debug for SegregatedArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegregatedArena")
            .field("id", &self.id)
            .field("capacity", &self.config.capacity())
            .field("size_classes", &self.config.size_classes())
            .field("blocks", &self.partition.len())
            .field("head", &self.head)
            .finish_non_exhaustive()
    }
}

/// Iterator over free blocks in list order.
///
/// Stops after as many steps as there are blocks, so a damaged list cannot
/// loop forever.
pub struct FreeList<'a> {
    storage: &'a [u8],
    cursor: Option<u32>,
    remaining: usize,
}

impl Iterator for FreeList<'_> {
    type Item = BlockInfo;

    fn next(&mut self) -> Option<BlockInfo> {
        if self.remaining == 0 {
            return None;
        }
        let offset = self.cursor?;
        self.remaining -= 1;
        let at = offset as usize;
        self.cursor = header::read_next(self.storage, at);
        Some(BlockInfo {
            offset,
            payload_size: header::read_payload_size(self.storage, at),
        })
    }
}
