//! Allocator and configuration error types.

use crate::constants::exit_codes;

/// Errors returned by allocate, release and payload access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// The requested size is not one of the configured size classes.
    #[error("invalid size {requested}: not a configured size class")]
    InvalidSize {
        /// Requested payload size in bytes.
        requested: usize,
    },

    /// Every block of the requested size class is currently allocated.
    #[error("out of memory: no free block with a {size}-byte payload")]
    OutOfMemory {
        /// Payload size of the exhausted class.
        size: u8,
    },

    /// The block named by the handle is already on the free list.
    #[error("double free of block at offset {offset}")]
    DoubleFree {
        /// Header offset of the block.
        offset: u32,
    },

    /// The block was re-allocated since the handle was issued.
    #[error(
        "stale handle for block at offset {offset}: handle generation {handle_generation}, block generation {block_generation}"
    )]
    StaleHandle {
        /// Header offset of the block.
        offset: u32,
        /// Generation carried by the handle.
        handle_generation: u32,
        /// Generation currently stored in the block header.
        block_generation: u32,
    },

    /// The handle was not issued by this arena, or names no carved block.
    #[error("handle does not belong to this arena (block offset {offset})")]
    ForeignHandle {
        /// Header offset claimed by the handle.
        offset: u32,
    },

    /// Payload access through a handle whose block has been released.
    #[error("use after free of block at offset {offset}")]
    UseAfterFree {
        /// Header offset of the block.
        offset: u32,
    },

    /// A header carried an unknown state tag.
    #[error("corrupt block header at offset {offset}")]
    CorruptHeader {
        /// Header offset of the block.
        offset: u32,
    },
}

impl ArenaError {
    /// Whether this error reports caller misuse rather than exhaustion.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::InvalidSize { .. }
                | Self::DoubleFree { .. }
                | Self::StaleHandle { .. }
                | Self::ForeignHandle { .. }
                | Self::UseAfterFree { .. }
        )
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::OutOfMemory { .. } => exit_codes::ERROR_OUT_OF_MEMORY,
            Self::CorruptHeader { .. } => exit_codes::ERROR_GENERIC,
            _ => exit_codes::ERROR_MISUSE,
        }
    }
}

/// Errors raised while building or loading an [`ArenaConfig`](crate::config::ArenaConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No size classes were given.
    #[error("at least one size class is required")]
    EmptySizeClasses,

    /// A size class with a zero-byte payload.
    #[error("size classes must have a non-zero payload")]
    ZeroPayload,

    /// The same payload size appears twice.
    #[error("duplicate size class {0}")]
    DuplicateSizeClass(u8),

    /// The arena cannot hold a single block of the smallest class.
    #[error("capacity {capacity} cannot hold a single {min_block}-byte block")]
    CapacityTooSmall {
        /// Configured capacity in bytes.
        capacity: usize,
        /// Header plus payload of the smallest class.
        min_block: usize,
    },

    /// The arena is larger than block offsets can address.
    #[error("capacity {capacity} exceeds the maximum of {max} bytes")]
    CapacityTooLarge {
        /// Configured capacity in bytes.
        capacity: usize,
        /// Largest supported capacity.
        max: usize,
    },

    /// A configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        exit_codes::ERROR_CONFIG
    }
}
