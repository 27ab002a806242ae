//! # segfit-memory
//!
//! Fixed-capacity segregated-fit allocator.
//!
//! One byte arena is carved, once, into blocks of a few fixed payload sizes.
//! Each block starts with an in-place header that threads it into a single
//! free list. Allocation takes the first free block whose payload size equals
//! the request; release pushes the block back on the list head. There is no
//! splitting, coalescing or growth.
#![warn(missing_docs)]

pub mod arena;
pub mod config;
pub mod constants;
pub mod error;
pub mod handle;
mod header;
pub mod layout;
pub mod shared;
pub mod stats;

pub use arena::{FreeList, SegregatedArena};
pub use config::ArenaConfig;
pub use error::{ArenaError, ConfigError};
pub use handle::BlockHandle;
pub use header::BlockState;
pub use layout::{BlockInfo, Partition};
pub use shared::SharedArena;
pub use stats::AllocStats;
