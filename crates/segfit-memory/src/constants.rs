//! Reference configuration values and process exit codes.

/// Arena capacity of the reference configuration, in bytes.
pub const DEFAULT_ARENA_CAPACITY: usize = 4096;

/// Payload size of the SMALL size class.
pub const SMALL_PAYLOAD: u8 = 15;

/// Payload size of the LARGE size class.
pub const LARGE_PAYLOAD: u8 = 180;

/// Size classes of the reference configuration, largest first.
pub const DEFAULT_SIZE_CLASSES: [u8; 2] = [LARGE_PAYLOAD, SMALL_PAYLOAD];

/// Bytes occupied by every in-place block header.
///
/// Matches the footprint of a pointer-plus-size-byte header on a 64-bit target.
pub const HEADER_SIZE: usize = 16;

/// Largest supported arena capacity.
///
/// Block offsets are stored as `u32` in headers and `u32::MAX` marks the end of
/// the free list, so every offset must stay strictly below it.
pub const MAX_ARENA_CAPACITY: usize = 1 << 31;

/// Process exit codes used by the `segfit` binary.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// A size class ran out of free blocks.
    pub const ERROR_OUT_OF_MEMORY: i32 = 2;
    /// The allocator rejected a call (bad size, double free, stale handle).
    pub const ERROR_MISUSE: i32 = 3;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_classes_are_largest_first() {
        assert!(DEFAULT_SIZE_CLASSES.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn default_capacity_fits_offsets() {
        assert!(DEFAULT_ARENA_CAPACITY < MAX_ARENA_CAPACITY);
        assert!(u32::try_from(MAX_ARENA_CAPACITY).is_ok());
    }
}
