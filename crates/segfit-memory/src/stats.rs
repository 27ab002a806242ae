//! Atomic allocation counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Snapshot of allocator activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AllocStats {
    /// Successful allocations.
    pub allocations: u64,
    /// Successful releases.
    pub releases: u64,
    /// Allocations that failed with `OutOfMemory`.
    pub out_of_memory: u64,
    /// Calls rejected for misuse (invalid size, double free, stale handle).
    pub rejected: u64,
}

impl AllocStats {
    /// Allocations not yet matched by a release.
    pub fn outstanding(&self) -> u64 {
        self.allocations.saturating_sub(self.releases)
    }
}

/// Relaxed atomic counters behind [`AllocStats`].
#[derive(Debug)]
pub struct AtomicAllocStats {
    allocations: AtomicU64,
    releases: AtomicU64,
    out_of_memory: AtomicU64,
    rejected: AtomicU64,
}

impl AtomicAllocStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self {
            allocations: AtomicU64::new(0),
            releases: AtomicU64::new(0),
            out_of_memory: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Take a snapshot of the current counters.
    pub fn snapshot(&self) -> AllocStats {
        AllocStats {
            allocations: self.allocations.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            out_of_memory: self.out_of_memory.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.allocations.store(0, Ordering::Relaxed);
        self.releases.store(0, Ordering::Relaxed);
        self.out_of_memory.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
    }

    pub(crate) fn record_allocation(&self) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_out_of_memory(&self) {
        self.out_of_memory.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for AtomicAllocStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stats_are_zeroed() {
        let stats = AtomicAllocStats::new();
        assert_eq!(stats.snapshot(), AllocStats::default());
    }

    #[test]
    fn record_and_snapshot() {
        let stats = AtomicAllocStats::new();
        stats.record_allocation();
        stats.record_allocation();
        stats.record_allocation();
        stats.record_release();
        stats.record_out_of_memory();
        stats.record_rejected();
        stats.record_rejected();
        let snap = stats.snapshot();
        assert_eq!(snap.allocations, 3);
        assert_eq!(snap.releases, 1);
        assert_eq!(snap.out_of_memory, 1);
        assert_eq!(snap.rejected, 2);
        assert_eq!(snap.outstanding(), 2);
    }

    #[test]
    fn reset_clears_counters() {
        let stats = AtomicAllocStats::new();
        stats.record_allocation();
        stats.record_out_of_memory();
        stats.reset();
        assert_eq!(stats.snapshot(), AllocStats::default());
    }
}
