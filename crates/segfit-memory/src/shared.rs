//! Thread-safe wrapper around a single arena.
//!
//! All state that callers share (the free-list head and the block headers)
//! sits behind one mutex, so single-threaded use observes exactly the LIFO
//! order of [`SegregatedArena`].

use std::sync::Arc;

use parking_lot::Mutex;

use crate::arena::SegregatedArena;
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::handle::BlockHandle;
use crate::stats::AllocStats;

/// Cloneable, `Send + Sync` handle to one [`SegregatedArena`].
#[derive(Clone, Debug)]
pub struct SharedArena {
    inner: Arc<Mutex<SegregatedArena>>,
}

impl SharedArena {
    /// Build and partition a new shared arena.
    pub fn new(config: ArenaConfig) -> Self {
        Self::from_arena(SegregatedArena::new(config))
    }

    /// Share an existing arena.
    pub fn from_arena(arena: SegregatedArena) -> Self {
        Self {
            inner: Arc::new(Mutex::new(arena)),
        }
    }

    /// See [`SegregatedArena::allocate`].
    pub fn allocate(&self, size: usize) -> Result<BlockHandle, ArenaError> {
        self.inner.lock().allocate(size)
    }

    /// See [`SegregatedArena::release`].
    pub fn release(&self, handle: BlockHandle) -> Result<(), ArenaError> {
        self.inner.lock().release(handle)
    }

    /// See [`SegregatedArena::release_opt`].
    pub fn release_opt(&self, handle: Option<BlockHandle>) -> Result<(), ArenaError> {
        self.inner.lock().release_opt(handle)
    }

    /// Run `f` on the payload of an allocated block while holding the lock.
    pub fn with_payload<R>(
        &self,
        handle: &BlockHandle,
        f: impl FnOnce(&[u8]) -> R,
    ) -> Result<R, ArenaError> {
        let arena = self.inner.lock();
        Ok(f(arena.payload(handle)?))
    }

    /// Run `f` on the mutable payload of an allocated block while holding the lock.
    pub fn with_payload_mut<R>(
        &self,
        handle: &BlockHandle,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R, ArenaError> {
        let mut arena = self.inner.lock();
        Ok(f(arena.payload_mut(handle)?))
    }

    /// Number of free blocks across all classes.
    pub fn free_blocks(&self) -> usize {
        self.inner.lock().free_blocks()
    }

    /// Number of free blocks of the given class.
    pub fn free_count(&self, payload_size: u8) -> usize {
        self.inner.lock().free_count(payload_size)
    }

    /// Snapshot of the allocation counters.
    pub fn stats(&self) -> AllocStats {
        self.inner.lock().stats()
    }

    /// See [`SegregatedArena::check_integrity`].
    pub fn check_integrity(&self) -> Result<(), ArenaError> {
        self.inner.lock().check_integrity()
    }
}

impl Default for SharedArena {
    fn default() -> Self {
        Self::new(ArenaConfig::reference())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn clones_share_one_free_list() {
        let a = SharedArena::default();
        let b = a.clone();
        let h = a.allocate(15).unwrap();
        assert_eq!(b.free_count(15), 4);
        b.release(h).unwrap();
        assert_eq!(a.free_count(15), 5);
    }

    #[test]
    fn single_thread_keeps_lifo_order() {
        let arena = SharedArena::default();
        let first = arena.allocate(15).unwrap();
        arena.release(first).unwrap();
        let again = arena.allocate(15).unwrap();
        assert_eq!(again.block_offset(), first.block_offset());
    }

    #[test]
    fn payload_closures() {
        let arena = SharedArena::default();
        let h = arena.allocate(15).unwrap();
        arena.with_payload_mut(&h, |p| p[0] = 42).unwrap();
        assert_eq!(arena.with_payload(&h, |p| p[0]).unwrap(), 42);
        arena.release(h).unwrap();
        assert!(arena.with_payload(&h, |p| p[0]).is_err());
    }

    #[test]
    fn threads_never_share_a_block() {
        let arena = SharedArena::default();
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let arena = arena.clone();
                thread::spawn(move || {
                    let mut held = Vec::new();
                    while let Ok(h) = arena.allocate(180) {
                        held.push(h);
                    }
                    held
                })
            })
            .collect();

        let mut offsets: Vec<u32> = workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .map(|h| h.block_offset())
            .collect();
        offsets.sort_unstable();
        offsets.dedup();
        assert_eq!(offsets.len(), 20);
        assert_eq!(arena.free_count(180), 0);
        arena.check_integrity().unwrap();
    }
}
