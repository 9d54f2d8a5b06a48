//! Per-sprint and per-sprint-backlog advisory locks
//!
//! Overlap checks read the sibling set and then write; two callers working on
//! the same sprint backlog must not interleave between those steps. Sprint
//! keys order before backlog keys, and a caller takes its sprint key before
//! any backlog key, so callers never wait on each other in a cycle.

use std::sync::Arc;

use bl_core::traits::Id;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockKey {
    Sprint(Id),
    SprintBacklog(Id),
}

type LockTable = DashMap<LockKey, Arc<Mutex<()>>>;

/// One async mutex per key, created on first use and dropped once released
/// with no waiters
#[derive(Clone, Default)]
pub struct SprintBacklogLocks {
    locks: Arc<LockTable>,
}

/// Held lock; releasing it evicts the table entry when nobody else wants it
pub struct LockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    table: Arc<LockTable>,
    key: LockKey,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.table
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl SprintBacklogLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn lock(&self, key: LockKey) -> LockGuard {
        // The map shard guard must be released before awaiting
        let mutex = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        LockGuard {
            guard: Some(mutex.lock_owned().await),
            table: self.locks.clone(),
            key,
        }
    }

    /// Lock several keys in ascending order, skipping duplicates
    pub async fn lock_all(&self, keys: impl IntoIterator<Item = LockKey>) -> Vec<LockGuard> {
        let mut keys: Vec<LockKey> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            guards.push(self.lock(key).await);
        }
        guards
    }

    /// Number of keys currently locked or awaited
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
