//! # Row-Level Write Locks
//!
//! Exclusive per-row locks for the in-memory store. Gap allocation must hold
//! an exclusive lock on the parent row so two concurrent inserts under the
//! same parent never compute the same gap; everything else in the engine is
//! serialized by the caller's transaction discipline.
//!
//! Locks are sharded by node id to keep the lock table itself uncontended,
//! and entries are reference-counted so the table stays empty when no lock is
//! held. Acquisition blocks; there is no timeout — a stuck holder fails the
//! whole enclosing transaction, which matches the engine's all-or-nothing
//! model.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};

use crate::node::NodeId;

const ROW_SHARD_COUNT: usize = 64;

/// Counters for monitoring lock behavior.
#[derive(Debug, Default)]
pub struct LockStats {
    pub rows_locked: AtomicU64,
    pub rows_contended: AtomicU64,
}

impl LockStats {
    fn record(&self, contended: bool) {
        self.rows_locked.fetch_add(1, Ordering::Relaxed);
        if contended {
            self.rows_contended.fetch_add(1, Ordering::Relaxed);
        }
    }
}

struct RowLockEntry {
    lock: RwLock<()>,
    ref_count: AtomicU64,
}

impl RowLockEntry {
    fn new() -> Self {
        Self {
            lock: RwLock::new(()),
            ref_count: AtomicU64::new(1),
        }
    }
}

struct RowLockShard {
    entries: Mutex<HashMap<NodeId, Arc<RowLockEntry>>>,
}

impl RowLockShard {
    fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn get_or_create(&self, id: NodeId) -> Arc<RowLockEntry> {
        let mut map = self.entries.lock();
        if let Some(entry) = map.get(&id) {
            entry.ref_count.fetch_add(1, Ordering::AcqRel);
            return Arc::clone(entry);
        }
        let entry = Arc::new(RowLockEntry::new());
        map.insert(id, Arc::clone(&entry));
        entry
    }

    fn release(&self, id: NodeId, entry: &RowLockEntry) {
        if entry.ref_count.fetch_sub(1, Ordering::AcqRel) == 1 {
            let mut map = self.entries.lock();
            // Re-check under the shard lock: another thread may have taken a
            // reference between our decrement and this cleanup.
            if entry.ref_count.load(Ordering::Acquire) == 0 {
                map.remove(&id);
            }
        }
    }
}

/// Exclusive hold on one row, released on drop.
pub struct RowWriteGuard<'a> {
    shard: &'a RowLockShard,
    id: NodeId,
    entry: Arc<RowLockEntry>,
}

impl Drop for RowWriteGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: lock_exclusive acquired the write lock and forgot its guard,
        // so this thread still holds it and must be the one to release it.
        unsafe { self.entry.lock.force_unlock_write() };
        self.shard.release(self.id, &self.entry);
    }
}

/// Sharded exclusive row-lock table.
pub struct RowLockManager {
    shards: Vec<RowLockShard>,
    pub stats: LockStats,
}

impl Default for RowLockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RowLockManager {
    pub fn new() -> Self {
        Self {
            shards: (0..ROW_SHARD_COUNT).map(|_| RowLockShard::new()).collect(),
            stats: LockStats::default(),
        }
    }

    fn shard(&self, id: NodeId) -> &RowLockShard {
        let index = (id.get() as usize).wrapping_mul(31) % ROW_SHARD_COUNT;
        &self.shards[index]
    }

    /// Acquire an exclusive lock on a row (blocking).
    pub fn lock_exclusive(&self, id: NodeId) -> RowWriteGuard<'_> {
        let shard = self.shard(id);
        let entry = shard.get_or_create(id);

        let contended = entry.lock.try_write().is_none();
        let guard = entry.lock.write();
        // Keep holding the write lock past this scope; RowWriteGuard's Drop
        // performs the matching force_unlock_write.
        std::mem::forget(guard);

        self.stats.record(contended);

        RowWriteGuard { shard, id, entry }
    }
}
