//! # In-Memory Node Store
//!
//! Reference [`NodeStore`] backend: a hash map of rows behind a `RwLock`,
//! with a sharded [`RowLockManager`] providing the exclusive row locks the
//! engine needs during gap allocation. Scans collect and sort on demand —
//! this backend exists to make the engine usable and testable standalone,
//! not to compete with an indexed table.
//!
//! Batches are applied under one write lock on the map, so a `save_all` is
//! atomic with respect to concurrent scans.

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::row_locks::{RowLockManager, RowWriteGuard};
use super::NodeStore;
use crate::error::TreeError;
use crate::node::{Node, NodeId};

pub struct MemoryStore {
    rows: RwLock<HashMap<NodeId, Node>>,
    row_locks: RowLockManager,
    next_id: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            row_locks: RowLockManager::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn scan<F>(&self, mut predicate: F) -> Vec<Node>
    where
        F: FnMut(&Node) -> bool,
    {
        self.rows
            .read()
            .values()
            .filter(|n| predicate(n))
            .copied()
            .collect()
    }
}

/// Row snapshot taken after the exclusive lock was granted, so the holder
/// sees the value no concurrent writer can still be changing.
pub struct MemoryWriteGuard<'a> {
    node: Node,
    _lock: RowWriteGuard<'a>,
}

impl Deref for MemoryWriteGuard<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl std::fmt::Debug for MemoryWriteGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryWriteGuard")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

impl NodeStore for MemoryStore {
    type WriteGuard<'a>
        = MemoryWriteGuard<'a>
    where
        Self: 'a;

    fn all_ordered_by_left(&self) -> Result<Vec<Node>, TreeError> {
        let mut nodes: Vec<Node> = self.rows.read().values().copied().collect();
        nodes.sort_by_key(|n| n.left);
        Ok(nodes)
    }

    fn get(&self, id: NodeId) -> Result<Option<Node>, TreeError> {
        Ok(self.rows.read().get(&id).copied())
    }

    fn allocate_id(&self) -> Result<NodeId, TreeError> {
        Ok(NodeId::new(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    fn lock_for_write(&self, id: NodeId) -> Result<Self::WriteGuard<'_>, TreeError> {
        let lock = self.row_locks.lock_exclusive(id);
        // Read after the lock is granted: the row may have been shifted by a
        // writer we were waiting on, or deleted outright.
        let node = self
            .rows
            .read()
            .get(&id)
            .copied()
            .ok_or(TreeError::NotFound(id))?;
        Ok(MemoryWriteGuard { node, _lock: lock })
    }

    fn find_prev_sibling(
        &self,
        parent: Option<NodeId>,
        left: i64,
    ) -> Result<Option<Node>, TreeError> {
        Ok(self
            .scan(|n| n.parent == parent && n.right < left)
            .into_iter()
            .max_by_key(|n| n.right))
    }

    fn find_next_sibling(
        &self,
        parent: Option<NodeId>,
        right: i64,
    ) -> Result<Option<Node>, TreeError> {
        Ok(self
            .scan(|n| n.parent == parent && n.left > right)
            .into_iter()
            .min_by_key(|n| n.left))
    }

    fn find_subtree(&self, left: i64, right: i64) -> Result<Vec<Node>, TreeError> {
        let mut nodes = self.scan(|n| n.left >= left && n.right <= right);
        nodes.sort_by_key(|n| n.left);
        Ok(nodes)
    }

    fn nodes_to_shift(&self, right: i64) -> Result<Vec<Node>, TreeError> {
        Ok(self.scan(|n| n.right > right))
    }

    fn ancestors(&self, left: i64, right: i64) -> Result<Vec<Node>, TreeError> {
        let mut nodes = self.scan(|n| n.left < left && n.right > right);
        nodes.sort_by_key(|n| n.left);
        Ok(nodes)
    }

    fn descendants(&self, left: i64, right: i64) -> Result<Vec<Node>, TreeError> {
        let mut nodes = self.scan(|n| n.left > left && n.right < right);
        nodes.sort_by_key(|n| n.left);
        Ok(nodes)
    }

    fn max_right(&self) -> Result<i64, TreeError> {
        Ok(self.rows.read().values().map(|n| n.right).max().unwrap_or(0))
    }

    fn save_all(&self, nodes: &[Node]) -> Result<(), TreeError> {
        let mut rows = self.rows.write();
        for node in nodes {
            rows.insert(node.id, *node);
        }
        Ok(())
    }

    fn remove(&self, nodes: &[Node]) -> Result<(), TreeError> {
        let mut rows = self.rows.write();
        for node in nodes {
            rows.remove(&node.id);
        }
        Ok(())
    }
}
