//! # Node Store
//!
//! The flat, orderable row store the engine mutates. The engine never walks
//! the tree recursively at the storage level; everything it needs is an
//! ordered or range scan over interval endpoints, plus an exclusive row lock
//! for gap allocation. Any backend that can answer these queries (a SQL
//! table with two indexed integer columns is the canonical one) can sit
//! behind [`NodeStore`]; [`MemoryStore`] is the bundled reference backend.
//!
//! `save_all` and `remove` must flush synchronously: the engine re-reads its
//! own writes within a single operation. Transaction boundaries are the
//! caller's responsibility — one engine operation maps to one transaction.

mod memory;
mod row_locks;

use std::ops::Deref;

pub use memory::{MemoryStore, MemoryWriteGuard};
pub use row_locks::{LockStats, RowLockManager, RowWriteGuard};

use crate::error::TreeError;
use crate::node::{Node, NodeId};

pub trait NodeStore {
    /// Exclusive hold on one row; dereferences to the row as read at lock
    /// acquisition. Released at drop, i.e. when the operation ends.
    type WriteGuard<'a>: Deref<Target = Node>
    where
        Self: 'a;

    /// Every row, ordered by ascending `left`.
    fn all_ordered_by_left(&self) -> Result<Vec<Node>, TreeError>;

    fn get(&self, id: NodeId) -> Result<Option<Node>, TreeError>;

    /// Mint a fresh, never-used id for a row about to be created.
    fn allocate_id(&self) -> Result<NodeId, TreeError>;

    /// Lock a row exclusively until the guard drops. Fails with
    /// [`TreeError::NotFound`] if the id does not resolve.
    fn lock_for_write(&self, id: NodeId) -> Result<Self::WriteGuard<'_>, TreeError>;

    /// Greatest `right < left` among rows with the given parent.
    fn find_prev_sibling(
        &self,
        parent: Option<NodeId>,
        left: i64,
    ) -> Result<Option<Node>, TreeError>;

    /// Smallest `left > right` among rows with the given parent.
    fn find_next_sibling(
        &self,
        parent: Option<NodeId>,
        right: i64,
    ) -> Result<Option<Node>, TreeError>;

    /// Rows with `left >= left` and `right <= right`: the boundary node and
    /// its whole subtree.
    fn find_subtree(&self, left: i64, right: i64) -> Result<Vec<Node>, TreeError>;

    /// Rows with `right` strictly greater than the given value — the
    /// candidate set for every gap shift pass.
    fn nodes_to_shift(&self, right: i64) -> Result<Vec<Node>, TreeError>;

    /// Rows strictly enclosing the given interval.
    fn ancestors(&self, left: i64, right: i64) -> Result<Vec<Node>, TreeError>;

    /// Rows strictly inside the given interval.
    fn descendants(&self, left: i64, right: i64) -> Result<Vec<Node>, TreeError>;

    /// Greatest `right` across all rows, 0 for an empty store.
    fn max_right(&self) -> Result<i64, TreeError>;

    /// Upsert a batch; must be visible to the next read.
    fn save_all(&self, nodes: &[Node]) -> Result<(), TreeError>;

    /// Remove a batch; must be invisible to the next read.
    fn remove(&self, nodes: &[Node]) -> Result<(), TreeError>;
}
