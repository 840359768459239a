//! # Interval Mutation Engine
//!
//! All writes to the nested-set encoding go through [`TreeEngine`]. Every
//! operation follows the same shape: resolve and validate against a read
//! snapshot (structural errors surface before any row is touched), compute a
//! pure update plan, persist it through `save_all` batches. Callers wrap each
//! operation in one transaction; the engine itself never spawns work or
//! suspends.
//!
//! | Operation     | Cost                      | Module        |
//! |---------------|---------------------------|---------------|
//! | `insert`      | O(rows past the gap)      | this module   |
//! | `delete`      | O(subtree + rows past it) | this module   |
//! | `move_node`   | O(both subtrees)          | `relocate`    |
//! | `reparent`    | O(subtree + shifted rows) | `reparent`    |
//! | `rebuild`     | O(whole forest)           | `rebuild`     |

mod gap;
mod rebuild;
mod relocate;
mod reparent;

pub use relocate::MoveDirection;

use tracing::debug;

use crate::error::TreeError;
use crate::node::{Node, NodeId};
use crate::store::NodeStore;

use gap::{close_gap, open_gap};

/// Endpoint space a fresh leaf occupies.
const LEAF_GAP: i64 = 2;

pub struct TreeEngine<S: NodeStore> {
    store: S,
}

impl<S: NodeStore> TreeEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Insert a new node as the last child of `parent`, or as the rightmost
    /// root when `parent` is `None`.
    ///
    /// Child insertion holds an exclusive lock on the parent row for the
    /// whole allocation so concurrent inserts under the same parent cannot
    /// compute the same gap.
    pub fn insert(&self, parent: Option<NodeId>) -> Result<Node, TreeError> {
        let id = self.store.allocate_id()?;
        let node = match parent {
            None => {
                let left = self.store.max_right()? + 1;
                Node::new(id, left, left + 1, None)
            }
            Some(parent_id) => {
                let guard = self.store.lock_for_write(parent_id)?;
                let mut parent_row = *guard;
                let insert_at = parent_row.right;

                // The shift query returns right > insert_at, which excludes
                // the parent itself; its edge is bumped directly.
                let candidates = self.store.nodes_to_shift(insert_at)?;
                let mut batch = open_gap(&candidates, insert_at, LEAF_GAP);
                parent_row.right += LEAF_GAP;
                batch.push(parent_row);
                self.store.save_all(&batch)?;

                debug!(
                    parent = %parent_id,
                    insert_at,
                    shifted = batch.len() - 1,
                    "opened insertion gap"
                );
                Node::new(id, insert_at, insert_at + 1, Some(parent_id))
            }
        };
        self.store.save_all(std::slice::from_ref(&node))?;
        debug!(node = %node.id, left = node.left, right = node.right, "inserted node");
        Ok(node)
    }

    /// Delete a node and its entire subtree, then close the gap it occupied.
    /// Returns the number of rows removed. There is no reparent-children-up
    /// mode; removal is unconditional.
    pub fn delete(&self, id: NodeId) -> Result<usize, TreeError> {
        let node = self.store.get(id)?.ok_or(TreeError::NotFound(id))?;
        let width = node.width();

        let doomed = self.store.find_subtree(node.left, node.right)?;
        self.store.remove(&doomed)?;

        let candidates = self.store.nodes_to_shift(node.right)?;
        let batch = close_gap(&candidates, node.right, width);
        self.store.save_all(&batch)?;

        debug!(
            node = %id,
            removed = doomed.len(),
            width,
            shifted = batch.len(),
            "deleted subtree"
        );
        Ok(doomed.len())
    }

    /// Rows strictly enclosing the node's interval, outermost first.
    pub fn ancestors_of(&self, id: NodeId) -> Result<Vec<Node>, TreeError> {
        let node = self.store.get(id)?.ok_or(TreeError::NotFound(id))?;
        self.store.ancestors(node.left, node.right)
    }

    /// Rows strictly inside the node's interval, in `left` order.
    pub fn descendants_of(&self, id: NodeId) -> Result<Vec<Node>, TreeError> {
        let node = self.store.get(id)?.ok_or(TreeError::NotFound(id))?;
        self.store.descendants(node.left, node.right)
    }
}
