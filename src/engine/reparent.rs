//! # Reparenting
//!
//! Moves a node under a new parent (or to root level) together with its
//! entire subtree. The old gap is closed, a gap of the subtree's full width
//! is opened under the new parent, and every moving row shifts by the same
//! offset, so descendants keep their relative layout.
//!
//! Cycle validation runs before the first row is mutated: a target equal to
//! the node or lying inside its interval would detach the subtree from the
//! forest, and is rejected outright.

use hashbrown::HashSet;
use tracing::debug;

use super::gap::{close_gap, open_gap};
use super::TreeEngine;
use crate::error::TreeError;
use crate::node::{Node, NodeId};
use crate::store::NodeStore;

impl<S: NodeStore> TreeEngine<S> {
    /// Make `new_parent` the parent of `id`; `None` turns the node into the
    /// rightmost root. Requesting the current parent is a no-op.
    pub fn reparent(&self, id: NodeId, new_parent: Option<NodeId>) -> Result<Node, TreeError> {
        let node = self.store.get(id)?.ok_or(TreeError::NotFound(id))?;
        if node.parent == new_parent {
            return Ok(node);
        }

        if let Some(parent_id) = new_parent {
            if parent_id == id {
                return Err(TreeError::CycleRejected {
                    node: id,
                    target: parent_id,
                });
            }
            let target = self
                .store
                .get(parent_id)?
                .ok_or(TreeError::NotFound(parent_id))?;
            if node.contains(&target) {
                return Err(TreeError::CycleRejected {
                    node: id,
                    target: parent_id,
                });
            }
        }

        let width = node.width();
        let moving = self.store.find_subtree(node.left, node.right)?;
        let moving_ids: HashSet<NodeId> = moving.iter().map(|row| row.id).collect();

        // Close the old gap. Every moving row has right <= node.right, so the
        // shift query cannot catch the subtree itself.
        let candidates = self.store.nodes_to_shift(node.right)?;
        let closed = close_gap(&candidates, node.right, width);
        self.store.save_all(&closed)?;

        let new_left = match new_parent {
            Some(parent_id) => {
                let guard = self.store.lock_for_write(parent_id)?;
                let mut parent_row = *guard;
                let insert_at = parent_row.right;

                // The detached subtree still sits in the store with stale
                // intervals; keep it out of the shift pass.
                let candidates: Vec<Node> = self
                    .store
                    .nodes_to_shift(insert_at)?
                    .into_iter()
                    .filter(|row| !moving_ids.contains(&row.id))
                    .collect();
                let mut batch = open_gap(&candidates, insert_at, width);
                parent_row.right += width;
                batch.push(parent_row);
                self.store.save_all(&batch)?;
                insert_at
            }
            None => {
                let max_right = self
                    .store
                    .all_ordered_by_left()?
                    .iter()
                    .filter(|row| !moving_ids.contains(&row.id))
                    .map(|row| row.right)
                    .max()
                    .unwrap_or(0);
                max_right + 1
            }
        };

        let delta = new_left - node.left;
        let mut batch = moving;
        for row in &mut batch {
            row.left += delta;
            row.right += delta;
            if row.id == id {
                row.parent = new_parent;
            }
        }
        self.store.save_all(&batch)?;

        debug!(
            node = %id,
            new_parent = ?new_parent,
            delta,
            rows = batch.len(),
            "reparented subtree"
        );

        Ok(batch
            .iter()
            .find(|row| row.id == id)
            .copied()
            .ok_or(TreeError::NotFound(id))?)
    }
}
