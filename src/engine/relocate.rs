//! # Sibling Reordering
//!
//! Swaps a node's subtree with its adjacent sibling's subtree. The two row
//! sets are disjoint, so both relocations are computed as one batch of final
//! target intervals and applied together — no scratch offset is needed and
//! no transient overlap exists even mid-batch. Cost is proportional to the
//! two subtree sizes, independent of the rest of the forest.

use tracing::debug;

use super::TreeEngine;
use crate::error::TreeError;
use crate::node::{Node, NodeId};
use crate::store::NodeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Swap with the immediately preceding sibling.
    Up,
    /// Swap with the immediately following sibling.
    Down,
}

impl<S: NodeStore> TreeEngine<S> {
    /// Move a node before (`Up`) or after (`Down`) its adjacent sibling.
    ///
    /// Siblings share a parent id; roots are siblings of each other. With no
    /// adjacent sibling in the requested direction the node is returned
    /// unchanged — a no-op, not an error.
    pub fn move_node(&self, id: NodeId, direction: MoveDirection) -> Result<Node, TreeError> {
        let node = self.store.get(id)?.ok_or(TreeError::NotFound(id))?;

        let sibling = match direction {
            MoveDirection::Up => self.store.find_prev_sibling(node.parent, node.left)?,
            MoveDirection::Down => self.store.find_next_sibling(node.parent, node.right)?,
        };
        let Some(sibling) = sibling else {
            debug!(node = %id, ?direction, "no adjacent sibling, nothing to move");
            return Ok(node);
        };

        let node_width = node.width();
        let sibling_width = sibling.width();
        let (node_delta, sibling_delta) = match direction {
            MoveDirection::Up => (-sibling_width, node_width),
            MoveDirection::Down => (sibling_width, -node_width),
        };

        let mut batch = self.store.find_subtree(node.left, node.right)?;
        for row in &mut batch {
            row.left += node_delta;
            row.right += node_delta;
        }
        let mut sibling_rows = self.store.find_subtree(sibling.left, sibling.right)?;
        for row in &mut sibling_rows {
            row.left += sibling_delta;
            row.right += sibling_delta;
        }
        batch.append(&mut sibling_rows);
        self.store.save_all(&batch)?;

        debug!(
            node = %id,
            sibling = %sibling.id,
            ?direction,
            rows = batch.len(),
            "swapped sibling subtrees"
        );

        // find_subtree returned the boundary node among its rows
        Ok(batch
            .iter()
            .find(|row| row.id == id)
            .copied()
            .ok_or(TreeError::NotFound(id))?)
    }
}
