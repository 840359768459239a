//! # Full Renumbering
//!
//! The recovery path: recomputes every interval from parent pointers alone,
//! by depth-first numbering. Existing `left` values are used only as a stable
//! ordering hint to keep sibling order — they are not assumed to form a valid
//! encoding, which is the point: this repairs drifted or never-assigned
//! intervals after corruption or bulk import.
//!
//! Rows whose parent id does not resolve within the forest are adopted as
//! roots and their parent reference is cleared; the repair path must
//! terminate on inconsistent input.

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use tracing::debug;

use super::TreeEngine;
use crate::error::TreeError;
use crate::node::{Node, NodeId};
use crate::store::NodeStore;

type ChildIndexes = SmallVec<[usize; 8]>;

impl<S: NodeStore> TreeEngine<S> {
    /// Renumber the whole forest from parent pointers. Idempotent: a second
    /// run over the result assigns identical intervals. Returns the number of
    /// rows written.
    pub fn rebuild(&self) -> Result<usize, TreeError> {
        let mut rows = self.store.all_ordered_by_left()?;
        if rows.is_empty() {
            return Ok(0);
        }

        let present: HashSet<NodeId> = rows.iter().map(|row| row.id).collect();
        for row in &mut rows {
            if let Some(parent) = row.parent {
                if !present.contains(&parent) {
                    row.parent = None;
                }
            }
        }

        // rows arrive sorted by left, so per-parent child lists inherit the
        // prior sibling order
        let mut children: HashMap<Option<NodeId>, ChildIndexes> = HashMap::new();
        for (index, row) in rows.iter().enumerate() {
            children.entry(row.parent).or_default().push(index);
        }

        renumber(None, 0, &children, &mut rows);
        self.store.save_all(&rows)?;

        debug!(rows = rows.len(), "rebuilt forest intervals");
        Ok(rows.len())
    }
}

/// Assign intervals to every child of `parent`, starting after `left`.
/// Returns the parent's own right edge (for the virtual forest root, the
/// next free endpoint value).
fn renumber(
    parent: Option<NodeId>,
    mut left: i64,
    children: &HashMap<Option<NodeId>, ChildIndexes>,
    rows: &mut [Node],
) -> i64 {
    if let Some(indexes) = children.get(&parent) {
        for &index in indexes {
            let child_left = left + 1;
            let child_id = rows[index].id;
            let child_right = renumber(Some(child_id), child_left, children, rows);
            rows[index].left = child_left;
            rows[index].right = child_right;
            left = child_right;
        }
    }
    left + 1
}
