//! # Gap Arithmetic
//!
//! Pure shift computations for opening and closing interval gaps. Both
//! functions take the candidate rows the store's shift query returned
//! (`right > boundary`), compute new intervals, and hand the changed subset
//! back; persistence stays with the caller, keeping the store-interaction
//! layer the only stateful boundary.
//!
//! Opening a gap at a parent's right edge is the minimal perturbation that
//! inserts a new last child: everything past the edge slides outward, the
//! parent's own edge is the caller's to bump (its pre-shift `right` equals
//! the insertion point, so including it in the pass would double-count).

use crate::node::Node;

/// Shift candidates outward to make room for `width` endpoint values at
/// `insert_at`. Candidates must be the rows with `right > insert_at`,
/// excluding the parent whose edge is being opened.
///
/// A candidate with `left < insert_at` is an ancestor of the insertion
/// point: only its `right` grows, reflecting one more descendant inside it.
pub(crate) fn open_gap(candidates: &[Node], insert_at: i64, width: i64) -> Vec<Node> {
    candidates
        .iter()
        .map(|&node| {
            let mut node = node;
            node.right += width;
            if node.left >= insert_at {
                node.left += width;
            }
            node
        })
        .collect()
}

/// Shift candidates inward after the interval ending at `removed_right` with
/// the given `width` was removed. Candidates must be the rows with
/// `right > removed_right`.
///
/// Rows entirely past the removed range move whole; rows straddling it
/// (ancestors of the removed subtree) shrink from the right only.
pub(crate) fn close_gap(candidates: &[Node], removed_right: i64, width: i64) -> Vec<Node> {
    candidates
        .iter()
        .map(|&node| {
            let mut node = node;
            node.right -= width;
            if node.left > removed_right {
                node.left -= width;
            }
            node
        })
        .collect()
}
