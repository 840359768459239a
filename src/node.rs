//! # Node Model
//!
//! The tree unit stored in the flat node store. A node owns an integer
//! interval `[left, right]`; interval containment encodes the hierarchy:
//!
//! ```text
//! root      [1                    10]
//! ├─ a      [2        7]
//! │  ├─ a1  [3  4]
//! │  └─ a2  [5  6]
//! └─ b      [8  9]
//! ```
//!
//! Structural questions reduce to interval comparisons: `a` contains `a1`, so
//! `a1` is a descendant of `a`; `a` and `b` are disjoint, so neither contains
//! the other. The `parent` field is a non-owning back-reference kept for
//! sibling queries and rebuilds; the authoritative structure is the intervals.
//!
//! ## Invariants
//!
//! After every completed mutation:
//!
//! - `right - left` is a positive odd integer; a leaf has `right - left == 1`
//! - any two intervals are disjoint or one strictly contains the other
//! - a node's interval lies strictly inside its parent's interval, and a node
//!   without a parent is enclosed by no other interval
//! - all endpoint values are globally unique
//!
//! [`verify`] checks all of these over a full forest snapshot.

use std::fmt;

use hashbrown::HashSet;

use crate::error::TreeError;

/// Opaque, immutable row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tree row: identity, interval, and a weak parent reference.
///
/// `left` and `right` are owned exclusively by the mutation engine; no other
/// actor may assign them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub left: i64,
    pub right: i64,
    pub parent: Option<NodeId>,
}

impl Node {
    pub fn new(id: NodeId, left: i64, right: i64, parent: Option<NodeId>) -> Self {
        Self {
            id,
            left,
            right,
            parent,
        }
    }

    /// Interval width `right - left + 1`: the amount of endpoint space the
    /// subtree occupies, and the shift distance when it is removed.
    pub fn width(&self) -> i64 {
        self.right - self.left + 1
    }

    pub fn is_leaf(&self) -> bool {
        self.right - self.left == 1
    }

    /// Number of proper descendants, derived from the interval alone.
    pub fn descendant_count(&self) -> i64 {
        (self.right - self.left - 1) / 2
    }

    /// True if `other` is a proper descendant of `self`.
    pub fn contains(&self, other: &Node) -> bool {
        self.left < other.left && other.right < self.right
    }
}

/// Validates the nested-set invariants over a full forest snapshot.
///
/// Sweeps the rows in ascending `left` order keeping a stack of open
/// intervals; the stack top is always the tightest enclosing interval, which
/// must match the row's `parent` reference. Any partial overlap, duplicated
/// endpoint, or even-width interval fails with [`TreeError::Corrupt`].
pub fn verify(nodes: &[Node]) -> Result<(), TreeError> {
    let mut endpoints = HashSet::with_capacity(nodes.len() * 2);
    for node in nodes {
        let span = node.right - node.left;
        if span < 1 || span % 2 == 0 {
            return Err(TreeError::Corrupt(format!(
                "node {} has invalid interval [{}, {}]",
                node.id, node.left, node.right
            )));
        }
        if !endpoints.insert(node.left) || !endpoints.insert(node.right) {
            return Err(TreeError::Corrupt(format!(
                "node {} reuses an endpoint of [{}, {}]",
                node.id, node.left, node.right
            )));
        }
    }

    let mut sorted: Vec<&Node> = nodes.iter().collect();
    sorted.sort_by_key(|n| n.left);

    let mut open: Vec<&Node> = Vec::new();
    for node in sorted {
        while let Some(top) = open.last() {
            if top.right < node.left {
                open.pop();
            } else {
                break;
            }
        }
        match open.last() {
            Some(top) => {
                if node.right > top.right {
                    return Err(TreeError::Corrupt(format!(
                        "nodes {} and {} overlap without nesting",
                        top.id, node.id
                    )));
                }
                if node.parent != Some(top.id) {
                    return Err(TreeError::Corrupt(format!(
                        "node {} is enclosed by {} but references {:?}",
                        node.id, top.id, node.parent
                    )));
                }
            }
            None => {
                if let Some(parent) = node.parent {
                    return Err(TreeError::Corrupt(format!(
                        "node {} references parent {} but is enclosed by no interval",
                        node.id, parent
                    )));
                }
            }
        }
        open.push(node);
    }
    Ok(())
}
