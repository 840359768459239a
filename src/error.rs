//! # Error Taxonomy
//!
//! All structural errors are raised by validation passes that run before the
//! first row is mutated, so a rejected operation leaves the store untouched.
//! Mid-operation backend failures travel as [`TreeError::Store`] and it is the
//! enclosing transaction's job to roll the partial work back; the engine has
//! no partial-completion semantics.

use thiserror::Error;

use crate::node::NodeId;

#[derive(Debug, Error)]
pub enum TreeError {
    /// A referenced row does not resolve. Fatal to the operation, no retry.
    #[error("node {0} not found")]
    NotFound(NodeId),

    /// Reparent target lies inside the moving subtree.
    #[error("cannot move node {node} under {target}: target is its own descendant")]
    CycleRejected { node: NodeId, target: NodeId },

    /// An integrity check found intervals violating the nested-set invariants.
    #[error("tree integrity violated: {0}")]
    Corrupt(String),

    /// Backend failure from a `NodeStore` implementation, propagated as-is.
    #[error("node store failure")]
    Store(#[from] eyre::Report),
}
