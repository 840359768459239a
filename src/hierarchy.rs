//! # Hierarchy Assembly
//!
//! Turns a flat node list back into a forest of response values — the read
//! side of the engine, pure and store-free. A node whose declared parent is
//! absent from the input is treated as top-level, so a partial subtree
//! renders as its own small forest.
//!
//! Assembly processes nodes in descending `left` order. That is not exact
//! post-order, but it guarantees every node is handled only after all of its
//! proper descendants: a descendant always has a strictly larger `left` than
//! its ancestor. By the time a node attaches its children, each child already
//! carries its own.

use hashbrown::{HashMap, HashSet};

use crate::node::{Node, NodeId};

/// Response value that receives its children by replacement: attaching
/// returns the (possibly new) value superseding the pre-attachment one.
pub trait Assemble: Sized {
    fn attach_children(self, children: Vec<Self>) -> Self;
}

/// Ready-made response type carrying the interval alongside the children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeView {
    pub id: NodeId,
    pub left: i64,
    pub right: i64,
    pub children: Vec<TreeView>,
}

impl From<&Node> for TreeView {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            left: node.left,
            right: node.right,
            children: Vec::new(),
        }
    }
}

impl Assemble for TreeView {
    fn attach_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }
}

/// Assemble a forest of response values from a flat node list.
///
/// `convert` maps each node to its response value; children are attached in
/// input order. The result lists the top-level values in input order.
pub fn assemble<R, F>(nodes: &[Node], mut convert: F) -> Vec<R>
where
    R: Assemble,
    F: FnMut(&Node) -> R,
{
    if nodes.is_empty() {
        return Vec::new();
    }

    let present: HashSet<NodeId> = nodes.iter().map(|node| node.id).collect();

    let mut assembled: HashMap<NodeId, R> = nodes
        .iter()
        .map(|node| (node.id, convert(node)))
        .collect();

    let mut child_ids: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for node in nodes {
        if let Some(parent) = node.parent {
            if present.contains(&parent) {
                child_ids.entry(parent).or_default().push(node.id);
            }
        }
    }

    let mut order: Vec<&Node> = nodes.iter().collect();
    order.sort_by(|a, b| b.left.cmp(&a.left));

    for node in order {
        let children: Vec<R> = child_ids
            .remove(&node.id)
            .unwrap_or_default()
            .iter()
            .filter_map(|child| assembled.remove(child))
            .collect();
        if let Some(value) = assembled.remove(&node.id) {
            assembled.insert(node.id, value.attach_children(children));
        }
    }

    nodes
        .iter()
        .filter(|node| node.parent.map_or(true, |parent| !present.contains(&parent)))
        .filter_map(|node| assembled.remove(&node.id))
        .collect()
}
