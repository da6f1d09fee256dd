//! Read-only lookups over a tree snapshot.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::ids::NodeId;
use crate::node::{Node, Tree};

/// Preorder depth-first search for `id`.
pub fn find<'a>(tree: &'a Tree, id: &NodeId) -> Option<&'a Arc<Node>> {
    find_in(tree.roots(), id)
}

pub(crate) fn find_in<'a>(nodes: &'a [Arc<Node>], id: &NodeId) -> Option<&'a Arc<Node>> {
    for node in nodes {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in(node.children(), id) {
            return Some(found);
        }
    }
    None
}

/// Nearest node whose immediate children contain `id`. `None` for root-level or unknown ids.
pub fn find_parent<'a>(tree: &'a Tree, id: &NodeId) -> Option<&'a Arc<Node>> {
    find_parent_in(tree.roots(), id)
}

fn find_parent_in<'a>(nodes: &'a [Arc<Node>], id: &NodeId) -> Option<&'a Arc<Node>> {
    for node in nodes {
        let children = node.children();
        if children.iter().any(|child| &child.id == id) {
            return Some(node);
        }
        if let Some(found) = find_parent_in(children, id) {
            return Some(found);
        }
    }
    None
}

/// Ids from the root down to `id`, inclusive.
pub fn find_path(tree: &Tree, id: &NodeId) -> Option<Vec<NodeId>> {
    let mut path = Vec::new();
    if path_in(tree.roots(), id, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn path_in(nodes: &[Arc<Node>], id: &NodeId, path: &mut Vec<NodeId>) -> bool {
    for node in nodes {
        path.push(node.id.clone());
        if &node.id == id || path_in(node.children(), id, path) {
            return true;
        }
        path.pop();
    }
    false
}

/// Check that no id appears twice in the materialized tree. Intended for tests and debugging.
pub fn validate_invariants(tree: &Tree) -> Result<()> {
    let mut seen = HashSet::new();
    for node in tree.iter() {
        if !seen.insert(&node.id) {
            return Err(Error::InconsistentState(format!(
                "duplicate node id {}",
                node.id
            )));
        }
    }
    Ok(())
}

/// Flat id -> parent index derived from one snapshot.
#[derive(Clone, Debug, Default)]
pub struct TreeIndex {
    parents: HashMap<NodeId, Option<NodeId>>,
}

impl TreeIndex {
    pub fn build(tree: &Tree) -> Self {
        let mut parents = HashMap::new();
        let mut stack: Vec<(&Arc<Node>, Option<&NodeId>)> =
            tree.roots().iter().map(|n| (n, None)).collect();
        while let Some((node, parent)) = stack.pop() {
            parents.insert(node.id.clone(), parent.cloned());
            stack.extend(node.children().iter().map(|c| (c, Some(&node.id))));
        }
        Self { parents }
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.parents.contains_key(id)
    }

    /// `None` when `id` is unknown, `Some(None)` for root-level nodes.
    pub fn parent_of(&self, id: &NodeId) -> Option<Option<&NodeId>> {
        self.parents.get(id).map(Option::as_ref)
    }

    /// `id` followed by each ancestor up to its root. Empty when `id` is unknown.
    pub fn ancestors(&self, id: &NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.parents.get_key_value(id);
        while let Some((node, parent)) = current {
            chain.push(node.clone());
            current = parent.as_ref().and_then(|p| self.parents.get_key_value(p));
        }
        chain
    }

    /// True when `id` is `ancestor` or lies below it.
    pub fn is_within(&self, id: &NodeId, ancestor: &NodeId) -> bool {
        self.ancestors(id).iter().any(|a| a == ancestor)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}
