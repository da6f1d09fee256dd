//! Pure tree rewrites. Each returns a new snapshot; only the nodes on the path to a change
//! are rebuilt and every untouched sibling list keeps its allocation.

use std::collections::HashSet;
use std::sync::Arc;

use crate::ids::NodeId;
use crate::node::{Children, Node, NodePatch, Tree};

/// Rebuild `nodes` with `edit` applied to every node it returns `Some` for.
/// Returns `None` when nothing below `nodes` changed.
pub(crate) fn rewrite<F>(nodes: &[Arc<Node>], edit: &mut F) -> Option<Children>
where
    F: FnMut(&Node) -> Option<Node>,
{
    let mut changed = false;
    let mut next = Vec::with_capacity(nodes.len());
    for node in nodes {
        let mut updated = edit(node);
        if let Some(children) = node.children.as_deref() {
            if let Some(new_children) = rewrite(children, edit) {
                let mut base = updated.unwrap_or_else(|| Node::clone(node));
                base.children = Some(new_children);
                updated = Some(base);
            }
        }
        match updated {
            Some(n) => {
                changed = true;
                next.push(Arc::new(n));
            }
            None => next.push(Arc::clone(node)),
        }
    }
    changed.then(|| next.into())
}

fn rewrite_tree<F>(tree: &Tree, mut edit: F) -> Tree
where
    F: FnMut(&Node) -> Option<Node>,
{
    match rewrite(tree.roots(), &mut edit) {
        Some(roots) => Tree::from_children(roots),
        None => tree.clone(),
    }
}

/// Replace the node `id` with `{...node, ...patch}`. Unknown ids return the same snapshot.
pub fn replace(tree: &Tree, id: &NodeId, patch: &NodePatch) -> Tree {
    rewrite_tree(tree, |node| (&node.id == id).then(|| node.patched(patch)))
}

/// Remove `id` from the children of `parent_id` and recompute the parent's leaf flag.
///
/// A missing or sentinel `parent_id` removes from the root sequence. A parent that cannot be
/// located, or whose children were never loaded, leaves the tree unchanged.
pub fn remove(tree: &Tree, parent_id: Option<&NodeId>, id: &NodeId) -> Tree {
    let parent_id = match parent_id {
        Some(p) if !p.is_all() => p,
        _ => {
            if !tree.roots().iter().any(|n| &n.id == id) {
                return tree.clone();
            }
            let roots: Vec<Arc<Node>> =
                tree.roots().iter().filter(|n| &n.id != id).cloned().collect();
            return Tree::from_children(roots.into());
        }
    };
    rewrite_tree(tree, |node| {
        if &node.id != parent_id {
            return None;
        }
        let children = node.children.as_deref()?;
        let remaining: Vec<Arc<Node>> = children.iter().filter(|c| &c.id != id).cloned().collect();
        let mut next = node.clone();
        next.is_leaf = remaining.is_empty();
        next.children = Some(remaining.into());
        Some(next)
    })
}

/// Add `delta` to `field` on every materialized node of `ancestor_ids` that carries that field.
pub fn adjust_counter(tree: &Tree, ancestor_ids: &[NodeId], field: &str, delta: i64) -> Tree {
    if delta == 0 || ancestor_ids.is_empty() {
        return tree.clone();
    }
    let targets: HashSet<&NodeId> = ancestor_ids.iter().collect();
    rewrite_tree(tree, |node| {
        if !targets.contains(&node.id) {
            return None;
        }
        let current = node.counter(field)?;
        let mut next = node.clone();
        next.counters.insert(field.to_string(), current + delta);
        Some(next)
    })
}

/// Split a materialized path into ids ordered from the node itself up to its root.
pub fn ancestor_chain(path: &str, separator: char) -> Vec<NodeId> {
    path.split(separator)
        .filter(|segment| !segment.is_empty())
        .rev()
        .map(NodeId::from)
        .collect()
}
