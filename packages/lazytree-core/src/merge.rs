//! Merge reconciliation of freshly fetched siblings into materialized ones.
//!
//! The fetched list decides membership and order. A node already present keeps its `Arc`,
//! and with it any loaded grandchildren and previously computed decoration.

use std::collections::HashMap;
use std::sync::Arc;

use crate::decorate::{Decorator, NoDecoration};
use crate::ids::NodeId;
use crate::mutate::rewrite;
use crate::node::{Children, Node, Tree};

/// Combine `fresh` with `existing`, keeping existing nodes for matching ids.
pub fn combine(existing: &[Arc<Node>], fresh: Vec<Node>) -> Children {
    combine_with(existing, fresh, &NoDecoration)
}

/// As [`combine`], decorating only the nodes adopted from `fresh`.
pub fn combine_with<D: Decorator + ?Sized>(
    existing: &[Arc<Node>],
    fresh: Vec<Node>,
    decorator: &D,
) -> Children {
    let by_id: HashMap<&NodeId, &Arc<Node>> = existing.iter().map(|n| (&n.id, n)).collect();
    fresh
        .into_iter()
        .map(|node| match by_id.get(&node.id) {
            Some(kept) => Arc::clone(kept),
            None => Arc::new(adopt(node, decorator)),
        })
        .collect()
}

fn adopt<D: Decorator + ?Sized>(mut node: Node, decorator: &D) -> Node {
    node.is_leaf = !node.expand;
    decorator.decorate(node)
}

/// Merge `fresh` below `parent_id`, or into the root sequence when no parent is given.
///
/// The parent becomes a non-leaf even if `fresh` is empty. An unknown parent leaves the tree
/// unchanged.
pub fn merge_at(tree: &Tree, parent_id: Option<&NodeId>, fresh: Vec<Node>) -> Tree {
    merge_at_with(tree, parent_id, fresh, &NoDecoration)
}

pub fn merge_at_with<D: Decorator + ?Sized>(
    tree: &Tree,
    parent_id: Option<&NodeId>,
    fresh: Vec<Node>,
    decorator: &D,
) -> Tree {
    let parent_id = match parent_id {
        Some(p) if !p.is_all() => p,
        _ => return Tree::from_children(combine_with(tree.roots(), fresh, decorator)),
    };
    let mut fresh = Some(fresh);
    let rewritten = rewrite(tree.roots(), &mut |node: &Node| {
        if &node.id != parent_id {
            return None;
        }
        let mut next = node.clone();
        next.is_leaf = false;
        next.children = Some(combine_with(
            node.children(),
            fresh.take().unwrap_or_default(),
            decorator,
        ));
        Some(next)
    });
    match rewritten {
        Some(roots) => Tree::from_children(roots),
        None => tree.clone(),
    }
}
