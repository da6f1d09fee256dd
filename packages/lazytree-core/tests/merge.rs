use std::sync::Arc;

use lazytree_core::{
    combine, find, merge_at, merge_at_with, DecorationPolicy, Decorator, Node, NodeId, Tree,
};

fn ids(nodes: &[Arc<Node>]) -> Vec<&str> {
    nodes.iter().map(|n| n.id.as_str()).collect()
}

#[test]
fn expand_merges_children_and_derives_leaf_flags() {
    let tree = Tree::new(vec![Node::new("A", "a", true)]);
    let fresh = vec![Node::new("B", "b", false), Node::new("C", "c", true)];

    let next = merge_at(&tree, Some(&"A".into()), fresh);

    let a = find(&next, &"A".into()).unwrap();
    assert_eq!(ids(a.children()), vec!["B", "C"]);
    assert!(!a.is_leaf);
    assert!(a.children()[0].is_leaf);
    assert!(!a.children()[1].is_leaf);
}

#[test]
fn create_refetch_preserves_loaded_grandchildren() {
    let tree = Tree::new(vec![Node::new("A", "a", true).with_children(vec![
        Node::new("B", "b", true).with_children(vec![Node::new("X", "x", false)]),
    ])]);
    let old_b = Arc::clone(find(&tree, &"B".into()).unwrap());

    let fresh = vec![Node::new("B", "b", true), Node::new("D", "d", false)];
    let next = merge_at(&tree, Some(&"A".into()), fresh);

    let a = find(&next, &"A".into()).unwrap();
    assert_eq!(ids(a.children()), vec!["B", "D"]);
    assert!(Arc::ptr_eq(&a.children()[0], &old_b));
    assert_eq!(ids(a.children()[0].children()), vec!["X"]);
}

#[test]
fn combine_follows_fresh_order_and_drops_missing() {
    let existing: Vec<Arc<Node>> = vec![
        Arc::new(Node::new("A", "a", false)),
        Arc::new(Node::new("B", "b", false)),
        Arc::new(Node::new("C", "c", false)),
    ];
    let fresh = vec![Node::new("C", "c", false), Node::new("N", "n", true), Node::new("A", "a", false)];
    let merged = combine(&existing, fresh);
    assert_eq!(ids(&merged), vec!["C", "N", "A"]);
    assert!(Arc::ptr_eq(&merged[0], &existing[2]));
    assert!(Arc::ptr_eq(&merged[2], &existing[0]));
}

#[test]
fn combine_keeps_existing_fields_over_fresh_ones() {
    let existing = vec![Arc::new(Node::new("A", "old name", false))];
    let merged = combine(&existing, vec![Node::new("A", "new name", false)]);
    assert_eq!(merged[0].name, "old name");
}

#[test]
fn combine_is_idempotent() {
    let fresh = vec![Node::new("A", "a", true), Node::new("B", "b", false)];
    let first = combine(&[], fresh.clone());
    let second = combine(&first, fresh);
    assert_eq!(first, second);
    for (a, b) in first.iter().zip(second.iter()) {
        assert!(Arc::ptr_eq(a, b));
    }
}

#[test]
fn merge_at_root_without_parent() {
    let tree = Tree::new(vec![Node::new("A", "a", true).with_children(vec![])]);
    let next = merge_at(&tree, None, vec![Node::new("Z", "z", false), Node::new("A", "a", true)]);
    assert_eq!(ids(next.roots()), vec!["Z", "A"]);
    assert!(next.roots()[1].is_loaded());
}

#[test]
fn merge_at_unknown_parent_is_a_no_op() {
    let tree = Tree::new(vec![Node::new("A", "a", true)]);
    let next = merge_at(&tree, Some(&NodeId::from("ghost")), vec![Node::new("B", "b", false)]);
    assert!(next.ptr_eq(&tree));
}

#[test]
fn empty_fetch_marks_parent_loaded_but_not_leaf() {
    let tree = Tree::new(vec![Node::new("A", "a", true)]);
    let next = merge_at(&tree, Some(&"A".into()), Vec::new());
    let a = find(&next, &"A".into()).unwrap();
    assert!(a.is_loaded());
    assert!(a.children().is_empty());
    assert!(!a.is_leaf);
}

#[test]
fn only_adopted_nodes_are_decorated() {
    let policy = DecorationPolicy::new()
        .disabled_when(|n| n.kind == "locked")
        .reason_with(|n| (n.kind == "locked").then(|| format!("{} is locked", n.name)));

    let kept = Node::new("B", "b", false).with_kind("locked");
    let tree = Tree::new(vec![Node::new("A", "a", true).with_children(vec![kept])]);
    let fresh = vec![
        Node::new("B", "b", false).with_kind("locked"),
        Node::new("C", "c", false).with_kind("locked"),
    ];
    let next = merge_at_with(&tree, Some(&"A".into()), fresh, &policy);

    let b = find(&next, &"B".into()).unwrap();
    assert!(!b.disabled, "preserved nodes keep their earlier decoration");
    let c = find(&next, &"C".into()).unwrap();
    assert!(c.disabled);
    assert_eq!(c.disable_tip.as_deref(), Some("c is locked"));
}

#[test]
fn decoration_recurses_into_loaded_children() {
    let policy = DecorationPolicy::new().disabled_when(|n| n.name.starts_with('x'));
    let node = Node::new("A", "a", true).with_children(vec![Node::new("X", "xray", false)]);
    let decorated = policy.decorate(node);
    assert!(!decorated.disabled);
    assert!(decorated.children()[0].disabled);
    assert_eq!(decorated.children()[0].disable_tip, None);
}
