use lazytree_core::{find, find_parent, find_path, validate_invariants, Error, Node, NodeId, Tree, TreeIndex};

fn sample() -> Tree {
    Tree::new(vec![
        Node::new("A", "Sales", true).with_children(vec![
            Node::new("B", "Retail", true).with_children(vec![Node::new("X", "Shops", false)]),
            Node::new("C", "Contracts", false),
        ]),
        Node::new("E", "Engineering", true),
    ])
}

#[test]
fn find_returns_nested_nodes() {
    let tree = sample();
    assert_eq!(find(&tree, &"X".into()).map(|n| n.name.as_str()), Some("Shops"));
    assert_eq!(find(&tree, &"E".into()).map(|n| n.name.as_str()), Some("Engineering"));
    assert!(find(&tree, &"missing".into()).is_none());
}

#[test]
fn find_parent_returns_immediate_parent() {
    let tree = sample();
    assert_eq!(find_parent(&tree, &"X".into()).map(|n| n.id.clone()), Some(NodeId::from("B")));
    assert_eq!(find_parent(&tree, &"C".into()).map(|n| n.id.clone()), Some(NodeId::from("A")));
    assert!(find_parent(&tree, &"A".into()).is_none(), "root nodes have no parent");
    assert!(find_parent(&tree, &"missing".into()).is_none());
}

#[test]
fn find_path_runs_from_root_to_node() {
    let tree = sample();
    assert_eq!(
        find_path(&tree, &"X".into()),
        Some(vec!["A".into(), "B".into(), "X".into()])
    );
    assert_eq!(find_path(&tree, &"missing".into()), None);
}

#[test]
fn unloaded_children_are_not_searched() {
    let tree = Tree::new(vec![Node::new("A", "Sales", true)]);
    assert!(find(&tree, &"B".into()).is_none());
    assert!(find(&tree, &"A".into()).unwrap().children.is_none());
}

#[test]
fn index_matches_recursive_lookup() {
    let tree = sample();
    let index = TreeIndex::build(&tree);
    assert_eq!(index.len(), 5);
    assert_eq!(index.parent_of(&"X".into()), Some(Some(&NodeId::from("B"))));
    assert_eq!(index.parent_of(&"A".into()), Some(None));
    assert_eq!(index.parent_of(&"missing".into()), None);
    assert_eq!(
        index.ancestors(&"X".into()),
        vec![NodeId::from("X"), NodeId::from("B"), NodeId::from("A")]
    );
    assert!(index.is_within(&"X".into(), &"A".into()));
    assert!(!index.is_within(&"C".into(), &"B".into()));
}

#[test]
fn duplicate_ids_are_reported() {
    let tree = Tree::new(vec![
        Node::new("A", "one", true).with_children(vec![Node::new("B", "two", false)]),
        Node::new("B", "dup", false),
    ]);
    assert!(matches!(validate_invariants(&tree), Err(Error::InconsistentState(_))));
    validate_invariants(&sample()).unwrap();
}
