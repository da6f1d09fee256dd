use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ids::NodeId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A sibling list. Shared so unrelated branches are reused across snapshots.
pub type Children = Arc<[Arc<Node>]>;

/// Query parameters forwarded to root loads and searches.
pub type QueryParams = BTreeMap<String, String>;

/// The unit of the tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    /// Backend hint: the node has children worth fetching.
    pub expand: bool,
    pub is_leaf: bool,
    /// `None` until the children have been loaded.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub children: Option<Children>,
    pub disabled: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub disable_tip: Option<String>,
    /// Materialized path: ancestor ids joined by a separator, ending with this node.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub path: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "BTreeMap::is_empty"))]
    pub counters: BTreeMap<String, i64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "BTreeMap::is_empty"))]
    pub attributes: BTreeMap<String, String>,
}

impl Node {
    /// A freshly loaded node: `is_leaf` mirrors `!expand` and children are not loaded.
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, expand: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expand,
            is_leaf: !expand,
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_counter(mut self, field: impl Into<String>, value: i64) -> Self {
        self.counters.insert(field.into(), value);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = Some(children.into_iter().map(Arc::new).collect());
        self
    }

    pub fn children(&self) -> &[Arc<Node>] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_loaded(&self) -> bool {
        self.children.is_some()
    }

    pub fn counter(&self, field: &str) -> Option<i64> {
        self.counters.get(field).copied()
    }

    /// `{...node, ...patch}`: set fields overwrite, unset fields are kept.
    pub fn patched(&self, patch: &NodePatch) -> Node {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(kind) = &patch.kind {
            next.kind = kind.clone();
        }
        if let Some(expand) = patch.expand {
            next.expand = expand;
        }
        if let Some(is_leaf) = patch.is_leaf {
            next.is_leaf = is_leaf;
        }
        if let Some(disabled) = patch.disabled {
            next.disabled = disabled;
        }
        if let Some(tip) = &patch.disable_tip {
            next.disable_tip = tip.clone();
        }
        if let Some(path) = &patch.path {
            next.path = Some(path.clone());
        }
        for (field, value) in &patch.counters {
            next.counters.insert(field.clone(), *value);
        }
        for (key, value) in &patch.attributes {
            next.attributes.insert(key.clone(), value.clone());
        }
        next
    }
}

/// Partial update of a node. Identity and children are never patched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct NodePatch {
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: Option<String>,
    pub expand: Option<bool>,
    pub is_leaf: Option<bool>,
    pub disabled: Option<bool>,
    /// `Some(None)` clears the tip.
    pub disable_tip: Option<Option<String>>,
    pub path: Option<String>,
    pub counters: BTreeMap<String, i64>,
    pub attributes: BTreeMap<String, String>,
}

impl NodePatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Patch carrying every descriptive field of `node`.
    pub fn from_node(node: &Node) -> Self {
        Self {
            name: Some(node.name.clone()),
            kind: Some(node.kind.clone()),
            expand: Some(node.expand),
            is_leaf: None,
            disabled: Some(node.disabled),
            disable_tip: Some(node.disable_tip.clone()),
            path: node.path.clone(),
            counters: node.counters.clone(),
            attributes: node.attributes.clone(),
        }
    }
}

/// Node as delivered by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct NodeRecord {
    pub id: NodeId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub expand: bool,
    pub path: Option<String>,
    pub counters: BTreeMap<String, i64>,
    pub attributes: BTreeMap<String, String>,
    /// Some backends return a pre-expanded subtree.
    pub children: Option<Vec<NodeRecord>>,
}

impl NodeRecord {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, expand: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expand,
            ..Self::default()
        }
    }
}

/// Payload of a create-child request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct NodeDraft {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub attributes: BTreeMap<String, String>,
}

impl NodeDraft {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            attributes: BTreeMap::new(),
        }
    }
}

/// Ordered root-level sequence of nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tree {
    roots: Children,
}

impl Default for Tree {
    fn default() -> Self {
        Self {
            roots: Arc::from(Vec::new()),
        }
    }
}

impl Tree {
    pub fn new(roots: Vec<Node>) -> Self {
        Self {
            roots: roots.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn from_children(roots: Children) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[Arc<Node>] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// True when both trees share the same root allocation.
    pub fn ptr_eq(&self, other: &Tree) -> bool {
        Arc::ptr_eq(&self.roots, &other.roots)
    }

    /// Preorder iterator over every materialized node.
    pub fn iter(&self) -> Preorder<'_> {
        Preorder {
            stack: self.roots.iter().rev().collect(),
        }
    }
}

pub struct Preorder<'a> {
    stack: Vec<&'a Arc<Node>>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Arc<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}
