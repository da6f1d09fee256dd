#![forbid(unsafe_code)]
//! WASM-friendly bridge for lazytree.
//! Exposes the pure tree algebra over plain JS node objects
//! (`{ id, name, type, expand, isLeaf, children?, disabled, disableTip?, path?, counters }`).

use lazytree_core::{
    adjust_counter, ancestor_chain, combine, find, find_parent, matches_keyword, merge_at, remove,
    replace, validate_invariants, Node, NodeId, NodePatch, Tree,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

fn decode<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    from_value(value).map_err(|e| JsValue::from_str(&format!("invalid {what}: {e}")))
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    // Plain objects rather than ES maps for `counters` and `attributes`.
    let serializer = Serializer::new().serialize_maps_as_objects(true);
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parent_arg(parent_id: Option<String>) -> Option<NodeId> {
    parent_id.map(NodeId::from).filter(|p| !p.is_all())
}

#[wasm_bindgen(js_name = find)]
pub fn find_node(tree: JsValue, id: String) -> Result<JsValue, JsValue> {
    let tree: Tree = decode(tree, "tree")?;
    match find(&tree, &NodeId::from(id)) {
        Some(node) => encode(node.as_ref()),
        None => Ok(JsValue::NULL),
    }
}

#[wasm_bindgen(js_name = findParent)]
pub fn find_parent_node(tree: JsValue, id: String) -> Result<JsValue, JsValue> {
    let tree: Tree = decode(tree, "tree")?;
    match find_parent(&tree, &NodeId::from(id)) {
        Some(node) => encode(node.as_ref()),
        None => Ok(JsValue::NULL),
    }
}

#[wasm_bindgen(js_name = replaceNode)]
pub fn replace_node(tree: JsValue, id: String, patch: JsValue) -> Result<JsValue, JsValue> {
    let tree: Tree = decode(tree, "tree")?;
    let patch: NodePatch = decode(patch, "patch")?;
    encode(&replace(&tree, &NodeId::from(id), &patch))
}

#[wasm_bindgen(js_name = removeNode)]
pub fn remove_node(tree: JsValue, parent_id: Option<String>, id: String) -> Result<JsValue, JsValue> {
    let tree: Tree = decode(tree, "tree")?;
    let parent = parent_arg(parent_id);
    encode(&remove(&tree, parent.as_ref(), &NodeId::from(id)))
}

#[wasm_bindgen(js_name = adjustCounter)]
pub fn adjust_counter_js(
    tree: JsValue,
    ancestor_ids: Vec<String>,
    field: String,
    delta: i32,
) -> Result<JsValue, JsValue> {
    let tree: Tree = decode(tree, "tree")?;
    let chain: Vec<NodeId> = ancestor_ids.into_iter().map(NodeId::from).collect();
    encode(&adjust_counter(&tree, &chain, &field, i64::from(delta)))
}

#[wasm_bindgen(js_name = ancestorChain)]
pub fn ancestor_chain_js(path: String, separator: Option<String>) -> Vec<String> {
    let separator = separator.and_then(|s| s.chars().next()).unwrap_or('/');
    ancestor_chain(&path, separator)
        .into_iter()
        .map(|id| id.0)
        .collect()
}

#[wasm_bindgen(js_name = combine)]
pub fn combine_js(existing: JsValue, fresh: JsValue) -> Result<JsValue, JsValue> {
    let existing: Tree = decode(existing, "existing siblings")?;
    let fresh: Vec<Node> = decode(fresh, "fresh siblings")?;
    encode(&combine(existing.roots(), fresh)[..])
}

#[wasm_bindgen(js_name = mergeAt)]
pub fn merge_at_js(tree: JsValue, parent_id: Option<String>, fresh: JsValue) -> Result<JsValue, JsValue> {
    let tree: Tree = decode(tree, "tree")?;
    let fresh: Vec<Node> = decode(fresh, "fresh siblings")?;
    let parent = parent_arg(parent_id);
    encode(&merge_at(&tree, parent.as_ref(), fresh))
}

#[wasm_bindgen(js_name = matchesKeyword)]
pub fn matches_keyword_js(name: String, keyword: String) -> bool {
    matches_keyword(&name, &keyword)
}

/// Throws when an id appears twice in the tree.
#[wasm_bindgen(js_name = validateTree)]
pub fn validate_tree(tree: JsValue) -> Result<(), JsValue> {
    let tree: Tree = decode(tree, "tree")?;
    validate_invariants(&tree).map_err(|e| JsValue::from_str(&e.to_string()))
}
