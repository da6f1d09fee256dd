//! Flat keyword-filtered projection kept loosely in sync with tree mutations.

use std::sync::Arc;

use crate::ids::NodeId;
use crate::node::{Node, NodePatch};

/// Case-insensitive substring test.
pub fn matches_keyword(name: &str, keyword: &str) -> bool {
    name.to_lowercase().contains(&keyword.to_lowercase())
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OverlayState {
    #[default]
    Inactive,
    /// A search for `keyword` is in flight. `previous` is restored if it fails.
    Loading {
        keyword: String,
        previous: Box<OverlayState>,
    },
    Active {
        keyword: String,
        nodes: Vec<Arc<Node>>,
    },
}

/// What the owner must do after an overlay transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayEffect {
    None,
    Refetch(String),
}

#[derive(Clone, Debug, Default)]
pub struct SearchOverlay {
    state: OverlayState,
}

impl SearchOverlay {
    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// Keyword of the current or in-flight search.
    pub fn keyword(&self) -> Option<&str> {
        match &self.state {
            OverlayState::Inactive => None,
            OverlayState::Loading { keyword, .. } | OverlayState::Active { keyword, .. } => {
                Some(keyword)
            }
        }
    }

    /// Materialized list; `None` unless `Active`.
    pub fn nodes(&self) -> Option<&[Arc<Node>]> {
        match &self.state {
            OverlayState::Active { nodes, .. } => Some(nodes),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, OverlayState::Loading { .. })
    }

    pub fn clear(&mut self) {
        self.state = OverlayState::Inactive;
    }

    pub fn begin(&mut self, keyword: impl Into<String>) {
        let previous = std::mem::take(&mut self.state);
        // Never nest loading states: a superseded search restores to what preceded it.
        let previous = match previous {
            OverlayState::Loading { previous, .. } => *previous,
            other => other,
        };
        self.state = OverlayState::Loading {
            keyword: keyword.into(),
            previous: Box::new(previous),
        };
    }

    /// Install results for `keyword`. Returns `false` and drops them when `keyword` is no
    /// longer the one being searched.
    pub fn finish(&mut self, keyword: &str, nodes: Vec<Arc<Node>>) -> bool {
        if self.keyword() != Some(keyword) {
            return false;
        }
        self.state = OverlayState::Active {
            keyword: keyword.to_string(),
            nodes,
        };
        true
    }

    /// Roll back a failed search for `keyword`.
    pub fn fail(&mut self, keyword: &str) {
        if let OverlayState::Loading { keyword: k, .. } = &self.state {
            if k != keyword {
                return;
            }
        } else {
            return;
        }
        if let OverlayState::Loading { previous, .. } = std::mem::take(&mut self.state) {
            self.state = *previous;
        }
    }

    /// Append a created node when it matches the active keyword.
    pub fn on_create(&mut self, node: Arc<Node>) -> bool {
        let OverlayState::Active { keyword, nodes } = &mut self.state else {
            return false;
        };
        if !matches_keyword(&node.name, keyword) || nodes.iter().any(|n| n.id == node.id) {
            return false;
        }
        nodes.push(node);
        true
    }

    /// Patch an edited node in place, or drop it when it stops matching or `keep` rejects it.
    pub fn on_edit(&mut self, id: &NodeId, patch: &NodePatch, keep: impl Fn(&Node) -> bool) -> bool {
        let OverlayState::Active { keyword, nodes } = &mut self.state else {
            return false;
        };
        let Some(pos) = nodes.iter().position(|n| &n.id == id) else {
            return false;
        };
        let updated = nodes[pos].patched(patch);
        if matches_keyword(&updated.name, keyword) && keep(&updated) {
            nodes[pos] = Arc::new(updated);
        } else {
            nodes.remove(pos);
        }
        true
    }

    /// Deletions cannot be patched locally; the owner refetches with the active keyword.
    pub fn on_delete(&self) -> OverlayEffect {
        match &self.state {
            OverlayState::Active { keyword, .. } => OverlayEffect::Refetch(keyword.clone()),
            _ => OverlayEffect::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_match_ignores_case() {
        assert!(matches_keyword("Foo-Bar", "foo"));
        assert!(matches_keyword("foo-bar", "BAR"));
        assert!(!matches_keyword("qux", "foo"));
    }

    #[test]
    fn failed_search_restores_previous_list() {
        let mut overlay = SearchOverlay::default();
        overlay.begin("foo");
        assert!(overlay.finish("foo", vec![Arc::new(Node::new("n", "foo", false))]));
        overlay.begin("bar");
        assert!(overlay.nodes().is_none());
        overlay.fail("bar");
        assert_eq!(overlay.keyword(), Some("foo"));
        assert_eq!(overlay.nodes().map(<[_]>::len), Some(1));
    }

    #[test]
    fn superseded_results_are_dropped() {
        let mut overlay = SearchOverlay::default();
        overlay.begin("foo");
        overlay.begin("foob");
        assert!(!overlay.finish("foo", Vec::new()));
        assert!(overlay.is_loading());
        assert!(overlay.finish("foob", Vec::new()));
    }

    #[test]
    fn delete_requests_refetch_only_when_active() {
        let mut overlay = SearchOverlay::default();
        assert_eq!(overlay.on_delete(), OverlayEffect::None);
        overlay.begin("x");
        overlay.finish("x", Vec::new());
        assert_eq!(overlay.on_delete(), OverlayEffect::Refetch("x".into()));
    }

    #[test]
    fn edit_drops_node_rejected_by_filter() {
        let mut overlay = SearchOverlay::default();
        overlay.begin("foo");
        overlay.finish("foo", vec![Arc::new(Node::new("n", "foo", false).with_kind("domain"))]);
        let patch = NodePatch {
            kind: Some("report".into()),
            ..NodePatch::default()
        };
        assert!(overlay.on_edit(&"n".into(), &patch, |n| n.kind == "domain"));
        assert_eq!(overlay.nodes().map(<[_]>::len), Some(0));
    }
}
