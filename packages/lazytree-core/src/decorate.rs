//! Derived, non-authoritative display attributes.

use std::fmt;
use std::sync::Arc;

use crate::node::Node;

/// Computes the `disabled` / `disable_tip` fields of a node.
///
/// Implementations must be total; a panicking predicate is not caught.
pub trait Decorator {
    fn is_disabled(&self, _node: &Node) -> bool {
        false
    }

    fn disable_reason(&self, _node: &Node) -> Option<String> {
        None
    }

    /// Decorate `node` and any children it already carries.
    fn decorate(&self, mut node: Node) -> Node {
        node.disabled = self.is_disabled(&node);
        node.disable_tip = self.disable_reason(&node);
        if let Some(children) = node.children.take() {
            node.children = Some(
                children
                    .iter()
                    .map(|child| Arc::new(self.decorate(Node::clone(child))))
                    .collect(),
            );
        }
        node
    }
}

impl<D: Decorator + ?Sized> Decorator for &D {
    fn is_disabled(&self, node: &Node) -> bool {
        (**self).is_disabled(node)
    }

    fn disable_reason(&self, node: &Node) -> Option<String> {
        (**self).disable_reason(node)
    }

    fn decorate(&self, node: Node) -> Node {
        (**self).decorate(node)
    }
}

/// Leaves every node enabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDecoration;

impl Decorator for NoDecoration {}

type Predicate = Box<dyn Fn(&Node) -> bool>;
type Reason = Box<dyn Fn(&Node) -> Option<String>>;

/// Decorator assembled from optional closures.
#[derive(Default)]
pub struct DecorationPolicy {
    disabled: Option<Predicate>,
    reason: Option<Reason>,
}

impl DecorationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled_when(mut self, predicate: impl Fn(&Node) -> bool + 'static) -> Self {
        self.disabled = Some(Box::new(predicate));
        self
    }

    pub fn reason_with(mut self, reason: impl Fn(&Node) -> Option<String> + 'static) -> Self {
        self.reason = Some(Box::new(reason));
        self
    }
}

impl Decorator for DecorationPolicy {
    fn is_disabled(&self, node: &Node) -> bool {
        self.disabled.as_ref().is_some_and(|f| f(node))
    }

    fn disable_reason(&self, node: &Node) -> Option<String> {
        self.reason.as_ref().and_then(|f| f(node))
    }
}

impl fmt::Debug for DecorationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecorationPolicy")
            .field("disabled", &self.disabled.is_some())
            .field("reason", &self.reason.is_some())
            .finish()
    }
}
