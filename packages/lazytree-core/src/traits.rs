use std::sync::Arc;

use crate::error::Result;
use crate::ids::NodeId;
use crate::node::{Node, NodeDraft, NodeRecord, QueryParams};

/// Remote data source supplied by the surrounding application.
///
/// Futures are awaited on the caller's thread; they need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait Loader {
    type Record;

    async fn load_children(&self, node: &NodeId) -> Result<Vec<Self::Record>>;
    async fn load_root(&self, query: &QueryParams) -> Result<Vec<Self::Record>>;
    async fn load_node_detail(&self, node: &NodeId) -> Result<Self::Record>;
    async fn search(&self, keyword: &str, query: &QueryParams) -> Result<Vec<Self::Record>>;
    /// Create a child below `parent` (root level when `None`) and return its id.
    async fn create_child(&self, parent: Option<&NodeId>, draft: &NodeDraft) -> Result<NodeId>;
}

/// Turns loader records into nodes.
pub trait NodeMapper<R> {
    fn to_node(&self, record: R) -> Node;
}

/// Default mapping for [`NodeRecord`]. `is_leaf` mirrors `!expand`; nested records become
/// loaded children.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordMapper;

impl NodeMapper<NodeRecord> for RecordMapper {
    fn to_node(&self, record: NodeRecord) -> Node {
        Node {
            id: record.id,
            name: record.name,
            kind: record.kind,
            expand: record.expand,
            is_leaf: !record.expand,
            children: record
                .children
                .map(|children| children.into_iter().map(|c| Arc::new(self.to_node(c))).collect()),
            disabled: false,
            disable_tip: None,
            path: record.path,
            counters: record.counters,
            attributes: record.attributes,
        }
    }
}

impl<R, F> NodeMapper<R> for F
where
    F: Fn(R) -> Node,
{
    fn to_node(&self, record: R) -> Node {
        self(record)
    }
}
