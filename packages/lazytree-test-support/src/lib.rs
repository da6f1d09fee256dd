//! In-memory backend standing in for the remote loader in tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use lazytree_core::{
    matches_keyword, Error, Loader, NodeDraft, NodeId, NodeRecord, QueryParams, Result,
};

pub use futures::executor::block_on;

/// Loader entry points, used for call counting and failure injection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Call {
    LoadChildren,
    LoadRoot,
    LoadNodeDetail,
    Search,
    CreateChild,
}

#[derive(Clone, Debug)]
struct Entry {
    record: NodeRecord,
    children: Vec<NodeId>,
}

#[derive(Default)]
struct Backend {
    entries: HashMap<NodeId, Entry>,
    roots: Vec<NodeId>,
    next_id: u64,
}

impl Backend {
    fn records(&self, ids: &[NodeId]) -> Vec<NodeRecord> {
        ids.iter()
            .filter_map(|id| self.entries.get(id))
            .map(|e| e.record.clone())
            .collect()
    }

    fn preorder(&self) -> Vec<&NodeRecord> {
        let mut out = Vec::new();
        let mut stack: Vec<&NodeId> = self.roots.iter().rev().collect();
        while let Some(id) = stack.pop() {
            if let Some(entry) = self.entries.get(id) {
                out.push(&entry.record);
                stack.extend(entry.children.iter().rev());
            }
        }
        out
    }

    fn detach(&mut self, id: &NodeId) {
        self.roots.retain(|r| r != id);
        for entry in self.entries.values_mut() {
            entry.children.retain(|c| c != id);
        }
    }

    fn drop_subtree(&mut self, id: &NodeId) {
        if let Some(entry) = self.entries.remove(id) {
            for child in entry.children {
                self.drop_subtree(&child);
            }
        }
    }
}

/// A whole tree held in memory and served lazily, one level at a time.
#[derive(Default)]
pub struct MemoryLoader {
    backend: RefCell<Backend>,
    failures: RefCell<BTreeSet<Call>>,
    calls: RefCell<BTreeMap<Call, usize>>,
    last_query: RefCell<Option<QueryParams>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `record` below `parent` (root level when `None`).
    pub fn with(self, parent: Option<&str>, record: NodeRecord) -> Self {
        self.insert(parent, record);
        self
    }

    pub fn insert(&self, parent: Option<&str>, mut record: NodeRecord) {
        let mut backend = self.backend.borrow_mut();
        let id = record.id.clone();
        record.children = None;
        match parent {
            Some(p) => {
                let p = NodeId::from(p);
                if let Some(entry) = backend.entries.get_mut(&p) {
                    entry.children.push(id.clone());
                    entry.record.expand = true;
                }
            }
            None => backend.roots.push(id.clone()),
        }
        backend.entries.insert(
            id,
            Entry {
                record,
                children: Vec::new(),
            },
        );
    }

    pub fn rename(&self, id: &str, name: &str) {
        if let Some(entry) = self.backend.borrow_mut().entries.get_mut(id) {
            entry.record.name = name.to_string();
        }
    }

    /// Remove `id` and everything below it.
    pub fn delete(&self, id: &str) {
        let id = NodeId::from(id);
        let mut backend = self.backend.borrow_mut();
        backend.detach(&id);
        backend.drop_subtree(&id);
    }

    pub fn record(&self, id: &str) -> Option<NodeRecord> {
        self.backend.borrow().entries.get(id).map(|e| e.record.clone())
    }

    /// Make the next call to `call` fail once.
    pub fn fail_next(&self, call: Call) {
        self.failures.borrow_mut().insert(call);
    }

    pub fn calls(&self, call: Call) -> usize {
        self.calls.borrow().get(&call).copied().unwrap_or(0)
    }

    pub fn last_query(&self) -> Option<QueryParams> {
        self.last_query.borrow().clone()
    }

    fn enter(&self, call: Call) -> Result<()> {
        *self.calls.borrow_mut().entry(call).or_default() += 1;
        if self.failures.borrow_mut().remove(&call) {
            return Err(Error::Loader(format!("injected {call:?} failure")));
        }
        Ok(())
    }
}

impl Loader for MemoryLoader {
    type Record = NodeRecord;

    async fn load_children(&self, node: &NodeId) -> Result<Vec<NodeRecord>> {
        self.enter(Call::LoadChildren)?;
        let backend = self.backend.borrow();
        let entry = backend.entries.get(node).ok_or_else(|| Error::NotFound(node.clone()))?;
        Ok(backend.records(&entry.children))
    }

    async fn load_root(&self, query: &QueryParams) -> Result<Vec<NodeRecord>> {
        self.enter(Call::LoadRoot)?;
        *self.last_query.borrow_mut() = Some(query.clone());
        let backend = self.backend.borrow();
        Ok(backend.records(&backend.roots))
    }

    async fn load_node_detail(&self, node: &NodeId) -> Result<NodeRecord> {
        self.enter(Call::LoadNodeDetail)?;
        self.backend
            .borrow()
            .entries
            .get(node)
            .map(|e| e.record.clone())
            .ok_or_else(|| Error::NotFound(node.clone()))
    }

    async fn search(&self, keyword: &str, query: &QueryParams) -> Result<Vec<NodeRecord>> {
        self.enter(Call::Search)?;
        *self.last_query.borrow_mut() = Some(query.clone());
        Ok(self
            .backend
            .borrow()
            .preorder()
            .into_iter()
            .filter(|r| matches_keyword(&r.name, keyword))
            .cloned()
            .collect())
    }

    async fn create_child(&self, parent: Option<&NodeId>, draft: &NodeDraft) -> Result<NodeId> {
        self.enter(Call::CreateChild)?;
        let (id, path) = {
            let mut backend = self.backend.borrow_mut();
            backend.next_id += 1;
            let id = NodeId::new(format!("new-{}", backend.next_id));
            let path = match parent {
                Some(p) => {
                    let entry = backend.entries.get(p).ok_or_else(|| Error::NotFound(p.clone()))?;
                    entry.record.path.as_ref().map(|pp| format!("{pp}/{id}"))
                }
                None => Some(id.to_string()),
            };
            (id, path)
        };
        let record = NodeRecord {
            id: id.clone(),
            name: draft.name.clone(),
            kind: draft.kind.clone(),
            expand: false,
            path,
            counters: BTreeMap::new(),
            attributes: draft.attributes.clone(),
            children: None,
        };
        self.insert(parent.map(NodeId::as_str), record);
        Ok(id)
    }
}

/// A record with a materialized path and a zeroed `count` counter.
pub fn record(id: &str, name: &str, expand: bool, path: &str) -> NodeRecord {
    let mut record = NodeRecord::new(id, name, expand);
    record.kind = "domain".to_string();
    record.path = Some(path.to_string());
    record.counters.insert("count".to_string(), 0);
    record
}

/// ```text
/// A "Sales"            E "Engineering"
/// ├── B "foo-bar"      └── F "Platform"
/// │   └── X "foo-x"
/// └── C "Contracts"
/// ```
pub fn sample_backend() -> MemoryLoader {
    MemoryLoader::new()
        .with(None, record("A", "Sales", true, "A"))
        .with(None, record("E", "Engineering", true, "E"))
        .with(Some("A"), record("B", "foo-bar", true, "A/B"))
        .with(Some("A"), record("C", "Contracts", false, "A/C"))
        .with(Some("B"), record("X", "foo-x", false, "A/B/X"))
        .with(Some("E"), record("F", "Platform", false, "E/F"))
}
