//! Orchestrator owning the current snapshot, expansion state, selection and search overlay.
//!
//! Every method takes `&self` and no state borrow is held across a loader await, so
//! operations on unrelated branches proceed while a fetch is in flight. Results are applied
//! to whatever snapshot is current when they resolve. Overlapping expands of the same node
//! are not fenced; the later resolution wins.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::decorate::{Decorator, NoDecoration};
use crate::error::Result;
use crate::ids::NodeId;
use crate::locate::{find, TreeIndex};
use crate::merge::merge_at_with;
use crate::mutate::{adjust_counter, ancestor_chain, remove, replace};
use crate::node::{Node, NodeDraft, NodePatch, NodeRecord, Tree};
use crate::options::StoreOptions;
use crate::overlay::{OverlayEffect, OverlayState, SearchOverlay};
use crate::traits::{Loader, NodeMapper, RecordMapper};

/// Named operations a UI surface can dispatch against a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Expand,
    /// Create a child below the target node (the "all" sentinel targets the root level).
    Create(NodeDraft),
    Edit(NodePatch),
    Delete,
    /// Add `delta` to the configured counter along the node's ancestor chain.
    /// `path` overrides the chain when the node itself is not loaded.
    AdjustCounter { delta: i64, path: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    All,
    Node(Arc<Node>),
}

impl Selection {
    pub fn id(&self) -> NodeId {
        match self {
            Selection::All => NodeId::all(),
            Selection::Node(node) => node.id.clone(),
        }
    }
}

#[derive(Default)]
struct StoreState {
    tree: Arc<Tree>,
    index: Option<Rc<TreeIndex>>,
    expanded: BTreeSet<NodeId>,
    loading: BTreeSet<NodeId>,
    root_loading: bool,
    selected: Option<NodeId>,
    overlay: SearchOverlay,
}

impl StoreState {
    fn index(&mut self) -> Rc<TreeIndex> {
        let StoreState { index, tree, .. } = self;
        Rc::clone(index.get_or_insert_with(|| Rc::new(TreeIndex::build(tree))))
    }

    fn commit(&mut self, next: Tree) {
        if next.ptr_eq(&self.tree) {
            return;
        }
        self.tree = Arc::new(next);
        self.index = None;
    }
}

pub struct TreeStore<L, M = RecordMapper, D = NoDecoration> {
    loader: L,
    mapper: M,
    decorator: D,
    options: StoreOptions,
    state: RefCell<StoreState>,
}

impl<L> TreeStore<L>
where
    L: Loader<Record = NodeRecord>,
{
    pub fn new(loader: L) -> Self {
        Self::with_parts(loader, RecordMapper, NoDecoration, StoreOptions::default())
    }
}

impl<L, M, D> TreeStore<L, M, D> {
    pub fn with_parts(loader: L, mapper: M, decorator: D, options: StoreOptions) -> Self {
        Self {
            loader,
            mapper,
            decorator,
            options,
            state: RefCell::new(StoreState::default()),
        }
    }

    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_decorator<D2>(self, decorator: D2) -> TreeStore<L, M, D2> {
        TreeStore {
            loader: self.loader,
            mapper: self.mapper,
            decorator,
            options: self.options,
            state: self.state,
        }
    }

    pub fn with_mapper<M2>(self, mapper: M2) -> TreeStore<L, M2, D> {
        TreeStore {
            loader: self.loader,
            mapper,
            decorator: self.decorator,
            options: self.options,
            state: self.state,
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn current_tree(&self) -> Arc<Tree> {
        Arc::clone(&self.state.borrow().tree)
    }

    /// The selected node resolved against the current snapshot.
    pub fn current_selection(&self) -> Selection {
        let state = self.state.borrow();
        state
            .selected
            .as_ref()
            .and_then(|id| find(&state.tree, id))
            .map_or(Selection::All, |node| Selection::Node(Arc::clone(node)))
    }

    /// Overlay list while a keyword is active and its results have arrived.
    pub fn current_overlay(&self) -> Option<Vec<Arc<Node>>> {
        self.state.borrow().overlay.nodes().map(<[_]>::to_vec)
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.state.borrow().overlay.state().clone()
    }

    pub fn search_keyword(&self) -> Option<String> {
        self.state.borrow().overlay.keyword().map(str::to_string)
    }

    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.state.borrow().expanded.contains(id)
    }

    pub fn expanded(&self) -> BTreeSet<NodeId> {
        self.state.borrow().expanded.clone()
    }

    pub fn is_loading(&self, id: &NodeId) -> bool {
        self.state.borrow().loading.contains(id)
    }

    pub fn is_root_loading(&self) -> bool {
        self.state.borrow().root_loading
    }

    /// Id -> parent index of the current snapshot, built on first use.
    pub fn index(&self) -> Rc<TreeIndex> {
        self.state.borrow_mut().index()
    }

    pub fn collapse(&self, id: &NodeId) {
        self.state.borrow_mut().expanded.remove(id);
    }

    /// Select a loaded node. Returns `false` when it is not in the tree.
    pub fn select(&self, id: &NodeId) -> bool {
        if id.is_all() {
            self.select_all();
            return true;
        }
        let mut state = self.state.borrow_mut();
        if find(&state.tree, id).is_none() {
            trace!("select: {id} is not loaded");
            return false;
        }
        state.selected = Some(id.clone());
        true
    }

    pub fn select_all(&self) {
        self.state.borrow_mut().selected = None;
    }
}

impl<L, M, D> TreeStore<L, M, D>
where
    L: Loader,
    M: NodeMapper<L::Record>,
    D: Decorator,
{
    /// Apply `operation` to `node_id`.
    pub async fn dispatch(&self, operation: Operation, node_id: &NodeId) -> Result<()> {
        debug!("dispatch {operation:?} on '{node_id}'");
        match operation {
            Operation::Expand => self.expand(node_id).await,
            Operation::Create(draft) => self.create(node_id, &draft).await.map(|_| ()),
            Operation::Edit(patch) => {
                self.edit(node_id, &patch);
                Ok(())
            }
            Operation::Delete => self.delete(node_id).await,
            Operation::AdjustCounter { delta, path } => {
                self.adjust_counter(node_id, delta, path.as_deref());
                Ok(())
            }
        }
    }

    /// Fetch root-level nodes and merge them into the root sequence.
    pub async fn load_root(&self) -> Result<()> {
        self.state.borrow_mut().root_loading = true;
        let result = self.loader.load_root(&self.options.root_query).await;
        self.state.borrow_mut().root_loading = false;
        let records = result.inspect_err(|e| warn!("root load failed: {e}"))?;
        let fresh = self.to_nodes(records);
        debug!("root load returned {} nodes", fresh.len());
        let tree = self.current_tree();
        let next = merge_at_with(&tree, None, fresh, &self.decorator);
        self.state.borrow_mut().commit(next);
        Ok(())
    }

    /// Expand `id`, fetching its children when they have not been loaded yet.
    pub async fn expand(&self, id: &NodeId) -> Result<()> {
        let loaded = match find(&self.state.borrow().tree, id) {
            Some(node) => node.is_loaded(),
            None => {
                trace!("expand: {id} is not in the tree");
                return Ok(());
            }
        };
        if !loaded {
            self.fetch_children(id).await?;
        }
        self.state.borrow_mut().expanded.insert(id.clone());
        Ok(())
    }

    /// Re-fetch the children of `id` even when already loaded.
    pub async fn refresh_children(&self, id: &NodeId) -> Result<()> {
        if id.is_all() {
            return self.load_root().await;
        }
        self.fetch_children(id).await
    }

    /// Create a child below `parent` and absorb it through a re-fetch of the parent's children.
    pub async fn create(&self, parent: &NodeId, draft: &NodeDraft) -> Result<NodeId> {
        let parent = (!parent.is_all()).then_some(parent);
        let new_id = self.loader.create_child(parent, draft).await?;
        debug!("created '{new_id}' below {parent:?}");
        match parent {
            Some(p) => {
                self.fetch_children(p).await?;
                let mut state = self.state.borrow_mut();
                if find(&state.tree, p).is_some() {
                    state.expanded.insert(p.clone());
                }
            }
            None => self.load_root().await?,
        }

        if !matches!(self.state.borrow().overlay.state(), OverlayState::Active { .. }) {
            return Ok(new_id);
        }
        let merged = find(&self.state.borrow().tree, &new_id).cloned();
        let node = match merged {
            Some(node) => node,
            None => Arc::new(self.to_node(self.loader.load_node_detail(&new_id).await?)),
        };
        if self.options.keeps_kind(&node.kind) {
            self.state.borrow_mut().overlay.on_create(node);
        } else {
            trace!("create: '{new_id}' of kind '{}' is filtered from the overlay", node.kind);
        }
        Ok(new_id)
    }

    /// Apply an already persisted edit to the tree and the overlay.
    pub fn edit(&self, id: &NodeId, patch: &NodePatch) {
        let mut state = self.state.borrow_mut();
        let next = replace(&state.tree, id, patch);
        if next.ptr_eq(&state.tree) {
            trace!("edit: {id} is not in the tree");
        }
        state.commit(next);
        state.overlay.on_edit(id, patch, |n| self.options.keeps_kind(&n.kind));
    }

    /// Reload one node's own fields from the backend, keeping its loaded children.
    pub async fn refresh_node(&self, id: &NodeId) -> Result<()> {
        let fresh = self.to_node(self.loader.load_node_detail(id).await?);
        let mut patch = NodePatch::from_node(&fresh);
        let loaded = find(&self.state.borrow().tree, id).is_some_and(|n| n.is_loaded());
        if !loaded {
            patch.is_leaf = Some(!fresh.expand);
        }
        self.edit(id, &patch);
        Ok(())
    }

    /// Drop an already deleted node from the tree and resynchronize the overlay.
    pub async fn delete(&self, id: &NodeId) -> Result<()> {
        let effect = {
            let mut state = self.state.borrow_mut();
            let index = state.index();
            match index.parent_of(id) {
                None => trace!("delete: {id} is not in the tree"),
                Some(parent) => {
                    let removed: BTreeSet<NodeId> = state
                        .tree
                        .iter()
                        .filter(|n| index.is_within(&n.id, id))
                        .map(|n| n.id.clone())
                        .collect();
                    let next = remove(&state.tree, parent, id);
                    state.commit(next);
                    state.expanded.retain(|n| !removed.contains(n));
                    state.loading.retain(|n| !removed.contains(n));
                    if state.selected.as_ref().is_some_and(|s| removed.contains(s)) {
                        state.selected = parent.cloned();
                    }
                }
            }
            state.overlay.on_delete()
        };
        if let OverlayEffect::Refetch(keyword) = effect {
            self.run_search(keyword).await?;
        }
        Ok(())
    }

    /// Adjust the configured counter on `id` and its ancestors.
    pub fn adjust_counter(&self, id: &NodeId, delta: i64, path: Option<&str>) {
        let separator = self.options.path_separator;
        let mut state = self.state.borrow_mut();
        let own_path = find(&state.tree, id).and_then(|n| n.path.clone());
        let chain = match path.map(str::to_string).or(own_path) {
            Some(path) => ancestor_chain(&path, separator),
            None => state.index().ancestors(id),
        };
        if chain.is_empty() {
            trace!("adjust_counter: no ancestor chain for {id}");
            return;
        }
        let next = adjust_counter(&state.tree, &chain, &self.options.counter_field, delta);
        state.commit(next);
    }

    /// Activate the search overlay for `keyword`, or clear it when `keyword` is blank.
    pub async fn set_search_keyword(&self, keyword: &str) -> Result<()> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            self.state.borrow_mut().overlay.clear();
            return Ok(());
        }
        self.run_search(keyword.to_string()).await
    }

    async fn run_search(&self, keyword: String) -> Result<()> {
        self.state.borrow_mut().overlay.begin(keyword.as_str());
        let result = self.loader.search(&keyword, &self.options.root_query).await;
        let records = match result {
            Ok(records) => records,
            Err(e) => {
                warn!("search for '{keyword}' failed: {e}");
                self.state.borrow_mut().overlay.fail(&keyword);
                return Err(e);
            }
        };
        let nodes: Vec<Arc<Node>> = self
            .to_nodes(records)
            .into_iter()
            .filter(|n| self.options.keeps_kind(&n.kind))
            .map(Arc::new)
            .collect();
        debug!("search for '{keyword}' returned {} nodes", nodes.len());
        if !self.state.borrow_mut().overlay.finish(&keyword, nodes) {
            warn!("discarding results for superseded keyword '{keyword}'");
        }
        Ok(())
    }

    async fn fetch_children(&self, id: &NodeId) -> Result<()> {
        self.state.borrow_mut().loading.insert(id.clone());
        let result = self.loader.load_children(id).await;
        self.state.borrow_mut().loading.remove(id);
        let records = result.inspect_err(|e| warn!("loading children of {id} failed: {e}"))?;
        let fresh = self.to_nodes(records);
        debug!("loaded {} children for {id}", fresh.len());
        // The decorator may read store state, so no borrow is held while it runs.
        let tree = self.current_tree();
        let next = merge_at_with(&tree, Some(id), fresh, &self.decorator);
        self.state.borrow_mut().commit(next);
        Ok(())
    }

    fn to_node(&self, record: L::Record) -> Node {
        self.decorator.decorate(self.mapper.to_node(record))
    }

    fn to_nodes(&self, records: Vec<L::Record>) -> Vec<Node> {
        records.into_iter().map(|r| self.to_node(r)).collect()
    }
}
