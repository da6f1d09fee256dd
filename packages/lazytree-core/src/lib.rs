#![forbid(unsafe_code)]
//! Lazy-loaded hierarchical tree synchronization.
//! Keeps a partially materialized tree consistent while branches are fetched on demand,
//! nodes are mutated from other surfaces, and a flat search overlay views the same data.
//! Transport and rendering stay with the host, behind the [`Loader`] and [`NodeMapper`] seams.

pub mod decorate;
pub mod error;
pub mod ids;
pub mod locate;
pub mod merge;
pub mod mutate;
pub mod node;
pub mod options;
pub mod overlay;
pub mod store;
pub mod traits;

pub use decorate::{DecorationPolicy, Decorator, NoDecoration};
pub use error::{Error, Result};
pub use ids::NodeId;
pub use locate::{find, find_parent, find_path, validate_invariants, TreeIndex};
pub use merge::{combine, combine_with, merge_at, merge_at_with};
pub use mutate::{adjust_counter, ancestor_chain, remove, replace};
pub use node::{Children, Node, NodeDraft, NodePatch, NodeRecord, QueryParams, Tree};
pub use options::StoreOptions;
pub use overlay::{matches_keyword, OverlayEffect, OverlayState, SearchOverlay};
pub use store::{Operation, Selection, TreeStore};
pub use traits::{Loader, NodeMapper, RecordMapper};
