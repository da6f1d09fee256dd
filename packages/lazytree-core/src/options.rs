use std::collections::BTreeSet;

use crate::node::QueryParams;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tree store configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct StoreOptions {
    /// Forwarded to root loads and searches.
    pub root_query: QueryParams,
    /// Counter adjusted by `Operation::AdjustCounter`.
    pub counter_field: String,
    /// Separator of materialized node paths.
    pub path_separator: char,
    /// Node kinds kept from search results; `None` keeps all.
    pub search_kinds: Option<BTreeSet<String>>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            root_query: QueryParams::new(),
            counter_field: "count".to_string(),
            path_separator: '/',
            search_kinds: None,
        }
    }
}

impl StoreOptions {
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.root_query.insert(key.into(), value.into());
        self
    }

    pub fn with_counter_field(mut self, field: impl Into<String>) -> Self {
        self.counter_field = field.into();
        self
    }

    pub fn with_search_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_kinds = Some(kinds.into_iter().map(Into::into).collect());
        self
    }

    pub fn keeps_kind(&self, kind: &str) -> bool {
        self.search_kinds.as_ref().map_or(true, |kinds| kinds.contains(kind))
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::Error::Config(e.to_string()))
    }
}
