//! The remote query interface of the hosted backend.
//!
//! The backend is treated as an opaque paginated-query API with three
//! operations: a ranged page with an exact total, a full ordered listing, and
//! a single row looked up by key. [`RestStore`](crate::rest::RestStore) talks
//! to the real service; [`MemoryStore`](crate::memory::MemoryStore) implements
//! the same semantics in process.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Query description
// ---------------------------------------------------------------------------

/// A single column predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `column = value`
    Eq { column: String, value: String },
    /// `column IN (values)`
    In { column: String, values: Vec<String> },
}

/// A conjunction of column predicates. Empty means "every row".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.conditions.push(Condition::Eq {
            column: column.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn in_list<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.conditions.push(Condition::In {
            column: column.into(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: SortDirection,
}

impl OrderBy {
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            direction: SortDirection::Asc,
        }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            direction: SortDirection::Desc,
        }
    }
}

/// Row window: `limit` rows starting at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub offset: u64,
    pub limit: u64,
}

/// One page of raw rows plus the total number of rows matching the filter.
///
/// `total_matching` is a point-in-time snapshot; the store may change
/// between two page requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowsPage {
    pub rows: Vec<Value>,
    pub total_matching: u64,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch one ordered, filtered window of `resource` with an exact total.
    async fn fetch_page(
        &self,
        resource: &str,
        filter: &Filter,
        range: RowRange,
        order: &[OrderBy],
    ) -> Result<RowsPage, StoreError>;

    /// Fetch every row of `resource` matching `filter`, ordered.
    async fn fetch_all(
        &self,
        resource: &str,
        filter: &Filter,
        order: &[OrderBy],
    ) -> Result<Vec<Value>, StoreError>;

    /// Fetch the row whose `key_column` equals `key`, if any.
    async fn fetch_one(
        &self,
        resource: &str,
        key_column: &str,
        key: &str,
    ) -> Result<Option<Value>, StoreError>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

impl std::fmt::Debug for dyn RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RemoteStore")
    }
}

/// Shared, type-erased store handle passed to repositories and services.
pub type StoreHandle = Arc<dyn RemoteStore>;
