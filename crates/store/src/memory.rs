//! In-process implementation of [`RemoteStore`].
//!
//! Holds each resource as a vector of JSON rows and applies the same
//! filter, ordering and window semantics as the REST backend. Used by the
//! test suites and by the `memory:` development mode.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::remote::{Condition, Filter, OrderBy, RemoteStore, RowRange, RowsPage, SortDirection};

/// In-memory table store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    /// Number of upcoming requests that fail with [`StoreError::Unavailable`].
    failures: AtomicUsize,
    /// Total requests served, including failed ones.
    requests: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style table population.
    pub fn with_table(mut self, resource: &str, rows: Vec<Value>) -> Self {
        self.tables
            .get_mut()
            .entry(resource.to_string())
            .or_default()
            .extend(rows);
        self
    }

    /// Build a store from a snapshot object of the form
    /// `{ "resource": [row, ...], ... }`.
    pub fn from_snapshot(snapshot: &Value) -> Result<Self, StoreError> {
        let tables = snapshot
            .as_object()
            .ok_or_else(|| StoreError::Decode("snapshot must be a JSON object".into()))?;
        let mut store = Self::new();
        for (resource, rows) in tables {
            let rows = rows.as_array().ok_or_else(|| {
                StoreError::Decode(format!("snapshot table '{resource}' must be an array"))
            })?;
            store = store.with_table(resource, rows.clone());
        }
        Ok(store)
    }

    /// Append rows to a resource.
    pub async fn insert_rows(&self, resource: &str, rows: Vec<Value>) {
        self.tables
            .write()
            .await
            .entry(resource.to_string())
            .or_default()
            .extend(rows);
    }

    /// Remove every row of a resource whose `column` equals `value`.
    pub async fn delete_where(&self, resource: &str, column: &str, value: &str) -> usize {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(resource) else {
            return 0;
        };
        let before = rows.len();
        rows.retain(|row| value_text(row.get(column)).as_deref() != Some(value));
        before - rows.len()
    }

    /// Make the next `count` requests fail as if the store were unreachable.
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, AtomicOrdering::SeqCst);
    }

    /// Number of requests served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(AtomicOrdering::SeqCst)
    }

    fn begin_request(&self) -> Result<(), StoreError> {
        self.requests.fetch_add(1, AtomicOrdering::SeqCst);
        let injected = self
            .failures
            .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |n| {
                n.checked_sub(1)
            })
            .is_ok();
        if injected {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        Ok(())
    }

    async fn select(&self, resource: &str, filter: &Filter, order: &[OrderBy]) -> Vec<Value> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(resource)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_filter(row, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by(|a, b| compare_rows(a, b, order));
        rows
    }
}

/// Text form of a scalar JSON value, as the REST filter syntax sees it.
fn value_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn matches_filter(row: &Value, filter: &Filter) -> bool {
    filter.conditions.iter().all(|condition| match condition {
        Condition::Eq { column, value } => {
            value_text(row.get(column.as_str())).as_deref() == Some(value.as_str())
        }
        Condition::In { column, values } => value_text(row.get(column.as_str()))
            .is_some_and(|text| values.iter().any(|v| *v == text)),
    })
}

/// Compare two column values. Nulls sort after everything else in ascending
/// order, matching PostgreSQL's default.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn compare_rows(a: &Value, b: &Value, order: &[OrderBy]) -> Ordering {
    for clause in order {
        let ord = compare_values(a.get(clause.column), b.get(clause.column));
        let ord = match clause.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn fetch_page(
        &self,
        resource: &str,
        filter: &Filter,
        range: RowRange,
        order: &[OrderBy],
    ) -> Result<RowsPage, StoreError> {
        self.begin_request()?;
        let rows = self.select(resource, filter, order).await;
        let total_matching = rows.len() as u64;
        let offset = usize::try_from(range.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(range.limit).unwrap_or(usize::MAX);
        let rows = rows.into_iter().skip(offset).take(limit).collect();
        Ok(RowsPage {
            rows,
            total_matching,
        })
    }

    async fn fetch_all(
        &self,
        resource: &str,
        filter: &Filter,
        order: &[OrderBy],
    ) -> Result<Vec<Value>, StoreError> {
        self.begin_request()?;
        Ok(self.select(resource, filter, order).await)
    }

    async fn fetch_one(
        &self,
        resource: &str,
        key_column: &str,
        key: &str,
    ) -> Result<Option<Value>, StoreError> {
        self.begin_request()?;
        let filter = Filter::new().eq(key_column, key);
        Ok(self.select(resource, &filter, &[]).await.into_iter().next())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.begin_request()
    }
}
