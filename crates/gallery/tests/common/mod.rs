#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{oneshot, Mutex, Notify};
use vizfolio_gallery::{GalleryCache, GalleryConfig, PageFetcher};
use vizfolio_store::memory::MemoryStore;
use vizfolio_store::remote::{Filter, OrderBy, RemoteStore, RowRange, RowsPage};
use vizfolio_store::repositories::{CategoryRepo, GalleryItemRepo, SiteSettingRepo};
use vizfolio_store::StoreError;

pub const INTERIORS: &str = "00000000-0000-4000-8000-0000000000a1";
pub const EXTERIORS: &str = "00000000-0000-4000-8000-0000000000a2";

/// A store whose next page request can be held open until released.
pub struct GatedStore {
    inner: MemoryStore,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    held: Notify,
}

impl GatedStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            gate: Mutex::new(None),
            held: Notify::new(),
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Hold the next `fetch_page` call until the returned sender fires.
    pub async fn hold_next_page(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().await = Some(rx);
        tx
    }

    /// Resolves once a held request has reached the store.
    pub async fn wait_until_held(&self) {
        self.held.notified().await;
    }
}

#[async_trait]
impl RemoteStore for GatedStore {
    async fn fetch_page(
        &self,
        resource: &str,
        filter: &Filter,
        range: RowRange,
        order: &[OrderBy],
    ) -> Result<RowsPage, StoreError> {
        let gate = self.gate.lock().await.take();
        if let Some(rx) = gate {
            self.held.notify_one();
            let _ = rx.await;
        }
        self.inner.fetch_page(resource, filter, range, order).await
    }

    async fn fetch_all(
        &self,
        resource: &str,
        filter: &Filter,
        order: &[OrderBy],
    ) -> Result<Vec<Value>, StoreError> {
        self.inner.fetch_all(resource, filter, order).await
    }

    async fn fetch_one(
        &self,
        resource: &str,
        key_column: &str,
        key: &str,
    ) -> Result<Option<Value>, StoreError> {
        self.inner.fetch_one(resource, key_column, key).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

/// `count` gallery rows in `category`, display orders `first..first+count`.
pub fn item_rows(count: usize, category: Option<&str>, first: usize) -> Vec<Value> {
    (first..first + count)
        .map(|n| {
            json!({
                "id": format!("40000000-0000-4000-8000-{n:012}"),
                "title": format!("Item {n}"),
                "image_url": format!("https://cdn.example/{n}.jpg"),
                "category_id": category,
                "width": 1000 + (n % 3) * 400,
                "height": 1000,
                "display_order": n,
                "created_at": "2024-06-01T00:00:00Z",
            })
        })
        .collect()
}

pub fn category_rows(exteriors_hidden: bool) -> Vec<Value> {
    vec![
        json!({"id": INTERIORS, "name": "Interiors", "display_order": 1, "show_in_all": true}),
        json!({"id": EXTERIORS, "name": "Exteriors", "display_order": 2, "show_in_all": !exteriors_hidden}),
    ]
}

pub fn settings_row(value: Value) -> Vec<Value> {
    vec![json!({"key": "gallery_settings", "value": value})]
}

pub fn store_with(items: Vec<Value>) -> MemoryStore {
    MemoryStore::new()
        .with_table(GalleryItemRepo::RESOURCE, items)
        .with_table(CategoryRepo::RESOURCE, category_rows(false))
        .with_table(SiteSettingRepo::RESOURCE, Vec::new())
}

pub fn config(page_size: u32) -> GalleryConfig {
    GalleryConfig {
        page_size,
        ..GalleryConfig::default()
    }
}

pub fn cache_for(store: Arc<dyn RemoteStore>) -> Arc<GalleryCache> {
    Arc::new(GalleryCache::new(
        PageFetcher::new(store),
        Duration::from_secs(600),
    ))
}
