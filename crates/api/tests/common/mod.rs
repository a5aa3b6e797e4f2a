#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use vizfolio_api::config::ServerConfig;
use vizfolio_api::router::build_app_router;
use vizfolio_api::state::AppState;
use vizfolio_gallery::{GalleryCache, GalleryConfig, PageFetcher};
use vizfolio_store::memory::MemoryStore;
use vizfolio_store::repositories::{
    CategoryRepo, GalleryItemRepo, HeroBannerRepo, SiteSettingRepo, VrEntryRepo,
};
use vizfolio_store::{StoreConfig, StoreHandle};

pub const INTERIORS: &str = "00000000-0000-4000-8000-0000000000a1";
pub const EXTERIORS: &str = "00000000-0000-4000-8000-0000000000a2";

/// Build a test `ServerConfig` with safe defaults and the given page size.
pub fn test_config(page_size: u32) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        store: StoreConfig {
            url: vizfolio_store::MEMORY_STORE_URL.to_string(),
            anon_key: String::new(),
            seed_file: None,
        },
        gallery: GalleryConfig {
            page_size,
            ..GalleryConfig::default()
        },
    }
}

/// Build the full application router over `store`, through the same
/// [`build_app_router`] the binary uses.
pub fn build_test_app(store: Arc<MemoryStore>, page_size: u32) -> Router {
    let config = test_config(page_size);
    let handle: StoreHandle = store;
    let cache = Arc::new(GalleryCache::new(
        PageFetcher::new(handle.clone()),
        Duration::from_secs(600),
    ));

    let state = AppState {
        store: handle,
        config: Arc::new(config.clone()),
        cache,
    };

    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// `count` gallery rows in `category`, display orders `first..first+count`.
pub fn item_rows(count: usize, category: Option<&str>, first: usize) -> Vec<Value> {
    (first..first + count)
        .map(|n| {
            json!({
                "id": format!("40000000-0000-4000-8000-{n:012}"),
                "title": format!("Item {n}"),
                "image_url": format!("https://cdn.example/{n}.jpg"),
                "category_id": category,
                "width": 1200,
                "height": 800,
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

/// 30 interiors followed by 20 exteriors, plus both categories.
pub fn gallery_store() -> MemoryStore {
    let mut items = item_rows(30, Some(INTERIORS), 0);
    items.extend(item_rows(20, Some(EXTERIORS), 30));

    MemoryStore::new()
        .with_table(GalleryItemRepo::RESOURCE, items)
        .with_table(CategoryRepo::RESOURCE, category_rows(false))
        .with_table(SiteSettingRepo::RESOURCE, Vec::new())
        .with_table(HeroBannerRepo::RESOURCE, Vec::new())
        .with_table(VrEntryRepo::RESOURCE, Vec::new())
}
