//! Integration tests for the hero banner and VR tour endpoints.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, get};
use serde_json::json;
use vizfolio_store::memory::MemoryStore;
use vizfolio_store::repositories::{HeroBannerRepo, VrEntryRepo};

fn showcase_store() -> MemoryStore {
    MemoryStore::new()
        .with_table(
            HeroBannerRepo::RESOURCE,
            vec![
                json!({"id": "00000000-0000-4000-8000-0000000000b2", "title": "Second", "image_url": "https://cdn.example/b2.jpg", "display_order": 2, "is_active": true}),
                json!({"id": "00000000-0000-4000-8000-0000000000b1", "title": "First", "image_url": "https://cdn.example/b1.jpg", "display_order": 1, "is_active": true}),
                json!({"id": "00000000-0000-4000-8000-0000000000b3", "title": "Retired", "image_url": "https://cdn.example/b3.jpg", "display_order": 0, "is_active": false}),
            ],
        )
        .with_table(
            VrEntryRepo::RESOURCE,
            vec![
                json!({"id": "00000000-0000-4000-8000-0000000000c2", "title": "Villa", "vr_url": "https://vr.example/villa", "display_order": 1}),
                json!({"id": "00000000-0000-4000-8000-0000000000c1", "title": "Loft", "vr_url": "https://vr.example/loft", "display_order": 1}),
            ],
        )
}

#[tokio::test]
async fn banners_lists_active_in_carousel_order() {
    let app = common::build_test_app(Arc::new(showcase_store()), 20);
    let json = body_json(get(app, "/api/v1/banners").await).await;

    let titles: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["First", "Second"]);
}

#[tokio::test]
async fn vr_entries_ordered_by_position_then_title() {
    let app = common::build_test_app(Arc::new(showcase_store()), 20);
    let json = body_json(get(app, "/api/v1/vr").await).await;

    assert_eq!(json["data"][0]["title"], "Loft");
    assert_eq!(json["data"][1]["title"], "Villa");
    assert_eq!(json["data"][1]["vr_url"], "https://vr.example/villa");
}

#[tokio::test]
async fn banners_store_failure_maps_to_bad_gateway() {
    let store = Arc::new(showcase_store());
    store.fail_next(1);
    let app = common::build_test_app(store, 20);

    let response = get(app, "/api/v1/banners").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "UPSTREAM_ERROR");
}
