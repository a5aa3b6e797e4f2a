//! End-to-end behaviour of the gallery session over the page cache.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use vizfolio_core::types::EntityId;
use vizfolio_gallery::{CacheEvent, CategorySelection, FetchOutcome, GalleryView, QueryKey};
use vizfolio_store::memory::MemoryStore;
use vizfolio_store::repositories::{CategoryRepo, GalleryItemRepo, SiteSettingRepo};
use vizfolio_store::StoreHandle;

use common::*;

fn ids(items: &[vizfolio_store::models::gallery_item::GalleryItem]) -> Vec<EntityId> {
    items.iter().map(|i| i.id).collect()
}

#[tokio::test]
async fn pages_of_fifty_over_one_hundred_twenty_items() {
    let store: StoreHandle = Arc::new(store_with(item_rows(120, Some(INTERIORS), 0)));
    let cache = cache_for(store.clone());
    let mut view = GalleryView::new(store, cache, &config(50));
    view.load_metadata().await.unwrap();

    assert_eq!(
        view.ensure_loaded().await.unwrap(),
        FetchOutcome::Fetched { page_index: 0, item_count: 50 }
    );
    assert!(view.snapshot().await.has_next_page);

    assert_eq!(
        view.load_more().await.unwrap(),
        FetchOutcome::Fetched { page_index: 1, item_count: 50 }
    );
    assert!(view.snapshot().await.has_next_page);

    assert_eq!(
        view.load_more().await.unwrap(),
        FetchOutcome::Fetched { page_index: 2, item_count: 20 }
    );
    let snapshot = view.snapshot().await;
    assert!(!snapshot.has_next_page);
    assert_eq!(snapshot.items.len(), 120);
    assert_eq!(snapshot.total_count, 120);

    assert_eq!(view.load_more().await.unwrap(), FetchOutcome::NoMorePages);
}

#[tokio::test]
async fn fetched_items_carry_category_names() {
    let store: StoreHandle = Arc::new(store_with(item_rows(3, Some(EXTERIORS), 0)));
    let cache = cache_for(store.clone());
    let mut view = GalleryView::new(store, cache, &config(50));
    view.load_metadata().await.unwrap();
    view.ensure_loaded().await.unwrap();

    let items = view.display_items().await;
    assert!(items
        .iter()
        .all(|i| i.category_name.as_deref() == Some("Exteriors")));
}

#[tokio::test]
async fn stale_all_response_stays_out_of_the_selected_category() {
    let mut rows = item_rows(10, Some(INTERIORS), 0);
    rows.extend(item_rows(5, Some(EXTERIORS), 100));
    let gated = Arc::new(GatedStore::new(store_with(rows)));
    let store: StoreHandle = gated.clone();
    let cache = cache_for(store.clone());
    let mut view = GalleryView::new(store, cache.clone(), &config(50));
    view.load_metadata().await.unwrap();

    // "All" request goes out and hangs.
    let release = gated.hold_next_page().await;
    let all_key = view.query_key();
    let pending_all = {
        let cache = cache.clone();
        let key = all_key.clone();
        tokio::spawn(async move { cache.ensure_first_page(&key).await })
    };
    gated.wait_until_held().await;
    assert!(cache.snapshot(&all_key).await.is_loading);

    // Visitor switches to "Exteriors" and that page lands first.
    let exteriors: EntityId = EXTERIORS.parse().unwrap();
    view.select(CategorySelection::Category(exteriors));
    view.ensure_loaded().await.unwrap();

    // The "All" response arrives late.
    release.send(()).unwrap();
    assert_matches!(
        pending_all.await.unwrap(),
        Ok(FetchOutcome::Fetched { item_count: 15, .. })
    );

    let shown = view.display_items().await;
    assert_eq!(shown.len(), 5);
    assert!(shown.iter().all(|i| i.category_id == Some(exteriors)));

    assert_eq!(cache.snapshot(&all_key).await.items.len(), 15);
    assert_eq!(cache.bucket_count().await, 2);
}

#[tokio::test]
async fn second_fetch_while_pending_is_a_no_op() {
    let gated = Arc::new(GatedStore::new(store_with(item_rows(80, None, 0))));
    let store: StoreHandle = gated.clone();
    let cache = cache_for(store.clone());
    let view = GalleryView::new(store, cache.clone(), &config(50));
    view.ensure_loaded().await.unwrap();

    let release = gated.hold_next_page().await;
    let key = view.query_key();
    let first = {
        let cache = cache.clone();
        let key = key.clone();
        tokio::spawn(async move { cache.fetch_next_page(&key).await })
    };
    gated.wait_until_held().await;

    assert_eq!(view.load_more().await.unwrap(), FetchOutcome::AlreadyInFlight);
    assert!(view.snapshot().await.is_fetching_next_page);

    release.send(()).unwrap();
    assert_matches!(
        first.await.unwrap(),
        Ok(FetchOutcome::Fetched { page_index: 1, item_count: 30 })
    );
    assert_eq!(view.snapshot().await.items.len(), 80);
    assert_eq!(gated.inner().request_count(), 2);
}

#[tokio::test]
async fn shuffle_disabled_keeps_fetch_order() {
    let store: StoreHandle = Arc::new(store_with(item_rows(120, None, 0)));
    let cache = cache_for(store.clone());
    let mut view = GalleryView::new(store, cache, &config(50));
    view.load_metadata().await.unwrap();
    assert!(!view.settings().shuffle);

    view.ensure_loaded().await.unwrap();
    view.load_more().await.unwrap();
    view.load_more().await.unwrap();

    let shown = view.display_items().await;
    assert_eq!(ids(&shown), ids(&view.snapshot().await.items));
    let orders: Vec<i32> = shown.iter().map(|i| i.display_order).collect();
    assert_eq!(orders, (0..120).collect::<Vec<i32>>());
}

#[tokio::test]
async fn shuffle_uses_the_session_seed() {
    let memory = store_with(item_rows(10, None, 0))
        .with_table(SiteSettingRepo::RESOURCE, settings_row(json!({"shuffle": true})));
    let store: StoreHandle = Arc::new(memory);
    let cache = cache_for(store.clone());

    let mut view = GalleryView::new(store.clone(), cache.clone(), &config(50)).with_seed(42);
    view.load_metadata().await.unwrap();
    view.ensure_loaded().await.unwrap();

    let fetched = view.snapshot().await.items;
    let shown = view.display_items().await;
    let expected: Vec<EntityId> = [0, 7, 3, 5, 2, 1, 8, 9, 4, 6]
        .into_iter()
        .map(|i| fetched[i].id)
        .collect();
    assert_eq!(ids(&shown), expected);

    // Stable across re-renders within the session.
    assert_eq!(ids(&view.display_items().await), expected);
}

#[tokio::test]
async fn layout_uses_configured_columns() {
    let memory = store_with(item_rows(9, None, 0)).with_table(
        SiteSettingRepo::RESOURCE,
        settings_row(json!({"columns": {"mobile": 1, "tablet": 1, "desktop": 3, "wide": 4}})),
    );
    let store: StoreHandle = Arc::new(memory);
    let cache = cache_for(store.clone());
    let mut view = GalleryView::new(store, cache, &config(50));
    view.load_metadata().await.unwrap();
    view.ensure_loaded().await.unwrap();

    view.set_viewport_width(1100);
    assert_eq!(view.column_count(), 2);
    view.set_viewport_width(1300);
    let layout = view.layout().await;
    assert_eq!(layout.column_count, 3);

    let placed: usize = layout.column_items().iter().map(Vec::len).sum();
    assert_eq!(placed, 9);
    assert_eq!(layout.masonry.assignments.len(), 9);
}

#[tokio::test]
async fn server_seed_only_before_category_metadata() {
    let memory = Arc::new(store_with(item_rows(60, Some(INTERIORS), 0)));
    let store: StoreHandle = memory.clone();
    let cache = cache_for(store.clone());
    let fetcher = cache.fetcher().clone();

    let mut view = GalleryView::new(store, cache, &config(50));
    let first = fetcher
        .fetch_page(0, &view.query_key().filter, 50, &Default::default())
        .await
        .unwrap();
    let requests = memory.request_count();

    assert!(view.seed_first_page(first.clone()).await);
    assert_eq!(view.ensure_loaded().await.unwrap(), FetchOutcome::Cached);
    assert_eq!(view.snapshot().await.items.len(), 50);
    assert_eq!(memory.request_count(), requests);

    view.load_metadata().await.unwrap();
    assert!(!view.seed_first_page(first).await);
}

#[tokio::test]
async fn opted_out_category_hidden_from_all() {
    let mut rows = item_rows(4, Some(INTERIORS), 0);
    rows.extend(item_rows(3, Some(EXTERIORS), 10));
    let memory = MemoryStore::new()
        .with_table(GalleryItemRepo::RESOURCE, rows)
        .with_table(CategoryRepo::RESOURCE, category_rows(true));
    let store: StoreHandle = Arc::new(memory);
    let cache = cache_for(store.clone());
    let mut view = GalleryView::new(store, cache, &config(50));
    view.load_metadata().await.unwrap();
    view.ensure_loaded().await.unwrap();

    assert_eq!(view.display_items().await.len(), 4);

    view.select(CategorySelection::Category(EXTERIORS.parse().unwrap()));
    view.ensure_loaded().await.unwrap();
    assert_eq!(view.display_items().await.len(), 3);
}

#[tokio::test]
async fn category_failure_keeps_default_catalog() {
    let memory = Arc::new(store_with(item_rows(3, None, 0)));
    let store: StoreHandle = memory.clone();
    let cache = cache_for(store.clone());
    let mut view = GalleryView::new(store, cache, &config(50));

    memory.fail_next(2);
    assert!(view.load_metadata().await.is_err());
    assert!(view.catalog().is_empty());
    assert!(view.query_key().filter.is_unrestricted_all());
    assert!(!view.settings().shuffle);
}

#[tokio::test]
async fn fetch_dropped_mid_request_frees_the_key() {
    let gated = Arc::new(GatedStore::new(store_with(item_rows(30, None, 0))));
    let store: StoreHandle = gated.clone();
    let cache = cache_for(store);
    let key = QueryKey::initial(20);
    let mut events = cache.subscribe();

    let _release = gated.hold_next_page().await;
    let timed_out =
        tokio::time::timeout(Duration::from_millis(50), cache.ensure_first_page(&key)).await;
    assert!(timed_out.is_err());

    assert_matches!(
        events.recv().await.unwrap(),
        CacheEvent::FetchAbandoned { page_index: 0, .. }
    );
    let snapshot = cache.snapshot(&key).await;
    assert!(!snapshot.is_loading);
    assert!(snapshot.items.is_empty());

    assert_eq!(
        cache.ensure_first_page(&key).await.unwrap(),
        FetchOutcome::Fetched { page_index: 0, item_count: 20 }
    );
}

#[tokio::test]
async fn waiter_recovers_when_the_fetching_caller_goes_away() {
    let gated = Arc::new(GatedStore::new(store_with(item_rows(30, None, 0))));
    let store: StoreHandle = gated.clone();
    let cache = cache_for(store);
    let key = QueryKey::initial(20);

    let _release = gated.hold_next_page().await;
    let fetching = {
        let cache = cache.clone();
        let key = key.clone();
        tokio::spawn(async move { cache.ensure_first_page(&key).await })
    };
    gated.wait_until_held().await;

    let waiting = {
        let cache = cache.clone();
        let key = key.clone();
        tokio::spawn(async move { cache.load_pages(&key, 1).await })
    };
    tokio::task::yield_now().await;

    fetching.abort();
    assert!(fetching.await.unwrap_err().is_cancelled());

    let snapshot = tokio::time::timeout(Duration::from_secs(2), waiting)
        .await
        .expect("waiter stayed blocked")
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.items.len(), 20);
    assert!(snapshot.has_next_page);
}
