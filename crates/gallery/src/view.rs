//! One visitor's gallery session.
//!
//! [`GalleryView`] owns the per-session state: loaded categories and
//! settings, the shuffle seed, the selected filter and the viewport width.
//! Pages come from the shared [`GalleryCache`]; layout is recomputed from
//! scratch on every call.

use std::sync::Arc;

use serde::Serialize;
use vizfolio_core::columns::resolve_column_count;
use vizfolio_core::layout::{balance_columns, MasonryLayout};
use vizfolio_core::settings::GallerySettings;
use vizfolio_core::shuffle::{apply_display_order, new_session_seed};
use vizfolio_core::types::EntityId;
use vizfolio_store::models::gallery_item::GalleryItem;
use vizfolio_store::StoreHandle;

use crate::cache::{FetchOutcome, GalleryCache, QueryKey, QuerySnapshot};
use crate::catalog::{CategoryCatalog, CategorySelection};
use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::fetcher::Page;
use crate::lightbox::LightboxController;
use crate::settings::load_gallery_settings;

/// Items in display order with their column placement.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryLayout {
    pub column_count: usize,
    pub items: Vec<GalleryItem>,
    pub masonry: MasonryLayout,
}

impl GalleryLayout {
    /// Items grouped by column, top to bottom.
    pub fn column_items(&self) -> Vec<Vec<&GalleryItem>> {
        self.masonry.project(&self.items)
    }
}

/// A visitor's session over the shared cache.
///
/// The grid shows [`display_items`](Self::display_items), which is the
/// session shuffle when enabled. The lightbox always steps through fetch
/// order. That sequence only ever grows at its end, so the lightbox index
/// and its pending advance stay valid as pages land. The shuffled order is
/// recomputed over every loaded item whenever a page arrives.
pub struct GalleryView {
    store: StoreHandle,
    cache: Arc<GalleryCache>,
    catalog: CategoryCatalog,
    settings: GallerySettings,
    settings_key: String,
    page_size: u32,
    seed: u32,
    selection: CategorySelection,
    viewport_width: u32,
}

impl GalleryView {
    /// Start a session. The shuffle seed is drawn here, once.
    ///
    /// Categories and settings are not loaded yet; until
    /// [`load_metadata`](Self::load_metadata) runs the view shows the
    /// unrestricted "All" list with default settings.
    pub fn new(store: StoreHandle, cache: Arc<GalleryCache>, config: &GalleryConfig) -> Self {
        Self {
            store,
            cache,
            catalog: CategoryCatalog::default(),
            settings: GallerySettings::default(),
            settings_key: config.settings_key.clone(),
            page_size: config.page_size,
            seed: new_session_seed(),
            selection: CategorySelection::All,
            viewport_width: 0,
        }
    }

    /// Replace the session seed, e.g. to reproduce a shared layout.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Load categories and settings concurrently. Settings never fail; a
    /// category failure leaves the catalog empty and is returned.
    pub async fn load_metadata(&mut self) -> Result<(), GalleryError> {
        let (categories, settings) = tokio::join!(
            CategoryCatalog::load(self.store.as_ref()),
            load_gallery_settings(self.store.as_ref(), &self.settings_key),
        );
        self.settings = settings;
        match categories {
            Ok(catalog) => {
                self.catalog = catalog;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load gallery categories");
                Err(e)
            }
        }
    }

    /// Install a server-rendered first page. Only accepted before category
    /// metadata is loaded and while "All" is selected.
    pub async fn seed_first_page(&self, page: Page) -> bool {
        let key = self.query_key();
        self.cache.seed_initial(&key, page).await
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn settings(&self) -> &GallerySettings {
        &self.settings
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> CategorySelection {
        self.selection
    }

    /// Switch the category filter. Pages already cached for the new filter
    /// are reused; call [`ensure_loaded`](Self::ensure_loaded) afterwards.
    pub fn select(&mut self, selection: CategorySelection) {
        if self.selection != selection {
            tracing::debug!(?selection, "Gallery filter changed");
        }
        self.selection = selection;
    }

    pub fn set_viewport_width(&mut self, width: u32) {
        self.viewport_width = width;
    }

    /// Cache key of the current filter.
    pub fn query_key(&self) -> QueryKey {
        QueryKey::new(
            self.catalog.filter_for(self.selection),
            self.page_size,
            self.catalog.names(),
        )
    }

    /// Make sure the current filter has its first page.
    pub async fn ensure_loaded(&self) -> Result<FetchOutcome, GalleryError> {
        self.cache.ensure_first_page(&self.query_key()).await
    }

    /// Fetch the next page of the current filter.
    pub async fn load_more(&self) -> Result<FetchOutcome, GalleryError> {
        self.cache.fetch_next_page(&self.query_key()).await
    }

    pub async fn snapshot(&self) -> QuerySnapshot {
        self.cache.snapshot(&self.query_key()).await
    }

    /// Loaded items in the order they are shown: fetch order, or the
    /// session shuffle when enabled.
    pub async fn display_items(&self) -> Vec<GalleryItem> {
        let snapshot = self.snapshot().await;
        apply_display_order(&snapshot.items, self.settings.shuffle, self.seed)
    }

    /// Column count for the current viewport width.
    pub fn column_count(&self) -> usize {
        resolve_column_count(&self.settings.columns, self.viewport_width)
    }

    /// Masonry placement of the displayed items.
    pub async fn layout(&self) -> GalleryLayout {
        let items = self.display_items().await;
        let column_count = self.column_count();
        let masonry = balance_columns(&items, column_count);
        GalleryLayout {
            column_count,
            items,
            masonry,
        }
    }

    /// Open the lightbox on the clicked item, looked up by id in fetch
    /// order. With shuffle on, next and prev therefore follow fetch order,
    /// not grid order. Returns whether the item is loaded.
    pub async fn open_lightbox(&self, lightbox: &LightboxController, item_id: EntityId) -> bool {
        let key = self.query_key();
        let snapshot = self.cache.snapshot(&key).await;
        match snapshot.items.iter().position(|item| item.id == item_id) {
            Some(index) => {
                lightbox.open(key, index).await;
                true
            }
            None => false,
        }
    }
}
