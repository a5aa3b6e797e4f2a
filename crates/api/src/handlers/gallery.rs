//! Handlers for the public gallery.
//!
//! Pages for a specific index come straight from the fetcher. The seed page
//! and layouts go through the shared [`GalleryCache`](vizfolio_gallery::GalleryCache),
//! so repeated requests for the same filter within the freshness window do
//! not reach the store.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use vizfolio_core::error::CoreError;
use vizfolio_core::layout::ColumnAssignment;
use vizfolio_gallery::catalog::FilterChip;
use vizfolio_gallery::fetcher::validate_page_size;
use vizfolio_gallery::settings::load_gallery_settings;
use vizfolio_gallery::{CategoryCatalog, CategorySelection, GalleryView, Page, QueryKey};
use vizfolio_store::models::category::Category;
use vizfolio_store::models::gallery_item::GalleryItem;

use crate::error::{AppError, AppResult};
use crate::query::{GalleryItemsParams, LayoutParams, DEFAULT_VIEWPORT_WIDTH, MAX_LAYOUT_PAGES};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
    /// "All" followed by the categories, in chip order.
    pub chips: Vec<FilterChip>,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub seed: u32,
    pub shuffle: bool,
    pub column_count: usize,
    pub total_count: u64,
    pub loaded_count: usize,
    pub has_next_page: bool,
    /// Items per column, top to bottom.
    pub columns: Vec<Vec<GalleryItem>>,
    /// Column placement of each item in display order.
    pub assignments: Vec<ColumnAssignment>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_selection(catalog: &CategoryCatalog, raw: Option<&str>) -> AppResult<CategorySelection> {
    let Some(raw) = raw else {
        return Ok(CategorySelection::All);
    };
    catalog.resolve(raw).ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Category",
            key: raw.to_string(),
        })
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/gallery/items
///
/// One page of items for a category filter, with the next-page cursor and
/// the total matching count.
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<GalleryItemsParams>,
) -> AppResult<impl IntoResponse> {
    let page_size =
        validate_page_size(params.page_size.unwrap_or(state.config.gallery.page_size))?;
    let catalog = CategoryCatalog::load(state.store.as_ref()).await?;
    let selection = resolve_selection(&catalog, params.category.as_deref())?;

    let page = state
        .cache
        .fetcher()
        .fetch_page(
            params.page,
            &catalog.filter_for(selection),
            page_size,
            &catalog.names(),
        )
        .await?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/gallery/first-page
///
/// The unrestricted first page used to seed a client cache before category
/// metadata has loaded.
pub async fn first_page(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let key = QueryKey::initial(state.config.gallery.page_size);
    state.cache.load_pages(&key, 1).await?;

    let page: Page = state
        .cache
        .page(&key, 0)
        .await
        .ok_or_else(|| AppError::InternalError("first gallery page missing after load".into()))?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/gallery/categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let catalog = CategoryCatalog::load(state.store.as_ref()).await?;

    Ok(Json(DataResponse {
        data: CategoriesResponse {
            chips: catalog.chips(),
            categories: catalog.categories().to_vec(),
        },
    }))
}

/// GET /api/v1/gallery/settings
///
/// Always succeeds; an unreadable settings row yields the defaults.
pub async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    let settings =
        load_gallery_settings(state.store.as_ref(), &state.config.gallery.settings_key).await;

    Json(DataResponse { data: settings })
}

/// GET /api/v1/gallery/layout
///
/// Load `pages` pages of a filter and return them balanced into the column
/// count for `width`, in the session order for `seed`.
pub async fn get_layout(
    State(state): State<AppState>,
    Query(params): Query<LayoutParams>,
) -> AppResult<impl IntoResponse> {
    let pages = params.pages.unwrap_or(1);
    if pages == 0 || pages > MAX_LAYOUT_PAGES {
        return Err(AppError::BadRequest(format!(
            "pages must be between 1 and {MAX_LAYOUT_PAGES}"
        )));
    }

    let mut view = GalleryView::new(
        state.store.clone(),
        state.cache.clone(),
        &state.config.gallery,
    );
    if let Some(seed) = params.seed {
        view = view.with_seed(seed);
    }
    view.load_metadata().await?;

    let selection = resolve_selection(view.catalog(), params.category.as_deref())?;
    view.select(selection);
    view.set_viewport_width(params.width.unwrap_or(DEFAULT_VIEWPORT_WIDTH));

    let snapshot = state.cache.load_pages(&view.query_key(), pages).await?;
    let layout = view.layout().await;

    tracing::debug!(
        seed = view.seed(),
        columns = layout.column_count,
        items = layout.items.len(),
        "Built gallery layout",
    );

    let columns: Vec<Vec<GalleryItem>> = layout
        .column_items()
        .into_iter()
        .map(|column| column.into_iter().cloned().collect())
        .collect();

    Ok(Json(DataResponse {
        data: LayoutResponse {
            seed: view.seed(),
            shuffle: view.settings().shuffle,
            column_count: layout.column_count,
            total_count: snapshot.total_count,
            loaded_count: layout.items.len(),
            has_next_page: snapshot.has_next_page,
            columns,
            assignments: layout.masonry.assignments,
        },
    }))
}
