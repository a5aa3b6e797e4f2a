pub mod gallery;
pub mod health;
pub mod showcase;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /gallery/items           one page for a category filter
/// /gallery/first-page      seed page for the client cache
/// /gallery/categories      filter chips
/// /gallery/settings        display settings
/// /gallery/layout          masonry columns for a viewport width
/// /banners                 active hero banners
/// /vr                      VR tours
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/gallery", gallery::router())
        .merge(showcase::router())
}
