use axum::routing::get;
use axum::Router;

use crate::handlers::gallery;
use crate::state::AppState;

/// Gallery routes mounted at `/gallery`.
///
/// ```text
/// GET /items         -> list_items
/// GET /first-page    -> first_page
/// GET /categories    -> list_categories
/// GET /settings      -> get_settings
/// GET /layout        -> get_layout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items", get(gallery::list_items))
        .route("/first-page", get(gallery::first_page))
        .route("/categories", get(gallery::list_categories))
        .route("/settings", get(gallery::get_settings))
        .route("/layout", get(gallery::get_layout))
}
