use axum::routing::get;
use axum::Router;

use crate::handlers::showcase;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/banners", get(showcase::list_banners))
        .route("/vr", get(showcase::list_vr_entries))
}
