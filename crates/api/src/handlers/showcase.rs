//! Handlers for the hero carousel and the VR tour list.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use vizfolio_store::repositories::{HeroBannerRepo, VrEntryRepo};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/banners
///
/// Active hero banners in carousel order.
pub async fn list_banners(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let banners = HeroBannerRepo::list_active(state.store.as_ref()).await?;

    Ok(Json(DataResponse { data: banners }))
}

/// GET /api/v1/vr
pub async fn list_vr_entries(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let entries = VrEntryRepo::list_all(state.store.as_ref()).await?;

    Ok(Json(DataResponse { data: entries }))
}
