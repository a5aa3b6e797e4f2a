use std::sync::Arc;

use vizfolio_gallery::GalleryCache;
use vizfolio_store::StoreHandle;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything heavy sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Remote store holding every gallery entity.
    pub store: StoreHandle,
    pub config: Arc<ServerConfig>,
    /// Page cache shared by every request, keyed by filter.
    pub cache: Arc<GalleryCache>,
}
