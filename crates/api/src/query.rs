//! Query parameter types for the gallery handlers.

use serde::Deserialize;

/// Upper bound for `?pages=` on the layout endpoint.
pub const MAX_LAYOUT_PAGES: usize = 20;

/// Viewport width assumed when `?width=` is absent.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// `GET /gallery/items?page=&page_size=&category=`
#[derive(Debug, Default, Deserialize)]
pub struct GalleryItemsParams {
    #[serde(default)]
    pub page: u32,
    pub page_size: Option<u32>,
    /// Category id or name; absent or `all` for the unfiltered view.
    pub category: Option<String>,
}

/// `GET /gallery/layout?width=&pages=&category=&seed=`
#[derive(Debug, Default, Deserialize)]
pub struct LayoutParams {
    pub width: Option<u32>,
    /// Pages to load before laying out (default 1).
    pub pages: Option<usize>,
    pub category: Option<String>,
    /// Shuffle seed to reproduce; a fresh one is drawn when absent.
    pub seed: Option<u32>,
}
