use std::time::Duration;

use crate::fetcher::validate_page_size;

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// How long a cached filter bucket is reused before it is refetched.
pub const DEFAULT_FRESH_FOR: Duration = Duration::from_secs(10 * 60);

/// Autoplay period of the lightbox.
pub const DEFAULT_AUTOPLAY_EVERY: Duration = Duration::from_secs(3);

/// Site-settings key holding the gallery display settings.
pub const DEFAULT_SETTINGS_KEY: &str = "gallery_settings";

/// Gallery engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryConfig {
    /// Items requested per page.
    pub page_size: u32,
    /// Freshness window of a cache bucket.
    pub fresh_for: Duration,
    /// Lightbox autoplay period.
    pub autoplay_every: Duration,
    /// Key of the settings row read once per session.
    pub settings_key: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            fresh_for: DEFAULT_FRESH_FOR,
            autoplay_every: DEFAULT_AUTOPLAY_EVERY,
            settings_key: DEFAULT_SETTINGS_KEY.to_string(),
        }
    }
}

impl GalleryConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default            |
    /// |----------------------------|--------------------|
    /// | `GALLERY_PAGE_SIZE`        | `50`               |
    /// | `GALLERY_CACHE_FRESH_SECS` | `600`              |
    /// | `GALLERY_AUTOPLAY_SECS`    | `3`                |
    /// | `GALLERY_SETTINGS_KEY`     | `gallery_settings` |
    pub fn from_env() -> Self {
        let page_size: u32 = std::env::var("GALLERY_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse()
            .expect("GALLERY_PAGE_SIZE must be a valid u32");
        let page_size = validate_page_size(page_size)
            .unwrap_or_else(|e| panic!("GALLERY_PAGE_SIZE {page_size} rejected: {e}"));

        let fresh_secs: u64 = std::env::var("GALLERY_CACHE_FRESH_SECS")
            .unwrap_or_else(|_| DEFAULT_FRESH_FOR.as_secs().to_string())
            .parse()
            .expect("GALLERY_CACHE_FRESH_SECS must be a valid u64");

        let autoplay_secs: u64 = std::env::var("GALLERY_AUTOPLAY_SECS")
            .unwrap_or_else(|_| DEFAULT_AUTOPLAY_EVERY.as_secs().to_string())
            .parse()
            .expect("GALLERY_AUTOPLAY_SECS must be a valid u64");

        let settings_key =
            std::env::var("GALLERY_SETTINGS_KEY").unwrap_or_else(|_| DEFAULT_SETTINGS_KEY.into());

        Self {
            page_size,
            fresh_for: Duration::from_secs(fresh_secs),
            autoplay_every: Duration::from_secs(autoplay_secs.max(1)),
            settings_key,
        }
    }
}
