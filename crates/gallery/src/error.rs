use vizfolio_store::repositories::gallery_item_repo::MAX_PAGE_SIZE;
use vizfolio_store::StoreError;

/// Errors from the gallery engine.
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    /// The remote store failed or returned something unusable.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A page size outside `1..=MAX_PAGE_SIZE`.
    #[error("Page size must be between 1 and {}", MAX_PAGE_SIZE)]
    InvalidPageSize,

    /// The cache was shut down while the request was pending.
    #[error("Gallery cache is shut down")]
    ShutDown,
}
