//! Gallery engine: paginated fetching, per-filter page caching, category
//! and settings loading, the lightbox controller, and the gallery session
//! that ties them together.
//!
//! Pure layout and state-machine logic lives in `vizfolio-core`; this crate
//! adds the async orchestration against a
//! [`RemoteStore`](vizfolio_store::RemoteStore).

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod lightbox;
pub mod settings;
pub mod view;

pub use cache::{CacheEvent, FetchOutcome, GalleryCache, QueryKey, QuerySnapshot};
pub use catalog::{CategoryCatalog, CategorySelection};
pub use config::GalleryConfig;
pub use error::GalleryError;
pub use fetcher::{CategoryNames, Page, PageFetcher};
pub use lightbox::{DocumentHost, LightboxController};
pub use view::GalleryView;
