//! Read-only repositories over the remote store.
//!
//! Each repository is a zero-sized struct with associated async functions
//! taking the store as their first argument. Rows are decoded and validated
//! here so nothing loosely typed leaves this crate.

pub mod category_repo;
pub mod gallery_item_repo;
pub mod hero_banner_repo;
pub mod site_setting_repo;
pub mod vr_entry_repo;

pub use category_repo::CategoryRepo;
pub use gallery_item_repo::{GalleryItemRepo, ItemSlice};
pub use hero_banner_repo::HeroBannerRepo;
pub use site_setting_repo::SiteSettingRepo;
pub use vr_entry_repo::VrEntryRepo;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StoreError;

/// Decode raw rows into typed models.
fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}
