//! Repository for the `gallery_items` table.

use vizfolio_core::error::CoreError;

use crate::error::StoreError;
use crate::models::gallery_item::{GalleryFilter, GalleryItem, GalleryItemRow};
use crate::remote::{OrderBy, RemoteStore, RowRange};

use super::decode_rows;

/// Display order first, newest first among equals.
const ITEM_ORDER: [OrderBy; 2] = [OrderBy::asc("display_order"), OrderBy::desc("created_at")];

/// Largest page callers may request. The hosted backend caps responses at
/// this many rows, so a larger `limit` would come back short.
pub const MAX_PAGE_SIZE: u64 = 200;

/// One window of items plus the total matching the filter at fetch time.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSlice {
    pub items: Vec<GalleryItem>,
    pub total_matching: u64,
}

pub struct GalleryItemRepo;

impl GalleryItemRepo {
    pub const RESOURCE: &'static str = "gallery_items";

    /// Fetch up to `limit` items starting at `offset`, ordered by display
    /// order ascending then creation time descending. `limit` is passed
    /// through unchanged; keeping it within [`MAX_PAGE_SIZE`] is the
    /// caller's job.
    pub async fn fetch_page(
        store: &dyn RemoteStore,
        filter: &GalleryFilter,
        offset: u64,
        limit: u64,
    ) -> Result<ItemSlice, StoreError> {
        let range = RowRange { offset, limit };
        let page = store
            .fetch_page(Self::RESOURCE, &filter.to_store_filter(), range, &ITEM_ORDER)
            .await?;

        let rows: Vec<GalleryItemRow> = decode_rows(page.rows)?;
        let items = rows
            .into_iter()
            .map(GalleryItem::try_from)
            .collect::<Result<Vec<_>, CoreError>>()
            .map_err(|source| StoreError::InvalidRow {
                resource: Self::RESOURCE,
                source,
            })?;

        Ok(ItemSlice {
            items,
            total_matching: page.total_matching,
        })
    }
}
