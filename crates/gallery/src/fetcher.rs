//! Remote gallery page fetcher.

use std::collections::BTreeMap;

use serde::Serialize;
use vizfolio_core::types::EntityId;
use vizfolio_store::models::gallery_item::{GalleryFilter, GalleryItem};
use vizfolio_store::repositories::gallery_item_repo::MAX_PAGE_SIZE;
use vizfolio_store::repositories::GalleryItemRepo;
use vizfolio_store::StoreHandle;

use crate::error::GalleryError;

/// Category id to display name, attached to fetched items.
///
/// Part of the cache key, so it is ordered and hashable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryNames(BTreeMap<EntityId, String>);

impl CategoryNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &EntityId) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(EntityId, String)> for CategoryNames {
    fn from_iter<I: IntoIterator<Item = (EntityId, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One fetched slice of the gallery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<GalleryItem>,
    pub page_index: u32,
    /// Index of the following page, `None` at the end of the archive.
    pub next_page: Option<u32>,
    /// Items matching the filter when this page was fetched.
    pub total_count: u64,
}

impl Page {
    pub fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }
}

/// Whether a page after `page_index` exists, given the page size and the
/// reported total.
pub fn has_next_page(page_index: u32, page_size: u32, total_count: u64) -> bool {
    (u64::from(page_index) + 1) * u64::from(page_size) < total_count
}

/// Accept `page_size` only if one store request can return a whole page.
pub fn validate_page_size(page_size: u32) -> Result<u32, GalleryError> {
    if page_size == 0 || u64::from(page_size) > MAX_PAGE_SIZE {
        return Err(GalleryError::InvalidPageSize);
    }
    Ok(page_size)
}

/// Fetches single gallery pages from the remote store. No caching, no retry.
#[derive(Clone)]
pub struct PageFetcher {
    store: StoreHandle,
}

impl PageFetcher {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Fetch page `page_index` of the items matching `filter`.
    pub async fn fetch_page(
        &self,
        page_index: u32,
        filter: &GalleryFilter,
        page_size: u32,
        names: &CategoryNames,
    ) -> Result<Page, GalleryError> {
        let page_size = validate_page_size(page_size)?;

        let offset = u64::from(page_index) * u64::from(page_size);
        let slice =
            GalleryItemRepo::fetch_page(self.store.as_ref(), filter, offset, u64::from(page_size))
                .await?;

        let items = slice
            .items
            .into_iter()
            .map(|mut item| {
                item.category_name = item
                    .category_id
                    .and_then(|id| names.get(&id))
                    .map(str::to_string);
                item
            })
            .collect::<Vec<_>>();

        let next_page = has_next_page(page_index, page_size, slice.total_matching)
            .then_some(page_index + 1);

        tracing::debug!(
            page_index,
            page_size,
            fetched = items.len(),
            total = slice.total_matching,
            "Fetched gallery page",
        );

        Ok(Page {
            items,
            page_index,
            next_page,
            total_count: slice.total_matching,
        })
    }
}
