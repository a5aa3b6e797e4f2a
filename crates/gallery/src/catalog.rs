//! Category metadata: filter chips, the id-to-name map and the "All"
//! restriction.

use serde::Serialize;
use vizfolio_core::types::EntityId;
use vizfolio_store::models::category::Category;
use vizfolio_store::models::gallery_item::GalleryFilter;
use vizfolio_store::repositories::CategoryRepo;
use vizfolio_store::RemoteStore;

use crate::error::GalleryError;
use crate::fetcher::CategoryNames;

/// The category filter the visitor picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CategorySelection {
    #[default]
    All,
    Category(EntityId),
}

/// One filter chip, in display order. The "All" chip has no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChip {
    pub id: Option<EntityId>,
    pub label: String,
}

/// Label of the unfiltered chip.
pub const ALL_LABEL: &str = "All";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl CategoryCatalog {
    /// Load every category from the store.
    pub async fn load(store: &dyn RemoteStore) -> Result<Self, GalleryError> {
        let categories = CategoryRepo::list_all(store).await?;
        tracing::debug!(count = categories.len(), "Loaded gallery categories");
        Ok(Self::from_categories(categories))
    }

    pub fn from_categories(mut categories: Vec<Category>) -> Self {
        categories.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// "All" followed by every category in display order.
    pub fn chips(&self) -> Vec<FilterChip> {
        std::iter::once(FilterChip {
            id: None,
            label: ALL_LABEL.to_string(),
        })
        .chain(self.categories.iter().map(|c| FilterChip {
            id: Some(c.id),
            label: c.name.clone(),
        }))
        .collect()
    }

    pub fn names(&self) -> CategoryNames {
        self.categories
            .iter()
            .map(|c| (c.id, c.name.clone()))
            .collect()
    }

    /// Categories whose items appear in the "All" view.
    pub fn allowed_in_all(&self) -> Vec<EntityId> {
        self.categories
            .iter()
            .filter(|c| c.show_in_all)
            .map(|c| c.id)
            .collect()
    }

    /// Store filter for a selection.
    ///
    /// "All" is restricted to the opted-in categories only when at least one
    /// category opted out; otherwise it stays unrestricted so items without
    /// a category keep showing.
    pub fn filter_for(&self, selection: CategorySelection) -> GalleryFilter {
        match selection {
            CategorySelection::Category(id) => GalleryFilter::category(id),
            CategorySelection::All if self.categories.iter().all(|c| c.show_in_all) => {
                GalleryFilter::all()
            }
            CategorySelection::All => GalleryFilter::all_within(self.allowed_in_all()),
        }
    }

    /// Resolve a query value that is either a category id or a name
    /// (case-insensitive). `"all"` and the empty string select "All".
    pub fn resolve(&self, raw: &str) -> Option<CategorySelection> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(ALL_LABEL) {
            return Some(CategorySelection::All);
        }
        if let Ok(id) = raw.parse::<EntityId>() {
            return self
                .categories
                .iter()
                .any(|c| c.id == id)
                .then_some(CategorySelection::Category(id));
        }
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(raw))
            .map(|c| CategorySelection::Category(c.id))
    }
}
