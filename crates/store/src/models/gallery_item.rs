//! Gallery item model, its raw store row, and the page filter.

use serde::{Deserialize, Serialize};
use vizfolio_core::error::CoreError;
use vizfolio_core::layout::{effective_aspect_ratio, LayoutItem};
use vizfolio_core::media::{render_path, youtube_video_id, MediaKind, RenderPath};
use vizfolio_core::types::{EntityId, Timestamp};

use crate::remote::Filter;

/// Thumbnail used for YouTube items stored without an image.
const YOUTUBE_THUMBNAIL_BASE: &str = "https://img.youtube.com/vi";

// ---------------------------------------------------------------------------
// Raw row
// ---------------------------------------------------------------------------

/// A row from the `gallery_items` table as the store returns it.
///
/// Everything except `id` and `created_at` is optional here; the conversion
/// into [`GalleryItem`] fills in defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryItemRow {
    pub id: EntityId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub category_id: Option<EntityId>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
    #[serde(default)]
    pub display_order: Option<i64>,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A validated gallery item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: EntityId,
    pub title: String,
    pub image_url: String,
    pub video_url: Option<String>,
    pub media_kind: MediaKind,
    pub category_id: Option<EntityId>,
    /// Attached by the page fetcher from the category-name map.
    #[serde(default)]
    pub category_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Width over height; 1.0 when unknown.
    pub aspect_ratio: f64,
    /// Lower sorts first.
    pub display_order: i32,
    pub created_at: Timestamp,
}

impl GalleryItem {
    /// How this item is drawn.
    pub fn render_path(&self) -> RenderPath {
        render_path(
            &self.image_url,
            self.video_url.as_deref(),
            Some(self.aspect_ratio),
        )
    }

    pub fn is_video(&self) -> bool {
        self.media_kind == MediaKind::Video
    }
}

impl LayoutItem for GalleryItem {
    fn aspect_ratio(&self) -> Option<f64> {
        Some(self.aspect_ratio)
    }
}

fn positive_dimension(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v > 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v.round() as u32)
}

impl TryFrom<GalleryItemRow> for GalleryItem {
    type Error = CoreError;

    fn try_from(row: GalleryItemRow) -> Result<Self, Self::Error> {
        let video_url = row
            .video_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        let declared = row.media_type.as_deref().map(MediaKind::parse).transpose()?;
        let media_kind = MediaKind::resolve(declared, video_url.as_deref());

        let image_url = match row.image_url.map(|u| u.trim().to_string()) {
            Some(url) if !url.is_empty() => url,
            _ => video_url
                .as_deref()
                .and_then(youtube_video_id)
                .map(|id| format!("{YOUTUBE_THUMBNAIL_BASE}/{id}/hqdefault.jpg"))
                .ok_or_else(|| {
                    CoreError::Validation(format!("Gallery item {} has no image", row.id))
                })?,
        };

        let width = positive_dimension(row.width);
        let height = positive_dimension(row.height);
        let derived = match (width, height) {
            (Some(w), Some(h)) => Some(f64::from(w) / f64::from(h)),
            _ => None,
        };
        let aspect_ratio = effective_aspect_ratio(
            row.aspect_ratio
                .filter(|r| r.is_finite() && *r > 0.0)
                .or(derived),
        );

        let display_order = row
            .display_order
            .unwrap_or(0)
            .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;

        Ok(Self {
            id: row.id,
            title: row.title.unwrap_or_default(),
            image_url,
            video_url,
            media_kind,
            category_id: row.category_id,
            category_name: None,
            width,
            height,
            aspect_ratio,
            display_order,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Category restriction for a gallery page request.
///
/// - `category_id` set: only that category; `allowed_category_ids` is ignored.
/// - `category_id` unset, allowed set non-empty: the "All" view limited to
///   categories that opted into it.
/// - both empty: every item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GalleryFilter {
    pub category_id: Option<EntityId>,
    #[serde(default)]
    pub allowed_category_ids: Vec<EntityId>,
}

impl GalleryFilter {
    /// Unrestricted "All".
    pub fn all() -> Self {
        Self::default()
    }

    /// "All", restricted to the given categories. Ids are sorted and
    /// de-duplicated so equal sets compare and hash equal.
    pub fn all_within(ids: impl IntoIterator<Item = EntityId>) -> Self {
        let mut allowed: Vec<EntityId> = ids.into_iter().collect();
        allowed.sort_unstable();
        allowed.dedup();
        Self {
            category_id: None,
            allowed_category_ids: allowed,
        }
    }

    /// A single category.
    pub fn category(id: EntityId) -> Self {
        Self {
            category_id: Some(id),
            allowed_category_ids: Vec::new(),
        }
    }

    /// "All" with no restriction at all.
    pub fn is_unrestricted_all(&self) -> bool {
        self.category_id.is_none() && self.allowed_category_ids.is_empty()
    }

    /// Translate into store predicates on `category_id`.
    pub fn to_store_filter(&self) -> Filter {
        match self.category_id {
            Some(id) => Filter::new().eq("category_id", id),
            None if !self.allowed_category_ids.is_empty() => {
                Filter::new().in_list("category_id", &self.allowed_category_ids)
            }
            None => Filter::new(),
        }
    }
}
