//! Hero banner model for the landing page carousel.

use serde::{Deserialize, Serialize};
use vizfolio_core::types::EntityId;

/// A row from the `hero_banners` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroBanner {
    pub id: EntityId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
