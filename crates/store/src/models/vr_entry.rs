//! Virtual-reality tour links.

use serde::{Deserialize, Serialize};
use vizfolio_core::types::EntityId;

/// A row from the `vr_entries` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrEntry {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// External VR tour URL, opened in a new tab.
    pub vr_url: String,
    #[serde(default)]
    pub display_order: i32,
}
