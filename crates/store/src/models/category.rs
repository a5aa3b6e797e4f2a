//! Gallery category model.

use serde::{Deserialize, Serialize};
use vizfolio_core::types::EntityId;

/// A row from the `categories` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: EntityId,
    /// Unique across categories.
    pub name: String,
    /// Filter-chip ordering, lower first.
    #[serde(default)]
    pub display_order: i32,
    /// Whether items of this category appear in the unfiltered "All" view.
    #[serde(default = "default_show_in_all")]
    pub show_in_all: bool,
}

fn default_show_in_all() -> bool {
    true
}
