//! Key/value site settings.

use serde::{Deserialize, Serialize};

/// A row from the `site_settings` table. `value` is free-form JSON and is
/// coerced by the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSetting {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}
