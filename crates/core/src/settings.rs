//! Gallery display settings and their lenient coercion from stored JSON.
//!
//! Settings live in the hosted store as an untyped JSON value under a single
//! key. Anything missing or malformed falls back to its default instead of
//! failing, so a half-edited settings row never breaks the public gallery.
//!
//! Accepted shape:
//!
//! ```json
//! {
//!   "columns": { "mobile": 1, "tablet": 2, "desktop": 4, "wide": 5 },
//!   "image_radius": 0,
//!   "shuffle": false
//! }
//! ```
//!
//! Flat `columns_mobile` / `columns_tablet` / ... keys are also read, and
//! numbers may arrive as numeric strings.

use serde::Serialize;
use serde_json::Value;

use crate::columns::ColumnSettings;

/// Upper bound for a configured column count. Larger values are clamped.
pub const MAX_COLUMNS: u32 = 12;

/// Upper bound for the image corner radius, in pixels.
pub const MAX_IMAGE_RADIUS: u32 = 64;

/// Typed gallery settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GallerySettings {
    pub columns: ColumnSettings,
    /// Corner radius applied to thumbnails, in pixels.
    pub image_radius: u32,
    /// Shuffle the display order with the session seed.
    pub shuffle: bool,
}

impl GallerySettings {
    /// Coerce a stored JSON value. Never fails.
    pub fn from_json(value: &Value) -> Self {
        let defaults = Self::default();
        let nested = value.get("columns");
        let column = |name: &str, fallback: u32| {
            nested
                .and_then(|c| c.get(name))
                .or_else(|| value.get(format!("columns_{name}")))
                .and_then(coerce_u32)
                .map(|n| n.min(MAX_COLUMNS))
                .unwrap_or(fallback)
        };

        Self {
            columns: ColumnSettings {
                mobile: column("mobile", defaults.columns.mobile),
                tablet: column("tablet", defaults.columns.tablet),
                desktop: column("desktop", defaults.columns.desktop),
                wide: column("wide", defaults.columns.wide),
            },
            image_radius: value
                .get("image_radius")
                .and_then(coerce_u32)
                .map(|r| r.min(MAX_IMAGE_RADIUS))
                .unwrap_or(defaults.image_radius),
            shuffle: value
                .get("shuffle")
                .and_then(coerce_bool)
                .unwrap_or(defaults.shuffle),
        }
    }
}

/// Read a non-negative integer from a JSON number or numeric string.
fn coerce_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u32::try_from(u).ok()
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && *f <= f64::from(u32::MAX))
                    .map(|f| f.round() as u32)
            }
        }
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(|f| {
            (f.is_finite() && f >= 0.0 && f <= f64::from(u32::MAX)).then(|| f.round() as u32)
        }),
        _ => None,
    }
}

/// Read a boolean from a JSON bool, `"true"`/`"false"`, or `0`/`1`.
fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_value_gives_defaults() {
        let s = GallerySettings::from_json(&json!({}));
        assert_eq!(s, GallerySettings::default());
        assert_eq!(s.columns.mobile, 1);
        assert_eq!(s.columns.tablet, 2);
        assert_eq!(s.columns.desktop, 4);
        assert_eq!(s.columns.wide, 5);
        assert_eq!(s.image_radius, 0);
        assert!(!s.shuffle);
    }

    #[test]
    fn non_object_gives_defaults() {
        assert_eq!(GallerySettings::from_json(&json!(null)), GallerySettings::default());
        assert_eq!(GallerySettings::from_json(&json!("oops")), GallerySettings::default());
        assert_eq!(GallerySettings::from_json(&json!([1, 2])), GallerySettings::default());
    }

    #[test]
    fn nested_columns_are_read() {
        let s = GallerySettings::from_json(&json!({
            "columns": { "mobile": 2, "tablet": 3, "desktop": 5, "wide": 6 },
            "image_radius": 8,
            "shuffle": true
        }));
        assert_eq!(
            s.columns,
            ColumnSettings {
                mobile: 2,
                tablet: 3,
                desktop: 5,
                wide: 6
            }
        );
        assert_eq!(s.image_radius, 8);
        assert!(s.shuffle);
    }

    #[test]
    fn flat_keys_and_strings_are_coerced() {
        let s = GallerySettings::from_json(&json!({
            "columns_mobile": "2",
            "columns_wide": 7.0,
            "image_radius": "12",
            "shuffle": "true"
        }));
        assert_eq!(s.columns.mobile, 2);
        assert_eq!(s.columns.tablet, 2);
        assert_eq!(s.columns.wide, 7);
        assert_eq!(s.image_radius, 12);
        assert!(s.shuffle);
    }

    #[test]
    fn malformed_fields_fall_back_individually() {
        let s = GallerySettings::from_json(&json!({
            "columns": { "mobile": -1, "tablet": "many", "desktop": 3 },
            "image_radius": { "px": 4 },
            "shuffle": "maybe"
        }));
        assert_eq!(s.columns.mobile, 1);
        assert_eq!(s.columns.tablet, 2);
        assert_eq!(s.columns.desktop, 3);
        assert_eq!(s.columns.wide, 5);
        assert_eq!(s.image_radius, 0);
        assert!(!s.shuffle);
    }

    #[test]
    fn oversized_values_are_clamped() {
        let s = GallerySettings::from_json(&json!({
            "columns": { "wide": 40 },
            "image_radius": 500
        }));
        assert_eq!(s.columns.wide, MAX_COLUMNS);
        assert_eq!(s.image_radius, MAX_IMAGE_RADIUS);
    }
}
