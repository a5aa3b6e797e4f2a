//! Responsive column resolution for the masonry grid.
//!
//! The admin configures one column count per breakpoint. The viewport width
//! picks the breakpoint; the laptop range reuses the tablet value with a
//! floor of two columns.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Viewports narrower than this are "mobile".
pub const TABLET_MIN_WIDTH: u32 = 640;

/// Start of the laptop range that floors the tablet count at two.
pub const LAPTOP_MIN_WIDTH: u32 = 1024;

/// Start of the desktop range.
pub const DESKTOP_MIN_WIDTH: u32 = 1280;

/// Start of the wide range.
pub const WIDE_MIN_WIDTH: u32 = 1536;

/// Minimum column count used in the laptop range.
const LAPTOP_COLUMN_FLOOR: u32 = 2;

pub const DEFAULT_MOBILE_COLUMNS: u32 = 1;
pub const DEFAULT_TABLET_COLUMNS: u32 = 2;
pub const DEFAULT_DESKTOP_COLUMNS: u32 = 4;
pub const DEFAULT_WIDE_COLUMNS: u32 = 5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Admin-configured column counts, one per breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSettings {
    pub mobile: u32,
    pub tablet: u32,
    pub desktop: u32,
    pub wide: u32,
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            mobile: DEFAULT_MOBILE_COLUMNS,
            tablet: DEFAULT_TABLET_COLUMNS,
            desktop: DEFAULT_DESKTOP_COLUMNS,
            wide: DEFAULT_WIDE_COLUMNS,
        }
    }
}

/// Named viewport ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    /// `< 640px`
    Mobile,
    /// `640..1024px`
    Tablet,
    /// `1024..1280px`
    Laptop,
    /// `1280..1536px`
    Desktop,
    /// `>= 1536px`
    Wide,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Classify a viewport width in CSS pixels.
pub fn breakpoint_for_width(width: u32) -> Breakpoint {
    match width {
        w if w >= WIDE_MIN_WIDTH => Breakpoint::Wide,
        w if w >= DESKTOP_MIN_WIDTH => Breakpoint::Desktop,
        w if w >= LAPTOP_MIN_WIDTH => Breakpoint::Laptop,
        w if w >= TABLET_MIN_WIDTH => Breakpoint::Tablet,
        _ => Breakpoint::Mobile,
    }
}

impl ColumnSettings {
    /// Configured count for a breakpoint, before any floor is applied.
    pub fn configured_for(&self, breakpoint: Breakpoint) -> u32 {
        match breakpoint {
            Breakpoint::Mobile => self.mobile,
            Breakpoint::Tablet | Breakpoint::Laptop => self.tablet,
            Breakpoint::Desktop => self.desktop,
            Breakpoint::Wide => self.wide,
        }
    }
}

/// Column count to render at `width`.
///
/// The laptop range uses `max(tablet, 2)`. Every range yields at least one
/// column even when the admin stored zero.
pub fn resolve_column_count(settings: &ColumnSettings, width: u32) -> usize {
    let breakpoint = breakpoint_for_width(width);
    let configured = settings.configured_for(breakpoint);
    let effective = match breakpoint {
        Breakpoint::Laptop => configured.max(LAPTOP_COLUMN_FLOOR),
        _ => configured,
    };
    effective.max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(mobile: u32, tablet: u32, desktop: u32, wide: u32) -> ColumnSettings {
        ColumnSettings {
            mobile,
            tablet,
            desktop,
            wide,
        }
    }

    #[test]
    fn breakpoint_edges() {
        assert_eq!(breakpoint_for_width(0), Breakpoint::Mobile);
        assert_eq!(breakpoint_for_width(639), Breakpoint::Mobile);
        assert_eq!(breakpoint_for_width(640), Breakpoint::Tablet);
        assert_eq!(breakpoint_for_width(1023), Breakpoint::Tablet);
        assert_eq!(breakpoint_for_width(1024), Breakpoint::Laptop);
        assert_eq!(breakpoint_for_width(1279), Breakpoint::Laptop);
        assert_eq!(breakpoint_for_width(1280), Breakpoint::Desktop);
        assert_eq!(breakpoint_for_width(1535), Breakpoint::Desktop);
        assert_eq!(breakpoint_for_width(1536), Breakpoint::Wide);
        assert_eq!(breakpoint_for_width(3840), Breakpoint::Wide);
    }

    #[test]
    fn defaults_per_breakpoint() {
        let s = ColumnSettings::default();
        assert_eq!(resolve_column_count(&s, 375), 1);
        assert_eq!(resolve_column_count(&s, 800), 2);
        assert_eq!(resolve_column_count(&s, 1100), 2);
        assert_eq!(resolve_column_count(&s, 1400), 4);
        assert_eq!(resolve_column_count(&s, 1920), 5);
    }

    #[test]
    fn laptop_range_with_tablet_two() {
        assert_eq!(resolve_column_count(&settings(1, 2, 4, 5), 1100), 2);
    }

    #[test]
    fn laptop_range_floors_tablet_one_to_two() {
        assert_eq!(resolve_column_count(&settings(1, 1, 4, 5), 1100), 2);
    }

    #[test]
    fn laptop_range_keeps_larger_tablet_value() {
        assert_eq!(resolve_column_count(&settings(1, 3, 4, 5), 1100), 3);
    }

    #[test]
    fn tablet_range_has_no_floor() {
        assert_eq!(resolve_column_count(&settings(1, 1, 4, 5), 800), 1);
    }

    #[test]
    fn zero_columns_resolve_to_one() {
        let s = settings(0, 0, 0, 0);
        assert_eq!(resolve_column_count(&s, 320), 1);
        assert_eq!(resolve_column_count(&s, 1100), 2);
        assert_eq!(resolve_column_count(&s, 1400), 1);
        assert_eq!(resolve_column_count(&s, 2000), 1);
    }
}
