//! Column-balancing ("masonry") layout.
//!
//! Items are placed one by one, in their original order, into whichever
//! column is currently shortest. An item's height contribution is estimated
//! from its aspect ratio alone (`1 / aspect_ratio` for a unit-width column),
//! so the layout can be computed before any image has loaded.
//!
//! The layout is always recomputed from scratch when the item list or the
//! column count changes. There is no incremental patching.

use serde::Serialize;

/// Aspect ratio assumed when an item does not report a usable one.
pub const DEFAULT_ASPECT_RATIO: f64 = 1.0;

/// Anything that can be placed in the grid.
pub trait LayoutItem {
    /// Width divided by height, if known.
    fn aspect_ratio(&self) -> Option<f64>;
}

impl LayoutItem for f64 {
    fn aspect_ratio(&self) -> Option<f64> {
        Some(*self)
    }
}

impl LayoutItem for Option<f64> {
    fn aspect_ratio(&self) -> Option<f64> {
        *self
    }
}

/// Sanitise an aspect ratio: missing, zero, negative or non-finite values
/// fall back to [`DEFAULT_ASPECT_RATIO`].
pub fn effective_aspect_ratio(ratio: Option<f64>) -> f64 {
    match ratio {
        Some(r) if r.is_finite() && r > 0.0 => r,
        _ => DEFAULT_ASPECT_RATIO,
    }
}

/// Estimated rendered height of an item in a unit-width column.
pub fn height_contribution(ratio: Option<f64>) -> f64 {
    1.0 / effective_aspect_ratio(ratio)
}

/// Where a single item landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnAssignment {
    /// Column index, `0..column_count`.
    pub column: usize,
    /// Position of the item within its column.
    pub position: usize,
}

/// Result of balancing a list of items over N columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasonryLayout {
    /// Per column, the indices (into the input slice) of its items in order.
    pub columns: Vec<Vec<usize>>,
    /// Per input item, its column and position.
    pub assignments: Vec<ColumnAssignment>,
    /// Accumulated estimated height of each column.
    pub heights: Vec<f64>,
}

impl MasonryLayout {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Borrow the items of each column from the slice the layout was built on.
    pub fn project<'a, T>(&self, items: &'a [T]) -> Vec<Vec<&'a T>> {
        self.columns
            .iter()
            .map(|col| col.iter().filter_map(|&i| items.get(i)).collect())
            .collect()
    }

    /// Tallest column height, i.e. the height of the whole grid.
    pub fn max_height(&self) -> f64 {
        self.heights.iter().copied().fold(0.0, f64::max)
    }
}

/// Index of the shortest column; ties go to the lowest index.
fn shortest_column(heights: &[f64]) -> usize {
    let mut index = 0;
    let mut best = heights.first().copied().unwrap_or(0.0);
    for (i, h) in heights.iter().enumerate().skip(1) {
        if *h < best {
            best = *h;
            index = i;
        }
    }
    index
}

/// Distribute `items` over `column_count` columns, shortest column first.
///
/// A `column_count` of zero is treated as one.
pub fn balance_columns<T: LayoutItem>(items: &[T], column_count: usize) -> MasonryLayout {
    let n = column_count.max(1);
    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut heights = vec![0.0_f64; n];
    let mut assignments = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let column = shortest_column(&heights);
        assignments.push(ColumnAssignment {
            column,
            position: columns[column].len(),
        });
        columns[column].push(index);
        heights[column] += height_contribution(item.aspect_ratio());
    }

    MasonryLayout {
        columns,
        assignments,
        heights,
    }
}
