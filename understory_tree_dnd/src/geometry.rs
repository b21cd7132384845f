// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row geometry supplied by the host.

use hashbrown::HashMap;
use kurbo::{Point, Rect, Size, Vec2};
use understory_outline::{FlatId, FlatView};

/// Screen-space geometry of rendered rows, measured on demand.
///
/// The drag session asks for bounds of visible rows when it (re)builds its
/// row index and for the viewport height when it starts. A row without
/// geometry (not rendered, or detached mid-drag) is simply left out of hit
/// testing.
pub trait RowGeometry {
    /// Bounding box of a rendered row, in the same space as pointer positions.
    fn row_bounds(&self, row: FlatId) -> Option<Rect>;

    /// Height of the scrolling viewport the tree is shown in.
    fn viewport_height(&self) -> f64;
}

/// Geometry snapshot for hosts that lay rows out in a fixed-height column.
///
/// Each visible row gets `row_size`, stacked from `origin` downward and
/// indented by `indent` per level. Useful for headless hosts and tests; a
/// snapshot must be retaken after expansion changes.
#[derive(Clone, Debug, Default)]
pub struct FixedRowGeometry {
    bounds: HashMap<FlatId, Rect>,
    viewport_height: f64,
}

impl FixedRowGeometry {
    /// Lay out the currently visible rows of `flat`.
    pub fn layout(
        flat: &FlatView,
        origin: Point,
        row_size: Size,
        indent: f64,
        viewport_height: f64,
    ) -> Self {
        let mut bounds = HashMap::new();
        let mut y = origin.y;
        for row in flat.visible() {
            let x = origin.x + indent * row.level as f64;
            bounds.insert(row.id, Rect::from_origin_size((x, y), row_size));
            y += row_size.height;
        }
        Self {
            bounds,
            viewport_height,
        }
    }

    /// Override one row's bounds.
    pub fn set(&mut self, row: FlatId, bounds: Rect) {
        self.bounds.insert(row, bounds);
    }

    /// Forget one row, as if it stopped being rendered.
    pub fn remove(&mut self, row: FlatId) {
        self.bounds.remove(&row);
    }

    /// Shift every row by `-dy`, as scrolling the content by `dy` would.
    pub fn scroll_by(&mut self, dy: f64) {
        for rect in self.bounds.values_mut() {
            *rect = *rect - Vec2::new(0.0, dy);
        }
    }
}

impl RowGeometry for FixedRowGeometry {
    fn row_bounds(&self, row: FlatId) -> Option<Rect> {
        self.bounds.get(&row).copied()
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }
}
