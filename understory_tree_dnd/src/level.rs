// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nesting level from horizontal pointer offset.

use kurbo::Point;

/// Horizontal layout constants of the tree, in pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LevelMetrics {
    /// Width of one nesting level.
    pub indent: f64,
    /// Offset from the level-0 edge before level counting starts.
    pub lead: f64,
    /// Offset from the level-0 edge to where the insertion line starts.
    pub indicator_inset: f64,
    /// Half the thickness of the insertion line.
    pub indicator_half_height: f64,
}

impl Default for LevelMetrics {
    fn default() -> Self {
        Self {
            indent: 40.0,
            lead: 20.0,
            indicator_inset: 30.0,
            indicator_half_height: 5.0,
        }
    }
}

impl LevelMetrics {
    /// The level a pointer at `x` asks for, clamped to `[min, max]`.
    ///
    /// `root_x` is the left edge of level 0. Pointers left of the lead area
    /// get `min`.
    pub fn drop_level(&self, x: f64, root_x: f64, min: usize, max: usize) -> usize {
        let diff = x - root_x - self.lead;
        if diff < 0.0 || self.indent <= 0.0 {
            return min;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "diff is non-negative and levels are small."
        )]
        let level = (diff / self.indent + 0.5) as usize;
        level.min(max).max(min)
    }

    /// Origin of the insertion line for a drop at `level` along a row edge at `edge_y`.
    pub fn indicator_origin(&self, root_x: f64, level: usize, edge_y: f64) -> Point {
        Point::new(
            root_x + self.indicator_inset + level as f64 * self.indent,
            edge_y - self.indicator_half_height,
        )
    }
}

/// Levels allowed when dropping above a row at level `current`.
///
/// `previous` is the level of the row shown directly above, if any. A deeper
/// previous row opens up its levels; otherwise only `current` is allowed.
pub fn above_range(current: usize, previous: Option<usize>) -> (usize, usize) {
    match previous {
        Some(prev) if prev > current => (current, prev),
        _ => (current, current),
    }
}

/// Levels allowed when dropping below a row at level `current`.
///
/// `next` is the level of the row shown directly below, if any. A shallower
/// next row opens up the levels between; a same-level or deeper one pins the
/// drop to its level. With nothing below, any level up to `current` fits.
pub fn below_range(current: usize, next: Option<usize>) -> (usize, usize) {
    match next {
        Some(next) if current > next => (next, current),
        Some(next) => (next, next),
        None => (0, current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_rounds_to_nearest_indent() {
        let m = LevelMetrics::default();
        assert_eq!(m.drop_level(100.0, 0.0, 0, 5), 2);
        assert_eq!(m.drop_level(79.0, 0.0, 0, 5), 1);
        assert_eq!(m.drop_level(80.0, 0.0, 0, 5), 2);
        assert_eq!(m.drop_level(20.0, 0.0, 0, 5), 0);
    }

    #[test]
    fn level_is_clamped() {
        let m = LevelMetrics::default();
        assert_eq!(m.drop_level(500.0, 0.0, 1, 3), 3);
        assert_eq!(m.drop_level(30.0, 0.0, 2, 3), 2);
        // Left of the lead area.
        assert_eq!(m.drop_level(10.0, 0.0, 1, 3), 1);
        assert_eq!(m.drop_level(-40.0, 100.0, 0, 3), 0);
    }

    #[test]
    fn above_range_opens_to_deeper_previous() {
        assert_eq!(above_range(1, Some(3)), (1, 3));
        assert_eq!(above_range(2, Some(0)), (2, 2));
        assert_eq!(above_range(2, None), (2, 2));
    }

    #[test]
    fn below_range_follows_next_row() {
        assert_eq!(below_range(3, Some(1)), (1, 3));
        assert_eq!(below_range(1, Some(2)), (2, 2));
        assert_eq!(below_range(1, Some(1)), (1, 1));
        assert_eq!(below_range(2, None), (0, 2));
    }

    #[test]
    fn indicator_follows_level() {
        let m = LevelMetrics::default();
        assert_eq!(m.indicator_origin(10.0, 2, 100.0), Point::new(120.0, 95.0));
    }
}
