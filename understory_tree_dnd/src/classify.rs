// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlap classification of a dragged row against a candidate row.

use core::fmt;

use kurbo::Rect;

/// Where a drop lands relative to its target row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DropPosition {
    /// Insert before the target, as its sibling.
    Above,
    /// Insert after the target, as its sibling.
    Below,
    /// Append as the target's last child.
    Center,
}

impl DropPosition {
    /// Lowercase name, as used in change payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::Center => "center",
        }
    }
}

impl fmt::Display for DropPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overlap ratios separating the three drop positions.
///
/// A ratio strictly below `below` classifies as [`DropPosition::Below`], one
/// strictly above `above` as [`DropPosition::Above`]; everything in between
/// (bounds included) is [`DropPosition::Center`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Thresholds {
    /// Upper bound of the "below" band.
    pub below: f64,
    /// Lower bound of the "above" band.
    pub above: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl Thresholds {
    /// 0.30 / 0.70.
    pub const STANDARD: Self = Self {
        below: 0.30,
        above: 0.70,
    };

    /// 0.20 / 0.80, which widens the center band.
    pub const STRICT: Self = Self {
        below: 0.20,
        above: 0.80,
    };

    /// Both bounds lie in `[0, 1]` and `below < above`.
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.below)
            && (0.0..=1.0).contains(&self.above)
            && self.below < self.above
    }

    /// Classify an overlap ratio.
    pub fn classify(&self, ratio: f64) -> DropPosition {
        if ratio < self.below {
            DropPosition::Below
        } else if ratio > self.above {
            DropPosition::Above
        } else {
            DropPosition::Center
        }
    }
}

/// Fraction of `candidate`'s height covered by a probe `probe_height` tall
/// whose top edge is at `probe_top`.
///
/// A probe that starts below the candidate's bottom edge covers nothing (0);
/// one that ends above the candidate's bottom edge counts as full cover (1),
/// so pointers over the upper part of a row lean toward "above". A
/// zero-height candidate yields 0.
pub fn overlap_ratio(candidate: Rect, probe_top: f64, probe_height: f64) -> f64 {
    let probe_bottom = probe_top + probe_height;
    if probe_top > candidate.y1 {
        return 0.0;
    }
    if probe_bottom < candidate.y1 {
        return 1.0;
    }
    let height = candidate.y1 - candidate.y0;
    if height <= 0.0 {
        return 0.0;
    }
    let top = candidate.y0.max(probe_top);
    let bottom = candidate.y1.min(probe_bottom);
    (bottom - top) / height
}
