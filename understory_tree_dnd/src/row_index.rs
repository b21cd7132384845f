// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertical ordering of rendered rows for pointer hit testing.

use alloc::vec::Vec;

use kurbo::Rect;
use understory_outline::{FlatId, FlatView, ItemId};

use crate::geometry::RowGeometry;

/// A measured row.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RowEntry {
    /// Screen bounds at measurement time.
    pub bounds: Rect,
    /// The row.
    pub row: FlatId,
    /// The outline item shown by the row.
    pub item: ItemId,
    /// Depth of the row; roots are level 0.
    pub level: usize,
}

/// Rows sorted ascending by the top edge of their bounds.
///
/// Built from the visible, non-hidden rows of a [`FlatView`]. Lookups are
/// binary searches, so the index stays cheap to query on every pointer move;
/// it only needs rebuilding when geometry changes (expansion, scrolling).
#[derive(Clone, Debug, Default)]
pub struct RowIndex {
    entries: Vec<RowEntry>,
}

impl RowIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure the visible, non-hidden rows of `flat` and index them.
    pub fn build(flat: &FlatView, geometry: &impl RowGeometry) -> Self {
        let mut index = Self::new();
        index.rebuild(flat, geometry);
        index
    }

    /// Discard the current entries and re-measure.
    ///
    /// Rows that are hidden, or for which `geometry` has no bounds, are left out.
    pub fn rebuild(&mut self, flat: &FlatView, geometry: &impl RowGeometry) {
        self.entries.clear();
        for row in flat.visible() {
            if flat.is_hidden(row.id) {
                continue;
            }
            let Some(bounds) = geometry.row_bounds(row.id) else {
                continue;
            };
            self.insert_sorted(RowEntry {
                bounds,
                row: row.id,
                item: row.item,
                level: row.level,
            });
        }
    }

    /// Insert keeping ascending order; ties go before existing equal keys.
    pub fn insert_sorted(&mut self, entry: RowEntry) {
        let at = self.lower_bound(entry.bounds.y0);
        self.entries.insert(at, entry);
    }

    /// First position whose top edge is `>= y`.
    pub fn lower_bound(&self, y: f64) -> usize {
        self.entries.partition_point(|e| e.bounds.y0 < y)
    }

    /// The entry whose reference point is closest to `y`.
    ///
    /// A row's reference point is its top edge plus `offset` (half the height
    /// of the dragged row, so the comparison is between centers). On equal
    /// distance the upper row wins. Returns `None` for an empty index.
    pub fn nearest(&self, y: f64, offset: f64) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let key = |i: usize| self.entries[i].bounds.y0 + offset;
        let at = self.entries.partition_point(|e| e.bounds.y0 + offset < y);
        if at == 0 {
            return Some(0);
        }
        if at == self.entries.len() {
            return Some(at - 1);
        }
        if distance(key(at - 1), y) <= distance(key(at), y) {
            Some(at - 1)
        } else {
            Some(at)
        }
    }

    /// Entry at a position.
    pub fn get(&self, i: usize) -> Option<&RowEntry> {
        self.entries.get(i)
    }

    /// Position of a row in the index.
    pub fn position_of(&self, row: FlatId) -> Option<usize> {
        self.entries.iter().position(|e| e.row == row)
    }

    /// Nearest entry at `level`, scanning upward from `from` (inclusive).
    pub fn find_up(&self, from: usize, level: usize) -> Option<&RowEntry> {
        let end = (from + 1).min(self.entries.len());
        self.entries[..end].iter().rev().find(|e| e.level == level)
    }

    /// Nearest entry at `level`, scanning downward from `from` (inclusive).
    pub fn find_down(&self, from: usize, level: usize) -> Option<&RowEntry> {
        self.entries.get(from..)?.iter().find(|e| e.level == level)
    }

    /// All entries in order.
    pub fn entries(&self) -> &[RowEntry] {
        &self.entries
    }

    /// Number of indexed rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no rows are indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn distance(a: f64, b: f64) -> f64 {
    if a > b { a - b } else { b - a }
}
