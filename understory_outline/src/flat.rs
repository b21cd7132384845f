// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat projection: one row per linked item, with expansion and per-row drag state.

use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};

use crate::{FlatId, ItemId, Outline};

bitflags::bitflags! {
    /// Structural facts about a row, computed on rebuild.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RowFlags: u8 {
        /// The item has children.
        const EXPANDABLE = 0b0000_0001;
        /// The drag predicate allowed this row to start a drag.
        const CAN_DRAG   = 0b0000_0010;
        /// First among its siblings.
        const FIRST      = 0b0000_0100;
        /// Last among its siblings.
        const LAST       = 0b0000_1000;
    }
}

/// One row of a [`FlatView`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlatNode {
    /// Row handle, stable for the lifetime of `item`.
    pub id: FlatId,
    /// The outline item this row shows.
    pub item: ItemId,
    /// Row of the parent item, `None` at level 0.
    pub parent: Option<FlatId>,
    /// Depth; roots are level 0.
    pub level: usize,
    /// Position among siblings.
    pub index: usize,
    /// Structural flags.
    pub flags: RowFlags,
}

impl FlatNode {
    /// Whether the row has children to expand.
    pub fn is_expandable(&self) -> bool {
        self.flags.contains(RowFlags::EXPANDABLE)
    }

    /// Whether a drag may start on this row.
    pub fn can_drag(&self) -> bool {
        self.flags.contains(RowFlags::CAN_DRAG)
    }

    /// Whether this is the first sibling.
    pub fn is_first(&self) -> bool {
        self.flags.contains(RowFlags::FIRST)
    }

    /// Whether this is the last sibling.
    pub fn is_last(&self) -> bool {
        self.flags.contains(RowFlags::LAST)
    }
}

/// A pre-order projection of an [`Outline`] into rows, plus expansion state.
///
/// Rows are kept for every linked item whether or not it is currently shown;
/// [`FlatView::visible`] skips the subtrees of collapsed rows. The projection
/// is rebuilt after every structural change with [`FlatView::rebuild`], which
/// reuses the [`FlatId`] of each surviving item so that expansion and the
/// transient hidden flag carry over.
///
/// Rows of one subtree are contiguous, so subtree queries are slices.
///
/// ## Example
///
/// ```rust
/// use understory_outline::{FlatView, Node, Outline};
///
/// let outline = Outline::from_nodes(
///     vec![Node::leaf("a").child(Node::leaf("a1")), Node::leaf("b")],
///     None,
/// );
/// let mut flat = FlatView::new();
/// flat.rebuild(&outline, |_, _| true);
/// assert_eq!(flat.visible().count(), 2);
///
/// let a = flat.flat_of(outline.roots()[0]).unwrap();
/// flat.expand(a);
/// assert_eq!(flat.visible().count(), 3);
/// ```
#[derive(Clone, Default)]
pub struct FlatView {
    rows: Vec<FlatNode>,
    position: HashMap<FlatId, usize>,
    flat_to_item: HashMap<FlatId, ItemId>,
    item_to_flat: HashMap<ItemId, FlatId>,
    expanded: HashSet<FlatId>,
    hidden: HashSet<FlatId>,
    next_id: u32,
}

impl fmt::Debug for FlatView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatView")
            .field("rows", &self.rows.len())
            .field("expanded", &self.expanded.len())
            .field("hidden", &self.hidden.len())
            .finish_non_exhaustive()
    }
}

impl FlatView {
    /// Create an empty projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-project `outline`, keeping row ids of surviving items.
    ///
    /// `can_drag` decides [`RowFlags::CAN_DRAG`] per item.
    pub fn rebuild<T>(
        &mut self,
        outline: &Outline<T>,
        mut can_drag: impl FnMut(ItemId, &T) -> bool,
    ) {
        let previous = core::mem::take(&mut self.item_to_flat);
        self.rows.clear();
        self.position.clear();
        self.flat_to_item.clear();

        let mut parents: Vec<FlatId> = Vec::new();
        for (item, level) in outline.depth_first() {
            let Some(value) = outline.get(item) else {
                continue;
            };
            let id = match previous.get(&item) {
                Some(&id) => id,
                None => self.allocate(),
            };
            parents.truncate(level);
            let siblings = outline.siblings(item);
            let index = siblings.iter().position(|&s| s == item).unwrap_or(0);

            let mut flags = RowFlags::empty();
            flags.set(RowFlags::EXPANDABLE, outline.has_children(item));
            flags.set(RowFlags::CAN_DRAG, can_drag(item, value));
            flags.set(RowFlags::FIRST, index == 0);
            flags.set(RowFlags::LAST, index + 1 == siblings.len());

            self.position.insert(id, self.rows.len());
            self.flat_to_item.insert(id, item);
            self.item_to_flat.insert(item, id);
            self.rows.push(FlatNode {
                id,
                item,
                parent: parents.last().copied(),
                level,
                index,
                flags,
            });
            parents.push(id);
        }

        let live = &self.flat_to_item;
        self.expanded.retain(|id| live.contains_key(id));
        self.hidden.retain(|id| live.contains_key(id));
    }

    /// Every row in pre-order, shown or not.
    pub fn rows(&self) -> &[FlatNode] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a row.
    pub fn get(&self, id: FlatId) -> Option<&FlatNode> {
        self.position.get(&id).and_then(|&i| self.rows.get(i))
    }

    /// The row showing `item`.
    pub fn flat_of(&self, item: ItemId) -> Option<FlatId> {
        self.item_to_flat.get(&item).copied()
    }

    /// The item shown by a row.
    pub fn item_of(&self, id: FlatId) -> Option<ItemId> {
        self.flat_to_item.get(&id).copied()
    }

    /// Row of the parent item.
    pub fn parent(&self, id: FlatId) -> Option<FlatId> {
        self.get(id).and_then(|row| row.parent)
    }

    /// The level-0 row above `id` (or `id` itself at level 0).
    pub fn root_of(&self, id: FlatId) -> Option<FlatId> {
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent.and_then(|p| self.get(p)) {
            current = parent;
        }
        Some(current.id)
    }

    /// The rows of `id`'s subtree, excluding `id`.
    pub fn subtree(&self, id: FlatId) -> &[FlatNode] {
        match self.position.get(&id) {
            Some(&pos) => &self.rows[pos + 1..self.subtree_end(pos)],
            None => &[],
        }
    }

    /// Direct child rows of `parent`, or the level-0 rows for `None`.
    pub fn children(&self, parent: Option<FlatId>) -> Vec<FlatId> {
        match parent {
            None => self
                .rows
                .iter()
                .filter(|row| row.level == 0)
                .map(|row| row.id)
                .collect(),
            Some(p) => self
                .subtree(p)
                .iter()
                .filter(|row| row.parent == Some(p))
                .map(|row| row.id)
                .collect(),
        }
    }

    /// Whether `id` is expanded.
    pub fn is_expanded(&self, id: FlatId) -> bool {
        self.expanded.contains(&id)
    }

    /// Expand a row. Returns false if it already was expanded or is unknown.
    pub fn expand(&mut self, id: FlatId) -> bool {
        self.position.contains_key(&id) && self.expanded.insert(id)
    }

    /// Collapse a row. Returns false if it was not expanded.
    pub fn collapse(&mut self, id: FlatId) -> bool {
        self.expanded.remove(&id)
    }

    /// Flip a row's expansion, returning the new state.
    pub fn toggle(&mut self, id: FlatId) -> bool {
        if self.collapse(id) {
            false
        } else {
            self.expand(id)
        }
    }

    /// Expand every expandable row.
    pub fn expand_all(&mut self) {
        let expandable = self.rows.iter().filter(|row| row.is_expandable());
        self.expanded.extend(expandable.map(|row| row.id));
    }

    /// Collapse every row.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Expand every expandable row above `depth`, so rows down to level
    /// `depth` are shown.
    pub fn expand_to_level(&mut self, depth: usize) {
        let rows = self
            .rows
            .iter()
            .filter(|row| row.level < depth && row.is_expandable());
        self.expanded.extend(rows.map(|row| row.id));
    }

    /// Expand every ancestor of `id` so that it is shown.
    pub fn reveal(&mut self, id: FlatId) {
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            self.expanded.insert(parent);
            cursor = self.parent(parent);
        }
    }

    /// Whether every ancestor of `id` is expanded.
    pub fn is_visible(&self, id: FlatId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            if !self.is_expanded(parent) {
                return false;
            }
            cursor = self.parent(parent);
        }
        true
    }

    /// Shown rows in display order.
    pub fn visible(&self) -> VisibleRows<'_> {
        VisibleRows {
            view: self,
            next: 0,
            end: self.rows.len(),
        }
    }

    /// Shown rows strictly inside `id`'s subtree. Empty when `id` is collapsed.
    pub fn visible_descendants(&self, id: FlatId) -> VisibleRows<'_> {
        match self.position.get(&id) {
            Some(&pos) if self.is_expanded(id) => VisibleRows {
                view: self,
                next: pos + 1,
                end: self.subtree_end(pos),
            },
            _ => VisibleRows {
                view: self,
                next: 0,
                end: 0,
            },
        }
    }

    /// Mark a row as excluded from drop targeting, or clear the mark.
    pub fn set_hidden(&mut self, id: FlatId, hidden: bool) {
        if hidden {
            if self.position.contains_key(&id) {
                self.hidden.insert(id);
            }
        } else {
            self.hidden.remove(&id);
        }
    }

    /// Whether a row is excluded from drop targeting.
    pub fn is_hidden(&self, id: FlatId) -> bool {
        self.hidden.contains(&id)
    }

    /// Clear every hidden mark.
    pub fn clear_hidden(&mut self) {
        self.hidden.clear();
    }

    fn allocate(&mut self) -> FlatId {
        let id = FlatId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn subtree_end(&self, pos: usize) -> usize {
        let level = self.rows[pos].level;
        let mut end = pos + 1;
        while end < self.rows.len() && self.rows[end].level > level {
            end += 1;
        }
        end
    }
}

/// Iterator over shown rows. See [`FlatView::visible`].
#[derive(Clone)]
pub struct VisibleRows<'a> {
    view: &'a FlatView,
    next: usize,
    end: usize,
}

impl fmt::Debug for VisibleRows<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibleRows")
            .field("next", &self.next)
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

impl<'a> Iterator for VisibleRows<'a> {
    type Item = &'a FlatNode;

    fn next(&mut self) -> Option<&'a FlatNode> {
        if self.next >= self.end {
            return None;
        }
        let row = self.view.rows.get(self.next)?;
        self.next = if row.is_expandable() && !self.view.is_expanded(row.id) {
            self.view.subtree_end(self.next)
        } else {
            self.next + 1
        };
        Some(row)
    }
}
