// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notifications.

use alloc::vec::Vec;
use core::fmt;

use understory_outline::ItemId;

/// Where a programmatic insert placed the new item.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InsertPosition {
    /// Immediately before the anchor.
    Above,
    /// Immediately after the anchor.
    Below,
    /// As the last child of the anchor, or as a root.
    Into,
}

impl InsertPosition {
    /// Lowercase name: `"above"`, `"below"` or `"into"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::Into => "into",
        }
    }
}

/// The kind of a [`TreeChange`], used to key change handlers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// The tree was (re)loaded.
    Init,
    /// A new item was inserted.
    Insert,
    /// An item and its subtree were removed.
    Remove,
    /// An item's payload was replaced.
    Update,
    /// A drag moved an item.
    Reorder,
    /// Sibling order was re-applied on request.
    ManualReorder,
    /// The set of checked items changed.
    Selection,
}

impl ChangeKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Init,
        Self::Insert,
        Self::Remove,
        Self::Update,
        Self::Reorder,
        Self::ManualReorder,
        Self::Selection,
    ];

    /// Name used by hosts that dispatch on strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Insert => "insert",
            Self::Remove => "remove",
            Self::Update => "update",
            Self::Reorder => "reorder",
            Self::ManualReorder => "manualReorder",
            Self::Selection => "selection",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural, payload or selection change made through a
/// [`TreeView`](crate::TreeView).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeChange {
    /// The tree was loaded from new data.
    Init,
    /// `node` was created and placed.
    Insert {
        /// How it was placed relative to `parent`.
        position: InsertPosition,
        /// The anchor of the insert: the target row for
        /// [`InsertPosition::Above`] and [`InsertPosition::Below`], the new
        /// parent for [`InsertPosition::Into`] (`None` for a root).
        parent: Option<ItemId>,
        /// The new item.
        node: ItemId,
        /// Its index among its siblings after sorting.
        index: usize,
    },
    /// `target` and its subtree were freed. The handle is stale by the time
    /// handlers see it.
    Remove {
        /// The removed item.
        target: ItemId,
        /// Its parent before removal.
        parent: Option<ItemId>,
    },
    /// The payload of `node` was replaced.
    Update {
        /// The updated item.
        node: ItemId,
    },
    /// A drop moved `node`.
    Reorder {
        /// Parent before the move.
        from_parent: Option<ItemId>,
        /// Parent after the move.
        to_parent: Option<ItemId>,
        /// The moved item.
        node: ItemId,
        /// Its index among its new siblings after sorting.
        index: usize,
    },
    /// Siblings under `node` (or the whole tree for `None`) were re-sorted.
    ManualReorder {
        /// Root of the re-sorted subtree.
        node: Option<ItemId>,
    },
    /// Items were checked or unchecked.
    Selection {
        /// The item the user checked or unchecked, or `None` when a
        /// structural change re-settled the parents.
        node: Option<ItemId>,
        /// Every checked item afterwards, in the order they were checked.
        selected: Vec<ItemId>,
    },
}

impl TreeChange {
    /// The kind handlers are keyed by.
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Init => ChangeKind::Init,
            Self::Insert { .. } => ChangeKind::Insert,
            Self::Remove { .. } => ChangeKind::Remove,
            Self::Update { .. } => ChangeKind::Update,
            Self::Reorder { .. } => ChangeKind::Reorder,
            Self::ManualReorder { .. } => ChangeKind::ManualReorder,
            Self::Selection { .. } => ChangeKind::Selection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_distinct() {
        for (i, a) in ChangeKind::ALL.iter().enumerate() {
            for b in &ChangeKind::ALL[i + 1..] {
                assert_ne!(a.as_str(), b.as_str(), "{a:?} and {b:?} share a name");
            }
        }
    }

    #[test]
    fn change_reports_its_kind() {
        assert_eq!(TreeChange::Init.kind(), ChangeKind::Init);
        assert_eq!(
            TreeChange::ManualReorder { node: None }.kind(),
            ChangeKind::ManualReorder
        );
        let selection = TreeChange::Selection {
            node: None,
            selected: Vec::new(),
        };
        assert_eq!(selection.kind(), ChangeKind::Selection);
        assert_eq!(selection.kind().as_str(), "selection");
    }
}
