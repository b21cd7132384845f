// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by outline mutation and validation.

use core::fmt;

use crate::ItemId;

/// Why a mutation of an [`Outline`](crate::Outline) was refused.
///
/// A refused mutation leaves the outline untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OutlineError {
    /// The handle does not refer to a live item.
    Stale(ItemId),
    /// The anchor of a sibling insertion is not linked into the tree.
    Detached(ItemId),
    /// An item was asked to move relative to itself.
    SameItem(ItemId),
    /// Linking `item` under `parent` would make `item` its own ancestor.
    WouldCycle {
        /// The item being moved.
        item: ItemId,
        /// The parent it would land under.
        parent: ItemId,
    },
}

impl fmt::Display for OutlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stale(id) => write!(f, "item {id:?} is not live"),
            Self::Detached(id) => write!(f, "item {id:?} is not linked into the outline"),
            Self::SameItem(id) => write!(f, "item {id:?} cannot be placed relative to itself"),
            Self::WouldCycle { item, parent } => write!(
                f,
                "moving {item:?} under {parent:?} would make it its own ancestor"
            ),
        }
    }
}

impl core::error::Error for OutlineError {}

/// A broken structural invariant found by
/// [`Outline::check_integrity`](crate::Outline::check_integrity).
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct IntegrityError {
    /// The item where the inconsistency was observed.
    pub item: ItemId,
    /// Which invariant failed.
    pub kind: IntegrityErrorKind,
}

/// The invariant an [`IntegrityError`] refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntegrityErrorKind {
    /// A child list names an item whose parent link points elsewhere.
    ParentMismatch,
    /// A linked item does not appear in its parent's child list (or the roots).
    MissingFromSiblings,
    /// An item appears more than once among its siblings.
    Duplicated,
    /// A sibling list names a stale handle.
    DanglingChild,
    /// Walking the parent links from this item returns to it.
    Cycle,
}

impl fmt::Debug for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntegrityError {{ item: {:?}, kind: {:?} }}", self.item, self.kind)
    }
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            IntegrityErrorKind::ParentMismatch => "is listed under a parent it does not point to",
            IntegrityErrorKind::MissingFromSiblings => "is missing from its sibling list",
            IntegrityErrorKind::Duplicated => "appears more than once among its siblings",
            IntegrityErrorKind::DanglingChild => "is a stale handle inside a sibling list",
            IntegrityErrorKind::Cycle => "is its own ancestor",
        };
        write!(f, "item {:?} {what}", self.item)
    }
}

impl core::error::Error for IntegrityError {}
