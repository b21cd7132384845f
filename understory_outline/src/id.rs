// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handle types for outline items and their flat rows.

/// Identifier for an item in an [`Outline`](crate::Outline) (generational).
///
/// The first field is the slot index, the second the slot generation. A slot
/// is reused after its item is removed, with a bumped generation, so a stale
/// `ItemId` never aliases the item that later occupies the same slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ItemId(pub(crate) u32, pub(crate) u32);

impl ItemId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for a row of a [`FlatView`](crate::FlatView).
///
/// Flat ids are handed out monotonically and are kept for an item across
/// [`FlatView::rebuild`](crate::FlatView::rebuild) calls for as long as the
/// item stays alive, so per-row state keyed by `FlatId` survives structural
/// edits elsewhere in the tree.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FlatId(pub(crate) u32);

impl FlatId {
    /// Raw row number, in allocation order.
    pub const fn get(self) -> u32 {
        self.0
    }
}
