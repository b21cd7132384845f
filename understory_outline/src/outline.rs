// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The outline arena: structure, ordered mutation, and queries.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{IntegrityError, IntegrityErrorKind, OutlineError};
use crate::sort::{SortBy, map_by_identity};
use crate::ItemId;

/// An ordered, parented tree of payloads stored in a generational arena.
///
/// Every item is addressed by an [`ItemId`]. An item is either *linked*
/// (listed among the roots or among some item's children) or *detached*
/// (created but not yet placed, or taken out with [`Outline::detach`]).
/// Detaching an item keeps its own subtree intact, so a subtree can be moved
/// as a unit.
///
/// Structural invariants, kept by every mutation:
///
/// - a linked item with parent `p` appears exactly once in `p`'s children, and
///   a linked item without a parent appears exactly once among the roots;
/// - every id in a child list or in the roots is live and points back to the
///   list's owner;
/// - no item is its own ancestor. Moves that would break this are refused
///   with [`OutlineError::WouldCycle`].
///
/// When a sort function is installed, every insertion re-sorts the sibling
/// list that received the item and reports the item's post-sort index.
///
/// ## Example
///
/// ```rust
/// use understory_outline::Outline;
///
/// let mut outline = Outline::with_sort(|siblings: &mut [&u32], _parent| siblings.sort());
/// let a = outline.create(3);
/// let b = outline.create(1);
/// assert_eq!(outline.insert_into(None, a), Ok(0));
/// assert_eq!(outline.insert_into(None, b), Ok(0));
/// assert_eq!(outline.roots(), &[b, a]);
///
/// let child = outline.create(7);
/// outline.insert_into(Some(a), child).unwrap();
/// assert_eq!(outline.parent(child), Some(a));
/// assert!(outline.insert_into(Some(child), a).is_err());
/// ```
pub struct Outline<T> {
    /// slots
    slots: Vec<Option<Slot<T>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    roots: Vec<ItemId>,
    sort_by: Option<Box<SortBy<T>>>,
}

struct Slot<T> {
    generation: u32,
    value: T,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
    linked: bool,
}

impl<T> Slot<T> {
    fn new(generation: u32, value: T) -> Self {
        Self {
            generation,
            value,
            parent: None,
            children: Vec::new(),
            linked: false,
        }
    }
}

impl<T> fmt::Debug for Outline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outline")
            .field("len", &self.len())
            .field("roots", &self.roots)
            .field("free_list", &self.free_list.len())
            .field("sorted", &self.sort_by.is_some())
            .finish_non_exhaustive()
    }
}

impl<T> Default for Outline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Outline<T> {
    /// Create an empty outline that keeps insertion order.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            roots: Vec::new(),
            sort_by: None,
        }
    }

    /// Create an empty outline that orders siblings with `sort`.
    pub fn with_sort(sort: impl Fn(&mut [&T], Option<&T>) + 'static) -> Self {
        let mut outline = Self::new();
        outline.sort_by = Some(Box::new(sort));
        outline
    }

    /// Install or clear the sibling sort function.
    ///
    /// Existing sibling lists are not reordered; call [`Outline::resort`].
    pub fn set_sort_by(&mut self, sort: Option<Box<SortBy<T>>>) {
        self.sort_by = sort;
    }

    /// Whether a sibling sort function is installed.
    pub fn is_sorted(&self) -> bool {
        self.sort_by.is_some()
    }

    /// Number of live items, linked or detached.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Returns `true` if the outline holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `id` refers to a live item.
    pub fn is_alive(&self, id: ItemId) -> bool {
        self.slot(id).is_some()
    }

    /// Returns true if `id` is live and listed in a sibling list.
    pub fn is_linked(&self, id: ItemId) -> bool {
        self.slot(id).is_some_and(|s| s.linked)
    }

    /// The payload of a live item.
    pub fn get(&self, id: ItemId) -> Option<&T> {
        self.slot(id).map(|s| &s.value)
    }

    /// Mutable access to the payload of a live item.
    ///
    /// Changing the payload does not re-sort its siblings.
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut T> {
        self.slot_mut(id).map(|s| &mut s.value)
    }

    /// Swap in a new payload for `id`, returning the old one.
    pub fn replace(&mut self, id: ItemId, value: T) -> Result<T, OutlineError> {
        let slot = self.slot_mut(id).ok_or(OutlineError::Stale(id))?;
        Ok(core::mem::replace(&mut slot.value, value))
    }

    /// The parent of a live item, or `None` for roots, detached items and stale ids.
    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.slot(id).and_then(|s| s.parent)
    }

    /// The ordered children of an item, or an empty slice for stale ids.
    pub fn children(&self, id: ItemId) -> &[ItemId] {
        self.slot(id).map_or(&[], |s| &s.children)
    }

    /// Returns true if the item has at least one child.
    pub fn has_children(&self, id: ItemId) -> bool {
        !self.children(id).is_empty()
    }

    /// The ordered root sequence.
    pub fn roots(&self) -> &[ItemId] {
        &self.roots
    }

    /// The sibling list containing `id` (including `id` itself).
    ///
    /// Empty for detached or stale items.
    pub fn siblings(&self, id: ItemId) -> &[ItemId] {
        match self.slot(id) {
            Some(slot) if slot.linked => self.sibling_list(slot.parent),
            _ => &[],
        }
    }

    /// Position of `id` among its siblings.
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.siblings(id).iter().position(|&s| s == id)
    }

    /// Number of ancestors of `id`; roots are at depth 0.
    pub fn depth(&self, id: ItemId) -> Option<usize> {
        self.slot(id)?;
        Some(self.ancestors(id).count())
    }

    /// Walk the parent chain of `id`, nearest ancestor first.
    pub fn ancestors(&self, id: ItemId) -> Ancestors<'_, T> {
        Ancestors {
            outline: self,
            next: self.parent(id),
            remaining: self.len(),
        }
    }

    /// The topmost ancestor of `id`, or `id` itself when it has no parent.
    pub fn root_of(&self, id: ItemId) -> Option<ItemId> {
        self.slot(id)?;
        Some(self.ancestors(id).last().unwrap_or(id))
    }

    /// Returns true if `ancestor` appears anywhere on the parent chain of `id`.
    ///
    /// An item is not its own ancestor.
    pub fn is_ancestor_of(&self, ancestor: ItemId, id: ItemId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// All descendants of `id` in pre-order, excluding `id`.
    pub fn descendants(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut stack: Vec<ItemId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Pre-order walk over every linked item reachable from the roots,
    /// yielding each item with its depth.
    pub fn depth_first(&self) -> DepthFirst<'_, T> {
        DepthFirst {
            outline: self,
            stack: self.roots.iter().rev().map(|&id| (id, 0)).collect(),
        }
    }

    /// Allocate a detached item holding `value`.
    ///
    /// Place it with one of the insertion methods.
    pub fn create(&mut self, value: T) -> ItemId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Slot::new(generation, value));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Slot::new(generation, value)));
            self.generations.push(generation);
            (self.slots.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ItemId indices are 32-bit; the arena never grows past u32::MAX slots."
        )]
        ItemId::new(idx as u32, generation)
    }

    /// Move `item` so it sits immediately before `target` among `target`'s siblings.
    ///
    /// Returns the index where `item` ended up after re-sorting.
    pub fn insert_above(&mut self, target: ItemId, item: ItemId) -> Result<usize, OutlineError> {
        self.insert_beside(target, item, false)
    }

    /// Move `item` so it sits immediately after `target` among `target`'s siblings.
    ///
    /// Returns the index where `item` ended up after re-sorting.
    pub fn insert_below(&mut self, target: ItemId, item: ItemId) -> Result<usize, OutlineError> {
        self.insert_beside(target, item, true)
    }

    /// Append `item` to the children of `parent`, or to the roots for `None`.
    ///
    /// Returns the index where `item` ended up after re-sorting.
    pub fn insert_into(
        &mut self,
        parent: Option<ItemId>,
        item: ItemId,
    ) -> Result<usize, OutlineError> {
        self.ensure_live(item)?;
        if let Some(p) = parent {
            self.ensure_live(p)?;
            self.ensure_acyclic(item, p)?;
        }
        self.detach(item);
        self.link_last(parent, item);
        Ok(self.resort_siblings(parent, item))
    }

    /// Unlink `item` from its sibling list, keeping its subtree intact.
    ///
    /// Returns false if the item was not linked (or is stale).
    pub fn detach(&mut self, item: ItemId) -> bool {
        let parent = match self.slot(item) {
            Some(slot) if slot.linked => slot.parent,
            _ => return false,
        };
        if let Some(list) = self.sibling_list_mut(parent) {
            list.retain(|&c| c != item);
        }
        if let Some(slot) = self.slot_mut(item) {
            slot.parent = None;
            slot.linked = false;
        }
        true
    }

    /// Detach `item` and free it together with its whole subtree.
    ///
    /// Returns the payload of `item`; descendant payloads are dropped.
    pub fn remove(&mut self, item: ItemId) -> Option<T> {
        self.slot(item)?;
        self.detach(item);
        for doomed in self.descendants(item) {
            self.free(doomed);
        }
        self.free(item)
    }

    /// Re-apply the sort function to the children of `target` and, recursively,
    /// to all their descendants. `None` sorts the whole outline.
    pub fn resort(&mut self, target: Option<ItemId>) {
        if self.sort_by.is_none() {
            return;
        }
        let mut pending = vec![target];
        while let Some(parent) = pending.pop() {
            self.apply_sort(parent);
            pending.extend(self.sibling_list(parent).iter().map(|&c| Some(c)));
        }
    }

    /// Free every item. The sort function is kept.
    pub fn clear(&mut self) {
        for idx in 0..self.slots.len() {
            if self.slots[idx].take().is_some() {
                self.free_list.push(idx);
            }
        }
        self.roots.clear();
    }

    /// Verify the structural invariants listed on [`Outline`].
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        let fail = |item, kind| Err(IntegrityError { item, kind });
        for &root in &self.roots {
            match self.slot(root) {
                None => return fail(root, IntegrityErrorKind::DanglingChild),
                Some(slot) if slot.parent.is_some() || !slot.linked => {
                    return fail(root, IntegrityErrorKind::ParentMismatch);
                }
                Some(_) => {}
            }
        }
        for (id, slot) in self.live_slots() {
            if slot.linked {
                if slot.parent.is_some_and(|p| !self.is_alive(p)) {
                    return fail(id, IntegrityErrorKind::ParentMismatch);
                }
                match self.sibling_list(slot.parent).iter().filter(|&&s| s == id).count() {
                    0 => return fail(id, IntegrityErrorKind::MissingFromSiblings),
                    1 => {}
                    _ => return fail(id, IntegrityErrorKind::Duplicated),
                }
            } else if slot.parent.is_some() || self.roots.contains(&id) {
                return fail(id, IntegrityErrorKind::ParentMismatch);
            }
            for &child in &slot.children {
                let Some(child_slot) = self.slot(child) else {
                    return fail(child, IntegrityErrorKind::DanglingChild);
                };
                if child_slot.parent != Some(id) || !child_slot.linked {
                    return fail(child, IntegrityErrorKind::ParentMismatch);
                }
            }
            let mut cursor = slot.parent;
            let mut steps = 0;
            while let Some(p) = cursor {
                steps += 1;
                if p == id || steps > self.len() {
                    return fail(id, IntegrityErrorKind::Cycle);
                }
                cursor = self.parent(p);
            }
        }
        Ok(())
    }

    /// Append without sorting; used by bulk loaders that sort once afterwards.
    pub(crate) fn link_last(&mut self, parent: Option<ItemId>, item: ItemId) {
        if let Some(list) = self.sibling_list_mut(parent) {
            list.push(item);
        } else {
            return;
        }
        if let Some(slot) = self.slot_mut(item) {
            slot.parent = parent;
            slot.linked = true;
        }
    }

    /// Move the payload out of a detached item's slot, freeing it.
    pub(crate) fn take_value(&mut self, item: ItemId) -> Option<(T, Vec<ItemId>)> {
        self.slot(item)?;
        let slot = self.slots.get_mut(item.idx())?.take()?;
        self.free_list.push(item.idx());
        Some((slot.value, slot.children))
    }

    // --- internals ---

    fn slot(&self, id: ItemId) -> Option<&Slot<T>> {
        self.slots
            .get(id.idx())
            .and_then(|s| s.as_ref())
            .filter(|s| s.generation == id.1)
    }

    fn slot_mut(&mut self, id: ItemId) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(id.idx())
            .and_then(|s| s.as_mut())
            .filter(|s| s.generation == id.1)
    }

    fn live_slots(&self) -> impl Iterator<Item = (ItemId, &Slot<T>)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            let slot = slot.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ItemId indices are 32-bit; the arena never grows past u32::MAX slots."
            )]
            Some((ItemId::new(idx as u32, slot.generation), slot))
        })
    }

    fn free(&mut self, id: ItemId) -> Option<T> {
        self.slot(id)?;
        let slot = self.slots.get_mut(id.idx())?.take()?;
        self.free_list.push(id.idx());
        Some(slot.value)
    }

    fn ensure_live(&self, id: ItemId) -> Result<(), OutlineError> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(OutlineError::Stale(id))
        }
    }

    fn ensure_acyclic(&self, item: ItemId, parent: ItemId) -> Result<(), OutlineError> {
        if parent == item || self.is_ancestor_of(item, parent) {
            Err(OutlineError::WouldCycle { item, parent })
        } else {
            Ok(())
        }
    }

    fn insert_beside(
        &mut self,
        target: ItemId,
        item: ItemId,
        after: bool,
    ) -> Result<usize, OutlineError> {
        self.ensure_live(target)?;
        self.ensure_live(item)?;
        if target == item {
            return Err(OutlineError::SameItem(item));
        }
        if !self.is_linked(target) {
            return Err(OutlineError::Detached(target));
        }
        let parent = self.parent(target);
        if let Some(p) = parent {
            self.ensure_acyclic(item, p)?;
        }
        self.detach(item);
        let Some(list) = self.sibling_list_mut(parent) else {
            return Err(OutlineError::Detached(target));
        };
        let at = list.iter().position(|&s| s == target).unwrap_or(list.len());
        let at = if after { (at + 1).min(list.len()) } else { at };
        list.insert(at, item);
        if let Some(slot) = self.slot_mut(item) {
            slot.parent = parent;
            slot.linked = true;
        }
        Ok(self.resort_siblings(parent, item))
    }

    fn sibling_list(&self, parent: Option<ItemId>) -> &[ItemId] {
        match parent {
            None => &self.roots,
            Some(p) => self.children(p),
        }
    }

    fn sibling_list_mut(&mut self, parent: Option<ItemId>) -> Option<&mut Vec<ItemId>> {
        match parent {
            None => Some(&mut self.roots),
            Some(p) => self.slot_mut(p).map(|s| &mut s.children),
        }
    }

    fn resort_siblings(&mut self, parent: Option<ItemId>, item: ItemId) -> usize {
        self.apply_sort(parent);
        self.sibling_list(parent)
            .iter()
            .position(|&s| s == item)
            .unwrap_or(0)
    }

    fn apply_sort(&mut self, parent: Option<ItemId>) {
        let Some(order) = self.sorted_siblings(parent) else {
            return;
        };
        if let Some(list) = self.sibling_list_mut(parent) {
            *list = order;
        }
    }

    fn sorted_siblings(&self, parent: Option<ItemId>) -> Option<Vec<ItemId>> {
        let sort = self.sort_by.as_deref()?;
        let ids = self.sibling_list(parent);
        if ids.len() < 2 {
            return None;
        }
        let values: Vec<&T> = ids.iter().filter_map(|&id| self.get(id)).collect();
        if values.len() != ids.len() {
            return None;
        }
        let mut sorted = values.clone();
        sort(&mut sorted, parent.and_then(|p| self.get(p)));
        Some(map_by_identity(ids, &values, &sorted))
    }
}

/// Iterator over the parent chain of an item. See [`Outline::ancestors`].
pub struct Ancestors<'a, T> {
    outline: &'a Outline<T>,
    next: Option<ItemId>,
    remaining: usize,
}

impl<T> fmt::Debug for Ancestors<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ancestors")
            .field("next", &self.next)
            .finish_non_exhaustive()
    }
}

impl<T> Iterator for Ancestors<'_, T> {
    type Item = ItemId;

    fn next(&mut self) -> Option<ItemId> {
        let current = self.next?;
        // Bounded by the item count so a corrupted chain cannot loop forever.
        self.remaining = self.remaining.checked_sub(1)?;
        self.next = self.outline.parent(current);
        Some(current)
    }
}

/// Pre-order walk with depths. See [`Outline::depth_first`].
pub struct DepthFirst<'a, T> {
    outline: &'a Outline<T>,
    stack: Vec<(ItemId, usize)>,
}

impl<T> fmt::Debug for DepthFirst<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepthFirst")
            .field("pending", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl<T> Iterator for DepthFirst<'_, T> {
    type Item = (ItemId, usize);

    fn next(&mut self) -> Option<(ItemId, usize)> {
        let (id, depth) = self.stack.pop()?;
        self.stack.extend(
            self.outline
                .children(id)
                .iter()
                .rev()
                .map(|&c| (c, depth + 1)),
        );
        Some((id, depth))
    }
}
