// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_selection --heading-base-level=0

//! Understory Selection: checklist selection bookkeeping.
//!
//! [`Selection`] tracks which keys are checked. It does not know how the keys
//! relate to each other; a tree view decides which batch of keys a click
//! checks or unchecks (an item and its descendants, say) and hands the batch
//! to [`Selection::add_all`] or [`Selection::remove_all`].
//!
//! Besides the checked keys it keeps:
//! - An optional **primary** key, the most recently checked one.
//! - A **revision** counter that bumps only when the contents or the primary
//!   change, so callers can tell whether a batch did anything.
//!
//! Keys live in a `Vec<K>` with uniqueness enforced by equality, so
//! generational handles work without `Hash` or `Ord`.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_selection::Selection;
//!
//! let mut checked = Selection::<u32>::new();
//!
//! // Check a folder and everything inside it.
//! checked.add_all([1, 2, 3]);
//! assert_eq!(checked.items(), &[1, 2, 3]);
//! assert_eq!(checked.primary(), Some(&3));
//!
//! // Unchecking a subtree that is already unchecked changes nothing.
//! let revision = checked.revision();
//! checked.remove_all(&[7, 8]);
//! assert_eq!(checked.revision(), revision);
//!
//! checked.toggle(2);
//! assert!(!checked.contains(&2));
//! assert!(checked.contains_all(&[1, 3]));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

/// A set of checked keys plus a primary key and a revision counter.
#[derive(Clone, Debug, Default)]
pub struct Selection<T> {
    items: Vec<T>,
    primary: Option<usize>,
    revision: u64,
}

impl<T> Selection<T> {
    /// Creates an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            primary: None,
            revision: 0,
        }
    }

    /// Returns `true` if nothing is checked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of checked keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checked keys in the order they were checked.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Iterate over the checked keys.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The most recently checked key that is still checked.
    #[must_use]
    pub fn primary(&self) -> Option<&T> {
        self.primary.map(|idx| &self.items[idx])
    }

    /// Change counter; unchanged by no-op calls.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Uncheck everything.
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();
        self.primary = None;
        self.bump_revision();
    }

    /// Uncheck every key `pred` returns `true` for, returning how many went.
    ///
    /// The primary survives unless it was removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        let primary = self.primary;
        let mut seen = 0;
        let mut kept = 0;
        let mut new_primary = None;
        self.items.retain(|key| {
            let keep = !pred(key);
            if keep {
                if primary == Some(seen) {
                    new_primary = Some(kept);
                }
                kept += 1;
            }
            seen += 1;
            keep
        });
        let removed = before - self.items.len();
        if removed > 0 {
            self.primary = new_primary;
            self.bump_revision();
        }
        removed
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl<T> Selection<T>
where
    T: PartialEq,
{
    /// Returns `true` if `key` is checked.
    #[must_use]
    pub fn contains(&self, key: &T) -> bool {
        self.position_of(key).is_some()
    }

    /// Returns `true` if every key in `keys` is checked. Vacuously true for
    /// an empty batch.
    #[must_use]
    pub fn contains_all<'a>(&self, keys: impl IntoIterator<Item = &'a T>) -> bool
    where
        T: 'a,
    {
        keys.into_iter().all(|key| self.contains(key))
    }

    /// Returns `true` if at least one key in `keys` is checked.
    #[must_use]
    pub fn contains_any<'a>(&self, keys: impl IntoIterator<Item = &'a T>) -> bool
    where
        T: 'a,
    {
        keys.into_iter().any(|key| self.contains(key))
    }

    /// Check `key`. A newly checked key becomes the primary.
    pub fn add(&mut self, key: T) {
        if self.position_of(&key).is_none() {
            self.items.push(key);
            self.primary = Some(self.items.len() - 1);
            self.bump_revision();
        }
    }

    /// Check every key in `keys`; duplicates and already checked keys are
    /// skipped. The last newly checked key becomes the primary.
    pub fn add_all(&mut self, keys: impl IntoIterator<Item = T>) {
        let mut last_added = None;
        for key in keys {
            if self.position_of(&key).is_none() {
                self.items.push(key);
                last_added = Some(self.items.len() - 1);
            }
        }
        if let Some(idx) = last_added {
            self.primary = Some(idx);
            self.bump_revision();
        }
    }

    /// Uncheck `key`.
    pub fn remove(&mut self, key: &T) {
        self.remove_where(|k| k == key);
    }

    /// Uncheck every key in `keys`, returning how many were checked.
    pub fn remove_all<'a>(&mut self, keys: impl IntoIterator<Item = &'a T>) -> usize
    where
        T: 'a,
    {
        let keys: Vec<&T> = keys.into_iter().collect();
        self.remove_where(|k| keys.contains(&k))
    }

    /// Flip `key`.
    pub fn toggle(&mut self, key: T) {
        if self.contains(&key) {
            self.remove(&key);
        } else {
            self.add(key);
        }
    }

    fn position_of(&self, key: &T) -> Option<usize> {
        self.items.iter().position(|k| k == key)
    }
}
