// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `understory_selection` crate.
//!
//! These exercise how batches of checked keys interact with the primary key
//! and the revision counter.

use understory_selection::Selection;

#[test]
fn empty_selection_basics() {
    let sel = Selection::<u32>::new();
    assert!(sel.is_empty());
    assert_eq!(sel.len(), 0);
    assert_eq!(sel.primary(), None);
    assert_eq!(sel.revision(), 0);
    assert!(sel.contains_all(&[]));
    assert!(!sel.contains_any(&[1]));
}

#[test]
fn add_all_skips_duplicates_and_sets_primary() {
    let mut sel = Selection::new();
    sel.add_all([1, 2, 2, 3]);
    assert_eq!(sel.items(), &[1, 2, 3]);
    assert_eq!(sel.primary(), Some(&3));
    assert_eq!(sel.revision(), 1);

    // Nothing new: no revision bump, primary kept.
    sel.add_all([3, 1]);
    assert_eq!(sel.revision(), 1);
    assert_eq!(sel.primary(), Some(&3));
}

#[test]
fn remove_all_counts_only_checked_keys() {
    let mut sel = Selection::new();
    sel.add_all([1, 2, 3, 4]);
    assert_eq!(sel.remove_all(&[2, 4, 9]), 2);
    assert_eq!(sel.items(), &[1, 3]);
    assert_eq!(sel.revision(), 2);

    assert_eq!(sel.remove_all(&[9]), 0);
    assert_eq!(sel.revision(), 2);
}

#[test]
fn primary_follows_its_key_through_removals() {
    let mut sel = Selection::new();
    sel.add_all([1, 2, 3]);
    sel.add(0);
    assert_eq!(sel.primary(), Some(&0));

    sel.remove_where(|&k| k < 3 && k > 0);
    assert_eq!(sel.items(), &[3, 0]);
    assert_eq!(sel.primary(), Some(&0));

    sel.remove(&0);
    assert_eq!(sel.primary(), None);
    assert_eq!(sel.items(), &[3]);
}

#[test]
fn toggle_adds_and_removes_with_revision() {
    let mut sel = Selection::new();
    sel.toggle(5);
    assert!(sel.contains(&5));
    assert_eq!(sel.primary(), Some(&5));
    sel.toggle(5);
    assert!(sel.is_empty());
    assert_eq!(sel.primary(), None);
    assert_eq!(sel.revision(), 2);
}

#[test]
fn clear_bumps_revision_only_on_change() {
    let mut sel = Selection::new();
    sel.clear();
    assert_eq!(sel.revision(), 0);
    sel.add(1);
    sel.clear();
    assert!(sel.is_empty());
    assert_eq!(sel.revision(), 2);
}

#[test]
fn contains_all_and_any_over_batches() {
    let mut sel = Selection::new();
    sel.add_all([1, 2]);
    assert!(sel.contains_all(&[1, 2]));
    assert!(!sel.contains_all(&[1, 2, 3]));
    assert!(sel.contains_any(&[3, 2]));
    assert!(!sel.contains_any(&[3, 4]));
}
