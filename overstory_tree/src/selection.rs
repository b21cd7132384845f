// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Checklist rules over the outline.
//!
//! Checking an item checks its whole subtree and unchecking it unchecks the
//! subtree. After either, every ancestor is settled: an item with descendants
//! is checked exactly when all of its descendants are.

use understory_outline::{ItemId, Outline};
use understory_selection::Selection;

pub(crate) fn check<T>(outline: &Outline<T>, checked: &mut Selection<ItemId>, item: ItemId) {
    if !outline.is_alive(item) {
        return;
    }
    checked.add_all(core::iter::once(item).chain(outline.descendants(item)));
    settle_chain(outline, checked, outline.parent(item));
}

pub(crate) fn uncheck<T>(outline: &Outline<T>, checked: &mut Selection<ItemId>, item: ItemId) {
    if !outline.is_alive(item) {
        return;
    }
    let mut subtree = outline.descendants(item);
    subtree.push(item);
    checked.remove_all(&subtree);
    settle_chain(outline, checked, outline.parent(item));
}

/// Settle `from` and then each of its ancestors, nearest first.
pub(crate) fn settle_chain<T>(
    outline: &Outline<T>,
    checked: &mut Selection<ItemId>,
    from: Option<ItemId>,
) {
    let Some(from) = from else {
        return;
    };
    settle(outline, checked, from);
    for ancestor in outline.ancestors(from) {
        settle(outline, checked, ancestor);
    }
}

fn settle<T>(outline: &Outline<T>, checked: &mut Selection<ItemId>, item: ItemId) {
    let descendants = outline.descendants(item);
    if descendants.is_empty() {
        return;
    }
    match (checked.contains(&item), checked.contains_all(&descendants)) {
        (true, false) => checked.remove(&item),
        (false, true) => checked.add(item),
        _ => {}
    }
}

/// Forget handles whose items were freed.
pub(crate) fn purge<T>(outline: &Outline<T>, checked: &mut Selection<ItemId>) {
    checked.remove_where(|&id| !outline.is_alive(id));
}

/// Whether `item` has descendants and some, but not all, are checked.
pub(crate) fn is_partial<T>(
    outline: &Outline<T>,
    checked: &Selection<ItemId>,
    item: ItemId,
) -> bool {
    let descendants = outline.descendants(item);
    checked.contains_any(&descendants) && !checked.contains_all(&descendants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use understory_outline::Node;

    /// `[1 [2 [21, 22], 3], 4]`
    fn outline() -> Outline<u32> {
        Outline::from_nodes(
            vec![
                Node::leaf(1)
                    .child(Node::leaf(2).child(Node::leaf(21)).child(Node::leaf(22)))
                    .child(Node::leaf(3)),
                Node::leaf(4),
            ],
            None,
        )
    }

    fn find(outline: &Outline<u32>, value: u32) -> ItemId {
        outline
            .depth_first()
            .map(|(id, _)| id)
            .find(|&id| outline.get(id) == Some(&value))
            .unwrap()
    }

    fn checked_values(outline: &Outline<u32>, checked: &Selection<ItemId>) -> Vec<u32> {
        let mut values: Vec<u32> = checked.iter().map(|&id| *outline.get(id).unwrap()).collect();
        values.sort_unstable();
        values
    }

    #[test]
    fn checking_a_parent_checks_its_subtree() {
        let outline = outline();
        let mut checked = Selection::new();
        check(&outline, &mut checked, find(&outline, 2));
        assert_eq!(checked_values(&outline, &checked), [2, 21, 22]);
        assert!(is_partial(&outline, &checked, find(&outline, 1)));
    }

    #[test]
    fn last_child_rolls_up_through_every_ancestor() {
        let outline = outline();
        let mut checked = Selection::new();
        check(&outline, &mut checked, find(&outline, 3));
        check(&outline, &mut checked, find(&outline, 21));
        assert!(!checked.contains(&find(&outline, 2)));

        check(&outline, &mut checked, find(&outline, 22));
        assert_eq!(checked_values(&outline, &checked), [1, 2, 3, 21, 22]);
        assert!(!is_partial(&outline, &checked, find(&outline, 1)));
    }

    #[test]
    fn unchecking_a_leaf_unchecks_its_ancestors() {
        let outline = outline();
        let mut checked = Selection::new();
        check(&outline, &mut checked, find(&outline, 1));
        uncheck(&outline, &mut checked, find(&outline, 22));
        assert_eq!(checked_values(&outline, &checked), [3, 21]);
    }

    #[test]
    fn freed_handles_are_purged() {
        let mut outline = outline();
        let mut checked = Selection::new();
        check(&outline, &mut checked, find(&outline, 2));
        let two = find(&outline, 2);
        outline.remove(two);
        purge(&outline, &mut checked);
        assert!(checked.is_empty());
    }
}
