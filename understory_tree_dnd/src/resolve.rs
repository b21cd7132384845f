// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop-target resolution: hit row, position, level and legality.

use kurbo::Point;
use understory_outline::{FlatId, ItemId, Outline};

use crate::classify::{DropPosition, Thresholds, overlap_ratio};
use crate::level::{LevelMetrics, above_range, below_range};
use crate::row_index::{RowEntry, RowIndex};

/// The arguments of a drop-policy check.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DropQuery {
    /// The item being dragged.
    pub node: ItemId,
    /// Its current parent.
    pub from_parent: Option<ItemId>,
    /// The parent it would land under.
    pub to_parent: Option<ItemId>,
    /// Where it would land relative to the target.
    pub position: DropPosition,
    /// Sibling that would precede it, for above/below drops.
    pub prev_sibling: Option<ItemId>,
    /// Sibling that would follow it, for above/below drops.
    pub next_sibling: Option<ItemId>,
}

impl DropQuery {
    /// Describe dropping `node` at `position` relative to `target`, landing
    /// under `parent`.
    ///
    /// The neighbors are taken from `target`'s current siblings and never
    /// name `node` itself.
    pub fn new<T>(
        outline: &Outline<T>,
        node: ItemId,
        target: ItemId,
        position: DropPosition,
        parent: Option<ItemId>,
    ) -> Self {
        let (prev_sibling, next_sibling) = match position {
            DropPosition::Above => (neighbor(outline, target, -1), Some(target)),
            DropPosition::Below => (Some(target), neighbor(outline, target, 1)),
            DropPosition::Center => (None, None),
        };
        let not_node = |n: Option<ItemId>| n.filter(|&n| n != node);
        Self {
            node,
            from_parent: outline.parent(node),
            to_parent: parent,
            position,
            prev_sibling: not_node(prev_sibling),
            next_sibling: not_node(next_sibling),
        }
    }
}

/// Caller policy consulted for every structurally legal drop target.
pub trait DropPolicy {
    /// Whether the drop described by `query` is allowed.
    fn can_drop(&self, query: &DropQuery) -> bool;
}

/// A policy that allows every structurally legal drop.
#[derive(Copy, Clone, Debug, Default)]
pub struct AllowAll;

impl DropPolicy for AllowAll {
    fn can_drop(&self, _: &DropQuery) -> bool {
        true
    }
}

impl<F: Fn(&DropQuery) -> bool> DropPolicy for F {
    fn can_drop(&self, query: &DropQuery) -> bool {
        self(query)
    }
}

/// The row being dragged, as measured when the drag started.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragSubject {
    /// Row of the dragged item.
    pub row: FlatId,
    /// The dragged item.
    pub item: ItemId,
    /// Left edge of level 0, taken from the dragged row's level-0 ancestor.
    pub root_x: f64,
    /// Height of the dragged row.
    pub height: f64,
    /// Horizontal distance from the row's left edge to where it was grabbed.
    pub grab_x: f64,
}

/// Where to draw the insertion line.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DropIndicator {
    /// Left end of the line, already offset by its half height.
    pub origin: Point,
    /// Level the line is drawn at.
    pub level: usize,
}

/// A resolved drop target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DropTarget {
    /// The row under the pointer.
    pub hit_row: FlatId,
    /// The item the drop is relative to. May differ from the hit row when the
    /// requested level moved the drop to another anchor.
    pub target: ItemId,
    /// Row of `target`.
    pub target_row: FlatId,
    /// Position relative to `target`.
    pub position: DropPosition,
    /// Parent the dragged item would land under.
    pub parent: Option<ItemId>,
    /// Level the dragged item would land at.
    pub level: usize,
    /// Overlap ratio the position was classified from.
    pub ratio: f64,
    /// Whether releasing here would move anything.
    pub legal: bool,
    /// Insertion line for legal above/below drops.
    pub indicator: Option<DropIndicator>,
}

/// Combines hit testing, classification and level resolution.
///
/// Resolution is a pure function of the row index, the pointer, and the
/// outline, so every pointer move recomputes the target from scratch.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Resolver {
    /// Classification thresholds.
    pub thresholds: Thresholds,
    /// Horizontal layout constants.
    pub metrics: LevelMetrics,
}

impl Resolver {
    /// Create a resolver.
    pub fn new(thresholds: Thresholds, metrics: LevelMetrics) -> Self {
        Self {
            thresholds,
            metrics,
        }
    }

    /// Resolve the drop target for a pointer at `pointer`.
    ///
    /// Returns `None` when there is no row to drop on, or when the requested
    /// level has no anchor row.
    pub fn resolve<T>(
        &self,
        index: &RowIndex,
        pointer: Point,
        subject: &DragSubject,
        outline: &Outline<T>,
        policy: &impl DropPolicy,
    ) -> Option<DropTarget> {
        let hit_at = index.nearest(pointer.y, subject.height / 2.0)?;
        let hit = *index.get(hit_at)?;
        let ratio = overlap_ratio(hit.bounds, pointer.y, subject.height);
        let x = pointer.x - subject.grab_x;

        let classified = self.thresholds.classify(ratio);
        let (anchor, position, level) = match classified {
            DropPosition::Above => {
                let prev = hit_at.checked_sub(1).and_then(|i| index.get(i));
                let (min, max) = above_range(hit.level, prev.map(|e| e.level));
                let level = self.metrics.drop_level(x, subject.root_x, min, max);
                if level > hit.level {
                    (*index.find_up(hit_at, level)?, DropPosition::Below, level)
                } else {
                    (hit, DropPosition::Above, level)
                }
            }
            DropPosition::Below => {
                let next = index.get(hit_at + 1);
                let (min, max) = below_range(hit.level, next.map(|e| e.level));
                let level = self.metrics.drop_level(x, subject.root_x, min, max);
                if level < hit.level {
                    match index.find_down(hit_at, level) {
                        Some(e) => (*e, DropPosition::Above, level),
                        None => (*index.find_up(hit_at, level)?, DropPosition::Below, level),
                    }
                } else if level > hit.level {
                    (*index.find_down(hit_at, level)?, DropPosition::Above, level)
                } else {
                    (hit, DropPosition::Below, level)
                }
            }
            DropPosition::Center => (hit, DropPosition::Center, hit.level + 1),
        };

        let parent = match position {
            DropPosition::Center => Some(anchor.item),
            DropPosition::Above | DropPosition::Below => outline.parent(anchor.item),
        };
        let legal = Self::is_legal(outline, subject, &anchor, position, parent, policy);

        let indicator = match classified {
            DropPosition::Above if legal => Some(hit.bounds.y0),
            DropPosition::Below if legal => Some(hit.bounds.y1),
            _ => None,
        }
        .map(|edge_y| DropIndicator {
            origin: self.metrics.indicator_origin(subject.root_x, level, edge_y),
            level,
        });

        Some(DropTarget {
            hit_row: hit.row,
            target: anchor.item,
            target_row: anchor.row,
            position,
            parent,
            level,
            ratio,
            legal,
            indicator,
        })
    }

    fn is_legal<T>(
        outline: &Outline<T>,
        subject: &DragSubject,
        anchor: &RowEntry,
        position: DropPosition,
        parent: Option<ItemId>,
        policy: &impl DropPolicy,
    ) -> bool {
        let dragged = subject.item;
        if anchor.item == dragged || nests_into(outline, dragged, parent) {
            return false;
        }
        // Landing right next to itself leaves the outline unchanged.
        let stays_put = match position {
            DropPosition::Above => neighbor(outline, anchor.item, -1) == Some(dragged),
            DropPosition::Below => neighbor(outline, anchor.item, 1) == Some(dragged),
            DropPosition::Center => false,
        };
        if stays_put {
            return false;
        }
        policy.can_drop(&DropQuery::new(
            outline,
            dragged,
            anchor.item,
            position,
            parent,
        ))
    }
}

/// Whether landing under `parent` would put `dragged` inside its own subtree.
pub fn nests_into<T>(outline: &Outline<T>, dragged: ItemId, parent: Option<ItemId>) -> bool {
    parent.is_some_and(|p| p == dragged || outline.is_ancestor_of(dragged, p))
}

fn neighbor<T>(outline: &Outline<T>, item: ItemId, step: isize) -> Option<ItemId> {
    let siblings = outline.siblings(item);
    let at = siblings.iter().position(|&s| s == item)?;
    siblings.get(at.checked_add_signed(step)?).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use kurbo::Size;
    use understory_outline::{FlatView, Node};

    use crate::geometry::FixedRowGeometry;

    // 1            y 200
    //   2          y 240
    //     21       y 280
    //   3          y 320
    // 4            y 360
    struct Fixture {
        outline: Outline<u32>,
        flat: FlatView,
        index: RowIndex,
    }

    impl Fixture {
        fn new() -> Self {
            let outline = Outline::from_nodes(
                vec![
                    Node::leaf(1)
                        .child(Node::leaf(2).child(Node::leaf(21)))
                        .child(Node::leaf(3)),
                    Node::leaf(4),
                ],
                None,
            );
            let mut flat = FlatView::new();
            flat.rebuild(&outline, |_, _| true);
            flat.expand_all();
            let geometry = FixedRowGeometry::layout(
                &flat,
                Point::new(0.0, 200.0),
                Size::new(300.0, 40.0),
                40.0,
                1_000.0,
            );
            let index = RowIndex::build(&flat, &geometry);
            Self {
                outline,
                flat,
                index,
            }
        }

        fn item(&self, value: u32) -> ItemId {
            self.outline
                .depth_first()
                .map(|(id, _)| id)
                .find(|&id| self.outline.get(id) == Some(&value))
                .unwrap()
        }

        fn subject(&self, value: u32) -> DragSubject {
            let item = self.item(value);
            DragSubject {
                row: self.flat.flat_of(item).unwrap(),
                item,
                root_x: 0.0,
                height: 40.0,
                grab_x: 5.0,
            }
        }

        fn resolve(&self, dragged: u32, pointer: Point) -> DropTarget {
            Resolver::default()
                .resolve(&self.index, pointer, &self.subject(dragged), &self.outline, &AllowAll)
                .unwrap()
        }
    }

    #[test]
    fn above_root_row() {
        let f = Fixture::new();
        // Ratio 0.875 against row 4.
        let t = f.resolve(3, Point::new(10.0, 365.0));
        assert_eq!(t.position, DropPosition::Above);
        assert_eq!(t.target, f.item(4));
        assert_eq!(t.parent, None);
        assert_eq!(t.level, 0);
        assert!(t.legal);
        assert_eq!(
            t.indicator,
            Some(DropIndicator {
                origin: Point::new(30.0, 355.0),
                level: 0
            })
        );
    }

    #[test]
    fn deeper_level_above_flips_to_below_previous() {
        let f = Fixture::new();
        // Above row 4 but pointed at level 1: lands after 3.
        let t = f.resolve(2, Point::new(65.0, 365.0));
        assert_eq!(t.level, 1);
        assert_eq!(t.position, DropPosition::Below);
        assert_eq!(t.target, f.item(3));
        assert_eq!(t.parent, Some(f.item(1)));
        assert!(t.legal);
    }

    #[test]
    fn shallower_level_below_moves_to_next_anchor() {
        let f = Fixture::new();
        // Below row 21 (level 2); pointing at level 1 lands above 3.
        let t = f.resolve(4, Point::new(65.0, 310.0));
        assert_eq!(t.position, DropPosition::Above);
        assert_eq!(t.target, f.item(3));
        assert_eq!(t.level, 1);
        assert!(t.legal);
        // Level 0 is out of reach here: the row below pins the minimum to 1.
        let t = f.resolve(4, Point::new(0.0, 310.0));
        assert_eq!((t.position, t.target, t.level), (DropPosition::Above, f.item(3), 1));
    }

    #[test]
    fn below_last_row_falls_back_upward() {
        let f = Fixture::new();
        let mut rows: Vec<_> = f.index.entries().to_vec();
        rows.truncate(4);
        let mut index = RowIndex::new();
        for r in rows {
            index.insert_sorted(r);
        }
        // Below row 3 (level 1) with nothing after it, pointed at level 0.
        let t = Resolver::default()
            .resolve(&index, Point::new(0.0, 350.0), &f.subject(21), &f.outline, &AllowAll)
            .unwrap();
        assert_eq!(t.position, DropPosition::Below);
        assert_eq!(t.target, f.item(1));
        assert_eq!(t.level, 0);
    }

    #[test]
    fn center_over_self_or_descendant_is_illegal() {
        let f = Fixture::new();
        let allow_everything = |_: &DropQuery| true;
        for (row_y, label) in [(200.0, "self"), (240.0, "child"), (280.0, "grandchild")] {
            let t = Resolver::default()
                .resolve(
                    &f.index,
                    Point::new(40.0, row_y + 20.0),
                    &f.subject(1),
                    &f.outline,
                    &allow_everything,
                )
                .unwrap();
            assert_eq!(t.position, DropPosition::Center, "{label}");
            assert!(!t.legal, "{label}");
            assert_eq!(t.indicator, None, "{label}");
        }
    }

    #[test]
    fn next_to_itself_is_illegal() {
        let f = Fixture::new();
        // Above its own row.
        let t = f.resolve(3, Point::new(45.0, 330.0));
        assert_eq!(t.target, f.item(3));
        assert!(!t.legal);
        // Above its next sibling, which is where it already is.
        let t = f.resolve(2, Point::new(0.0, 310.0));
        assert_eq!((t.position, t.target), (DropPosition::Above, f.item(3)));
        assert!(!t.legal);
        // Above 4 while dragging 1, whose next sibling is 4.
        let t = f.resolve(1, Point::new(5.0, 365.0));
        assert_eq!(t.position, DropPosition::Above);
        assert!(!t.legal);
    }

    #[test]
    fn policy_sees_neighbors() {
        let f = Fixture::new();
        let four = f.item(4);
        let one = f.item(1);
        let seen = core::cell::RefCell::new(None);
        let policy = |q: &DropQuery| {
            *seen.borrow_mut() = Some(*q);
            q.to_parent.is_some()
        };
        let t = Resolver::default()
            .resolve(&f.index, Point::new(10.0, 365.0), &f.subject(3), &f.outline, &policy)
            .unwrap();
        assert!(!t.legal);
        assert_eq!(t.indicator, None);
        let q = seen.borrow().unwrap();
        assert_eq!(q.from_parent, Some(one));
        assert_eq!(q.to_parent, None);
        assert_eq!(q.prev_sibling, Some(one));
        assert_eq!(q.next_sibling, Some(four));
    }

    #[test]
    fn empty_index_resolves_nothing() {
        let f = Fixture::new();
        let t = Resolver::default().resolve(
            &RowIndex::new(),
            Point::new(10.0, 10.0),
            &f.subject(1),
            &f.outline,
            &AllowAll,
        );
        assert!(t.is_none());
    }
}
