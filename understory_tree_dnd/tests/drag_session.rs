// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag sessions driven end to end against a fixed row layout.

use kurbo::{Point, Size};
use proptest::prelude::*;
use understory_outline::{FlatId, FlatView, ItemId, Node, Outline};
use understory_tree_dnd::{
    AllowAll, DragContext, DragEffect, DragInput, DragSession, DropPosition, DropQuery,
    FixedRowGeometry, LevelMetrics, Resolver, RowIndex, above_range,
};

fn layout(flat: &FlatView) -> FixedRowGeometry {
    FixedRowGeometry::layout(
        flat,
        Point::new(0.0, 200.0),
        Size::new(300.0, 40.0),
        40.0,
        1_000.0,
    )
}

fn step(
    session: &mut DragSession,
    outline: &Outline<u32>,
    flat: &mut FlatView,
    geometry: &FixedRowGeometry,
    input: DragInput,
) -> Vec<DragEffect> {
    let mut cx = DragContext {
        outline,
        flat,
        geometry,
        policy: &AllowAll,
    };
    session.handle(input, &mut cx)
}

fn find(outline: &Outline<u32>, value: u32) -> ItemId {
    outline
        .depth_first()
        .map(|(id, _)| id)
        .find(|&id| outline.get(id) == Some(&value))
        .unwrap()
}

fn row(outline: &Outline<u32>, flat: &FlatView, value: u32) -> FlatId {
    flat.flat_of(find(outline, value)).unwrap()
}

fn values(outline: &Outline<u32>, ids: &[ItemId]) -> Vec<u32> {
    ids.iter().map(|&id| *outline.get(id).unwrap()).collect()
}

/// `[1 [2, 3], 4]`, fully expanded.
fn small_tree() -> (Outline<u32>, FlatView) {
    let outline = Outline::from_nodes(
        vec![
            Node::leaf(1).child(Node::leaf(2)).child(Node::leaf(3)),
            Node::leaf(4),
        ],
        None,
    );
    let mut flat = FlatView::new();
    flat.rebuild(&outline, |_, _| true);
    flat.expand_all();
    (outline, flat)
}

fn dropped(effects: &[DragEffect]) -> Option<understory_tree_dnd::DropDecision> {
    effects.iter().find_map(|e| match e {
        DragEffect::Dropped(d) => Some(*d),
        _ => None,
    })
}

#[test]
fn drop_child_above_root_sibling() {
    let (mut outline, mut flat) = small_tree();
    let geometry = layout(&flat);
    let three = row(&outline, &flat, 3);
    let mut session = DragSession::default();

    let effects = step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Press {
            row: three,
            pointer: Point::new(45.0, 290.0),
        },
    );
    assert!(matches!(effects[0], DragEffect::Started { row, .. } if row == three));

    let effects = step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Move {
            pointer: Point::new(10.0, 325.0),
            now: 16,
        },
    );
    assert!(effects.iter().any(|e| matches!(e, DragEffect::Indicator(Some(_)))));
    let target = session.target().copied().unwrap();
    assert_eq!(target.position, DropPosition::Above);
    assert_eq!(target.level, 0);
    assert!(target.legal);

    let effects = step(&mut session, &outline, &mut flat, &geometry, DragInput::Release);
    let decision = dropped(&effects).unwrap();
    assert_eq!(effects.last(), Some(&DragEffect::Ended { dropped: true }));
    assert!(!session.is_dragging());

    let one = find(&outline, 1);
    assert_eq!(outline.parent(decision.dragged), Some(one));
    assert_eq!(decision.parent, None);
    assert_eq!(outline.insert_above(decision.target, decision.dragged), Ok(1));
    assert_eq!(values(&outline, outline.roots()), vec![1, 3, 4]);
    assert_eq!(values(&outline, outline.children(one)), vec![2]);
    outline.check_integrity().unwrap();
}

#[test]
fn escape_discards_a_legal_target() {
    let (outline, mut flat) = small_tree();
    let geometry = layout(&flat);
    let three = row(&outline, &flat, 3);
    let mut session = DragSession::default();
    let press = DragInput::Press {
        row: three,
        pointer: Point::new(45.0, 290.0),
    };
    step(&mut session, &outline, &mut flat, &geometry, press);
    step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Move {
            pointer: Point::new(10.0, 325.0),
            now: 16,
        },
    );
    assert!(session.target().is_some_and(|t| t.legal));

    let effects = step(&mut session, &outline, &mut flat, &geometry, DragInput::Escape);
    assert_eq!(dropped(&effects), None);
    assert!(effects.contains(&DragEffect::Indicator(None)));
    assert_eq!(effects.last(), Some(&DragEffect::Ended { dropped: false }));
}

#[test]
fn touch_cancel_commits_a_legal_target() {
    let (outline, mut flat) = small_tree();
    let geometry = layout(&flat);
    let three = row(&outline, &flat, 3);
    let mut session = DragSession::default();
    let press = DragInput::Press {
        row: three,
        pointer: Point::new(45.0, 290.0),
    };
    step(&mut session, &outline, &mut flat, &geometry, press);
    step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Move {
            pointer: Point::new(10.0, 325.0),
            now: 16,
        },
    );
    assert!(session.target().is_some_and(|t| t.legal));

    let effects = step(&mut session, &outline, &mut flat, &geometry, DragInput::Cancel);
    let decision = dropped(&effects).expect("a legal target commits on cancel");
    assert_eq!(decision.dragged, find(&outline, 3));
    assert_eq!(decision.target, find(&outline, 4));
    assert_eq!(decision.position, DropPosition::Above);
    assert_eq!(effects.last(), Some(&DragEffect::Ended { dropped: true }));
    assert!(!session.is_dragging());
}

#[test]
fn cancel_twice_is_harmless() {
    let (outline, mut flat) = small_tree();
    let geometry = layout(&flat);
    let one = row(&outline, &flat, 1);
    let mut session = DragSession::default();
    step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Press {
            row: one,
            pointer: Point::new(10.0, 210.0),
        },
    );
    assert!(flat.is_hidden(row(&outline, &flat, 2)));

    let first = step(&mut session, &outline, &mut flat, &geometry, DragInput::Cancel);
    assert_eq!(first.last(), Some(&DragEffect::Ended { dropped: false }));
    let second = step(&mut session, &outline, &mut flat, &geometry, DragInput::Cancel);
    assert!(second.is_empty());
    assert!(session.cancel(&mut flat).is_empty());

    assert!(!session.is_dragging());
    assert!(!flat.is_hidden(row(&outline, &flat, 2)));
    assert!(!flat.is_hidden(row(&outline, &flat, 3)));
    assert_eq!(session.next_deadline(), None);
}

#[test]
fn hovering_a_collapsed_row_expands_it() {
    let outline = Outline::from_nodes(
        vec![
            Node::leaf(1).child(Node::leaf(2)).child(Node::leaf(3)),
            Node::leaf(4).child(Node::leaf(5)),
        ],
        None,
    );
    let mut flat = FlatView::new();
    flat.rebuild(&outline, |_, _| true);
    flat.expand(row(&outline, &flat, 1));
    let geometry = layout(&flat);
    let two = row(&outline, &flat, 2);
    let four = row(&outline, &flat, 4);
    let five = row(&outline, &flat, 5);
    let mut session = DragSession::default();

    step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Press {
            row: two,
            pointer: Point::new(45.0, 250.0),
        },
    );
    let effects = step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Move {
            pointer: Point::new(45.0, 340.0),
            now: 100,
        },
    );
    assert!(effects.contains(&DragEffect::Highlight(Some(four))));
    assert_eq!(session.next_deadline(), Some(400));

    // Resting on the same row keeps the original deadline.
    step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Move {
            pointer: Point::new(45.0, 341.0),
            now: 200,
        },
    );
    assert_eq!(session.next_deadline(), Some(400));

    let early = step(&mut session, &outline, &mut flat, &geometry, DragInput::Tick { now: 399 });
    assert!(early.is_empty());
    let due = step(&mut session, &outline, &mut flat, &geometry, DragInput::Tick { now: 400 });
    assert_eq!(due, vec![DragEffect::Expand(four)]);
    assert!(flat.is_expanded(four));

    // The host lays out again; the newly shown child becomes a target.
    let geometry = layout(&flat);
    let effects = step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Move {
            pointer: Point::new(45.0, 380.0),
            now: 450,
        },
    );
    assert!(effects.contains(&DragEffect::Highlight(Some(five))));
    let target = session.target().copied().unwrap();
    assert_eq!(target.position, DropPosition::Center);
    assert_eq!(target.target, find(&outline, 5));

    // Leaving center cancels the pending timer.
    step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Move {
            pointer: Point::new(45.0, 366.0),
            now: 460,
        },
    );
    assert_ne!(session.target().map(|t| t.position), Some(DropPosition::Center));
    assert_eq!(session.next_deadline(), None);
}

#[test]
fn move_that_expands_waits_for_new_layout() {
    let outline = Outline::from_nodes(
        vec![
            Node::leaf(1).child(Node::leaf(2)).child(Node::leaf(3)),
            Node::leaf(4).child(Node::leaf(5)),
        ],
        None,
    );
    let mut flat = FlatView::new();
    flat.rebuild(&outline, |_, _| true);
    flat.expand(row(&outline, &flat, 1));
    let stale = layout(&flat);
    let two = row(&outline, &flat, 2);
    let four = row(&outline, &flat, 4);
    let five = row(&outline, &flat, 5);
    let mut session = DragSession::default();

    step(
        &mut session,
        &outline,
        &mut flat,
        &stale,
        DragInput::Press {
            row: two,
            pointer: Point::new(45.0, 250.0),
        },
    );
    step(
        &mut session,
        &outline,
        &mut flat,
        &stale,
        DragInput::Move {
            pointer: Point::new(45.0, 340.0),
            now: 100,
        },
    );

    // The timer fires on a move that still carries the old layout.
    let effects = step(
        &mut session,
        &outline,
        &mut flat,
        &stale,
        DragInput::Move {
            pointer: Point::new(45.0, 380.0),
            now: 450,
        },
    );
    assert_eq!(effects.len(), 2, "{effects:?}");
    assert_eq!(effects[0], DragEffect::Expand(four));
    assert!(matches!(effects[1], DragEffect::GhostMoved(_)));
    assert_eq!(session.target().map(|t| t.target), Some(find(&outline, 4)));

    let fresh = layout(&flat);
    let effects = step(
        &mut session,
        &outline,
        &mut flat,
        &fresh,
        DragInput::Move {
            pointer: Point::new(45.0, 381.0),
            now: 460,
        },
    );
    assert!(effects.contains(&DragEffect::Highlight(Some(five))));
    assert_eq!(session.target().map(|t| t.target), Some(find(&outline, 5)));
}

#[test]
fn dragged_row_never_expands_itself() {
    let outline = Outline::from_nodes(vec![Node::leaf(1), Node::leaf(4).child(Node::leaf(5))], None);
    let mut flat = FlatView::new();
    flat.rebuild(&outline, |_, _| true);
    let geometry = layout(&flat);
    let four = row(&outline, &flat, 4);
    let mut session = DragSession::default();

    step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Press {
            row: four,
            pointer: Point::new(10.0, 250.0),
        },
    );
    let effects = step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Move {
            pointer: Point::new(10.0, 260.0),
            now: 0,
        },
    );
    assert!(effects.contains(&DragEffect::NoDrop(true)));
    assert_eq!(session.next_deadline(), None);
    let later = step(&mut session, &outline, &mut flat, &geometry, DragInput::Tick { now: 10_000 });
    assert!(later.is_empty());
    assert!(!flat.is_expanded(four));
}

#[test]
fn edge_band_scrolls_and_suspends_targeting() {
    let (outline, mut flat) = small_tree();
    let mut geometry = layout(&flat);
    let three = row(&outline, &flat, 3);
    let mut session = DragSession::default();
    step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Press {
            row: three,
            pointer: Point::new(45.0, 290.0),
        },
    );
    step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Move {
            pointer: Point::new(10.0, 325.0),
            now: 16,
        },
    );
    assert!(session.target().is_some());

    let effects = step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Move {
            pointer: Point::new(10.0, 950.0),
            now: 32,
        },
    );
    assert!(effects.contains(&DragEffect::AutoScroll { dy: 2.0 }));
    assert!(effects.contains(&DragEffect::Indicator(None)));
    assert!(session.target().is_none());

    let effects = step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Move {
            pointer: Point::new(10.0, 50.0),
            now: 48,
        },
    );
    assert!(effects.contains(&DragEffect::AutoScroll { dy: -2.0 }));

    // Back out of the band: rows are measured again at their scrolled position.
    geometry.scroll_by(2.0);
    step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Move {
            pointer: Point::new(10.0, 325.0),
            now: 64,
        },
    );
    let target = session.target().copied().unwrap();
    assert_eq!(target.position, DropPosition::Above);
    assert!(target.legal);
}

#[test]
fn rows_that_vanish_mid_drag_leave_nothing_to_drop_on() {
    let (outline, mut flat) = small_tree();
    let geometry = layout(&flat);
    let three = row(&outline, &flat, 3);
    let mut session = DragSession::default();
    step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Press {
            row: three,
            pointer: Point::new(45.0, 290.0),
        },
    );
    // Entering the band drops the row index; it is rebuilt from whatever
    // geometry is available when targeting resumes.
    step(
        &mut session,
        &outline,
        &mut flat,
        &geometry,
        DragInput::Move {
            pointer: Point::new(10.0, 990.0),
            now: 16,
        },
    );
    let gone = FixedRowGeometry::default();
    step(
        &mut session,
        &outline,
        &mut flat,
        &gone,
        DragInput::Move {
            pointer: Point::new(10.0, 325.0),
            now: 32,
        },
    );
    assert!(session.target().is_none());
    let effects = step(&mut session, &outline, &mut flat, &gone, DragInput::Release);
    assert_eq!(effects.last(), Some(&DragEffect::Ended { dropped: false }));
    assert!(!session.is_dragging());
}

#[test]
fn center_on_own_descendants_is_never_legal() {
    let outline = Outline::from_nodes(
        vec![Node::leaf(1).child(Node::leaf(2).child(Node::leaf(3))), Node::leaf(4)],
        None,
    );
    let mut flat = FlatView::new();
    flat.rebuild(&outline, |_, _| true);
    flat.expand_all();
    let geometry = layout(&flat);
    let index = RowIndex::build(&flat, &geometry);
    let permissive = |_: &DropQuery| true;

    for (dragged, hovered_y) in [(1, 200.0), (1, 240.0), (1, 280.0), (2, 240.0), (2, 280.0)] {
        let item = find(&outline, dragged);
        let subject = understory_tree_dnd::DragSubject {
            row: flat.flat_of(item).unwrap(),
            item,
            root_x: 0.0,
            height: 40.0,
            grab_x: 0.0,
        };
        let target = Resolver::default()
            .resolve(
                &index,
                Point::new(40.0, hovered_y + 20.0),
                &subject,
                &outline,
                &permissive,
            )
            .unwrap();
        assert_eq!(target.position, DropPosition::Center);
        assert!(!target.legal, "{dragged} over row at {hovered_y}");
    }
}

proptest! {
    #[test]
    fn above_drop_level_stays_between_neighbors(
        current in 0_usize..8,
        previous in proptest::option::of(0_usize..8),
        x in -100.0_f64..600.0,
    ) {
        let (min, max) = above_range(current, previous);
        let level = LevelMetrics::default().drop_level(x, 0.0, min, max);
        match previous {
            Some(p) => {
                prop_assert!(level >= current.min(p));
                prop_assert!(level <= current.max(p));
            }
            None => prop_assert_eq!(level, current),
        }
    }
}
