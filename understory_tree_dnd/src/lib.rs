// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_tree_dnd --heading-base-level=0

//! Understory Tree DnD: drag-and-drop geometry for outline trees.
//!
//! Given row bounds supplied by the host and a stream of pointer positions,
//! this crate decides where a dragged row would land in an
//! [`Outline`](understory_outline::Outline): which row the pointer is over,
//! whether that means above, below or into it, at which nesting level, and
//! whether the drop is legal.
//!
//! The pieces, leaves first:
//!
//! - [`RowIndex`]: visible rows sorted by their top edge, with nearest-row
//!   lookup by binary search.
//! - [`overlap_ratio`] and [`Thresholds`]: classify the overlap between the
//!   dragged row and the row under it as [`DropPosition::Above`],
//!   [`DropPosition::Below`] or [`DropPosition::Center`].
//! - [`LevelMetrics`]: turn the horizontal pointer offset into a nesting
//!   level, clamped to the levels adjacent rows allow.
//! - [`Resolver`]: combine the above with self-nesting rejection and a
//!   caller [`DropPolicy`] into a [`DropTarget`].
//! - [`DragSession`]: the `Idle -> Dragging -> Idle` state machine that
//!   owns ghost tracking, edge auto-scroll ([`AutoScroll`]) and delayed
//!   auto-expand, and reports what to render as [`DragEffect`]s.
//!
//! Nothing here touches a real UI. Geometry comes in through [`RowGeometry`];
//! time comes in as plain timestamps on [`DragInput`].
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use understory_outline::{FlatView, Node, Outline};
//! use understory_tree_dnd::{
//!     AllowAll, DragContext, DragEffect, DragInput, DragSession, DropPosition,
//!     FixedRowGeometry,
//! };
//!
//! let mut outline = Outline::from_nodes(
//!     vec![Node::leaf(1).child(Node::leaf(2)).child(Node::leaf(3)), Node::leaf(4)],
//!     None,
//! );
//! let mut flat = FlatView::new();
//! flat.rebuild(&outline, |_, _| true);
//! flat.expand_all();
//!
//! // Rows 40px tall starting at y = 200, indented 40px per level.
//! let geometry = FixedRowGeometry::layout(
//!     &flat, Point::new(0.0, 200.0), Size::new(300.0, 40.0), 40.0, 1_000.0,
//! );
//! let three = flat.rows()[2].id;
//!
//! let mut session = DragSession::default();
//! let mut cx = DragContext { outline: &outline, flat: &mut flat, geometry: &geometry, policy: &AllowAll };
//! session.handle(DragInput::Press { row: three, pointer: Point::new(45.0, 290.0) }, &mut cx);
//! session.handle(DragInput::Move { pointer: Point::new(10.0, 325.0), now: 16 }, &mut cx);
//! let effects = session.handle(DragInput::Release, &mut cx);
//!
//! let decision = effects.iter().find_map(|e| match e {
//!     DragEffect::Dropped(d) => Some(*d),
//!     _ => None,
//! }).unwrap();
//! assert_eq!(decision.position, DropPosition::Above);
//! assert_eq!(decision.parent, None);
//!
//! outline.insert_above(decision.target, decision.dragged).unwrap();
//! let roots: Vec<u32> = outline.roots().iter().map(|&id| *outline.get(id).unwrap()).collect();
//! assert_eq!(roots, [1, 3, 4]);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwarded to `kurbo`.
//! - `libm`: float math for `no_std` builds, forwarded to `kurbo`.
//! - `tracing`: emit `tracing` events for session start and end, auto-expand
//!   and auto-scroll.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod classify;
mod geometry;
mod level;
mod resolve;
mod row_index;
mod scroll;
mod session;

pub use classify::{DropPosition, Thresholds, overlap_ratio};
pub use geometry::{FixedRowGeometry, RowGeometry};
pub use level::{LevelMetrics, above_range, below_range};
pub use resolve::{
    AllowAll, DragSubject, DropIndicator, DropPolicy, DropQuery, DropTarget, Resolver, nests_into,
};
pub use row_index::{RowEntry, RowIndex};
pub use scroll::AutoScroll;
pub use session::{DragContext, DragEffect, DragInput, DragSession, DropDecision, SessionConfig};

pub use understory_event_state::drag::DragAxis;
