// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=overstory_tree --heading-base-level=0

//! Overstory Tree: the core of a reorderable tree view.
//!
//! [`TreeView`] ties an [`Outline`](understory_outline::Outline), its
//! [`FlatView`](understory_outline::FlatView) projection and a
//! [`DragSession`](understory_tree_dnd::DragSession) together behind the
//! operations a tree widget offers: inserting, removing, updating and
//! re-sorting items, expanding and collapsing rows, checking items as a
//! checklist, locking the tree, and reordering by drag and drop. Every
//! structural or selection change is reported as a [`TreeChange`].
//!
//! The view renders nothing. Hosts lay out [`TreeView::visible_rows`], report
//! row bounds through a [`RowGeometry`](understory_tree_dnd::RowGeometry),
//! forward pointer input to [`TreeView::drag`] and render the returned
//! [`DragEffect`](understory_tree_dnd::DragEffect)s.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use overstory_tree::{ChangeKind, TreeChange, TreeConfig, TreeView};
//! use understory_outline::Node;
//! use understory_tree_dnd::{DragInput, FixedRowGeometry};
//!
//! let config = TreeConfig::<&str>::new()
//!     .expand_level(1)
//!     .can_drop(|check| *check.node != "locked");
//! let mut view = TreeView::new(
//!     vec![Node::leaf("docs").child(Node::leaf("a")).child(Node::leaf("b")), Node::leaf("src")],
//!     config,
//! )
//! .unwrap();
//! view.take_changes();
//!
//! let geometry = FixedRowGeometry::layout(
//!     view.flat(), Point::new(0.0, 200.0), Size::new(300.0, 40.0), 40.0, 1_000.0,
//! );
//! let b = view.outline().children(view.outline().roots()[0])[1];
//! let row = view.row_of(b).unwrap();
//!
//! // Drag "b" over the top part of "src", left of the child indent.
//! view.drag(DragInput::Press { row, pointer: Point::new(45.0, 290.0) }, &geometry);
//! view.drag(DragInput::Move { pointer: Point::new(10.0, 325.0), now: 16 }, &geometry);
//! view.drag(DragInput::Release, &geometry);
//!
//! let changes = view.take_changes();
//! assert_eq!(changes.len(), 1);
//! assert_eq!(changes[0].kind(), ChangeKind::Reorder);
//! assert!(matches!(changes[0], TreeChange::Reorder { to_parent: None, index: 1, .. }));
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwarded to the kernel crates.
//! - `libm`: float math for `no_std` builds.
//! - `json`: [`TreeView::from_json`] and [`TreeView::to_json`] over
//!   `serde_json` values, with a configurable children field.
//! - `tracing`: emit `tracing` events for changes, drops and lock changes.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod actions;
mod change;
mod config;
mod lock;
mod selection;
mod view;

pub use actions::TreeAction;
pub use change::{ChangeKind, InsertPosition, TreeChange};
pub use config::{
    CanDragFn, CanDropFn, ChangeHandler, ConfigError, ConfirmDropFn, DropCheck, DropVerdict,
    LevelNameFn, NodeClass, NodeClassFn, SelectedFn, TreeConfig,
};
pub use lock::{LockGuard, TreeLock};
pub use view::TreeView;
