// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_event_state --heading-base-level=0

//! Understory Event State: event state managers for UI interactions.
//!
//! This crate provides small, focused state machines for interactions that
//! need state carried across multiple events.
//!
//! - [`drag`]: Track pointer drags with a grab offset, an axis constraint, and
//!   placement for a floating copy of the dragged element.
//!
//! The managers do not assume any UI framework, event system, or scene graph.
//! They accept raw pointer positions and element geometry and produce deltas
//! and positions that applications interpret.
//!
//! ### Drag Operations
//!
//! ```rust
//! use kurbo::Point;
//! use understory_event_state::drag::{DragAxis, DragState};
//!
//! let mut drag = DragState::new(DragAxis::Both);
//! drag.start_on(Point::new(12.0, 12.0), Point::new(10.0, 10.0));
//!
//! let delta = drag.update(Point::new(15.0, 14.0)).unwrap();
//! assert_eq!((delta.x, delta.y), (3.0, 2.0));
//!
//! // Where the element's top-left corner follows the pointer to.
//! assert_eq!(drag.anchor(Point::new(15.0, 14.0)), Some(Point::new(13.0, 12.0)));
//! ```
//!
//! ## Features
//!
//! - `drag`: Enable drag state tracking (requires `kurbo` dependency)
//!
//! This crate is `no_std` compatible.

#![no_std]

#[cfg(feature = "drag")]
pub mod drag;
