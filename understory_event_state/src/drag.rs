// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag state helper: pointer deltas, grab offset, and axis-constrained ghost placement.
//!
//! ## Usage
//!
//! 1) Start a drag with [`DragState::start_on`], passing the pointer position and
//!    the top-left corner of the element being dragged. The difference is kept as
//!    the grab offset.
//! 2) On each move event, call [`DragState::update`] for the (axis-constrained)
//!    movement since the last update, or [`DragState::ghost_origin`] for where a
//!    floating copy of the element should be drawn.
//! 3) [`DragState::anchor`] gives the pointer position corrected by the grab
//!    offset, i.e. where the element's leading edge would be.
//! 4) End the drag with [`DragState::end`].
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use understory_event_state::drag::{DragAxis, DragState};
//!
//! let mut drag = DragState::new(DragAxis::Vertical);
//!
//! // Grab a 40px tall row whose top-left is (40, 200) at (45, 210).
//! drag.start_on(Point::new(45.0, 210.0), Point::new(40.0, 200.0));
//! assert!(drag.is_dragging());
//!
//! // Vertical drags ignore horizontal movement.
//! let delta = drag.update(Point::new(60.0, 230.0)).unwrap();
//! assert_eq!((delta.x, delta.y), (0.0, 20.0));
//!
//! // The ghost is centered on the pointer vertically and stays in its column.
//! let ghost = drag.ghost_origin(Point::new(60.0, 230.0), 40.0).unwrap();
//! assert_eq!(ghost, Point::new(40.0, 210.0));
//!
//! // The anchor still follows the pointer horizontally.
//! assert_eq!(drag.anchor(Point::new(60.0, 230.0)).unwrap().x, 55.0);
//! ```

use kurbo::{Point, Vec2};

/// Which directions a dragged element may follow the pointer in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DragAxis {
    /// Only vertical movement is reflected.
    #[default]
    Vertical,
    /// The element follows the pointer freely.
    Both,
}

impl DragAxis {
    /// Drop the components of `delta` this axis does not follow.
    pub fn constrain(self, delta: Vec2) -> Vec2 {
        match self {
            Self::Vertical => Vec2::new(0.0, delta.y),
            Self::Both => delta,
        }
    }
}

/// Tracks drag state for move event processing
#[derive(Debug, Clone, Default, Copy)]
pub struct DragState {
    /// Start position of the drag operation
    pub start_pos: Option<Point>,
    /// Last recorded pointer position during drag
    pub last_pos: Option<Point>,
    /// Pointer position minus the dragged element's origin at start.
    pub grab_offset: Vec2,
    /// Movement constraint.
    pub axis: DragAxis,
}

impl DragState {
    /// Idle state with the given axis constraint.
    pub fn new(axis: DragAxis) -> Self {
        Self {
            axis,
            ..Self::default()
        }
    }

    /// Start tracking a new drag from `pos` without a grab offset.
    pub fn start(&mut self, pos: Point) {
        self.start_on(pos, pos);
    }

    /// Start tracking a new drag from `pos` on an element whose origin is `origin`.
    pub fn start_on(&mut self, pos: Point, origin: Point) {
        self.start_pos = Some(pos);
        self.last_pos = Some(pos);
        self.grab_offset = pos - origin;
    }

    /// Update with a new position, returning the constrained delta since the last update.
    pub fn update(&mut self, pos: Point) -> Option<Vec2> {
        self.start_pos?;
        let last = self.last_pos.replace(pos)?;
        Some(self.axis.constrain(pos - last))
    }

    /// Constrained offset from the drag start position.
    pub fn total_offset(&self, current_pos: Point) -> Option<Vec2> {
        self.start_pos
            .map(|start| self.axis.constrain(current_pos - start))
    }

    /// Origin of the dragged element when the drag started.
    pub fn element_origin(&self) -> Option<Point> {
        self.start_pos.map(|start| start - self.grab_offset)
    }

    /// Pointer position shifted by the grab offset.
    ///
    /// Unlike the ghost, this is never axis-constrained: it reports where the
    /// element's origin would be if it followed the pointer freely.
    pub fn anchor(&self, pos: Point) -> Option<Point> {
        self.start_pos?;
        Some(pos - self.grab_offset)
    }

    /// Where to draw a floating copy of an element `height` tall.
    ///
    /// The copy is centered vertically on the pointer. Horizontally it tracks
    /// the pointer for [`DragAxis::Both`] and stays at its starting column for
    /// [`DragAxis::Vertical`].
    pub fn ghost_origin(&self, pos: Point, height: f64) -> Option<Point> {
        let origin = self.element_origin()?;
        let x = match self.axis {
            DragAxis::Vertical => origin.x,
            DragAxis::Both => pos.x - self.grab_offset.x,
        };
        Some(Point::new(x, pos.y - height / 2.0))
    }

    /// End the current drag operation and reset state. The axis is kept.
    pub fn end(&mut self) {
        self.start_pos = None;
        self.last_pos = None;
        self.grab_offset = Vec2::ZERO;
    }

    /// Returns `true` while a drag operation is active
    pub fn is_dragging(&self) -> bool {
        self.start_pos.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_drag_state_is_not_dragging() {
        let drag = DragState::new(DragAxis::Both);
        assert!(!drag.is_dragging());
        assert_eq!(drag.axis, DragAxis::Both);
        assert_eq!(drag.element_origin(), None);
        assert_eq!(drag.ghost_origin(Point::ZERO, 10.0), None);
    }

    #[test]
    fn start_on_records_grab_offset() {
        let mut drag = DragState::default();
        drag.start_on(Point::new(15.0, 28.0), Point::new(10.0, 20.0));
        assert_eq!(drag.grab_offset, Vec2::new(5.0, 8.0));
        assert_eq!(drag.element_origin(), Some(Point::new(10.0, 20.0)));
        assert_eq!(drag.start_pos, drag.last_pos);
    }

    #[test]
    fn vertical_axis_drops_horizontal_movement() {
        let mut drag = DragState::new(DragAxis::Vertical);
        drag.start(Point::new(0.0, 0.0));
        assert_eq!(drag.update(Point::new(5.0, 3.0)), Some(Vec2::new(0.0, 3.0)));
        assert_eq!(drag.update(Point::new(8.0, 7.0)), Some(Vec2::new(0.0, 4.0)));
        assert_eq!(drag.total_offset(Point::new(8.0, 7.0)), Some(Vec2::new(0.0, 7.0)));
    }

    #[test]
    fn free_axis_tracks_both_components() {
        let mut drag = DragState::new(DragAxis::Both);
        drag.start(Point::new(100.0, 100.0));
        assert_eq!(drag.update(Point::new(90.0, 85.0)), Some(Vec2::new(-10.0, -15.0)));
        assert_eq!(drag.total_offset(Point::new(90.0, 85.0)), Some(Vec2::new(-10.0, -15.0)));
    }

    #[test]
    fn update_returns_none_when_not_dragging() {
        let mut drag = DragState::default();
        assert_eq!(drag.update(Point::new(15.0, 25.0)), None);
        assert!(drag.last_pos.is_none());
    }

    #[test]
    fn update_with_no_last_position_returns_none() {
        let mut drag = DragState {
            start_pos: Some(Point::new(10.0, 20.0)),
            ..DragState::default()
        };
        let new_pos = Point::new(15.0, 25.0);
        assert_eq!(drag.update(new_pos), None);
        assert_eq!(drag.last_pos, Some(new_pos));
    }

    #[test]
    fn ghost_is_centered_on_pointer() {
        let mut drag = DragState::new(DragAxis::Both);
        drag.start_on(Point::new(45.0, 210.0), Point::new(40.0, 200.0));
        assert_eq!(
            drag.ghost_origin(Point::new(70.0, 300.0), 40.0),
            Some(Point::new(65.0, 280.0))
        );
        drag.axis = DragAxis::Vertical;
        assert_eq!(
            drag.ghost_origin(Point::new(70.0, 300.0), 40.0),
            Some(Point::new(40.0, 280.0))
        );
    }

    #[test]
    fn anchor_ignores_axis() {
        let mut drag = DragState::new(DragAxis::Vertical);
        drag.start_on(Point::new(45.0, 210.0), Point::new(40.0, 200.0));
        assert_eq!(drag.anchor(Point::new(10.0, 0.0)), Some(Point::new(5.0, -10.0)));
    }

    #[test]
    fn end_resets_but_keeps_axis() {
        let mut drag = DragState::new(DragAxis::Both);
        drag.start_on(Point::new(10.0, 20.0), Point::new(0.0, 0.0));
        drag.end();
        drag.end();
        assert!(!drag.is_dragging());
        assert!(drag.last_pos.is_none());
        assert_eq!(drag.grab_offset, Vec2::ZERO);
        assert_eq!(drag.axis, DragAxis::Both);
    }

    #[test]
    fn start_overwrites_previous_drag() {
        let mut drag = DragState::default();
        drag.start(Point::new(0.0, 0.0));
        drag.update(Point::new(10.0, 10.0));

        let new_start = Point::new(50.0, 60.0);
        drag.start(new_start);
        assert_eq!(drag.start_pos, Some(new_start));
        assert_eq!(drag.total_offset(Point::new(55.0, 65.0)), Some(Vec2::new(0.0, 5.0)));
    }
}
