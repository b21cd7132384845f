// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag session state machine.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{Point, Rect};
use understory_event_state::drag::{DragAxis, DragState};
use understory_outline::{FlatId, FlatView, ItemId, Outline};
use understory_timing::{TimerId, TimerQueue};

use crate::classify::{DropPosition, Thresholds};
use crate::geometry::RowGeometry;
use crate::level::LevelMetrics;
use crate::resolve::{DragSubject, DropIndicator, DropPolicy, DropTarget, Resolver};
use crate::row_index::RowIndex;
use crate::scroll::AutoScroll;

/// Tunables for a [`DragSession`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Classification thresholds.
    pub thresholds: Thresholds,
    /// Horizontal layout constants.
    pub metrics: LevelMetrics,
    /// Edge-band auto-scroll.
    pub scroll: AutoScroll,
    /// Which pointer movement the ghost follows.
    pub axis: DragAxis,
    /// How long the pointer must rest over a collapsed row, in host clock
    /// units, before it expands.
    pub expand_delay: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            metrics: LevelMetrics::default(),
            scroll: AutoScroll::default(),
            axis: DragAxis::Vertical,
            expand_delay: 300,
        }
    }
}

/// Pointer and keyboard input, already translated by the host.
///
/// `now` is the host's monotonic clock, in the same unit as
/// [`SessionConfig::expand_delay`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DragInput {
    /// Pointer or touch pressed on a row's drag handle.
    Press {
        /// The pressed row.
        row: FlatId,
        /// Pointer position.
        pointer: Point,
    },
    /// Pointer or touch moved.
    Move {
        /// Pointer position.
        pointer: Point,
        /// Current time.
        now: u64,
    },
    /// Time passed without pointer movement.
    Tick {
        /// Current time.
        now: u64,
    },
    /// Pointer or touch released.
    Release,
    /// The platform cancelled the pointer or touch. Ends the drag like
    /// [`DragInput::Release`], committing a legal target.
    Cancel,
    /// The escape key was pressed. Never commits.
    Escape,
}

/// A committed drop, for the mutation engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DropDecision {
    /// The dragged item.
    pub dragged: ItemId,
    /// The item the drop is relative to.
    pub target: ItemId,
    /// Position relative to `target`.
    pub position: DropPosition,
    /// Parent the dragged item lands under.
    pub parent: Option<ItemId>,
    /// Level the dragged item lands at.
    pub level: usize,
}

/// What the host should do in response to an input, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum DragEffect {
    /// Swallow the input; no session state changed.
    Suppressed,
    /// A drag started on `row`.
    Started {
        /// The dragged row.
        row: FlatId,
        /// The dragged item.
        item: ItemId,
    },
    /// Show a floating copy of `row` at `rect`.
    GhostCreated {
        /// The dragged row.
        row: FlatId,
        /// Initial bounds of the copy.
        rect: Rect,
    },
    /// Move the floating copy's top-left corner.
    GhostMoved(Point),
    /// Remove the floating copy.
    GhostDestroyed,
    /// Render these rows as disabled for the rest of the drag.
    RowsDisabled(Vec<FlatId>),
    /// Render these rows normally again.
    RowsEnabled(Vec<FlatId>),
    /// Scroll the viewport content by `dy`.
    AutoScroll {
        /// Negative scrolls up.
        dy: f64,
    },
    /// Show the insertion line, or hide it with `None`.
    Indicator(Option<DropIndicator>),
    /// Highlight the row a center drop would land in, or clear it.
    Highlight(Option<FlatId>),
    /// Toggle the "cannot drop here" affordance on the ghost.
    NoDrop(bool),
    /// The session expanded this row. Rows below it moved: hosts must pass
    /// updated geometry with the next input.
    Expand(FlatId),
    /// The drag ended with a legal drop.
    Dropped(DropDecision),
    /// The drag ended.
    Ended {
        /// Whether a [`DragEffect::Dropped`] preceded this.
        dropped: bool,
    },
}

/// Everything a session reads (and the expansion state it writes) while handling input.
#[derive(Debug)]
pub struct DragContext<'a, T, G, P> {
    /// The tree being reordered.
    pub outline: &'a Outline<T>,
    /// Its row projection.
    pub flat: &'a mut FlatView,
    /// Current row geometry.
    pub geometry: &'a G,
    /// Caller drop policy.
    pub policy: &'a P,
}

#[derive(Debug)]
struct ActiveDrag {
    subject: DragSubject,
    drag: DragState,
    viewport_height: f64,
    /// Rows hidden from targeting for this drag.
    disabled: Vec<FlatId>,
    /// `None` while scrolling or after geometry changed.
    index: Option<RowIndex>,
    target: Option<DropTarget>,
    expand: Option<(TimerId, FlatId)>,
}

#[derive(Debug)]
enum State {
    Idle,
    Dragging(Box<ActiveDrag>),
}

/// Drag-and-drop controller for one tree: `Idle -> Dragging -> Idle`.
///
/// Feed it input with [`DragSession::handle`]; it answers with the
/// [`DragEffect`]s the host should render. Only one drag runs at a time;
/// pressing again while dragging is suppressed. Every exit path (release,
/// cancel, escape) tears the drag down completely, and tearing down an idle
/// session does nothing.
///
/// ## Example
///
/// ```rust
/// use kurbo::{Point, Size};
/// use understory_outline::{FlatView, Node, Outline};
/// use understory_tree_dnd::{
///     AllowAll, DragContext, DragEffect, DragInput, DragSession, FixedRowGeometry,
/// };
///
/// let outline = Outline::from_nodes(vec![Node::leaf("a"), Node::leaf("b")], None);
/// let mut flat = FlatView::new();
/// flat.rebuild(&outline, |_, _| true);
/// let geometry =
///     FixedRowGeometry::layout(&flat, Point::new(0.0, 200.0), Size::new(200.0, 40.0), 40.0, 1_000.0);
///
/// let a = flat.rows()[0].id;
/// let mut session = DragSession::default();
/// let mut cx = DragContext { outline: &outline, flat: &mut flat, geometry: &geometry, policy: &AllowAll };
///
/// session.handle(DragInput::Press { row: a, pointer: Point::new(10.0, 210.0) }, &mut cx);
/// // Lower part of "b": drop below it.
/// session.handle(DragInput::Move { pointer: Point::new(10.0, 270.0), now: 16 }, &mut cx);
/// let effects = session.handle(DragInput::Release, &mut cx);
/// assert!(matches!(effects.last(), Some(DragEffect::Ended { dropped: true })));
/// ```
#[derive(Debug)]
pub struct DragSession {
    config: SessionConfig,
    timers: TimerQueue<FlatId>,
    state: State,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl DragSession {
    /// Create an idle session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            timers: TimerQueue::new(),
            state: State::Idle,
        }
    }

    /// The session's configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, State::Dragging(_))
    }

    /// The dragged row, while dragging.
    pub fn subject(&self) -> Option<&DragSubject> {
        match &self.state {
            State::Dragging(active) => Some(&active.subject),
            State::Idle => None,
        }
    }

    /// The currently resolved drop target.
    pub fn target(&self) -> Option<&DropTarget> {
        match &self.state {
            State::Dragging(active) => active.target.as_ref(),
            State::Idle => None,
        }
    }

    /// When the pending auto-expand fires, so hosts can arm a timer and send
    /// [`DragInput::Tick`].
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Process one input.
    pub fn handle<T, G, P>(
        &mut self,
        input: DragInput,
        cx: &mut DragContext<'_, T, G, P>,
    ) -> Vec<DragEffect>
    where
        G: RowGeometry,
        P: DropPolicy,
    {
        let mut effects = Vec::new();
        match input {
            DragInput::Press { row, pointer } => self.start(row, pointer, cx, &mut effects),
            DragInput::Move { pointer, now } => {
                if self.fire_due(now, cx.flat, &mut effects) {
                    // `cx.geometry` predates the expansion; resolve on the next input.
                    if let State::Dragging(active) = &mut self.state {
                        move_ghost(active, pointer, &mut effects);
                    }
                } else {
                    self.drag_to(pointer, now, cx, &mut effects);
                }
            }
            DragInput::Tick { now } => {
                self.fire_due(now, cx.flat, &mut effects);
            }
            DragInput::Release | DragInput::Cancel => self.finish(true, cx.flat, &mut effects),
            DragInput::Escape => self.finish(false, cx.flat, &mut effects),
        }
        effects
    }

    /// End any drag without dropping. Safe to call when idle.
    pub fn cancel(&mut self, flat: &mut FlatView) -> Vec<DragEffect> {
        let mut effects = Vec::new();
        self.finish(false, flat, &mut effects);
        effects
    }

    fn start<T, G: RowGeometry, P>(
        &mut self,
        row: FlatId,
        pointer: Point,
        cx: &mut DragContext<'_, T, G, P>,
        effects: &mut Vec<DragEffect>,
    ) {
        if self.is_dragging() {
            effects.push(DragEffect::Suppressed);
            return;
        }
        let Some(node) = cx.flat.get(row).copied() else {
            effects.push(DragEffect::Suppressed);
            return;
        };
        let Some(bounds) = cx.geometry.row_bounds(row).filter(|_| node.can_drag()) else {
            effects.push(DragEffect::Suppressed);
            return;
        };

        let root_x = cx
            .flat
            .root_of(row)
            .and_then(|root| cx.geometry.row_bounds(root))
            .map_or(
                bounds.x0 - self.config.metrics.indent * node.level as f64,
                |r| r.x0,
            );
        let mut drag = DragState::new(self.config.axis);
        drag.start_on(pointer, bounds.origin());
        let subject = DragSubject {
            row,
            item: node.item,
            root_x,
            height: bounds.height(),
            grab_x: drag.grab_offset.x,
        };

        let disabled: Vec<FlatId> = cx.flat.visible_descendants(row).map(|r| r.id).collect();
        for &id in &disabled {
            cx.flat.set_hidden(id, true);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(row = ?row, item = ?node.item, disabled = disabled.len(), "drag started");

        effects.push(DragEffect::Started {
            row,
            item: node.item,
        });
        if !disabled.is_empty() {
            effects.push(DragEffect::RowsDisabled(disabled.clone()));
        }
        effects.push(DragEffect::GhostCreated { row, rect: bounds });

        let index = RowIndex::build(cx.flat, cx.geometry);
        self.timers.clear();
        self.state = State::Dragging(Box::new(ActiveDrag {
            subject,
            drag,
            viewport_height: cx.geometry.viewport_height(),
            disabled,
            index: Some(index),
            target: None,
            expand: None,
        }));
    }

    fn drag_to<T, G: RowGeometry, P: DropPolicy>(
        &mut self,
        pointer: Point,
        now: u64,
        cx: &mut DragContext<'_, T, G, P>,
        effects: &mut Vec<DragEffect>,
    ) {
        let State::Dragging(active) = &mut self.state else {
            return;
        };
        move_ghost(active, pointer, effects);

        if let Some(dy) = self.config.scroll.step_for(pointer.y, active.viewport_height) {
            #[cfg(feature = "tracing")]
            if active.index.is_some() {
                tracing::trace!(dy, "auto-scroll band entered");
            }
            active.index = None;
            cancel_expand(&mut self.timers, active);
            set_target(active, None, effects);
            effects.push(DragEffect::AutoScroll { dy });
            return;
        }

        let index = active
            .index
            .get_or_insert_with(|| RowIndex::build(cx.flat, cx.geometry));
        let resolver = Resolver::new(self.config.thresholds, self.config.metrics);
        let target = resolver.resolve(index, pointer, &active.subject, cx.outline, cx.policy);

        match target {
            Some(t) if t.position == DropPosition::Center && t.target_row != active.subject.row => {
                let same = active.expand.is_some_and(|(_, row)| row == t.target_row);
                if !same {
                    cancel_expand(&mut self.timers, active);
                    let id = self
                        .timers
                        .schedule_after(now, self.config.expand_delay, t.target_row);
                    active.expand = Some((id, t.target_row));
                }
            }
            _ => cancel_expand(&mut self.timers, active),
        }
        set_target(active, target, effects);
    }

    /// Expand rows whose hover timer is due. Returns whether any row expanded.
    ///
    /// The row index is dropped on expansion and rebuilt from the geometry
    /// of the next input, so the host must lay out again after
    /// [`DragEffect::Expand`] before sending more moves.
    fn fire_due(&mut self, now: u64, flat: &mut FlatView, effects: &mut Vec<DragEffect>) -> bool {
        let State::Dragging(active) = &mut self.state else {
            return false;
        };
        let mut expanded = false;
        while let Some((id, row)) = self.timers.pop_due(now) {
            if active.expand.is_some_and(|(pending, _)| pending == id) {
                active.expand = None;
            }
            if row == active.subject.row || active.disabled.contains(&row) {
                continue;
            }
            let expandable = flat.get(row).is_some_and(|r| r.is_expandable());
            if expandable && flat.expand(row) {
                #[cfg(feature = "tracing")]
                tracing::debug!(row = ?row, "auto-expanded");
                active.index = None;
                effects.push(DragEffect::Expand(row));
                expanded = true;
            }
        }
        expanded
    }

    fn finish(&mut self, commit: bool, flat: &mut FlatView, effects: &mut Vec<DragEffect>) {
        let State::Dragging(active) = core::mem::replace(&mut self.state, State::Idle) else {
            return;
        };
        let mut active = *active;
        self.timers.clear();

        effects.push(DragEffect::GhostDestroyed);
        let decision = active
            .target
            .filter(|t| commit && t.legal)
            .map(|t| DropDecision {
                dragged: active.subject.item,
                target: t.target,
                position: t.position,
                parent: t.parent,
                level: t.level,
            });
        set_target(&mut active, None, effects);
        for &id in &active.disabled {
            flat.set_hidden(id, false);
        }
        if !active.disabled.is_empty() {
            effects.push(DragEffect::RowsEnabled(core::mem::take(&mut active.disabled)));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(row = ?active.subject.row, decision = ?decision, "drag ended");

        if let Some(decision) = decision {
            effects.push(DragEffect::Dropped(decision));
        }
        effects.push(DragEffect::Ended {
            dropped: decision.is_some(),
        });
    }
}

fn move_ghost(active: &mut ActiveDrag, pointer: Point, effects: &mut Vec<DragEffect>) {
    active.drag.update(pointer);
    if let Some(origin) = active.drag.ghost_origin(pointer, active.subject.height) {
        effects.push(DragEffect::GhostMoved(origin));
    }
}

fn cancel_expand(timers: &mut TimerQueue<FlatId>, active: &mut ActiveDrag) {
    if let Some((id, _)) = active.expand.take() {
        timers.cancel(id);
    }
}

/// Replace the current target, emitting effects for what changed.
fn set_target(active: &mut ActiveDrag, next: Option<DropTarget>, effects: &mut Vec<DragEffect>) {
    let prev = active.target.take();
    let indicator = |t: &Option<DropTarget>| t.and_then(|t| t.indicator);
    let highlight = |t: &Option<DropTarget>| {
        t.filter(|t| t.legal && t.position == DropPosition::Center)
            .map(|t| t.target_row)
    };
    let no_drop = |t: &Option<DropTarget>| t.is_some_and(|t| !t.legal);

    if indicator(&prev) != indicator(&next) {
        effects.push(DragEffect::Indicator(indicator(&next)));
    }
    if highlight(&prev) != highlight(&next) {
        effects.push(DragEffect::Highlight(highlight(&next)));
    }
    if no_drop(&prev) != no_drop(&next) {
        effects.push(DragEffect::NoDrop(no_drop(&next)));
    }
    active.target = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use kurbo::Size;
    use understory_outline::Node;

    use crate::geometry::FixedRowGeometry;
    use crate::resolve::AllowAll;

    fn setup() -> (Outline<u32>, FlatView, FixedRowGeometry) {
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
        let geometry = layout(&flat);
        (outline, flat, geometry)
    }

    fn layout(flat: &FlatView) -> FixedRowGeometry {
        FixedRowGeometry::layout(
            flat,
            Point::new(0.0, 200.0),
            Size::new(300.0, 40.0),
            40.0,
            1_000.0,
        )
    }

    #[test]
    fn press_disables_visible_descendants() {
        let (outline, mut flat, geometry) = setup();
        let one = flat.rows()[0].id;
        let mut session = DragSession::default();
        let mut cx = DragContext {
            outline: &outline,
            flat: &mut flat,
            geometry: &geometry,
            policy: &AllowAll,
        };
        let effects = session.handle(
            DragInput::Press {
                row: one,
                pointer: Point::new(10.0, 210.0),
            },
            &mut cx,
        );
        let children = vec![flat_row(cx.flat, 1), flat_row(cx.flat, 2)];
        assert!(effects.contains(&DragEffect::RowsDisabled(children.clone())));
        assert!(children.iter().all(|&c| cx.flat.is_hidden(c)));

        let effects = session.handle(DragInput::Escape, &mut cx);
        assert!(effects.contains(&DragEffect::RowsEnabled(children.clone())));
        assert!(children.iter().all(|&c| !cx.flat.is_hidden(c)));
    }

    fn flat_row(flat: &FlatView, n: usize) -> FlatId {
        flat.rows()[n].id
    }

    #[test]
    fn second_press_is_suppressed() {
        let (outline, mut flat, geometry) = setup();
        let four = flat_row(&flat, 3);
        let two = flat_row(&flat, 1);
        let mut session = DragSession::default();
        let mut cx = DragContext {
            outline: &outline,
            flat: &mut flat,
            geometry: &geometry,
            policy: &AllowAll,
        };
        let press = |row| DragInput::Press {
            row,
            pointer: Point::new(10.0, 330.0),
        };
        assert!(!session.handle(press(four), &mut cx).contains(&DragEffect::Suppressed));
        assert_eq!(session.handle(press(two), &mut cx), vec![DragEffect::Suppressed]);
        assert_eq!(session.subject().map(|s| s.row), Some(four));
    }

    #[test]
    fn undraggable_row_is_suppressed() {
        let (outline, mut flat, geometry) = setup();
        flat.rebuild(&outline, |_, v| *v != 4);
        let four = flat_row(&flat, 3);
        let mut session = DragSession::default();
        let mut cx = DragContext {
            outline: &outline,
            flat: &mut flat,
            geometry: &geometry,
            policy: &AllowAll,
        };
        let effects = session.handle(
            DragInput::Press {
                row: four,
                pointer: Point::new(10.0, 330.0),
            },
            &mut cx,
        );
        assert_eq!(effects, vec![DragEffect::Suppressed]);
        assert!(!session.is_dragging());
    }

    #[test]
    fn release_without_target_drops_nothing() {
        let (outline, mut flat, geometry) = setup();
        let four = flat_row(&flat, 3);
        let mut session = DragSession::default();
        let mut cx = DragContext {
            outline: &outline,
            flat: &mut flat,
            geometry: &geometry,
            policy: &AllowAll,
        };
        session.handle(
            DragInput::Press {
                row: four,
                pointer: Point::new(10.0, 330.0),
            },
            &mut cx,
        );
        let effects = session.handle(DragInput::Release, &mut cx);
        assert_eq!(
            effects,
            vec![DragEffect::GhostDestroyed, DragEffect::Ended { dropped: false }]
        );
        assert!(session.handle(DragInput::Release, &mut cx).is_empty());
    }

    #[test]
    fn ghost_follows_axis() {
        let (outline, mut flat, geometry) = setup();
        let four = flat_row(&flat, 3);
        let mut session = DragSession::new(SessionConfig {
            axis: DragAxis::Both,
            ..SessionConfig::default()
        });
        let mut cx = DragContext {
            outline: &outline,
            flat: &mut flat,
            geometry: &geometry,
            policy: &AllowAll,
        };
        session.handle(
            DragInput::Press {
                row: four,
                pointer: Point::new(10.0, 330.0),
            },
            &mut cx,
        );
        let effects = session.handle(
            DragInput::Move {
                pointer: Point::new(50.0, 500.0),
                now: 10,
            },
            &mut cx,
        );
        assert_eq!(effects[0], DragEffect::GhostMoved(Point::new(40.0, 480.0)));
    }
}
