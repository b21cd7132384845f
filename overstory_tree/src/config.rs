// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree view configuration.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::future::Future;
use core::pin::Pin;

use smallvec::SmallVec;
use understory_outline::{Outline, SortBy};
use understory_tree_dnd::{
    AutoScroll, DragAxis, DropPosition, DropQuery, LevelMetrics, SessionConfig, Thresholds,
};

#[cfg(feature = "json")]
use understory_outline::json::{ChildrenField, JsonTreeError};

use crate::change::{ChangeKind, TreeChange};

/// Decides per payload whether its row may start a drag.
pub type CanDragFn<T> = dyn Fn(&T) -> bool;

/// Synchronous drop policy, consulted while hovering.
pub type CanDropFn<T> = dyn Fn(&DropCheck<'_, T>) -> bool;

/// Drop confirmation, consulted once on release.
pub type ConfirmDropFn<T> = dyn Fn(&DropCheck<'_, T>) -> DropVerdict;

/// Decides per payload whether it starts out checked.
pub type SelectedFn<T> = dyn Fn(&T) -> bool;

/// Classes to attach to a payload's row.
pub type NodeClassFn<T> = dyn Fn(&T) -> NodeClass;

/// Name of a nesting level, for styling rows by depth.
pub type LevelNameFn = dyn Fn(usize) -> String;

/// Change handler.
pub type ChangeHandler = dyn Fn(&TreeChange);

/// A proposed drop, with payloads resolved for policy callbacks.
#[derive(Debug)]
pub struct DropCheck<'a, T> {
    /// Payload of the dragged item.
    pub node: &'a T,
    /// Payload of its current parent.
    pub from_parent: Option<&'a T>,
    /// Payload of the parent it would land under.
    pub to_parent: Option<&'a T>,
    /// Where it would land relative to the target.
    pub position: DropPosition,
    /// Payload of the sibling that would precede it.
    pub prev_sibling: Option<&'a T>,
    /// Payload of the sibling that would follow it.
    pub next_sibling: Option<&'a T>,
    /// The same drop in item handles.
    pub query: DropQuery,
}

impl<'a, T> DropCheck<'a, T> {
    /// Resolve the payloads named by `query`. `None` if the dragged item is stale.
    pub fn new(outline: &'a Outline<T>, query: DropQuery) -> Option<Self> {
        let value = |id: Option<_>| id.and_then(|id| outline.get(id));
        Some(Self {
            node: outline.get(query.node)?,
            from_parent: value(query.from_parent),
            to_parent: value(query.to_parent),
            position: query.position,
            prev_sibling: value(query.prev_sibling),
            next_sibling: value(query.next_sibling),
            query,
        })
    }
}

/// Answer of a drop confirmation.
pub enum DropVerdict {
    /// Decided on the spot.
    Ready(bool),
    /// Decided later; the tree stays locked until the future completes or is
    /// dropped.
    Deferred(Pin<Box<dyn Future<Output = bool>>>),
}

impl DropVerdict {
    /// Wrap a future answer.
    pub fn deferred(future: impl Future<Output = bool> + 'static) -> Self {
        Self::Deferred(Box::pin(future))
    }
}

impl From<bool> for DropVerdict {
    fn from(accept: bool) -> Self {
        Self::Ready(accept)
    }
}

impl fmt::Debug for DropVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(accept) => f.debug_tuple("Ready").field(accept).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// One or several CSS-style class names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeClass {
    /// A single string, possibly holding several whitespace-separated names.
    One(String),
    /// A list of strings, each possibly holding several names.
    Many(Vec<String>),
}

impl NodeClass {
    /// Split into individual names, dropping empty ones.
    pub fn into_names(self) -> SmallVec<[String; 2]> {
        let mut names = SmallVec::new();
        match self {
            Self::One(s) => names.extend(s.split_whitespace().map(String::from)),
            Self::Many(list) => {
                for s in &list {
                    names.extend(s.split_whitespace().map(String::from));
                }
            }
        }
        names
    }
}

impl From<&str> for NodeClass {
    fn from(s: &str) -> Self {
        Self::One(String::from(s))
    }
}

impl From<String> for NodeClass {
    fn from(s: String) -> Self {
        Self::One(s)
    }
}

impl From<Vec<String>> for NodeClass {
    fn from(list: Vec<String>) -> Self {
        Self::Many(list)
    }
}

impl From<&[&str]> for NodeClass {
    fn from(list: &[&str]) -> Self {
        Self::Many(list.iter().copied().map(String::from).collect())
    }
}

/// Configuration rejected by [`TreeView::new`](crate::TreeView::new).
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The children field name is empty.
    #[cfg(feature = "json")]
    EmptyChildrenField,
    /// Thresholds are outside `[0, 1]` or not ordered `below < above`.
    InvalidThresholds(Thresholds),
    /// The indent width is zero, negative or NaN.
    NonPositiveIndent(f64),
    /// Levels below `max_level` could never be shown expanded.
    ExpandLevelAboveMax {
        /// Requested initial expansion depth.
        expand_level: usize,
        /// Deepest level loaded.
        max_level: usize,
    },
    /// Raw data does not have the configured nesting shape.
    #[cfg(feature = "json")]
    InvalidData(JsonTreeError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "json")]
            Self::EmptyChildrenField => f.write_str("children field name must not be empty"),
            Self::InvalidThresholds(t) => write!(
                f,
                "drop thresholds must satisfy 0 <= below ({}) < above ({}) <= 1",
                t.below, t.above
            ),
            Self::NonPositiveIndent(indent) => {
                write!(f, "indent width must be positive, got {indent}")
            }
            Self::ExpandLevelAboveMax {
                expand_level,
                max_level,
            } => write!(
                f,
                "expand level {expand_level} is deeper than max level {max_level}"
            ),
            #[cfg(feature = "json")]
            Self::InvalidData(err) => write!(f, "invalid tree data: {err}"),
        }
    }
}

impl core::error::Error for ConfigError {}

#[cfg(feature = "json")]
impl From<JsonTreeError> for ConfigError {
    fn from(err: JsonTreeError) -> Self {
        Self::InvalidData(err)
    }
}

/// Options for a [`TreeView`](crate::TreeView).
///
/// Every field has a default; set the ones you need with the builder methods.
///
/// ```rust
/// use overstory_tree::{ChangeKind, TreeConfig};
///
/// let config = TreeConfig::<u32>::new()
///     .max_level(3)
///     .expand_level(1)
///     .sort_by(|siblings, _parent| siblings.sort())
///     .can_drag(|&id| id != 0)
///     .on(ChangeKind::Reorder, |change| {
///         let _ = change;
///     });
/// assert!(config.validate().is_ok());
/// assert!(TreeConfig::<u32>::new().max_level(1).expand_level(2).validate().is_err());
/// ```
pub struct TreeConfig<T> {
    pub(crate) max_level: Option<usize>,
    pub(crate) expand_level: Option<usize>,
    pub(crate) sort_by: Option<Box<SortBy<T>>>,
    pub(crate) can_drag: Option<Box<CanDragFn<T>>>,
    pub(crate) can_drop: Option<Box<CanDropFn<T>>>,
    pub(crate) confirm_drop: Option<Box<ConfirmDropFn<T>>>,
    pub(crate) node_class: Option<Box<NodeClassFn<T>>>,
    pub(crate) selected: Option<Box<SelectedFn<T>>>,
    pub(crate) level_name: Option<Box<LevelNameFn>>,
    pub(crate) session: SessionConfig,
    #[cfg(feature = "json")]
    pub(crate) children_field: ChildrenField,
    pub(crate) handlers: Vec<(ChangeKind, Box<ChangeHandler>)>,
}

impl<T> Default for TreeConfig<T> {
    fn default() -> Self {
        Self {
            max_level: None,
            expand_level: None,
            sort_by: None,
            can_drag: None,
            can_drop: None,
            confirm_drop: None,
            node_class: None,
            selected: None,
            level_name: None,
            session: SessionConfig::default(),
            #[cfg(feature = "json")]
            children_field: ChildrenField::default(),
            handlers: Vec::new(),
        }
    }
}

impl<T> TreeConfig<T> {
    /// Default configuration: unlimited depth, nothing expanded, insertion
    /// order, every row draggable and every legal drop allowed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop nodes deeper than `level` when loading. Roots are level 0.
    pub fn max_level(mut self, level: usize) -> Self {
        self.max_level = Some(level);
        self
    }

    /// Expand rows above `level` after loading.
    pub fn expand_level(mut self, level: usize) -> Self {
        self.expand_level = Some(level);
        self
    }

    /// Order siblings. See [`SortBy`].
    pub fn sort_by(mut self, sort: impl Fn(&mut [&T], Option<&T>) + 'static) -> Self {
        self.sort_by = Some(Box::new(sort));
        self
    }

    /// Decide which rows may start a drag.
    pub fn can_drag(mut self, f: impl Fn(&T) -> bool + 'static) -> Self {
        self.can_drag = Some(Box::new(f));
        self
    }

    /// Veto structurally legal drops while hovering.
    pub fn can_drop(mut self, f: impl Fn(&DropCheck<'_, T>) -> bool + 'static) -> Self {
        self.can_drop = Some(Box::new(f));
        self
    }

    /// Confirm each drop on release, possibly asynchronously.
    ///
    /// With a confirmation installed, drops are no longer applied by
    /// [`TreeView::drag`](crate::TreeView::drag); pass each decision to
    /// [`TreeView::complete_drop`](crate::TreeView::complete_drop).
    pub fn confirm_drop(
        mut self,
        f: impl Fn(&DropCheck<'_, T>) -> DropVerdict + 'static,
    ) -> Self {
        self.confirm_drop = Some(Box::new(f));
        self
    }

    /// Attach classes to rows.
    pub fn node_class(mut self, f: impl Fn(&T) -> NodeClass + 'static) -> Self {
        self.node_class = Some(Box::new(f));
        self
    }

    /// Check matching items, with their descendants, whenever data is
    /// loaded.
    pub fn selected(mut self, f: impl Fn(&T) -> bool + 'static) -> Self {
        self.selected = Some(Box::new(f));
        self
    }

    /// Name nesting levels. The default is `level-{n}`.
    pub fn level_name(mut self, f: impl Fn(usize) -> String + 'static) -> Self {
        self.level_name = Some(Box::new(f));
        self
    }

    /// Let the ghost follow the pointer on both axes, or only vertically.
    pub fn drag_axis(mut self, axis: DragAxis) -> Self {
        self.session.axis = axis;
        self
    }

    /// Above/below/center classification thresholds.
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.session.thresholds = thresholds;
        self
    }

    /// Horizontal layout constants.
    pub fn metrics(mut self, metrics: LevelMetrics) -> Self {
        self.session.metrics = metrics;
        self
    }

    /// Hover time before a collapsed row expands, in host clock units.
    pub fn auto_expand_delay(mut self, delay: u64) -> Self {
        self.session.expand_delay = delay;
        self
    }

    /// Edge-band auto-scroll.
    pub fn scroll(mut self, scroll: AutoScroll) -> Self {
        self.session.scroll = scroll;
        self
    }

    /// Field holding the children of raw JSON objects.
    #[cfg(feature = "json")]
    pub fn children_field(mut self, field: impl Into<ChildrenField>) -> Self {
        self.children_field = field.into();
        self
    }

    /// Call `handler` for every change of `kind`.
    pub fn on(mut self, kind: ChangeKind, handler: impl Fn(&TreeChange) + 'static) -> Self {
        self.handlers.push((kind, Box::new(handler)));
        self
    }

    /// The drag session settings derived from this configuration.
    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    /// Check the options against each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        #[cfg(feature = "json")]
        if let ChildrenField::Name(name) = &self.children_field
            && name.is_empty()
        {
            return Err(ConfigError::EmptyChildrenField);
        }
        let thresholds = self.session.thresholds;
        if !thresholds.is_valid() {
            return Err(ConfigError::InvalidThresholds(thresholds));
        }
        let indent = self.session.metrics.indent;
        if indent.is_nan() || indent <= 0.0 {
            return Err(ConfigError::NonPositiveIndent(indent));
        }
        if let (Some(expand_level), Some(max_level)) = (self.expand_level, self.max_level)
            && expand_level > max_level
        {
            return Err(ConfigError::ExpandLevelAboveMax {
                expand_level,
                max_level,
            });
        }
        Ok(())
    }

    pub(crate) fn level_name_of(&self, level: usize) -> String {
        match &self.level_name {
            Some(f) => f(level),
            None => format!("level-{level}"),
        }
    }

    pub(crate) fn notify(&self, change: &TreeChange) {
        let kind = change.kind();
        for (_, handler) in self.handlers.iter().filter(|(k, _)| *k == kind) {
            handler(change);
        }
    }
}

impl<T> fmt::Debug for TreeConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("TreeConfig");
        s.field("max_level", &self.max_level)
            .field("expand_level", &self.expand_level)
            .field("has_sort_by", &self.sort_by.is_some())
            .field("has_can_drag", &self.can_drag.is_some())
            .field("has_can_drop", &self.can_drop.is_some())
            .field("has_confirm_drop", &self.confirm_drop.is_some())
            .field("has_node_class", &self.node_class.is_some())
            .field("has_selected", &self.selected.is_some())
            .field("has_level_name", &self.level_name.is_some())
            .field("session", &self.session);
        #[cfg(feature = "json")]
        s.field("children_field", &self.children_field);
        s.field("handlers", &self.handlers.len()).finish()
    }
}
