// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-row actions.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use understory_outline::ItemId;

enum ActionKind<T> {
    Item(Box<dyn Fn(ItemId, &T)>),
    Group(Vec<TreeAction<T>>),
}

/// A command offered on a row, or a named group of them.
///
/// Visibility is decided per payload: an item is shown when its `show`
/// predicate passes (or it has none); a group is shown when its own predicate
/// passes and at least one child is shown.
///
/// ```rust
/// use overstory_tree::TreeAction;
///
/// let menu = TreeAction::<u32>::group(
///     "Edit",
///     vec![
///         TreeAction::item("Rename", |_, _| {}),
///         TreeAction::item("Delete", |_, _| {}).show(|&n| n != 0),
///     ],
/// );
/// assert!(menu.is_visible(&0));
///
/// let only_delete = TreeAction::<u32>::group(
///     "Danger",
///     vec![TreeAction::item("Delete", |_, _| {}).show(|&n| n != 0)],
/// );
/// assert!(!only_delete.is_visible(&0));
/// ```
pub struct TreeAction<T> {
    label: String,
    show: Option<Box<dyn Fn(&T) -> bool>>,
    kind: ActionKind<T>,
}

impl<T> TreeAction<T> {
    /// An action that runs `click` with the row's item and payload.
    pub fn item(label: impl Into<String>, click: impl Fn(ItemId, &T) + 'static) -> Self {
        Self {
            label: label.into(),
            show: None,
            kind: ActionKind::Item(Box::new(click)),
        }
    }

    /// A named group of actions.
    pub fn group(label: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            label: label.into(),
            show: None,
            kind: ActionKind::Group(children),
        }
    }

    /// Only show this action for payloads that pass `show`.
    pub fn show(mut self, show: impl Fn(&T) -> bool + 'static) -> Self {
        self.show = Some(Box::new(show));
        self
    }

    /// The display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether this is a group.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ActionKind::Group(_))
    }

    /// Children of a group; empty for an item.
    pub fn children(&self) -> &[Self] {
        match &self.kind {
            ActionKind::Group(children) => children,
            ActionKind::Item(_) => &[],
        }
    }

    /// Whether this action is offered for `value`.
    pub fn is_visible(&self, value: &T) -> bool {
        if self.show.as_ref().is_some_and(|show| !show(value)) {
            return false;
        }
        match &self.kind {
            ActionKind::Item(_) => true,
            ActionKind::Group(children) => children.iter().any(|c| c.is_visible(value)),
        }
    }

    /// The children of a group that are offered for `value`.
    pub fn visible_children<'a>(&'a self, value: &'a T) -> impl Iterator<Item = &'a Self> + 'a {
        self.children().iter().filter(move |c| c.is_visible(value))
    }

    /// Run the action for `item`. Returns whether anything ran: groups and
    /// hidden actions do nothing.
    pub fn click(&self, item: ItemId, value: &T) -> bool {
        match &self.kind {
            ActionKind::Item(click) if self.is_visible(value) => {
                click(item, value);
                true
            }
            _ => false,
        }
    }
}

impl<T> fmt::Debug for TreeAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeAction")
            .field("label", &self.label)
            .field("has_show", &self.show.is_some())
            .field("children", &self.children())
            .finish()
    }
}
