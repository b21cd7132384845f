// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree view facade.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;
use understory_outline::{FlatId, FlatNode, FlatView, ItemId, Node, Outline, OutlineError};
use understory_selection::Selection;
use understory_tree_dnd::{
    DragContext, DragEffect, DragInput, DragSession, DropDecision, DropPolicy, DropPosition,
    DropQuery, RowGeometry,
};

use crate::change::{InsertPosition, TreeChange};
use crate::config::{CanDropFn, ConfigError, DropCheck, DropVerdict, TreeConfig};
use crate::lock::TreeLock;
use crate::selection;

/// Adapts the payload-level `can_drop` callback to the session's policy seam.
struct ConfigPolicy<'a, T> {
    outline: &'a Outline<T>,
    can_drop: Option<&'a CanDropFn<T>>,
}

impl<T> DropPolicy for ConfigPolicy<'_, T> {
    fn can_drop(&self, query: &DropQuery) -> bool {
        let Some(can_drop) = self.can_drop else {
            return true;
        };
        DropCheck::new(self.outline, *query).is_some_and(|check| can_drop(&check))
    }
}

/// A reorderable tree: data, expansion state, checked items, drag session
/// and change events.
///
/// Every structural change goes through the view so that the row projection
/// stays in sync and a [`TreeChange`] is reported to the configured handlers
/// and queued for [`TreeView::take_changes`]. Drop the queue regularly if you
/// rely on handlers only.
///
/// ## Example
///
/// ```rust
/// use overstory_tree::{InsertPosition, TreeChange, TreeConfig, TreeView};
/// use understory_outline::Node;
///
/// let mut view = TreeView::new(
///     vec![Node::leaf("inbox"), Node::leaf("archive")],
///     TreeConfig::new(),
/// )
/// .unwrap();
/// assert_eq!(view.take_changes(), [TreeChange::Init]);
///
/// let inbox = view.outline().roots()[0];
/// let draft = view.append_child("draft", Some(inbox)).unwrap();
/// assert!(view.is_expanded(inbox));
/// assert_eq!(
///     view.take_changes(),
///     [TreeChange::Insert { position: InsertPosition::Into, parent: Some(inbox), node: draft, index: 0 }]
/// );
/// ```
pub struct TreeView<T> {
    outline: Outline<T>,
    flat: FlatView,
    config: TreeConfig<T>,
    session: DragSession,
    lock: TreeLock,
    reorder: bool,
    checked: Selection<ItemId>,
    changes: Vec<TreeChange>,
}

impl<T> fmt::Debug for TreeView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeView")
            .field("outline", &self.outline)
            .field("flat", &self.flat)
            .field("config", &self.config)
            .field("session", &self.session)
            .field("lock", &self.lock)
            .field("reorder", &self.reorder)
            .field("checked", &self.checked.len())
            .field("changes", &self.changes.len())
            .finish()
    }
}

impl<T> TreeView<T> {
    /// Load `nodes`, sort them and expand to the configured level.
    ///
    /// Emits [`TreeChange::Init`].
    pub fn new(nodes: Vec<Node<T>>, mut config: TreeConfig<T>) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut outline = Outline::from_nodes(nodes, config.max_level);
        outline.set_sort_by(config.sort_by.take());
        outline.resort(None);
        let mut view = Self {
            outline,
            flat: FlatView::new(),
            session: DragSession::new(*config.session()),
            config,
            lock: TreeLock::new(),
            reorder: true,
            checked: Selection::new(),
            changes: Vec::new(),
        };
        view.refresh();
        view.apply_expand_level();
        view.apply_initial_selection();
        view.emit(TreeChange::Init);
        Ok(view)
    }

    /// The underlying tree.
    pub fn outline(&self) -> &Outline<T> {
        &self.outline
    }

    /// The row projection, for layout and rendering.
    pub fn flat(&self) -> &FlatView {
        &self.flat
    }

    /// The configuration this view was built with.
    ///
    /// The sort function has moved into the [`Outline`].
    pub fn config(&self) -> &TreeConfig<T> {
        &self.config
    }

    /// The drag session.
    pub fn session(&self) -> &DragSession {
        &self.session
    }

    /// Payload of `item`.
    pub fn get(&self, item: ItemId) -> Option<&T> {
        self.outline.get(item)
    }

    /// Row of `item`.
    pub fn row_of(&self, item: ItemId) -> Option<FlatId> {
        self.flat.flat_of(item)
    }

    /// Shown rows in display order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &FlatNode> + '_ {
        self.flat.visible()
    }

    /// Export the tree as nested nodes.
    pub fn data(&self) -> Vec<Node<T>>
    where
        T: Clone,
    {
        self.outline.to_nodes()
    }

    /// Replace the whole tree, keeping the sort function, and expand to the
    /// configured level again.
    ///
    /// A drag in progress is abandoned without its teardown effects; call
    /// [`TreeView::cancel_drag`] first to render them. The checked items are
    /// replaced by those the `selected` option picks. Emits
    /// [`TreeChange::Init`].
    pub fn set_data(&mut self, nodes: Vec<Node<T>>) {
        self.session.cancel(&mut self.flat);
        self.outline.clear();
        self.outline.load_nodes(None, nodes, self.config.max_level);
        self.outline.resort(None);
        self.flat = FlatView::new();
        self.refresh();
        self.apply_expand_level();
        self.checked.clear();
        self.apply_initial_selection();
        self.emit(TreeChange::Init);
    }

    /// Create `value` as the last child of `parent`, or as the last root.
    ///
    /// The parent is expanded so that the new row is shown. Emits
    /// [`TreeChange::Insert`] with [`InsertPosition::Into`].
    pub fn append_child(&mut self, value: T, parent: Option<ItemId>) -> Result<ItemId, OutlineError> {
        let node = self.place(value, |outline, node| outline.insert_into(parent, node))?;
        if let Some(row) = parent.and_then(|p| self.flat.flat_of(p)) {
            self.flat.expand(row);
        }
        self.finish_insert(InsertPosition::Into, parent, node);
        self.resettle(&[parent]);
        Ok(node)
    }

    /// Create `value` as the sibling just before `target`, subject to sorting.
    ///
    /// Emits [`TreeChange::Insert`] with [`InsertPosition::Above`].
    pub fn insert_above(&mut self, value: T, target: ItemId) -> Result<ItemId, OutlineError> {
        let node = self.place(value, |outline, node| outline.insert_above(target, node))?;
        self.finish_insert(InsertPosition::Above, Some(target), node);
        let parent = self.outline.parent(node);
        self.resettle(&[parent]);
        Ok(node)
    }

    /// Create `value` as the sibling just after `target`, subject to sorting.
    ///
    /// Emits [`TreeChange::Insert`] with [`InsertPosition::Below`].
    pub fn insert_below(&mut self, value: T, target: ItemId) -> Result<ItemId, OutlineError> {
        let node = self.place(value, |outline, node| outline.insert_below(target, node))?;
        self.finish_insert(InsertPosition::Below, Some(target), node);
        let parent = self.outline.parent(node);
        self.resettle(&[parent]);
        Ok(node)
    }

    fn place(
        &mut self,
        value: T,
        link: impl FnOnce(&mut Outline<T>, ItemId) -> Result<usize, OutlineError>,
    ) -> Result<ItemId, OutlineError> {
        let node = self.outline.create(value);
        if let Err(err) = link(&mut self.outline, node) {
            self.outline.remove(node);
            return Err(err);
        }
        self.refresh();
        Ok(node)
    }

    fn finish_insert(&mut self, position: InsertPosition, parent: Option<ItemId>, node: ItemId) {
        let index = self.outline.index_of(node).unwrap_or(0);
        self.emit(TreeChange::Insert {
            position,
            parent,
            node,
            index,
        });
    }

    /// Remove `item` and its subtree, returning its payload.
    ///
    /// Emits [`TreeChange::Remove`], then [`TreeChange::Selection`] if
    /// checked items went with it or the parents settled differently. Stale
    /// handles are ignored.
    pub fn remove_node(&mut self, item: ItemId) -> Option<T> {
        let parent = self.outline.parent(item);
        let value = self.outline.remove(item)?;
        self.refresh();
        self.emit(TreeChange::Remove {
            target: item,
            parent,
        });
        self.resettle(&[parent]);
        Some(value)
    }

    /// Replace the payload of `item`, returning the old one.
    ///
    /// Sibling order is not re-applied; call [`TreeView::manual_resort`] if
    /// the change affects sorting. Emits [`TreeChange::Update`].
    pub fn update_node_value(&mut self, item: ItemId, value: T) -> Result<T, OutlineError> {
        let old = self.outline.replace(item, value)?;
        self.refresh();
        self.emit(TreeChange::Update { node: item });
        Ok(old)
    }

    /// Re-apply the sort function below `item`, or to the whole tree.
    ///
    /// Emits [`TreeChange::ManualReorder`].
    pub fn manual_resort(&mut self, item: Option<ItemId>) {
        self.outline.resort(item);
        self.refresh();
        self.emit(TreeChange::ManualReorder { node: item });
    }

    /// Collapse every row.
    pub fn collapse_all(&mut self) {
        self.flat.collapse_all();
    }

    /// Expand every row.
    pub fn expand_all(&mut self) {
        self.flat.expand_all();
    }

    /// Expand rows above `level` and collapse the rest.
    pub fn expand_to_level(&mut self, level: usize) {
        self.flat.collapse_all();
        self.flat.expand_to_level(level);
    }

    /// Whether `item`'s row is expanded.
    pub fn is_expanded(&self, item: ItemId) -> bool {
        self.flat.flat_of(item).is_some_and(|row| self.flat.is_expanded(row))
    }

    /// Flip the expansion of `item`'s row. Refused while the tree is locked.
    ///
    /// Returns whether anything changed.
    pub fn toggle(&mut self, item: ItemId) -> bool {
        if self.lock.is_locked() {
            return false;
        }
        self.flat
            .flat_of(item)
            .is_some_and(|row| self.flat.toggle(row))
    }

    /// Allow drags to start.
    pub fn enable_reorder(&mut self) {
        self.reorder = true;
    }

    /// Refuse new drags. A drag in progress keeps running; end it with
    /// [`TreeView::cancel_drag`].
    pub fn disable_reorder(&mut self) {
        self.reorder = false;
    }

    /// Whether reordering is enabled, ignoring the lock.
    pub fn is_reorder_enabled(&self) -> bool {
        self.reorder
    }

    /// Whether a drag may start right now.
    pub fn can_reorder(&self) -> bool {
        self.reorder && !self.lock.is_locked()
    }

    /// Disable reordering and refuse expansion toggles.
    pub fn lock_tree(&mut self) {
        self.disable_reorder();
        self.lock.set_manual(true);
        #[cfg(feature = "tracing")]
        tracing::debug!("tree locked");
    }

    /// Undo [`TreeView::lock_tree`]. Pending drop confirmations keep their
    /// own hold on the lock.
    pub fn unlock_tree(&mut self) {
        self.enable_reorder();
        self.lock.set_manual(false);
        #[cfg(feature = "tracing")]
        tracing::debug!("tree unlocked");
    }

    /// Whether the tree is locked, manually or by a pending confirmation.
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// A handle on the lock that can be observed while the view is borrowed,
    /// e.g. during [`TreeView::complete_drop`].
    pub fn lock_handle(&self) -> TreeLock {
        self.lock.clone()
    }

    /// The direct child rows of `item` in display order, or every row for `None`.
    ///
    /// Children of a collapsed item are included.
    pub fn flat_children(&self, item: Option<ItemId>) -> Vec<ItemId> {
        let Some(item) = item else {
            return self.flat.rows().iter().map(|row| row.item).collect();
        };
        let Some(parent) = self.flat.flat_of(item).and_then(|id| self.flat.get(id)) else {
            return Vec::new();
        };
        self.flat
            .subtree(parent.id)
            .iter()
            .filter(|row| row.level == parent.level + 1)
            .map(|row| row.item)
            .collect()
    }

    /// The sibling list `item` belongs to, including `item`.
    pub fn siblings(&self, item: ItemId) -> &[ItemId] {
        self.outline.siblings(item)
    }

    /// Collapse everything, then reveal each item whose payload matches.
    ///
    /// Returns the matches in display order.
    pub fn filter_visible(&mut self, mut matches: impl FnMut(&T) -> bool) -> Vec<ItemId> {
        self.flat.collapse_all();
        let found: Vec<(ItemId, FlatId)> = self
            .flat
            .rows()
            .iter()
            .filter(|row| self.outline.get(row.item).is_some_and(&mut matches))
            .map(|row| (row.item, row.id))
            .collect();
        for &(_, row) in &found {
            self.flat.reveal(row);
        }
        found.into_iter().map(|(item, _)| item).collect()
    }

    /// Class names for `item`'s row.
    pub fn node_classes(&self, item: ItemId) -> SmallVec<[String; 2]> {
        match (&self.config.node_class, self.outline.get(item)) {
            (Some(node_class), Some(value)) => node_class(value).into_names(),
            _ => SmallVec::new(),
        }
    }

    /// Name of the level `item` sits at.
    pub fn level_name(&self, item: ItemId) -> Option<String> {
        Some(self.config.level_name_of(self.outline.depth(item)?))
    }

    /// Checked items, in the order they were checked.
    pub fn selected(&self) -> &[ItemId] {
        self.checked.items()
    }

    /// Whether `item` is checked.
    pub fn is_selected(&self, item: ItemId) -> bool {
        self.checked.contains(&item)
    }

    /// Whether some, but not all, of `item`'s descendants are checked.
    ///
    /// Hosts render this as an indeterminate checkbox.
    pub fn is_partially_selected(&self, item: ItemId) -> bool {
        selection::is_partial(&self.outline, &self.checked, item)
    }

    /// Check `item` and its subtree, then settle its ancestors.
    ///
    /// Returns whether anything changed; emits [`TreeChange::Selection`] if so.
    pub fn select(&mut self, item: ItemId) -> bool {
        let revision = self.checked.revision();
        selection::check(&self.outline, &mut self.checked, item);
        self.selection_changed(revision, Some(item))
    }

    /// Uncheck `item` and its subtree, then settle its ancestors.
    ///
    /// Returns whether anything changed; emits [`TreeChange::Selection`] if so.
    pub fn deselect(&mut self, item: ItemId) -> bool {
        let revision = self.checked.revision();
        selection::uncheck(&self.outline, &mut self.checked, item);
        self.selection_changed(revision, Some(item))
    }

    /// Check `item` if it is unchecked, uncheck it otherwise. See
    /// [`TreeView::select`] and [`TreeView::deselect`].
    pub fn toggle_selection(&mut self, item: ItemId) -> bool {
        if self.is_selected(item) {
            self.deselect(item)
        } else {
            self.select(item)
        }
    }

    /// Uncheck everything.
    ///
    /// Emits [`TreeChange::Selection`] if anything was checked.
    pub fn clear_selection(&mut self) -> bool {
        let revision = self.checked.revision();
        self.checked.clear();
        self.selection_changed(revision, None)
    }

    /// Take every change reported since the last call.
    pub fn take_changes(&mut self) -> Vec<TreeChange> {
        core::mem::take(&mut self.changes)
    }

    /// Feed one drag input to the session.
    ///
    /// Presses are suppressed while reordering is disabled or the tree is
    /// locked. Without a drop confirmation, a [`DragEffect::Dropped`] decision
    /// is applied before this returns; with one, pass it to
    /// [`TreeView::complete_drop`].
    pub fn drag<G: RowGeometry>(&mut self, input: DragInput, geometry: &G) -> Vec<DragEffect> {
        if matches!(input, DragInput::Press { .. }) && !self.can_reorder() {
            return vec![DragEffect::Suppressed];
        }
        let policy = ConfigPolicy {
            outline: &self.outline,
            can_drop: self.config.can_drop.as_deref(),
        };
        let mut cx = DragContext {
            outline: &self.outline,
            flat: &mut self.flat,
            geometry,
            policy: &policy,
        };
        let effects = self.session.handle(input, &mut cx);
        if self.config.confirm_drop.is_none() {
            for effect in &effects {
                if let DragEffect::Dropped(decision) = effect {
                    self.apply_drop(decision);
                }
            }
        }
        effects
    }

    /// End a drag in progress without dropping.
    pub fn cancel_drag(&mut self) -> Vec<DragEffect> {
        self.session.cancel(&mut self.flat)
    }

    /// Move the dragged item as `decision` says, without asking any policy.
    ///
    /// Returns its new index among its siblings, or `None` when the move is
    /// no longer possible (stale handles, or it would nest the item into
    /// itself). Emits [`TreeChange::Reorder`] on success.
    pub fn apply_drop(&mut self, decision: &DropDecision) -> Option<usize> {
        let DropDecision {
            dragged,
            target,
            position,
            ..
        } = *decision;
        let from_parent = self.outline.parent(dragged);
        let placed = match position {
            DropPosition::Above => self.outline.insert_above(target, dragged),
            DropPosition::Below => self.outline.insert_below(target, dragged),
            DropPosition::Center => self.outline.insert_into(Some(target), dragged),
        };
        let index = match placed {
            Ok(index) => index,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %_err, ?decision, "drop discarded");
                return None;
            }
        };
        self.refresh();
        let to_parent = self.outline.parent(dragged);
        #[cfg(feature = "tracing")]
        tracing::debug!(?from_parent, ?to_parent, index, "drop applied");
        self.emit(TreeChange::Reorder {
            from_parent,
            to_parent,
            node: dragged,
            index,
        });
        self.resettle(&[from_parent, to_parent]);
        Some(index)
    }

    /// Ask the drop confirmation about `decision` and apply it if accepted.
    ///
    /// While a deferred answer is pending the tree is locked; the lock is
    /// released when the answer arrives or when this future is dropped.
    /// Without a confirmation installed the drop is applied directly.
    pub async fn complete_drop(&mut self, decision: DropDecision) -> Option<usize> {
        let verdict = match &self.config.confirm_drop {
            None => DropVerdict::Ready(true),
            Some(confirm) => {
                let query = DropQuery::new(
                    &self.outline,
                    decision.dragged,
                    decision.target,
                    decision.position,
                    decision.parent,
                );
                match DropCheck::new(&self.outline, query) {
                    Some(check) => confirm(&check),
                    None => DropVerdict::Ready(false),
                }
            }
        };
        let accepted = match verdict {
            DropVerdict::Ready(accepted) => accepted,
            DropVerdict::Deferred(answer) => {
                let _guard = self.lock.hold();
                answer.await
            }
        };
        if accepted {
            self.apply_drop(&decision)
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(?decision, "drop rejected");
            None
        }
    }

    fn refresh(&mut self) {
        let can_drag = self.config.can_drag.as_deref();
        self.flat
            .rebuild(&self.outline, |_, value| can_drag.is_none_or(|f| f(value)));
    }

    fn apply_expand_level(&mut self) {
        if let Some(level) = self.config.expand_level {
            self.flat.expand_to_level(level);
        }
    }

    fn apply_initial_selection(&mut self) {
        let Some(selected) = &self.config.selected else {
            return;
        };
        let matches: Vec<ItemId> = self
            .outline
            .depth_first()
            .filter(|&(id, _)| self.outline.get(id).is_some_and(|value| selected(value)))
            .map(|(id, _)| id)
            .collect();
        for item in matches {
            selection::check(&self.outline, &mut self.checked, item);
        }
    }

    /// Re-settle the checked state after a structural change below `parents`.
    fn resettle(&mut self, parents: &[Option<ItemId>]) {
        let revision = self.checked.revision();
        selection::purge(&self.outline, &mut self.checked);
        for &parent in parents {
            selection::settle_chain(&self.outline, &mut self.checked, parent);
        }
        self.selection_changed(revision, None);
    }

    fn selection_changed(&mut self, revision: u64, node: Option<ItemId>) -> bool {
        if self.checked.revision() == revision {
            return false;
        }
        let selected = self.checked.items().to_vec();
        self.emit(TreeChange::Selection { node, selected });
        true
    }

    fn emit(&mut self, change: TreeChange) {
        #[cfg(feature = "tracing")]
        tracing::debug!(kind = change.kind().as_str(), ?change, "tree changed");
        self.config.notify(&change);
        self.changes.push(change);
    }
}

#[cfg(feature = "json")]
impl TreeView<serde_json::Value> {
    /// Load raw JSON data, splitting children out through the configured
    /// children field.
    pub fn from_json(
        data: serde_json::Value,
        config: TreeConfig<serde_json::Value>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let nodes = understory_outline::json::nodes_from_json(
            data,
            &config.children_field,
            config.max_level,
        )?;
        Self::new(nodes, config)
    }

    /// Replace the tree with raw JSON data. See [`TreeView::set_data`].
    pub fn set_json(&mut self, data: serde_json::Value) -> Result<(), ConfigError> {
        let nodes = understory_outline::json::nodes_from_json(
            data,
            &self.config.children_field,
            self.config.max_level,
        )?;
        self.set_data(nodes);
        Ok(())
    }

    /// Export the tree as raw JSON, children stored under the configured field.
    ///
    /// Leaves are written without a children field.
    pub fn to_json(&self) -> serde_json::Value {
        self.outline.to_json(&self.config.children_field)
    }
}
