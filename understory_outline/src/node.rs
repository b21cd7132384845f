// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nested input/output: loading an outline from owned trees and exporting it back.

use alloc::vec::Vec;

use crate::{ItemId, Outline};

/// An owned nested tree node, the exchange format for bulk loading and export.
///
/// Empty and absent children are not distinguished.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node<T> {
    /// Payload.
    pub value: T,
    /// Ordered children.
    pub children: Vec<Self>,
}

impl<T> Node<T> {
    /// A node without children.
    pub fn leaf(value: T) -> Self {
        Self {
            value,
            children: Vec::new(),
        }
    }

    /// A node with the given children.
    pub fn with_children(value: T, children: Vec<Self>) -> Self {
        Self { value, children }
    }

    /// Builder-style: append a child.
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

impl<T> Outline<T> {
    /// Build an outline from nested nodes.
    ///
    /// Nodes deeper than `max_level` (roots are level 0) are dropped together
    /// with their subtrees. Loading keeps input order; install a sort function
    /// and call [`Outline::resort`] to order the result.
    pub fn from_nodes(nodes: Vec<Node<T>>, max_level: Option<usize>) -> Self {
        let mut outline = Self::new();
        outline.load_nodes(None, nodes, max_level);
        outline
    }

    /// Append nested nodes under `parent` (or as roots), keeping input order.
    ///
    /// `max_level` counts from the roots of the whole outline. Returns the ids
    /// of the top-level nodes that were added. Nothing is added under a stale
    /// parent.
    pub fn load_nodes(
        &mut self,
        parent: Option<ItemId>,
        nodes: Vec<Node<T>>,
        max_level: Option<usize>,
    ) -> Vec<ItemId> {
        let base = match parent {
            None => 0,
            Some(p) => match self.depth(p) {
                Some(depth) => depth + 1,
                None => return Vec::new(),
            },
        };
        if max_level.is_some_and(|max| base > max) {
            return Vec::new();
        }
        let mut added = Vec::with_capacity(nodes.len());
        let mut stack: Vec<(Option<ItemId>, usize, Node<T>)> =
            nodes.into_iter().rev().map(|n| (parent, base, n)).collect();
        while let Some((under, level, node)) = stack.pop() {
            let Node { value, children } = node;
            let id = self.create(value);
            self.link_last(under, id);
            if under == parent {
                added.push(id);
            }
            if max_level.is_none_or(|max| level < max) {
                stack.extend(children.into_iter().rev().map(|c| (Some(id), level + 1, c)));
            }
        }
        added
    }

    /// Export the linked tree as nested nodes, cloning payloads.
    pub fn to_nodes(&self) -> Vec<Node<T>>
    where
        T: Clone,
    {
        self.roots()
            .iter()
            .filter_map(|&root| self.subtree_to_node(root))
            .collect()
    }

    /// Export one subtree as a nested node, cloning payloads.
    pub fn subtree_to_node(&self, id: ItemId) -> Option<Node<T>>
    where
        T: Clone,
    {
        let value = self.get(id)?.clone();
        let children = self
            .children(id)
            .iter()
            .filter_map(|&c| self.subtree_to_node(c))
            .collect();
        Some(Node { value, children })
    }

    /// Consume the outline, moving every linked payload into nested nodes.
    ///
    /// Detached items are dropped.
    pub fn into_nodes(mut self) -> Vec<Node<T>> {
        let roots = self.roots().to_vec();
        roots
            .into_iter()
            .filter_map(|root| self.take_subtree(root))
            .collect()
    }

    fn take_subtree(&mut self, id: ItemId) -> Option<Node<T>> {
        let (value, children) = self.take_value(id)?;
        let children = children
            .into_iter()
            .filter_map(|c| self.take_subtree(c))
            .collect();
        Some(Node { value, children })
    }
}
