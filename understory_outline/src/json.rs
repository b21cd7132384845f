// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loading and exporting nested JSON data.
//!
//! Raw data is an array of objects whose children live under a configurable
//! field. The field is removed from each payload on load and written back on
//! export.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde_json::Value;

use crate::{Node, Outline};

/// Where the children of a JSON object are stored.
pub enum ChildrenField {
    /// The same field name at every level.
    Name(String),
    /// A field name per level: the children of a level-`n` object are stored
    /// under `f(n)`.
    PerLevel(Box<dyn Fn(usize) -> String>),
}

impl ChildrenField {
    /// Field name holding the children of an object at `level`.
    pub fn name_for(&self, level: usize) -> Cow<'_, str> {
        match self {
            Self::Name(name) => Cow::Borrowed(name),
            Self::PerLevel(f) => Cow::Owned(f(level)),
        }
    }
}

impl Default for ChildrenField {
    fn default() -> Self {
        Self::Name(String::from("children"))
    }
}

impl From<&str> for ChildrenField {
    fn from(name: &str) -> Self {
        Self::Name(String::from(name))
    }
}

impl fmt::Debug for ChildrenField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::PerLevel(_) => f.write_str("PerLevel(..)"),
        }
    }
}

/// Raw JSON data that does not have the expected nesting shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JsonTreeError {
    /// The top-level value is not an array.
    NotAnArray,
    /// An object's children field holds something other than an array or null.
    ChildrenNotAnArray {
        /// Level of the object owning the field.
        level: usize,
        /// The field name that was looked up.
        field: String,
    },
}

impl fmt::Display for JsonTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnArray => f.write_str("tree data must be a JSON array"),
            Self::ChildrenNotAnArray { level, field } => write!(
                f,
                "field `{field}` of a level {level} object must be an array or null"
            ),
        }
    }
}

impl core::error::Error for JsonTreeError {}

/// Split a JSON array into nested nodes, removing each children field from
/// its payload. Levels deeper than `max_level` are dropped.
pub fn nodes_from_json(
    value: Value,
    field: &ChildrenField,
    max_level: Option<usize>,
) -> Result<Vec<Node<Value>>, JsonTreeError> {
    let Value::Array(items) = value else {
        return Err(JsonTreeError::NotAnArray);
    };
    split_level(items, field, 0, max_level)
}

fn split_level(
    items: Vec<Value>,
    field: &ChildrenField,
    level: usize,
    max_level: Option<usize>,
) -> Result<Vec<Node<Value>>, JsonTreeError> {
    let mut nodes = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(mut map) = item else {
            nodes.push(Node::leaf(item));
            continue;
        };
        let name = field.name_for(level);
        let children = match map.remove(name.as_ref()) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(children)) => {
                if max_level.is_none_or(|max| level < max) {
                    split_level(children, field, level + 1, max_level)?
                } else {
                    Vec::new()
                }
            }
            Some(_) => {
                return Err(JsonTreeError::ChildrenNotAnArray {
                    level,
                    field: name.into_owned(),
                });
            }
        };
        nodes.push(Node::with_children(Value::Object(map), children));
    }
    Ok(nodes)
}

/// Join nested nodes back into a JSON array, storing children under `field`.
///
/// Only object payloads can carry children; children of other payloads are
/// dropped. Leaves are written without the field, so a loaded
/// `"children": []` or `"children": null` does not come back on export.
pub fn nodes_to_json(nodes: Vec<Node<Value>>, field: &ChildrenField) -> Value {
    join_level(nodes, field, 0)
}

fn join_level(nodes: Vec<Node<Value>>, field: &ChildrenField, level: usize) -> Value {
    let items = nodes
        .into_iter()
        .map(|Node { value, children }| match value {
            Value::Object(mut map) if !children.is_empty() => {
                let name = field.name_for(level).into_owned();
                map.insert(name, join_level(children, field, level + 1));
                Value::Object(map)
            }
            other => other,
        })
        .collect();
    Value::Array(items)
}

impl Outline<Value> {
    /// Build an outline from a JSON array. See [`nodes_from_json`].
    pub fn from_json(
        value: Value,
        field: &ChildrenField,
        max_level: Option<usize>,
    ) -> Result<Self, JsonTreeError> {
        Ok(Self::from_nodes(nodes_from_json(value, field, max_level)?, None))
    }

    /// Export the linked tree as a JSON array. Leaves lose any empty
    /// children field; see [`nodes_to_json`].
    pub fn to_json(&self, field: &ChildrenField) -> Value {
        nodes_to_json(self.to_nodes(), field)
    }
}
