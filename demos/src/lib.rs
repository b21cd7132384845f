// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helpers shared by the tree demos: sample data, a fixed layout and
//! plain-text rendering.

use kurbo::{Point, Size};
use overstory_tree::TreeView;
use serde_json::{Value, json};
use understory_tree_dnd::{DragEffect, FixedRowGeometry};

/// Row height used by every demo.
pub const ROW_HEIGHT: f64 = 40.0;

/// A small project tree, children stored under `"children"`.
pub fn sample_data() -> Value {
    json!([
        { "name": "docs", "children": [{ "name": "guide.md" }, { "name": "api.md" }] },
        { "name": "src", "children": [{ "name": "lib.rs" }, { "name": "view.rs" }] },
        { "name": "README.md" }
    ])
}

/// Lay the shown rows out top to bottom from y = 200, 40px per level.
pub fn layout<T>(view: &TreeView<T>) -> FixedRowGeometry {
    FixedRowGeometry::layout(
        view.flat(),
        Point::new(0.0, 200.0),
        Size::new(320.0, ROW_HEIGHT),
        40.0,
        1_000.0,
    )
}

/// The `"name"` field of a payload, or `?`.
pub fn name(value: &Value) -> &str {
    value.get("name").and_then(Value::as_str).unwrap_or("?")
}

/// Print the shown rows, indented by level.
pub fn print_rows(view: &TreeView<Value>) {
    for row in view.visible_rows() {
        let marker = match (row.is_expandable(), view.flat().is_expanded(row.id)) {
            (false, _) => ' ',
            (true, true) => '-',
            (true, false) => '+',
        };
        let label = view.get(row.item).map_or("?", name);
        println!("  {:indent$}{marker} {label}", "", indent = row.level * 2);
    }
}

/// One-line description of a drag effect.
pub fn describe(view: &TreeView<Value>, effect: &DragEffect) -> String {
    let row_name = |row| {
        view.flat()
            .item_of(row)
            .and_then(|item| view.get(item))
            .map_or("?", name)
    };
    match effect {
        DragEffect::Started { row, .. } => format!("started dragging {}", row_name(*row)),
        DragEffect::GhostMoved(origin) => format!("ghost at ({:.0}, {:.0})", origin.x, origin.y),
        DragEffect::Highlight(Some(row)) => format!("highlight {}", row_name(*row)),
        DragEffect::Expand(row) => format!("auto-expanded {}", row_name(*row)),
        DragEffect::Indicator(Some(indicator)) => format!(
            "insertion line at ({:.0}, {:.0}), level {}",
            indicator.origin.x, indicator.origin.y, indicator.level
        ),
        DragEffect::Dropped(decision) => format!(
            "drop {} {} {}",
            view.get(decision.dragged).map_or("?", name),
            decision.position,
            view.get(decision.target).map_or("?", name),
        ),
        other => format!("{other:?}"),
    }
}
