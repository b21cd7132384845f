// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless drag and drop over a JSON tree.
//!
//! Drags `api.md` onto the collapsed `src` folder, waits for it to auto-expand
//! and drops the file into it, printing every effect a renderer would apply.
//!
//! Run:
//! - `cargo run -p understory_demos --example tree_drag_headless`

use kurbo::Point;
use overstory_tree::{ChangeKind, TreeConfig, TreeView};
use serde_json::Value;
use understory_demos::{describe, layout, name, print_rows, sample_data};
use understory_tree_dnd::{DragEffect, DragInput};

fn main() {
    let config = TreeConfig::<Value>::new()
        .children_field("children")
        .can_drag(|value| name(value) != "README.md")
        .on(ChangeKind::Reorder, |change| println!("change: {change:?}"));
    let mut view = TreeView::from_json(sample_data(), config).expect("sample data is valid");

    let docs = view.outline().roots()[0];
    view.toggle(docs);
    println!("Before:");
    print_rows(&view);

    let api = view.outline().children(docs)[1];
    let row = view.row_of(api).expect("api.md has a row");
    let mut geometry = layout(&view);

    // Rows: docs 200, guide.md 240, api.md 280, src 320, README.md 360.
    let inputs = [
        DragInput::Press {
            row,
            pointer: Point::new(45.0, 290.0),
        },
        // Halfway over `src`: a center drop that arms auto-expand.
        DragInput::Move {
            pointer: Point::new(45.0, 340.0),
            now: 1_000,
        },
        DragInput::Tick { now: 1_300 },
        DragInput::Move {
            pointer: Point::new(45.0, 342.0),
            now: 1_320,
        },
        DragInput::Release,
    ];

    for input in inputs {
        println!("{input:?}");
        let effects = view.drag(input, &geometry);
        for effect in &effects {
            println!("  {}", describe(&view, effect));
        }
        if effects.iter().any(|e| matches!(e, DragEffect::Expand(_))) {
            geometry = layout(&view);
        }
    }

    println!("After:");
    print_rows(&view);
    println!(
        "{}",
        serde_json::to_string_pretty(&view.to_json()).expect("JSON values always serialize")
    );
}
