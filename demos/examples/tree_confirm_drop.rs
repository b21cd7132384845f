// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asynchronous drop confirmation.
//!
//! Every drop is confirmed by a future that completes once the "user" answers.
//! The tree stays locked while the answer is pending. The future is polled
//! by hand with a no-op waker; a real host would hand it to its executor.
//!
//! Run:
//! - `cargo run -p understory_demos --example tree_confirm_drop`

use std::cell::Cell;
use std::future::{Future, poll_fn};
use std::pin::pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use kurbo::Point;
use overstory_tree::{DropVerdict, TreeConfig, TreeView};
use serde_json::Value;
use understory_demos::{describe, layout, name, print_rows, sample_data};
use understory_tree_dnd::{DragEffect, DragInput};

fn main() {
    let answer: Rc<Cell<Option<bool>>> = Rc::new(Cell::new(None));
    let pending_answer = Rc::clone(&answer);
    let config = TreeConfig::<Value>::new()
        .expand_level(1)
        .confirm_drop(move |check| {
            println!(
                "confirm: move {} {} {}?",
                name(check.node),
                check.position,
                check.next_sibling.or(check.prev_sibling).map_or("?", name),
            );
            let answer = Rc::clone(&pending_answer);
            DropVerdict::deferred(poll_fn(move |_| match answer.get() {
                Some(accept) => Poll::Ready(accept),
                None => Poll::Pending,
            }))
        });
    let mut view = TreeView::from_json(sample_data(), config).expect("sample data is valid");
    print_rows(&view);

    // Rows: docs 200, guide.md 240, api.md 280, src 320, lib.rs 360, view.rs 400.
    // Drag `view.rs` above `lib.rs`.
    let geometry = layout(&view);
    let src = view.outline().roots()[1];
    let view_rs = view.outline().children(src)[1];
    let row = view.row_of(view_rs).expect("view.rs has a row");
    let mut decision = None;
    for input in [
        DragInput::Press {
            row,
            pointer: Point::new(45.0, 410.0),
        },
        DragInput::Move {
            pointer: Point::new(45.0, 365.0),
            now: 16,
        },
        DragInput::Release,
    ] {
        for effect in view.drag(input, &geometry) {
            println!("  {}", describe(&view, &effect));
            if let DragEffect::Dropped(d) = effect {
                decision = Some(d);
            }
        }
    }
    let Some(decision) = decision else {
        println!("nothing to confirm");
        return;
    };

    let lock = view.lock_handle();
    let mut cx = Context::from_waker(Waker::noop());
    {
        let mut completion = pin!(view.complete_drop(decision));
        assert!(completion.as_mut().poll(&mut cx).is_pending());
        println!("waiting for an answer, tree locked: {}", lock.is_locked());

        answer.set(Some(true));
        let placed = completion.as_mut().poll(&mut cx);
        println!("answered: {placed:?}, tree locked: {}", lock.is_locked());
    }

    print_rows(&view);
}
