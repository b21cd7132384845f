// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_outline --heading-base-level=0

//! Understory Outline: ordered, parented trees for outline and tree-view UIs.
//!
//! This crate owns the canonical structure behind a tree view and nothing
//! about how it is drawn:
//!
//! - [`Outline`]: a generational arena of payloads with parent links and
//!   ordered child lists. Insert above/below a sibling, append into a parent,
//!   detach, remove and re-sort, with cycle rejection and post-sort indices.
//! - [`FlatView`]: a pre-order row projection of an outline with expansion
//!   state, stable [`FlatId`]s across rebuilds, and a transient per-row
//!   hidden flag used while a row is being dragged.
//! - [`Node`]: owned nested trees for bulk loading and export.
//! - `json` (feature `json`): split raw JSON arrays into nodes using a
//!   configurable children field, and join them back.
//!
//! ## Sorting
//!
//! An outline may carry a sort function ([`SortBy`]). It receives the
//! payloads of one sibling list as a mutable slice of references plus the
//! parent payload, and reorders the slice. The outline maps the result back to
//! items by reference address, so payloads that compare equal are still told
//! apart.
//!
//! ```rust
//! use understory_outline::{Node, Outline};
//!
//! #[derive(Debug)]
//! struct File { name: &'static str }
//!
//! let mut outline = Outline::from_nodes(
//!     vec![Node::leaf(File { name: "b" }), Node::leaf(File { name: "a" })],
//!     None,
//! );
//! outline.set_sort_by(Some(Box::new(|files: &mut [&File], _: Option<&File>| {
//!     files.sort_by_key(|f| f.name);
//! })));
//! outline.resort(None);
//!
//! let names: Vec<_> = outline.roots().iter().map(|&id| outline.get(id).unwrap().name).collect();
//! assert_eq!(names, ["a", "b"]);
//!
//! let c = outline.create(File { name: "c" });
//! let a = outline.roots()[0];
//! // Requested above "a", but the sort places it last.
//! assert_eq!(outline.insert_above(a, c), Ok(2));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod flat;
mod id;
#[cfg(feature = "json")]
pub mod json;
mod node;
mod outline;
mod sort;

pub use error::{IntegrityError, IntegrityErrorKind, OutlineError};
pub use flat::{FlatNode, FlatView, RowFlags, VisibleRows};
pub use id::{FlatId, ItemId};
pub use node::Node;
pub use outline::{Ancestors, DepthFirst, Outline};
pub use sort::SortBy;
