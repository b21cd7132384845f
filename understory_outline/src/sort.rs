// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping sorted payload references back to item handles.

use alloc::vec;
use alloc::vec::Vec;
use core::ptr;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::ItemId;

/// Caller-supplied sibling ordering.
///
/// Receives the payloads of one sibling list and the payload of their parent
/// (`None` for the root sequence), and reorders the slice in place. Only the
/// order of the references matters: the outline matches each returned
/// reference to its item by address.
pub type SortBy<T> = dyn Fn(&mut [&T], Option<&T>);

/// Rebuild an id list from `sorted`, a permutation of `values`.
///
/// `values[i]` is the payload of `ids[i]`. Each reference in `sorted` claims
/// the earliest unclaimed id whose payload lives at the same address. Ids that
/// were never claimed (because a reference was repeated) keep their original
/// relative order at the end.
pub(crate) fn map_by_identity<T>(ids: &[ItemId], values: &[&T], sorted: &[&T]) -> Vec<ItemId> {
    let mut by_address: HashMap<*const T, SmallVec<[usize; 1]>> =
        HashMap::with_capacity(values.len());
    for (i, value) in values.iter().enumerate().rev() {
        by_address.entry(ptr::from_ref(*value)).or_default().push(i);
    }

    let mut claimed = vec![false; ids.len()];
    let mut order = Vec::with_capacity(ids.len());
    for value in sorted {
        if let Some(queue) = by_address.get_mut(&ptr::from_ref(*value))
            && let Some(i) = queue.pop()
        {
            claimed[i] = true;
            order.push(ids[i]);
        }
    }
    order.extend(
        ids.iter()
            .zip(&claimed)
            .filter(|(_, taken)| !**taken)
            .map(|(id, _)| *id),
    );
    order
}
