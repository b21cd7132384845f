// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree locking.

use alloc::rc::Rc;
use core::cell::Cell;

#[derive(Debug, Default)]
struct LockState {
    manual: Cell<bool>,
    pending: Cell<usize>,
}

/// Shared lock flag of a [`TreeView`](crate::TreeView).
///
/// The tree is locked while the host holds a manual lock
/// ([`TreeView::lock_tree`](crate::TreeView::lock_tree)) or while any
/// [`LockGuard`] is alive. Guards are counted separately from the manual lock,
/// so releasing a guard never undoes a manual lock and vice versa.
///
/// Clones share state; hand one to code that needs to observe the lock while
/// the view itself is borrowed.
#[derive(Clone, Debug, Default)]
pub struct TreeLock(Rc<LockState>);

impl TreeLock {
    /// Create an unlocked lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether toggling and reordering are currently refused.
    pub fn is_locked(&self) -> bool {
        self.0.manual.get() || self.0.pending.get() > 0
    }

    /// Whether the manual lock is set.
    pub fn is_manual(&self) -> bool {
        self.0.manual.get()
    }

    /// Number of live guards.
    pub fn guards(&self) -> usize {
        self.0.pending.get()
    }

    pub(crate) fn set_manual(&self, locked: bool) {
        self.0.manual.set(locked);
    }

    /// Lock until the returned guard is dropped.
    pub fn hold(&self) -> LockGuard {
        let pending = self.0.pending.get() + 1;
        self.0.pending.set(pending);
        #[cfg(feature = "tracing")]
        tracing::trace!(pending, "tree lock acquired");
        LockGuard { lock: self.clone() }
    }
}

/// Keeps a [`TreeLock`] locked while alive.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard {
    lock: TreeLock,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let state = &self.lock.0;
        let pending = state.pending.get().saturating_sub(1);
        state.pending.set(pending);
        #[cfg(feature = "tracing")]
        tracing::trace!(pending, "tree lock released");
    }
}
