// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_timing --heading-base-level=0

//! Understory Timing: host-agnostic timer queues for UI runtimes.
//!
//! UI state machines often need "do this unless something changes within N
//! milliseconds": hover-to-expand, long press, tooltip delays. This crate keeps
//! the deadlines; the host keeps the clock. Every call takes the current time
//! as a plain `u64` in whatever monotonic unit the host uses (milliseconds by
//! convention), so the queue works the same under a browser event loop, a
//! native frame clock, or a test that advances time by hand.
//!
//! ## Example
//!
//! ```rust
//! use understory_timing::TimerQueue;
//!
//! let mut timers = TimerQueue::new();
//! let expand = timers.schedule_after(1_000, 300, "expand");
//! let _tooltip = timers.schedule_after(1_000, 500, "tooltip");
//! assert_eq!(timers.next_deadline(), Some(1_300));
//!
//! // Nothing is due yet.
//! assert_eq!(timers.pop_due(1_299), None);
//! assert_eq!(timers.pop_due(1_300), Some((expand, "expand")));
//!
//! // Cancelled timers never fire.
//! timers.clear();
//! assert!(timers.drain_due(10_000).is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

/// Handle for a scheduled timer, unique within its queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Entry<K> {
    deadline: u64,
    id: TimerId,
    key: K,
}

/// Deadline-ordered one-shot timers carrying a key of type `K`.
///
/// Timers with the same deadline fire in the order they were scheduled.
#[derive(Clone, Debug)]
pub struct TimerQueue<K> {
    /// Sorted by `(deadline, id)`.
    entries: Vec<Entry<K>>,
    next_id: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TimerQueue<K> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schedule `key` to fire at `deadline`.
    pub fn schedule_at(&mut self, deadline: u64, key: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        // Later ids sort after equal deadlines, keeping FIFO order.
        let at = self.entries.partition_point(|e| e.deadline <= deadline);
        self.entries.insert(at, Entry { deadline, id, key });
        id
    }

    /// Schedule `key` to fire `delay` after `now`.
    pub fn schedule_after(&mut self, now: u64, delay: u64, key: K) -> TimerId {
        self.schedule_at(now.saturating_add(delay), key)
    }

    /// Cancel a pending timer, returning its key.
    pub fn cancel(&mut self, id: TimerId) -> Option<K> {
        let at = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(at).key)
    }

    /// Cancel every pending timer whose key matches, returning how many were removed.
    pub fn cancel_where(&mut self, mut matches: impl FnMut(&K) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !matches(&e.key));
        before - self.entries.len()
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether `id` is still pending.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Deadline of a pending timer.
    pub fn deadline_of(&self, id: TimerId) -> Option<u64> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.deadline)
    }

    /// The earliest pending deadline, for hosts that arm a single OS timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.first().map(|e| e.deadline)
    }

    /// Remove and return the earliest timer whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<(TimerId, K)> {
        if self.entries.first()?.deadline > now {
            return None;
        }
        let entry = self.entries.remove(0);
        Some((entry.id, entry.key))
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn drain_due(&mut self, now: u64) -> Vec<(TimerId, K)> {
        let due = self.entries.partition_point(|e| e.deadline <= now);
        self.entries.drain(..due).map(|e| (e.id, e.key)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn fires_in_deadline_order() {
        let mut q = TimerQueue::new();
        let late = q.schedule_at(50, 'l');
        let early = q.schedule_at(10, 'e');
        assert_eq!(q.next_deadline(), Some(10));
        assert_eq!(q.drain_due(100), vec![(early, 'e'), (late, 'l')]);
        assert!(q.is_empty());
    }

    #[test]
    fn equal_deadlines_are_fifo() {
        let mut q = TimerQueue::new();
        let a = q.schedule_at(5, 1);
        let b = q.schedule_at(5, 2);
        let c = q.schedule_at(5, 3);
        assert_eq!(q.drain_due(5), vec![(a, 1), (b, 2), (c, 3)]);
    }

    #[test]
    fn deadline_is_inclusive() {
        let mut q = TimerQueue::new();
        let id = q.schedule_after(100, 300, ());
        assert_eq!(q.deadline_of(id), Some(400));
        assert_eq!(q.pop_due(399), None);
        assert!(q.is_pending(id));
        assert_eq!(q.pop_due(400), Some((id, ())));
        assert!(!q.is_pending(id));
    }

    #[test]
    fn cancel_removes_only_that_timer() {
        let mut q = TimerQueue::new();
        let a = q.schedule_at(1, "a");
        let b = q.schedule_at(2, "b");
        assert_eq!(q.cancel(a), Some("a"));
        assert_eq!(q.cancel(a), None);
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop_due(10), Some((b, "b")));
    }

    #[test]
    fn cancel_where_filters_by_key() {
        let mut q = TimerQueue::new();
        q.schedule_at(1, 10);
        q.schedule_at(2, 11);
        q.schedule_at(3, 10);
        assert_eq!(q.cancel_where(|k| *k == 10), 2);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn saturating_schedule_never_wraps() {
        let mut q = TimerQueue::new();
        let id = q.schedule_after(u64::MAX - 1, 10, ());
        assert_eq!(q.deadline_of(id), Some(u64::MAX));
        assert_eq!(q.pop_due(u64::MAX - 1), None);
    }
}
