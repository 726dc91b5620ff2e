//! Cooperative timeline
//!
//! Deferred actions keyed by deadline. Nothing runs on its own: the owner
//! advances the clock once per tick and handles whatever became due, in
//! deadline order (ties broken by insertion order).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::Millis;

#[derive(Debug)]
struct Entry<T> {
    deadline: Millis,
    seq: u64,
    payload: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        (self.deadline, self.seq) == (other.deadline, other.seq)
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.deadline, self.seq).cmp(&(other.deadline, other.seq))
    }
}

/// A min-heap of deadline-keyed payloads plus the current time
#[derive(Debug)]
pub struct Timeline<T> {
    now: Millis,
    seq: u64,
    queue: BinaryHeap<Reverse<Entry<T>>>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    #[inline]
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Schedule at an absolute time. Deadlines in the past fire on the next advance.
    pub fn schedule_at(&mut self, deadline: Millis, payload: T) {
        let seq = self.seq;
        self.seq += 1;
        self.queue.push(Reverse(Entry {
            deadline,
            seq,
            payload,
        }));
    }

    pub fn schedule_after(&mut self, delay: Millis, payload: T) {
        self.schedule_at(self.now.saturating_add(delay), payload);
    }

    /// Move the clock forward by `dt` and return everything now due, each
    /// paired with the deadline it was scheduled for.
    pub fn advance(&mut self, dt: Millis) -> Vec<(Millis, T)> {
        self.now = self.now.saturating_add(dt);
        let mut due = Vec::new();
        while self
            .queue
            .peek()
            .is_some_and(|Reverse(entry)| entry.deadline <= self.now)
        {
            if let Some(Reverse(entry)) = self.queue.pop() {
                due.push((entry.deadline, entry.payload));
            }
        }
        due
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}
