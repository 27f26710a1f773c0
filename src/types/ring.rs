//! Fixed-capacity ring buffer for position history

use std::collections::VecDeque;

/// Fixed-capacity FIFO buffer of recent samples.
///
/// This is the foundation for all downstream displacement computation: the
/// newest sample is compared against a lagged window of older entries. The
/// buffer never grows past its capacity; pushing at capacity evicts the
/// oldest entry.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer with the given capacity.
    ///
    /// A capacity of zero is clamped to one so the buffer can always hold
    /// the newest sample.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { items: VecDeque::with_capacity(capacity), capacity }
    }

    /// Push a new item, evicting and returning the oldest if at capacity.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted =
            if self.items.len() == self.capacity { self.items.pop_front() } else { None };
        self.items.push_back(item);
        evicted
    }

    /// Number of items currently held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the buffer holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the buffer has reached its capacity.
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Item at `index`, oldest first.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// The most recently pushed item.
    pub fn newest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Iterate over the half-open index range `[start, end)`, oldest first.
    ///
    /// The range is expected to be pre-clamped into `[0, len)`; an empty or
    /// inverted range yields nothing.
    pub fn range(&self, start: usize, end: usize) -> impl Iterator<Item = &T> {
        self.items.iter().skip(start).take(end.saturating_sub(start))
    }
}
