//! Memory management utilities
//!
//! Per-frame bump arenas for transient render payloads.

use std::ops::Range;

const MIN_CAPACITY: usize = 64;

/// Contiguous run of slots handed out by [`FrameArena::allocate`].
///
/// Spans are plain indices, so they stay valid across arena growth and only
/// lose meaning when the arena is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaSpan {
    start: usize,
    len: usize,
}

impl ArenaSpan {
    pub const EMPTY: ArenaSpan = ArenaSpan { start: 0, len: 0 };

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

/// Append-only buffer with a bump cursor, rewound once per frame.
///
/// Storage is never released on [`reset`](FrameArena::reset); after the first few
/// frames the arena stops touching the heap entirely. Elements past the cursor are
/// kept alive so their allocations (e.g. `String` capacity) are reused on refill.
pub struct FrameArena<T> {
    slots: Vec<T>,
    cursor: usize,
    high_water: usize,
}

impl<T: Default> FrameArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            cursor: 0,
            high_water: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut arena = Self::new();
        arena.slots.resize_with(capacity, T::default);
        arena
    }

    /// Allocate `n` contiguous default-initialized slots and advance the cursor.
    pub fn allocate(&mut self, n: usize) -> ArenaSpan {
        let span = self.bump(n);
        for slot in &mut self.slots[span.range()] {
            *slot = T::default();
        }
        span
    }

    fn bump(&mut self, n: usize) -> ArenaSpan {
        let start = self.cursor;
        let end = start + n;
        if end > self.slots.len() {
            self.grow(end);
        }
        self.cursor = end;
        self.high_water = self.high_water.max(end);
        ArenaSpan { start, len: n }
    }

    fn grow(&mut self, required: usize) {
        let target = required
            .max(self.slots.len().saturating_mul(2))
            .max(MIN_CAPACITY);
        tracing::trace!(from = self.slots.len(), to = target, "frame arena grow");
        self.slots.resize_with(target, T::default);
    }

    /// Rewind the cursor to zero, keeping storage.
    ///
    /// Taking `&mut self` guarantees no slice from the previous generation is
    /// still borrowed.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    #[inline]
    pub fn get(&self, span: ArenaSpan) -> &[T] {
        &self.slots[span.range()]
    }

    #[inline]
    pub fn get_mut(&mut self, span: ArenaSpan) -> &mut [T] {
        &mut self.slots[span.range()]
    }

    /// Slots handed out since the last reset.
    #[inline]
    pub fn len(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Largest cursor position ever reached.
    #[inline]
    pub fn high_water(&self) -> usize {
        self.high_water
    }
}

impl<T: Clone + Default> FrameArena<T> {
    /// Copy `values` into freshly bumped slots.
    pub fn fill(&mut self, values: &[T]) -> ArenaSpan {
        let span = self.bump(values.len());
        self.slots[span.range()].clone_from_slice(values);
        span
    }
}

impl<T: Default> Default for FrameArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_contiguous_and_default() {
        let mut arena = FrameArena::<u32>::new();
        let a = arena.allocate(3);
        let b = arena.allocate(2);

        assert_eq!(a.range(), 0..3);
        assert_eq!(b.range(), 3..5);
        assert_eq!(arena.get(a), &[0, 0, 0]);
        assert_eq!(arena.len(), 5);
    }

    #[test]
    fn growth_preserves_earlier_spans() {
        let mut arena = FrameArena::<u32>::new();
        let first = arena.fill(&[7, 8, 9]);
        let big = arena.allocate(1000);

        assert!(arena.capacity() >= 1003);
        assert_eq!(arena.get(first), &[7, 8, 9]);
        assert_eq!(big.len(), 1000);
    }

    #[test]
    fn reset_rewinds_without_releasing() {
        let mut arena = FrameArena::<u64>::new();
        arena.allocate(500);
        let capacity = arena.capacity();

        arena.reset();
        assert!(arena.is_empty());
        assert_eq!(arena.capacity(), capacity);
        assert_eq!(arena.high_water(), 500);

        let span = arena.allocate(10);
        assert_eq!(span.range(), 0..10);
        assert_eq!(arena.capacity(), capacity);
    }

    #[test]
    fn allocate_clears_reused_slots() {
        let mut arena = FrameArena::<String>::new();
        arena.fill(&["stale".to_string()]);
        arena.reset();

        let span = arena.allocate(1);
        assert_eq!(arena.get(span)[0], "");
    }

    #[test]
    fn fill_overwrites_reused_slots() {
        let mut arena = FrameArena::<String>::new();
        arena.fill(&["one".to_string(), "two".to_string()]);
        arena.reset();

        let span = arena.fill(&["three".to_string()]);
        assert_eq!(arena.get(span), &["three".to_string()]);
    }

    #[test]
    fn empty_allocation_is_harmless() {
        let mut arena = FrameArena::<f32>::new();
        let span = arena.allocate(0);
        assert!(span.is_empty());
        assert!(arena.get(span).is_empty());
        assert_eq!(arena.get(ArenaSpan::EMPTY).len(), 0);
    }
}
