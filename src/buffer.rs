//! GrowableBuffer: contiguous storage with an explicit growth policy.
//!
//! This is the only place that decides when and by how much storage
//! grows. Everything above it (`Array`, and through it every keyed
//! container) sees a slice plus count/capacity bookkeeping. Element
//! relocation on growth and on range removal is a plain Rust move, so
//! any `T` qualifies; address-sensitive types belong in `ObjectArray`.

use core::mem;
use core::ops::RangeBounds;

/// Capacity chosen when `required` slots do not fit into `capacity`.
///
/// Grows by half again (never by less than one slot) so that appending
/// stays amortized O(1), and jumps straight to `required` for bulk
/// requests that outrun the geometric step.
#[inline]
pub fn next_capacity(capacity: usize, required: usize) -> usize {
    let geometric = capacity.saturating_add(capacity / 2);
    geometric.max(capacity.saturating_add(1)).max(required)
}

pub struct GrowableBuffer<T> {
    items: Vec<T>,
}

impl<T> GrowableBuffer<T> {
    /// Empty buffer; no allocation happens until the first element.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Make room for at least `required` elements in total.
    pub fn ensure(&mut self, required: usize) {
        let capacity = self.items.capacity();
        if required <= capacity {
            return;
        }
        let target = next_capacity(capacity, required);
        self.items.reserve_exact(target - self.items.len());
        log::trace!(
            "GrowableBuffer<{}>: grew {} -> {}",
            core::any::type_name::<T>(),
            capacity,
            self.items.capacity()
        );
    }

    /// Reserve exactly enough for `total` elements, without the geometric step.
    pub fn reserve_total(&mut self, total: usize) {
        if total > self.items.capacity() {
            self.items.reserve_exact(total - self.items.len());
        }
    }

    /// Release unused capacity. Calling it twice is the same as once.
    pub fn shrink(&mut self) {
        if self.items.capacity() != self.items.len() {
            self.items.shrink_to_fit();
        }
    }

    #[inline]
    pub fn push(&mut self, item: T) -> &mut T {
        let n = self.items.len();
        self.ensure(n + 1);
        self.items.push(item);
        &mut self.items[n]
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Open a gap at `at` and fill it from `fill`, which must yield exactly
    /// `count` elements.
    pub fn insert_iter<I>(&mut self, at: usize, count: usize, fill: I)
    where
        I: IntoIterator<Item = T>,
    {
        debug_assert!(at <= self.items.len());
        self.ensure(self.items.len() + count);
        if at == self.items.len() {
            self.items.extend(fill);
        } else {
            self.items.splice(at..at, fill);
        }
        debug_assert!(self.items.capacity() >= self.items.len());
    }

    pub fn insert(&mut self, at: usize, item: T) {
        self.ensure(self.items.len() + 1);
        self.items.insert(at, item);
    }

    /// Drop the elements in `range` and shift the tail down over them.
    pub fn remove_range<R: RangeBounds<usize>>(&mut self, range: R) {
        self.items.drain(range);
    }

    pub fn remove(&mut self, at: usize) -> T {
        self.items.remove(at)
    }

    /// Keep the elements for which `keep(index, &item)` is true, in order.
    pub fn retain_indexed<F>(&mut self, mut keep: F)
    where
        F: FnMut(usize, &T) -> bool,
    {
        let mut i = 0;
        self.items.retain(|item| {
            let k = keep(i, item);
            i += 1;
            k
        });
    }

    pub fn truncate(&mut self, count: usize) {
        self.items.truncate(count);
    }

    /// Grow to `count` elements by calling `fill`, or truncate to it.
    pub fn resize_with<F: FnMut() -> T>(&mut self, count: usize, fill: F) {
        self.ensure(count);
        self.items.resize_with(count, fill);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Exchange storage with `other` in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.items, &mut other.items);
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }
}

impl<T: Clone> GrowableBuffer<T> {
    pub fn extend_from_slice(&mut self, items: &[T]) {
        self.ensure(self.items.len() + items.len());
        self.items.extend_from_slice(items);
    }
}

impl<T: Clone> Clone for GrowableBuffer<T> {
    fn clone(&self) -> Self {
        let mut items = Vec::with_capacity(self.items.len());
        items.extend_from_slice(&self.items);
        Self { items }
    }
}

impl<T> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
