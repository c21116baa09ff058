//! Array: ordered growable sequence with explicit growth and removal contracts.
//!
//! Soft failures (inserting at `at > count`, inserting zero elements)
//! return `false`. Reading or removing outside the live range is a hard
//! precondition and panics. `remove_sorted` trusts its caller: the list
//! must be strictly ascending, which is only verified in verifying builds.

use crate::buffer::GrowableBuffer;
use crate::sequence::Sequence;
use crate::verify::{is_strictly_ascending, verify};
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops;

pub struct Array<T> {
    buf: GrowableBuffer<T>,
}

impl<T> Array<T> {
    /// Empty array; the first allocation happens on the first add.
    pub const fn new() -> Self {
        Self {
            buf: GrowableBuffer::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: GrowableBuffer::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.buf.count()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.count() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Append `item` and return a reference to it in its new slot.
    #[inline]
    pub fn add(&mut self, item: T) -> &mut T {
        self.buf.push(item)
    }

    pub fn add_default(&mut self) -> &mut T
    where
        T: Default,
    {
        self.buf.push(T::default())
    }

    /// Append clones of `items`.
    pub fn append(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.buf.extend_from_slice(items);
    }

    /// Move every element of `other` to the end of `self`.
    pub fn append_pick(&mut self, other: Array<T>) {
        let n = other.count();
        let at = self.count();
        self.buf.insert_iter(at, n, other.buf.into_vec());
    }

    pub fn insert(&mut self, at: usize, item: T) -> bool {
        if at > self.count() {
            return false;
        }
        self.buf.insert(at, item);
        true
    }

    /// Insert `count` clones of `item` at `at`.
    pub fn insert_n(&mut self, at: usize, count: usize, item: &T) -> bool
    where
        T: Clone,
    {
        if count == 0 || at > self.count() {
            return false;
        }
        self.buf
            .insert_iter(at, count, core::iter::repeat(item).take(count).cloned());
        true
    }

    pub fn insert_slice(&mut self, at: usize, items: &[T]) -> bool
    where
        T: Clone,
    {
        if items.is_empty() || at > self.count() {
            return false;
        }
        self.buf.insert_iter(at, items.len(), items.iter().cloned());
        true
    }

    /// Move every element of `other` into `self` starting at `at`.
    pub fn insert_pick(&mut self, at: usize, other: Array<T>) -> bool {
        if other.is_empty() || at > self.count() {
            return false;
        }
        let n = other.count();
        self.buf.insert_iter(at, n, other.buf.into_vec());
        true
    }

    /// Insert a copy of `self[src]` at `at`.
    ///
    /// The source lives in the storage that is about to shift (and maybe
    /// reallocate), so the value is cloned out before the gap is opened.
    pub fn insert_from(&mut self, at: usize, src: usize) -> bool
    where
        T: Clone,
    {
        if at > self.count() || src >= self.count() {
            return false;
        }
        let item = self.buf.as_slice()[src].clone();
        self.buf.insert(at, item);
        true
    }

    /// Drop `count` elements starting at `at` and shift the tail down.
    pub fn remove(&mut self, at: usize, count: usize) {
        let n = self.count();
        assert!(
            at <= n && count <= n - at,
            "Array::remove: range {}..{} outside 0..{}",
            at,
            at.saturating_add(count),
            n
        );
        if count > 0 {
            self.buf.remove_range(at..at + count);
        }
    }

    /// Remove and return the element at `at`.
    pub fn take(&mut self, at: usize) -> T {
        let n = self.count();
        assert!(at < n, "Array::take: index {} out of range (count {})", at, n);
        self.buf.remove(at)
    }

    /// Remove every position listed in `sorted` in one compaction pass.
    ///
    /// `sorted` must be strictly ascending and in range. This is not
    /// corrected here: an unsorted list is a caller bug.
    pub fn remove_sorted(&mut self, sorted: &[usize]) {
        if sorted.is_empty() {
            return;
        }
        verify!(
            is_strictly_ascending(sorted, self.count()),
            "Array::remove_sorted: indices must be strictly ascending and < {}",
            self.count()
        );
        let mut next = 0;
        self.buf.retain_indexed(|i, _| {
            if next < sorted.len() && sorted[next] == i {
                next += 1;
                false
            } else {
                true
            }
        });
    }

    /// Remove every element matching `pred`, keeping the rest in order.
    /// Returns how many were removed.
    pub fn remove_if<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.count();
        self.buf.retain_indexed(|_, item| !pred(item));
        before - self.count()
    }

    #[inline]
    pub fn get(&self, i: usize) -> &T {
        let n = self.count();
        assert!(i < n, "Array::get: index {} out of range (count {})", i, n);
        &self.buf.as_slice()[i]
    }

    #[inline]
    pub fn get_mut(&mut self, i: usize) -> &mut T {
        let n = self.count();
        assert!(i < n, "Array::get_mut: index {} out of range (count {})", i, n);
        &mut self.buf.as_mut_slice()[i]
    }

    #[inline]
    pub fn try_get(&self, i: usize) -> Option<&T> {
        self.buf.as_slice().get(i)
    }

    /// Mutable access that grows the array to include `i`, filling any
    /// gap with `T::default()`.
    pub fn at(&mut self, i: usize) -> &mut T
    where
        T: Default,
    {
        if i >= self.count() {
            self.buf.resize_with(i + 1, T::default);
        }
        &mut self.buf.as_mut_slice()[i]
    }

    /// Like `at`, but the gap is filled with clones of `fill`.
    pub fn at_or(&mut self, i: usize, fill: &T) -> &mut T
    where
        T: Clone,
    {
        if i >= self.count() {
            self.buf.resize_with(i + 1, || fill.clone());
        }
        &mut self.buf.as_mut_slice()[i]
    }

    /// Store `item` at `i`, growing with defaults if `i` is past the end.
    pub fn set(&mut self, i: usize, item: T) -> &mut T
    where
        T: Default,
    {
        let slot = self.at(i);
        *slot = item;
        slot
    }

    pub fn replace(&mut self, i: usize, item: T) -> T {
        core::mem::replace(self.get_mut(i), item)
    }

    pub fn find(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.find_from(item, 0)
    }

    pub fn find_from(&self, item: &T, from: usize) -> Option<usize>
    where
        T: PartialEq,
    {
        let slice = self.buf.as_slice();
        if from >= slice.len() {
            return None;
        }
        slice[from..]
            .iter()
            .position(|x| x == item)
            .map(|p| p + from)
    }

    pub fn find_last(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.buf.as_slice().iter().rposition(|x| x == item)
    }

    /// Cut the array down to `count` elements.
    pub fn trim(&mut self, count: usize) {
        let n = self.count();
        assert!(count <= n, "Array::trim: {} exceeds count {}", count, n);
        self.buf.truncate(count);
    }

    /// Drop the last `count` elements.
    pub fn drop_last(&mut self, count: usize) {
        let n = self.count();
        assert!(count <= n, "Array::drop_last: {} exceeds count {}", count, n);
        self.buf.truncate(n - count);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.buf.pop()
    }

    pub fn top(&self) -> Option<&T> {
        self.buf.as_slice().last()
    }

    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.buf.as_mut_slice().last_mut()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Resize to `count`; new slots are default-constructed, surplus
    /// elements are dropped.
    pub fn set_count(&mut self, count: usize)
    where
        T: Default,
    {
        self.buf.resize_with(count, T::default);
    }

    pub fn set_count_with(&mut self, count: usize, fill: &T)
    where
        T: Clone,
    {
        self.buf.resize_with(count, || fill.clone());
    }

    /// Make sure the array can hold `total` elements without reallocating.
    pub fn reserve(&mut self, total: usize) {
        self.buf.reserve_total(total);
    }

    pub fn shrink(&mut self) {
        self.buf.shrink();
    }

    /// Exchange contents with `other` without touching the elements.
    pub fn swap(&mut self, other: &mut Array<T>) {
        self.buf.swap(&mut other.buf);
    }

    pub fn swap_elements(&mut self, i: usize, j: usize) {
        self.buf.as_mut_slice().swap(i, j);
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.buf.as_slice()
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.buf.as_mut_slice()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.buf.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.buf.as_mut_slice().iter_mut()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.buf.into_vec()
    }
}

impl<T> Sequence<T> for Array<T> {
    type Iter<'a>
        = core::slice::Iter<'a, T>
    where
        Self: 'a,
        T: 'a;
    type IterMut<'a>
        = core::slice::IterMut<'a, T>
    where
        Self: 'a,
        T: 'a;

    fn count(&self) -> usize {
        self.buf.count()
    }
    fn capacity(&self) -> usize {
        self.buf.capacity()
    }
    fn get(&self, i: usize) -> &T {
        Array::get(self, i)
    }
    fn get_mut(&mut self, i: usize) -> &mut T {
        Array::get_mut(self, i)
    }
    fn try_get(&self, i: usize) -> Option<&T> {
        Array::try_get(self, i)
    }
    fn add(&mut self, item: T) -> &mut T {
        Array::add(self, item)
    }
    fn insert(&mut self, at: usize, item: T) -> bool {
        Array::insert(self, at, item)
    }
    fn replace(&mut self, i: usize, item: T) -> T {
        Array::replace(self, i, item)
    }
    fn take(&mut self, at: usize) -> T {
        Array::take(self, at)
    }
    fn remove(&mut self, at: usize, count: usize) {
        Array::remove(self, at, count)
    }
    fn remove_sorted(&mut self, sorted: &[usize]) {
        Array::remove_sorted(self, sorted)
    }
    fn trim(&mut self, count: usize) {
        Array::trim(self, count)
    }
    fn pop(&mut self) -> Option<T> {
        Array::pop(self)
    }
    fn clear(&mut self) {
        Array::clear(self)
    }
    fn reserve(&mut self, total: usize) {
        Array::reserve(self, total)
    }
    fn shrink(&mut self) {
        Array::shrink(self)
    }
    fn iter(&self) -> Self::Iter<'_> {
        Array::iter(self)
    }
    fn iter_mut(&mut self) -> Self::IterMut<'_> {
        Array::iter_mut(self)
    }
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy: every element is cloned into fresh storage.
impl<T: Clone> Clone for Array<T> {
    fn clone(&self) -> Self {
        Self {
            buf: self.buf.clone(),
        }
    }
}

impl<T: PartialEq> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for Array<T> {}

impl<T: Hash> Hash for Array<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> ops::Index<usize> for Array<T> {
    type Output = T;
    #[inline]
    fn index(&self, i: usize) -> &T {
        self.get(i)
    }
}

impl<T> ops::IndexMut<usize> for Array<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        self.get_mut(i)
    }
}

impl<T> From<Vec<T>> for Array<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            buf: GrowableBuffer::from_vec(items),
        }
    }
}

impl<T: Clone> From<&[T]> for Array<T> {
    fn from(items: &[T]) -> Self {
        let mut a = Array::with_capacity(items.len());
        a.append(items);
        a
    }
}

impl<T> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut a = Array::new();
        a.extend(iter);
        a
    }
}

impl<T> Extend<T> for Array<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.buf.ensure(self.count() + lower);
        for item in iter {
            self.buf.push(item);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for Array<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> IntoIterator for Array<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        self.buf.into_vec().into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Array<T> {
    type Item = &'a mut T;
    type IntoIter = core::slice::IterMut<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
