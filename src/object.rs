//! ObjectArray: pointer-stable sequence of individually boxed elements.
//!
//! Same contract as `Array`, but every element lives in its own heap
//! allocation and only the boxes move when the sequence is reshaped.
//! An element's address therefore survives any add, insert or removal
//! that does not remove that element. Use it for types that hold raw
//! back-references or hand their address to foreign code.

use crate::array::Array;
use crate::sequence::Sequence;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops;

pub struct ObjectArray<T> {
    items: Array<Box<T>>,
}

/// Iterator over elements of an `ObjectArray`.
pub struct Iter<'a, T> {
    it: core::slice::Iter<'a, Box<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|b| &**b)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|b| &**b)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

/// Mutable iterator over elements of an `ObjectArray`.
pub struct IterMut<'a, T> {
    it: core::slice::IterMut<'a, Box<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|b| &mut **b)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|b| &mut **b)
    }
}

impl<'a, T> ExactSizeIterator for IterMut<'a, T> {}

impl<T> ObjectArray<T> {
    pub const fn new() -> Self {
        Self { items: Array::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Array::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.items.count()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Capacity of the pointer array, not of the elements.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub fn add(&mut self, item: T) -> &mut T {
        self.items.add(Box::new(item))
    }

    /// Adopt an already allocated element; its address does not change.
    pub fn add_boxed(&mut self, item: Box<T>) -> &mut T {
        self.items.add(item)
    }

    pub fn add_default(&mut self) -> &mut T
    where
        T: Default,
    {
        self.add(T::default())
    }

    pub fn append(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.items.reserve(self.items.count() + items.len());
        for item in items {
            self.items.add(Box::new(item.clone()));
        }
    }

    pub fn append_pick(&mut self, other: ObjectArray<T>) {
        self.items.append_pick(other.items);
    }

    pub fn insert(&mut self, at: usize, item: T) -> bool {
        if at > self.count() {
            return false;
        }
        self.items.insert(at, Box::new(item))
    }

    pub fn insert_boxed(&mut self, at: usize, item: Box<T>) -> bool {
        self.items.insert(at, item)
    }

    pub fn insert_n(&mut self, at: usize, count: usize, item: &T) -> bool
    where
        T: Clone,
    {
        if count == 0 || at > self.count() {
            return false;
        }
        let boxes: Array<Box<T>> = (0..count).map(|_| Box::new(item.clone())).collect();
        self.items.insert_pick(at, boxes)
    }

    /// Insert a clone of `self[src]` at `at`.
    pub fn insert_from(&mut self, at: usize, src: usize) -> bool
    where
        T: Clone,
    {
        if at > self.count() || src >= self.count() {
            return false;
        }
        let item = Box::new((*self.items[src]).clone());
        self.items.insert(at, item)
    }

    pub fn remove(&mut self, at: usize, count: usize) {
        self.items.remove(at, count);
    }

    /// See `Array::remove_sorted`.
    pub fn remove_sorted(&mut self, sorted: &[usize]) {
        self.items.remove_sorted(sorted);
    }

    pub fn remove_if<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.items.remove_if(|b| pred(b))
    }

    /// Remove the element at `at` without destroying it; the caller takes
    /// ownership of the allocation, whose address is unchanged.
    pub fn detach(&mut self, at: usize) -> Box<T> {
        self.items.take(at)
    }

    pub fn take(&mut self, at: usize) -> T {
        *self.items.take(at)
    }

    #[inline]
    pub fn get(&self, i: usize) -> &T {
        self.items.get(i)
    }

    #[inline]
    pub fn get_mut(&mut self, i: usize) -> &mut T {
        self.items.get_mut(i)
    }

    #[inline]
    pub fn try_get(&self, i: usize) -> Option<&T> {
        self.items.try_get(i).map(|b| &**b)
    }

    /// Mutable access that grows the array to include `i`.
    pub fn at(&mut self, i: usize) -> &mut T
    where
        T: Default,
    {
        while self.items.count() <= i {
            self.items.add(Box::default());
        }
        self.items.get_mut(i)
    }

    pub fn at_or(&mut self, i: usize, fill: &T) -> &mut T
    where
        T: Clone,
    {
        while self.items.count() <= i {
            self.items.add(Box::new(fill.clone()));
        }
        self.items.get_mut(i)
    }

    /// Store `item` at `i`, growing with defaults if `i` is past the end.
    /// An existing element is overwritten in place, keeping its address.
    pub fn set(&mut self, i: usize, item: T) -> &mut T
    where
        T: Default,
    {
        let slot = self.at(i);
        *slot = item;
        slot
    }

    /// Swap in a new allocation at `i` and hand back the old one.
    pub fn set_boxed(&mut self, i: usize, item: Box<T>) -> Box<T> {
        self.items.replace(i, item)
    }

    pub fn replace(&mut self, i: usize, item: T) -> T {
        core::mem::replace(&mut **self.items.get_mut(i), item)
    }

    pub fn find(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|x| x == item)
    }

    pub fn find_from(&self, item: &T, from: usize) -> Option<usize>
    where
        T: PartialEq,
    {
        if from >= self.count() {
            return None;
        }
        self.iter()
            .skip(from)
            .position(|x| x == item)
            .map(|p| p + from)
    }

    pub fn find_last(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().rposition(|x| x == item)
    }

    pub fn trim(&mut self, count: usize) {
        self.items.trim(count);
    }

    pub fn drop_last(&mut self, count: usize) {
        self.items.drop_last(count);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop().map(|b| *b)
    }

    pub fn top(&self) -> Option<&T> {
        self.items.top().map(|b| &**b)
    }

    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.items.top_mut().map(|b| &mut **b)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn set_count(&mut self, count: usize)
    where
        T: Default,
    {
        if count < self.count() {
            self.items.trim(count);
        } else if count > 0 {
            self.at(count - 1);
        }
    }

    pub fn set_count_with(&mut self, count: usize, fill: &T)
    where
        T: Clone,
    {
        if count < self.count() {
            self.items.trim(count);
        } else if count > 0 {
            self.at_or(count - 1, fill);
        }
    }

    pub fn reserve(&mut self, total: usize) {
        self.items.reserve(total);
    }

    pub fn shrink(&mut self) {
        self.items.shrink();
    }

    pub fn swap(&mut self, other: &mut ObjectArray<T>) {
        self.items.swap(&mut other.items);
    }

    /// Exchange two positions; both elements keep their addresses.
    pub fn swap_elements(&mut self, i: usize, j: usize) {
        self.items.swap_elements(i, j);
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            it: self.items.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            it: self.items.iter_mut(),
        }
    }
}

impl<T> Sequence<T> for ObjectArray<T> {
    type Iter<'a>
        = Iter<'a, T>
    where
        Self: 'a,
        T: 'a;
    type IterMut<'a>
        = IterMut<'a, T>
    where
        Self: 'a,
        T: 'a;

    fn count(&self) -> usize {
        self.items.count()
    }
    fn capacity(&self) -> usize {
        self.items.capacity()
    }
    fn get(&self, i: usize) -> &T {
        ObjectArray::get(self, i)
    }
    fn get_mut(&mut self, i: usize) -> &mut T {
        ObjectArray::get_mut(self, i)
    }
    fn try_get(&self, i: usize) -> Option<&T> {
        ObjectArray::try_get(self, i)
    }
    fn add(&mut self, item: T) -> &mut T {
        ObjectArray::add(self, item)
    }
    fn insert(&mut self, at: usize, item: T) -> bool {
        ObjectArray::insert(self, at, item)
    }
    fn replace(&mut self, i: usize, item: T) -> T {
        ObjectArray::replace(self, i, item)
    }
    fn take(&mut self, at: usize) -> T {
        ObjectArray::take(self, at)
    }
    fn remove(&mut self, at: usize, count: usize) {
        ObjectArray::remove(self, at, count)
    }
    fn remove_sorted(&mut self, sorted: &[usize]) {
        ObjectArray::remove_sorted(self, sorted)
    }
    fn trim(&mut self, count: usize) {
        ObjectArray::trim(self, count)
    }
    fn pop(&mut self) -> Option<T> {
        ObjectArray::pop(self)
    }
    fn clear(&mut self) {
        ObjectArray::clear(self)
    }
    fn reserve(&mut self, total: usize) {
        ObjectArray::reserve(self, total)
    }
    fn shrink(&mut self) {
        ObjectArray::shrink(self)
    }
    fn iter(&self) -> Self::Iter<'_> {
        ObjectArray::iter(self)
    }
    fn iter_mut(&mut self) -> Self::IterMut<'_> {
        ObjectArray::iter_mut(self)
    }
}

impl<T> Default for ObjectArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy: one fresh allocation per element.
impl<T: Clone> Clone for ObjectArray<T> {
    fn clone(&self) -> Self {
        let mut items = Array::with_capacity(self.count());
        for item in self.iter() {
            items.add(Box::new(item.clone()));
        }
        Self { items }
    }
}

impl<T: PartialEq> PartialEq for ObjectArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.count() == other.count() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for ObjectArray<T> {}

impl<T: Hash> Hash for ObjectArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.count());
        for item in self.iter() {
            item.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObjectArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> ops::Index<usize> for ObjectArray<T> {
    type Output = T;
    #[inline]
    fn index(&self, i: usize) -> &T {
        self.get(i)
    }
}

impl<T> ops::IndexMut<usize> for ObjectArray<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        self.get_mut(i)
    }
}

impl<T> FromIterator<T> for ObjectArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Box::new).collect(),
        }
    }
}

impl<T> Extend<T> for ObjectArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter.into_iter().map(Box::new));
    }
}

impl<T> IntoIterator for ObjectArray<T> {
    type Item = Box<T>;
    type IntoIter = std::vec::IntoIter<Box<T>>;
    /// Yields the owned allocations, addresses unchanged.
    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ObjectArray<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut ObjectArray<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Holds a pointer to itself; moving it would leave the pointer dangling.
    struct SelfRef {
        value: u32,
        me: *const SelfRef,
    }

    impl SelfRef {
        fn pin_in(arr: &mut ObjectArray<SelfRef>, value: u32) {
            let slot = arr.add(SelfRef {
                value,
                me: core::ptr::null(),
            });
            let me: *const SelfRef = &*slot;
            slot.me = me;
        }
        fn is_intact(&self) -> bool {
            core::ptr::eq(self.me, self)
        }
    }

    #[test]
    fn addresses_survive_growth_insert_and_remove() {
        let mut arr = ObjectArray::new();
        for v in 0..8 {
            SelfRef::pin_in(&mut arr, v);
        }
        let third: *const SelfRef = &arr[3];
        for v in 8..200 {
            SelfRef::pin_in(&mut arr, v);
        }
        arr.insert_boxed(0, Box::new(SelfRef { value: 999, me: core::ptr::null() }));
        arr.remove(1, 2);
        // old index 3 moved to 3 - 2 + 1
        assert!(core::ptr::eq(&arr[2], third));
        assert!(arr.iter().skip(1).all(SelfRef::is_intact));
        assert_eq!(arr[2].value, 3);
    }

    #[test]
    fn detach_transfers_ownership_without_moving() {
        let mut arr: ObjectArray<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let addr: *const String = &arr[1];
        let b = arr.detach(1);
        assert!(core::ptr::eq(&*b, addr));
        assert_eq!(*b, "b");
        assert_eq!(arr.count(), 2);
        assert_eq!(arr[1], "c");
        arr.add_boxed(b);
        assert!(core::ptr::eq(&arr[2], addr));
    }

    #[test]
    fn clone_allocates_per_element() {
        let arr: ObjectArray<i32> = (0..4).collect();
        let copy = arr.clone();
        assert_eq!(arr, copy);
        for i in 0..4 {
            assert!(!core::ptr::eq(&arr[i], &copy[i]));
        }
    }

    #[test]
    fn same_soft_failures_as_array() {
        let mut arr: ObjectArray<i32> = ObjectArray::new();
        assert!(!arr.insert(1, 5));
        assert!(!arr.insert_n(0, 0, &5));
        assert!(arr.insert_n(0, 3, &5));
        assert!(!arr.insert_from(0, 3));
        assert!(arr.insert_from(3, 0));
        assert_eq!(arr.count(), 4);
    }

    #[test]
    fn at_set_count_and_find() {
        let mut arr: ObjectArray<i32> = ObjectArray::new();
        *arr.at(2) = 7;
        assert_eq!(arr.iter().copied().collect::<Vec<_>>(), vec![0, 0, 7]);
        arr.set_count(5);
        assert_eq!(arr.count(), 5);
        arr.set_count(1);
        assert_eq!(arr.count(), 1);
        arr.set_count_with(3, &4);
        assert_eq!(arr.find(&4), Some(1));
        assert_eq!(arr.find_last(&4), Some(2));
        assert_eq!(arr.find_from(&4, 2), Some(2));
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut arr: ObjectArray<String> = ObjectArray::new();
        arr.add("x".to_string());
        let addr: *const String = &arr[0];
        arr.set(0, "y".to_string());
        assert!(core::ptr::eq(&arr[0], addr));
        let old = arr.set_boxed(0, Box::new("z".to_string()));
        assert_eq!(*old, "y");
        assert_eq!(arr[0], "z");
    }
}
