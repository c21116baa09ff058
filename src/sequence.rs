//! Storage contract shared by `Array` and `ObjectArray`.
//!
//! `IndexBase` and `MapBase` are written only against this trait, so the
//! relocatable and the pointer-stable families share one implementation
//! of hashing, tombstones and key/value alignment.

/// An ordered sequence with positional insert/remove.
///
/// Index arguments follow the containers' conventions: out-of-range
/// `get`/`remove`/`replace` are fatal, `insert` past the end returns
/// `false`.
pub trait Sequence<T>: Default {
    type Iter<'a>: Iterator<Item = &'a T>
    where
        Self: 'a,
        T: 'a;
    type IterMut<'a>: Iterator<Item = &'a mut T>
    where
        Self: 'a,
        T: 'a;

    fn count(&self) -> usize;
    fn capacity(&self) -> usize;
    fn get(&self, i: usize) -> &T;
    fn get_mut(&mut self, i: usize) -> &mut T;
    fn try_get(&self, i: usize) -> Option<&T>;
    fn add(&mut self, item: T) -> &mut T;
    fn insert(&mut self, at: usize, item: T) -> bool;
    /// Put `item` at `i` and return the previous occupant.
    fn replace(&mut self, i: usize, item: T) -> T;
    /// Remove the element at `at` and hand it back.
    fn take(&mut self, at: usize) -> T;
    fn remove(&mut self, at: usize, count: usize);
    fn remove_sorted(&mut self, sorted: &[usize]);
    fn trim(&mut self, count: usize);
    fn pop(&mut self) -> Option<T>;
    fn clear(&mut self);
    fn reserve(&mut self, total: usize);
    fn shrink(&mut self);
    fn iter(&self) -> Self::Iter<'_>;
    fn iter_mut(&mut self) -> Self::IterMut<'_>;
}
