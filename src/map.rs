//! MapBase: an `Index` of keys plus a value sequence aligned slot-for-slot.
//!
//! Every key-side mutation is mirrored on the value side at the same
//! position, so `keys().count() == values().count()` after every public
//! operation. Lookups go through the key index; values are never hashed.

use crate::array::Array;
use crate::index::{Index, IndexBase};
use crate::object::ObjectArray;
use crate::sequence::Sequence;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use hashbrown::hash_map::DefaultHashBuilder;

/// Associative container over relocatable values.
pub type Map<K, V, S = DefaultHashBuilder> = MapBase<K, V, Array<V>, S>;
/// Associative container whose values are boxed and never move.
pub type ObjectMap<K, V, S = DefaultHashBuilder> = MapBase<K, V, ObjectArray<V>, S>;

pub struct MapBase<K, V, C = Array<V>, S = DefaultHashBuilder> {
    key: Index<K, S>,
    value: C,
    _pd: PhantomData<fn() -> V>,
}

impl<K, V, C> MapBase<K, V, C>
where
    K: Eq + Hash,
    C: Sequence<V>,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V, C> Default for MapBase<K, V, C>
where
    K: Eq + Hash,
    C: Sequence<V>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C, S> MapBase<K, V, C, S>
where
    K: Eq + Hash,
    C: Sequence<V>,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            key: IndexBase::with_hasher(hasher),
            value: C::default(),
            _pd: PhantomData,
        }
    }

    /// Store `value` for a key slot just produced by a put: either the
    /// slot was appended, or it is a reused tombstone whose old value is
    /// dropped here.
    fn fill_slot(&mut self, i: usize, value: V) -> &mut V {
        if i == self.value.count() {
            self.value.add(value)
        } else {
            self.value.replace(i, value);
            self.value.get_mut(i)
        }
    }

    #[inline]
    fn check_aligned(&self) {
        debug_assert_eq!(
            self.key.count(),
            self.value.count(),
            "MapBase: key/value counts diverged"
        );
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.key.count()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.key.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }

    /// Append a pair even if `key` is already present.
    pub fn add(&mut self, key: K, value: V) -> &mut V {
        self.key.add(key);
        self.value.add(value)
    }

    /// Append `key` with a default value.
    pub fn add_key(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.add(key, V::default())
    }

    pub fn find<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.key.find(q)
    }

    pub fn find_next(&self, i: usize) -> Option<usize> {
        self.key.find_next(i)
    }

    pub fn find_last<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.key.find_last(q)
    }

    pub fn find_prev(&self, i: usize) -> Option<usize> {
        self.key.find_prev(i)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.key.find(q).is_some()
    }

    /// Value of the first live occurrence of `q`.
    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.key.find(q)?;
        Some(self.value.get(i))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.key.find(q)?;
        Some(self.value.get_mut(i))
    }

    pub fn get_or<'a, Q>(&'a self, q: &Q, fallback: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).unwrap_or(fallback)
    }

    /// Value for `key`, appending a default one first if absent.
    pub fn get_add(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_add_with(key, V::default)
    }

    /// Like `get_add`; `make` runs only when the key is inserted.
    pub fn get_add_with<F>(&mut self, key: K, make: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let (i, inserted) = self.key.find_add_flag(key);
        if inserted {
            self.value.add(make())
        } else {
            self.value.get_mut(i)
        }
    }

    /// Like `get_add`, but an insertion reuses a tombstone when one exists.
    pub fn get_put(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let (i, inserted) = self.key.find_put_flag(key);
        if inserted {
            self.fill_slot(i, V::default())
        } else {
            self.value.get_mut(i)
        }
    }

    /// Insert the pair only if `key` is absent; returns the key's slot
    /// either way. When present, `value` is dropped.
    pub fn find_add(&mut self, key: K, value: V) -> usize {
        let (i, inserted) = self.key.find_add_flag(key);
        if inserted {
            self.value.add(value);
        }
        i
    }

    /// Store the pair in a tombstoned slot if one exists, else append.
    /// No lookup is made, so an equal live key may already exist.
    pub fn put(&mut self, key: K, value: V) -> usize {
        let i = self.key.put(key);
        self.fill_slot(i, value);
        i
    }

    /// Overwrite the value of an existing `key`, or put the pair.
    pub fn find_put(&mut self, key: K, value: V) -> usize {
        let (i, inserted) = self.key.find_put_flag(key);
        if inserted {
            self.fill_slot(i, value);
        } else {
            self.value.replace(i, value);
        }
        i
    }

    /// Tombstone slot `i`. The value stays until the slot is swept or reused.
    pub fn unlink(&mut self, i: usize) {
        self.key.unlink(i);
    }

    pub fn unlink_key<Q>(&mut self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.key.unlink_key(q)
    }

    #[inline]
    pub fn is_unlinked(&self, i: usize) -> bool {
        self.key.is_unlinked(i)
    }

    #[inline]
    pub fn has_unlinked(&self) -> bool {
        self.key.has_unlinked()
    }

    pub fn unlinked(&self) -> Vec<usize> {
        self.key.unlinked()
    }

    /// Physically remove every tombstoned pair; returns how many.
    pub fn sweep(&mut self) -> usize {
        let list = self.key.unlinked();
        if list.is_empty() {
            return 0;
        }
        self.key.sweep_list(&list);
        self.value.remove_sorted(&list);
        self.check_aligned();
        list.len()
    }

    /// Replace the key at `i`, rehashing it; the value is untouched.
    pub fn set_key(&mut self, i: usize, key: K) -> K {
        self.key.set(i, key)
    }

    /// Replace the value at `i` and return the old one.
    pub fn set_value(&mut self, i: usize, value: V) -> V {
        self.value.replace(i, value)
    }

    pub fn insert(&mut self, at: usize, key: K, value: V) -> bool {
        if !self.key.insert(at, key) {
            return false;
        }
        self.value.insert(at, value)
    }

    pub fn remove(&mut self, at: usize, count: usize) {
        self.key.remove(at, count);
        self.value.remove(at, count);
    }

    pub fn take(&mut self, at: usize) -> (K, V) {
        (self.key.take(at), self.value.take(at))
    }

    pub fn remove_sorted(&mut self, sorted: &[usize]) {
        self.key.remove_sorted(sorted);
        self.value.remove_sorted(sorted);
        self.check_aligned();
    }

    /// Remove every live pair whose key equals `q`; returns how many.
    pub fn remove_key<Q>(&mut self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let found = self.key.find_all(q);
        self.remove_sorted(&found);
        found.len()
    }

    pub fn trim(&mut self, count: usize) {
        self.key.trim(count);
        self.value.trim(count);
    }

    pub fn drop_last(&mut self, count: usize) {
        let n = self.count();
        assert!(count <= n, "MapBase::drop_last: {} exceeds count {}", count, n);
        self.trim(n - count);
    }

    pub fn pop(&mut self) -> Option<(K, V)> {
        let k = self.key.pop()?;
        let v = self.value.pop()?;
        Some((k, v))
    }

    #[inline]
    pub fn key(&self, i: usize) -> &K {
        self.key.get(i)
    }

    #[inline]
    pub fn value(&self, i: usize) -> &V {
        self.value.get(i)
    }

    #[inline]
    pub fn value_mut(&mut self, i: usize) -> &mut V {
        self.value.get_mut(i)
    }

    pub fn try_value(&self, i: usize) -> Option<&V> {
        self.value.try_get(i)
    }

    pub fn keys(&self) -> &Index<K, S> {
        &self.key
    }

    pub fn values(&self) -> &C {
        &self.value
    }

    /// Pairs in slot order, unlinked ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.key.iter().zip(self.value.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> + '_ {
        self.key.iter().zip(self.value.iter_mut())
    }

    pub fn pick_keys(self) -> Index<K, S> {
        self.key
    }

    pub fn pick_values(self) -> C {
        self.value
    }

    pub fn into_parts(self) -> (Index<K, S>, C) {
        (self.key, self.value)
    }

    pub fn reserve(&mut self, total: usize) {
        self.key.reserve(total);
        self.value.reserve(total);
    }

    pub fn shrink(&mut self) {
        self.key.shrink();
        self.value.shrink();
    }

    pub fn clear(&mut self) {
        self.key.clear();
        self.value.clear();
    }

    pub fn swap(&mut self, other: &mut Self) {
        self.key.swap(&mut other.key);
        core::mem::swap(&mut self.value, &mut other.value);
    }

    /// Recompute every key hash; tombstones are kept.
    pub fn reindex(&mut self) {
        self.key.reindex();
    }
}

impl<K, V, S> MapBase<K, V, ObjectArray<V>, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Adopt a boxed value; its address does not change while it stays
    /// in the map.
    pub fn add_boxed(&mut self, key: K, value: Box<V>) -> &mut V {
        self.key.add(key);
        self.value.add_boxed(value)
    }

    /// Remove the pair at `at`, handing the value's allocation to the caller.
    pub fn detach(&mut self, at: usize) -> (K, Box<V>) {
        (self.key.take(at), self.value.detach(at))
    }
}

impl<K, V, C, S> Clone for MapBase<K, V, C, S>
where
    K: Clone,
    C: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
            _pd: PhantomData,
        }
    }
}

impl<K, V, C, S> PartialEq for MapBase<K, V, C, S>
where
    K: PartialEq,
    V: PartialEq,
    C: Sequence<V>,
{
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value.iter().eq(other.value.iter())
    }
}

impl<K, V, C, S> fmt::Debug for MapBase<K, V, C, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Sequence<V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries((&self.key).into_iter().zip(self.value.iter()))
            .finish()
    }
}

impl<K, V, C, S> FromIterator<(K, V)> for MapBase<K, V, C, S>
where
    K: Eq + Hash,
    C: Sequence<V>,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

/// Appends every pair, duplicates included.
impl<K, V, C, S> Extend<(K, V)> for MapBase<K, V, C, S>
where
    K: Eq + Hash,
    C: Sequence<V>,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.add(k, v);
        }
    }
}
