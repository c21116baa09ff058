//! IndexBase: key sequence plus a `HashTable` kept slot-for-slot aligned.
//!
//! Keys may repeat. `find` returns the first live occurrence in chain
//! order and `find_next`/`find_prev` step through the others. Removal
//! comes in two flavours: `remove*` shifts positions immediately, while
//! `unlink*` tombstones a slot in O(1) and leaves it in place until `put`
//! reuses it or `sweep` compacts it away.
//!
//! Unlinked keys stay readable through `get`/`iter`; only lookups skip
//! them. Every probe runs under the debug reentrancy guard because it
//! calls into the key's `Hash` and `Eq`.

use crate::array::Array;
use crate::hash_table::HashTable;
use crate::object::ObjectArray;
use crate::reentrancy::DebugReentrancy;
use crate::sequence::Sequence;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use core::ops;
use hashbrown::hash_map::DefaultHashBuilder;

/// Keyed container over relocatable keys.
pub type Index<K, S = DefaultHashBuilder> = IndexBase<K, Array<K>, S>;
/// Keyed container whose keys are individually boxed and never move.
pub type ObjectIndex<K, S = DefaultHashBuilder> = IndexBase<K, ObjectArray<K>, S>;

pub struct IndexBase<K, C = Array<K>, S = DefaultHashBuilder> {
    keys: C,
    hash: HashTable,
    hasher: S,
    reentrancy: DebugReentrancy,
    _pd: PhantomData<fn() -> K>,
}

/// Fold a 64-bit hash into the 32 bits the table stores.
#[inline]
pub(crate) fn fold_hash(h: u64) -> u32 {
    (h ^ (h >> 32)) as u32
}

impl<K, C> IndexBase<K, C>
where
    K: Eq + Hash,
    C: Sequence<K>,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, C> Default for IndexBase<K, C>
where
    K: Eq + Hash,
    C: Sequence<K>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C, S> IndexBase<K, C, S>
where
    K: Eq + Hash,
    C: Sequence<K>,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            keys: C::default(),
            hash: HashTable::new(),
            hasher,
            reentrancy: DebugReentrancy::new(),
            _pd: PhantomData,
        }
    }

    /// Take over an existing key sequence and index it.
    pub fn from_keys_with_hasher(keys: C, hasher: S) -> Self {
        let mut ix = Self {
            keys,
            hash: HashTable::new(),
            hasher,
            reentrancy: DebugReentrancy::new(),
            _pd: PhantomData,
        };
        ix.rehash_all();
        ix
    }

    #[inline]
    fn make_hash<Q>(&self, q: &Q) -> u32
    where
        Q: ?Sized + Hash,
    {
        fold_hash(self.hasher.hash_one(q))
    }

    fn hash_all(&self) -> HashTable {
        let mut table = HashTable::new();
        table.reserve(self.keys.count());
        for k in self.keys.iter() {
            table.add(self.make_hash(k));
        }
        table
    }

    fn rehash_all(&mut self) {
        self.hash = self.hash_all();
    }

    /// Walk the chain for `h` from `start`, confirming candidates by equality.
    fn scan_forward<Q>(&self, mut cur: Option<usize>, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        while let Some(i) = cur {
            if self.keys.get(i).borrow() == q {
                return Some(i);
            }
            cur = self.hash.find_next(i);
        }
        None
    }

    fn scan_backward<Q>(&self, mut cur: Option<usize>, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        while let Some(i) = cur {
            if self.keys.get(i).borrow() == q {
                return Some(i);
            }
            cur = self.hash.find_prev(i);
        }
        None
    }

    fn find_hashed<Q>(&self, h: u32, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.scan_forward(self.hash.find(h), q)
    }

    /// Hash `key` and look it up in one guarded section.
    fn probe(&self, op: &'static str, key: &K) -> (u32, Option<usize>) {
        let _g = self.reentrancy.enter(op);
        let h = self.make_hash(key);
        (h, self.find_hashed(h, key))
    }

    /// Every live slot holding a key equal to `q`, ascending.
    fn matches<Q>(&self, q: &Q) -> Vec<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.make_hash(q);
        let mut out = Vec::new();
        let mut cur = self.find_hashed(h, q);
        while let Some(i) = cur {
            out.push(i);
            cur = self.scan_forward(self.hash.find_next(i), q);
        }
        out.sort_unstable();
        out
    }

    fn append_hashed(&mut self, h: u32, key: K) -> usize {
        self.keys.add(key);
        self.hash.add(h);
        self.keys.count() - 1
    }

    fn put_hashed(&mut self, h: u32, key: K) -> usize {
        let i = self.hash.put(h);
        if i == self.keys.count() {
            self.keys.add(key);
        } else {
            self.keys.replace(i, key);
        }
        i
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.keys.count()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.count() == 0
    }

    pub fn capacity(&self) -> usize {
        self.keys.capacity()
    }

    /// Append `key` even if an equal key is already present.
    pub fn add(&mut self, key: K) -> usize {
        let h = {
            let _g = self.reentrancy.enter("IndexBase::add");
            self.make_hash(&key)
        };
        self.append_hashed(h, key)
    }

    /// First live slot holding `q`.
    pub fn find<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("IndexBase::find");
        let h = self.make_hash(q);
        self.find_hashed(h, q)
    }

    /// Next live slot after `i` holding a key equal to `self.get(i)`.
    pub fn find_next(&self, i: usize) -> Option<usize> {
        let _g = self.reentrancy.enter("IndexBase::find_next");
        let key = self.keys.get(i);
        self.scan_forward(self.hash.find_next(i), key)
    }

    /// Last live slot holding `q`.
    pub fn find_last<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("IndexBase::find_last");
        let h = self.make_hash(q);
        self.scan_backward(self.hash.find_last(h), q)
    }

    /// Previous live slot before `i` holding a key equal to `self.get(i)`.
    pub fn find_prev(&self, i: usize) -> Option<usize> {
        let _g = self.reentrancy.enter("IndexBase::find_prev");
        let key = self.keys.get(i);
        self.scan_backward(self.hash.find_prev(i), key)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    /// Slot of `key`, appending it first if absent.
    pub fn find_add(&mut self, key: K) -> usize {
        self.find_add_flag(key).0
    }

    /// Like `find_add`, also reporting whether the key was inserted.
    pub(crate) fn find_add_flag(&mut self, key: K) -> (usize, bool) {
        let (h, found) = self.probe("IndexBase::find_add", &key);
        match found {
            Some(i) => (i, false),
            None => (self.append_hashed(h, key), true),
        }
    }

    /// Store `key` in a tombstoned slot if one exists, else append.
    /// Does not look for an existing equal key.
    pub fn put(&mut self, key: K) -> usize {
        let h = {
            let _g = self.reentrancy.enter("IndexBase::put");
            self.make_hash(&key)
        };
        self.put_hashed(h, key)
    }

    /// Slot of `key`, putting it first if absent.
    pub fn find_put(&mut self, key: K) -> usize {
        self.find_put_flag(key).0
    }

    pub(crate) fn find_put_flag(&mut self, key: K) -> (usize, bool) {
        let (h, found) = self.probe("IndexBase::find_put", &key);
        match found {
            Some(i) => (i, false),
            None => (self.put_hashed(h, key), true),
        }
    }

    /// Tombstone slot `i`.
    pub fn unlink(&mut self, i: usize) {
        self.hash.unlink(i);
    }

    /// Every live slot holding `q`, ascending.
    pub fn find_all<Q>(&self, q: &Q) -> Vec<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("IndexBase::find_all");
        self.matches(q)
    }

    /// Tombstone every live slot holding `q`; returns how many.
    pub fn unlink_key<Q>(&mut self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let found = self.find_all(q);
        for &i in &found {
            self.hash.unlink(i);
        }
        found.len()
    }

    #[inline]
    pub fn is_unlinked(&self, i: usize) -> bool {
        self.hash.is_unlinked(i)
    }

    #[inline]
    pub fn has_unlinked(&self) -> bool {
        self.hash.has_unlinked()
    }

    /// Tombstoned slots, ascending.
    pub fn unlinked(&self) -> Vec<usize> {
        self.hash.unlinked()
    }

    /// Physically remove every tombstone; returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let list = self.hash.unlinked();
        self.sweep_list(&list);
        list.len()
    }

    pub(crate) fn sweep_list(&mut self, sorted: &[usize]) {
        if sorted.is_empty() {
            return;
        }
        self.keys.remove_sorted(sorted);
        self.hash.sweep(sorted);
        log::debug!("IndexBase::sweep: removed {} unlinked slots", sorted.len());
    }

    /// Replace the key at `i`, relinking the slot under the new hash.
    pub fn set(&mut self, i: usize, key: K) -> K {
        let h = {
            let _g = self.reentrancy.enter("IndexBase::set");
            self.make_hash(&key)
        };
        let old = self.keys.replace(i, key);
        self.hash.set(i, h);
        old
    }

    pub fn insert(&mut self, at: usize, key: K) -> bool {
        if at > self.count() {
            return false;
        }
        let h = {
            let _g = self.reentrancy.enter("IndexBase::insert");
            self.make_hash(&key)
        };
        self.keys.insert(at, key);
        self.hash.insert(at, h)
    }

    pub fn remove(&mut self, at: usize, count: usize) {
        self.keys.remove(at, count);
        self.hash.remove(at, count);
    }

    /// Remove and return the key at `at`.
    pub fn take(&mut self, at: usize) -> K {
        let key = self.keys.take(at);
        self.hash.remove(at, 1);
        key
    }

    /// See `Array::remove_sorted`.
    pub fn remove_sorted(&mut self, sorted: &[usize]) {
        self.keys.remove_sorted(sorted);
        self.hash.remove_sorted(sorted);
    }

    /// Remove every live slot holding `q`; returns how many.
    pub fn remove_key<Q>(&mut self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let found = self.find_all(q);
        self.remove_sorted(&found);
        found.len()
    }

    pub fn trim(&mut self, count: usize) {
        self.keys.trim(count);
        self.hash.trim(count);
    }

    pub fn drop_last(&mut self, count: usize) {
        let n = self.count();
        assert!(count <= n, "IndexBase::drop_last: {} exceeds count {}", count, n);
        self.trim(n - count);
    }

    pub fn pop(&mut self) -> Option<K> {
        let key = self.keys.pop()?;
        self.hash.drop_last(1);
        Some(key)
    }

    pub fn top(&self) -> Option<&K> {
        match self.count() {
            0 => None,
            n => Some(self.keys.get(n - 1)),
        }
    }

    #[inline]
    pub fn get(&self, i: usize) -> &K {
        self.keys.get(i)
    }

    #[inline]
    pub fn try_get(&self, i: usize) -> Option<&K> {
        self.keys.try_get(i)
    }

    /// All keys in slot order, unlinked ones included.
    pub fn iter(&self) -> C::Iter<'_> {
        self.keys.iter()
    }

    pub fn keys(&self) -> &C {
        &self.keys
    }

    /// Give up the index and keep the key sequence.
    pub fn pick_keys(self) -> C {
        self.keys
    }

    /// Recompute every hash from its key and rebuild the table; tombstones
    /// are preserved.
    pub fn reindex(&mut self) {
        let unlinked = self.hash.unlinked();
        self.hash = {
            let _g = self.reentrancy.enter("IndexBase::reindex");
            self.hash_all()
        };
        for i in unlinked {
            self.hash.unlink(i);
        }
    }

    pub fn reserve(&mut self, total: usize) {
        self.keys.reserve(total);
        self.hash.reserve(total);
    }

    pub fn shrink(&mut self) {
        self.keys.shrink();
        self.hash.shrink();
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.hash.clear();
    }

    /// Exchange contents (and hashers) with `other` in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.keys, &mut other.keys);
        self.hash.swap(&mut other.hash);
        core::mem::swap(&mut self.hasher, &mut other.hasher);
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    #[cfg(any(test, feature = "bench_internal"))]
    pub fn hash_table(&self) -> &HashTable {
        &self.hash
    }
}

impl<K, C, S> IndexBase<K, C, S>
where
    K: Eq + Hash,
    C: Sequence<K>,
    S: BuildHasher + Default,
{
    pub fn from_keys(keys: C) -> Self {
        Self::from_keys_with_hasher(keys, S::default())
    }
}

impl<K, S> IndexBase<K, ObjectArray<K>, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Adopt a boxed key; its address does not change while it stays in
    /// the index.
    pub fn add_boxed(&mut self, key: Box<K>) -> usize {
        let h = {
            let _g = self.reentrancy.enter("IndexBase::add_boxed");
            self.make_hash(&*key)
        };
        self.keys.add_boxed(key);
        self.hash.add(h);
        self.keys.count() - 1
    }

    /// Remove the key at `at` and hand its allocation to the caller.
    pub fn detach(&mut self, at: usize) -> Box<K> {
        let key = self.keys.detach(at);
        self.hash.remove(at, 1);
        key
    }
}

/// Deep copy of keys and table; the hasher state is cloned so hashes stay valid.
impl<K, C, S> Clone for IndexBase<K, C, S>
where
    C: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            hash: self.hash.clone(),
            hasher: self.hasher.clone(),
            reentrancy: DebugReentrancy::new(),
            _pd: PhantomData,
        }
    }
}

impl<K, C, S> PartialEq for IndexBase<K, C, S>
where
    K: PartialEq,
    C: Sequence<K>,
{
    fn eq(&self, other: &Self) -> bool {
        self.keys.count() == other.keys.count() && self.keys.iter().eq(other.keys.iter())
    }
}

impl<K: Eq, C: Sequence<K>, S> Eq for IndexBase<K, C, S> {}

impl<K, C, S> fmt::Debug for IndexBase<K, C, S>
where
    K: fmt::Debug,
    C: Sequence<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys.iter()).finish()
    }
}

impl<K, C, S> ops::Index<usize> for IndexBase<K, C, S>
where
    C: Sequence<K>,
{
    type Output = K;
    fn index(&self, i: usize) -> &K {
        self.keys.get(i)
    }
}

impl<K, C, S> FromIterator<K> for IndexBase<K, C, S>
where
    K: Eq + Hash,
    C: Sequence<K>,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut ix = Self::with_hasher(S::default());
        ix.extend(iter);
        ix
    }
}

impl<K, C, S> Extend<K> for IndexBase<K, C, S>
where
    K: Eq + Hash,
    C: Sequence<K>,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            self.add(k);
        }
    }
}

impl<'a, K, C, S> IntoIterator for &'a IndexBase<K, C, S>
where
    C: Sequence<K> + 'a,
    K: 'a,
{
    type Item = &'a K;
    type IntoIter = C::Iter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::Hasher;

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        } // force all keys into the same hash bucket
    }

    fn occurrences<K: Eq + Hash, C: Sequence<K>, S: BuildHasher>(
        ix: &IndexBase<K, C, S>,
        k: &K,
    ) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cur = ix.find(k);
        while let Some(i) = cur {
            out.push(i);
            cur = ix.find_next(i);
        }
        out
    }

    #[test]
    fn put_appends_then_reuses_tombstone() {
        let mut ix: Index<i32> = Index::new();
        ix.add(1);
        ix.add(5);
        ix.add(7);
        assert_eq!(ix.put(5), 3);
        assert_eq!(ix.count(), 4);

        ix.unlink(1);
        assert_eq!(ix.put(5), 1);
        assert_eq!(ix.count(), 4);
        assert!(!ix.has_unlinked());
        assert_eq!(occurrences(&ix, &5), vec![3, 1]);
    }

    #[test]
    fn duplicates_are_walked_in_both_directions() {
        let mut ix: Index<&str> = Index::new();
        for k in ["a", "b", "a", "c", "a"] {
            ix.add(k);
        }
        assert_eq!(occurrences(&ix, &"a"), vec![0, 2, 4]);
        assert_eq!(ix.find_last(&"a"), Some(4));
        assert_eq!(ix.find_prev(4), Some(2));
        assert_eq!(ix.find_prev(2), Some(0));
        assert_eq!(ix.find_prev(0), None);
        assert_eq!(ix.find_next(1), None);
    }

    #[test]
    fn collisions_are_resolved_by_equality() {
        let mut ix: Index<String, ConstBuildHasher> = Index::with_hasher(ConstBuildHasher);
        ix.add("a".to_string());
        ix.add("b".to_string());
        ix.add("a".to_string());
        ix.add("c".to_string());
        assert_eq!(ix.find("b"), Some(1));
        assert_eq!(ix.find("c"), Some(3));
        assert_eq!(ix.find_next(0), Some(2));
        assert_eq!(ix.find_next(2), None);
        assert_eq!(ix.find_last("a"), Some(2));
        assert_eq!(ix.find_prev(2), Some(0));
        assert_eq!(ix.find("d"), None);
        assert_eq!(ix.hash_table().longest_chain(), 4);
    }

    #[test]
    fn find_add_and_find_put() {
        let mut ix: Index<String> = Index::new();
        assert_eq!(ix.find_add("x".to_string()), 0);
        assert_eq!(ix.find_add("y".to_string()), 1);
        assert_eq!(ix.find_add("x".to_string()), 0);
        ix.unlink(0);
        assert_eq!(ix.find_put("y".to_string()), 1);
        assert_eq!(ix.find_put("z".to_string()), 0);
        assert_eq!(ix.get(0), "z");
        assert_eq!(ix.count(), 2);
    }

    #[test]
    fn unlink_then_sweep() {
        let mut ix: Index<i32> = (0..6).collect();
        ix.unlink(2);
        assert_eq!(ix.unlink_key(&4), 1);
        assert_eq!(ix.find(&2), None);
        assert!(ix.is_unlinked(2));
        assert_eq!(*ix.get(2), 2, "unlinked keys remain readable");
        assert_eq!(ix.unlinked(), vec![2, 4]);

        assert_eq!(ix.sweep(), 2);
        assert_eq!(ix.iter().copied().collect::<Vec<_>>(), vec![0, 1, 3, 5]);
        assert_eq!(ix.find(&5), Some(3));
        assert_eq!(ix.find(&4), None);
        assert_eq!(ix.sweep(), 0);
    }

    #[test]
    fn remove_key_removes_every_occurrence() {
        let mut ix: Index<i32> = [3, 1, 3, 2, 3].into_iter().collect();
        assert_eq!(ix.remove_key(&3), 3);
        assert_eq!(ix.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(ix.find(&2), Some(1));
        assert_eq!(ix.remove_key(&9), 0);
    }

    #[test]
    fn remove_key_after_put_reordered_the_chain() {
        let mut ix: Index<i32> = [3, 3, 3].into_iter().collect();
        ix.unlink(0);
        ix.put(3);
        assert_eq!(ix.remove_key(&3), 3);
        assert!(ix.is_empty());
    }

    #[test]
    fn set_insert_and_positional_removal() {
        let mut ix: Index<i32> = (0..4).collect();
        assert_eq!(ix.set(1, 10), 1);
        assert_eq!(ix.find(&1), None);
        assert_eq!(ix.find(&10), Some(1));

        assert!(ix.insert(0, 42));
        assert!(!ix.insert(9, 42));
        assert_eq!(ix.find(&42), Some(0));
        assert_eq!(ix.find(&3), Some(4));

        ix.remove(0, 2);
        assert_eq!(ix.find(&10), Some(0));
        assert_eq!(ix.take(0), 10);
        assert_eq!(ix.find(&2), Some(0));
        assert_eq!(ix.pop(), Some(3));
        assert_eq!(ix.pop(), Some(2));
        assert!(ix.is_empty());
        assert_eq!(ix.pop(), None);
    }

    #[test]
    fn borrowed_lookup_with_str() {
        let mut ix: Index<String> = Index::new();
        ix.add("hello".to_string());
        assert!(ix.contains_key("hello"));
        assert!(!ix.contains_key("world"));
    }

    #[test]
    fn reindex_keeps_tombstones() {
        let mut ix: Index<i32> = (0..5).collect();
        ix.unlink(3);
        ix.reindex();
        assert_eq!(ix.find(&3), None);
        assert!(ix.is_unlinked(3));
        assert_eq!(ix.find(&4), Some(4));
    }

    #[test]
    fn trim_and_drop_last() {
        let mut ix: Index<i32> = (0..10).collect();
        ix.unlink(8);
        ix.trim(6);
        assert!(!ix.has_unlinked());
        assert_eq!(ix.find(&7), None);
        ix.drop_last(2);
        assert_eq!(ix.count(), 4);
        assert_eq!(ix.top(), Some(&3));
    }

    #[test]
    fn clone_is_deep_and_equal() {
        let ix: Index<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let mut copy = ix.clone();
        assert_eq!(ix, copy);
        copy.add("c".to_string());
        assert_ne!(ix, copy);
        assert_eq!(copy.find("c"), Some(2));
        assert_eq!(ix.find("c"), None);
    }

    #[test]
    fn object_index_keeps_key_addresses() {
        let mut ix: ObjectIndex<String> = ObjectIndex::new();
        ix.add("first".to_string());
        let addr: *const String = ix.get(0);
        for i in 0..100 {
            ix.add(format!("k{i}"));
        }
        ix.insert(0, "zero".to_string());
        assert!(core::ptr::eq(ix.get(1), addr));
        assert_eq!(ix.find("first"), Some(1));
        let detached = ix.detach(1);
        assert!(core::ptr::eq(&*detached, addr));
        assert_eq!(ix.find("first"), None);
        assert_eq!(ix.add_boxed(detached), 101);
        assert_eq!(ix.find("first"), Some(101));
    }

    #[test]
    fn swap_exchanges_everything() {
        let mut a: Index<i32> = (0..3).collect();
        let mut b: Index<i32> = (10..12).collect();
        a.swap(&mut b);
        assert_eq!(a.find(&10), Some(0));
        assert_eq!(b.find(&2), Some(2));
    }

    /// Invariant (debug-only): re-entering the index from within `K: Eq`
    /// during a probe panics due to the reentrancy guard.
    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "IndexBase::find_next called while IndexBase::find is probing")]
    fn reentrancy_panics_from_eq_during_find() {
        struct ReentryKey {
            id: &'static str,
            index: *const Index<ReentryKey, ConstBuildHasher>,
            trigger: bool,
        }
        impl PartialEq for ReentryKey {
            fn eq(&self, other: &Self) -> bool {
                if self.id == other.id {
                    return true;
                }
                if other.trigger {
                    // Attempt to re-enter the same index during probing.
                    unsafe {
                        let ix = &*other.index;
                        let _ = ix.count();
                        let _ = ix.find_next(0);
                    }
                }
                false
            }
        }
        impl Eq for ReentryKey {}
        impl Hash for ReentryKey {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }

        let mut ix: Index<ReentryKey, ConstBuildHasher> = Index::with_hasher(ConstBuildHasher);
        ix.add(ReentryKey {
            id: "a",
            index: core::ptr::null(),
            trigger: false,
        });
        let query = ReentryKey {
            id: "b",
            index: &ix as *const _,
            trigger: true,
        };
        let _ = ix.find(&query);
    }
}
