//! HashTable: chained index from 32-bit hashes to slot numbers.
//!
//! The table stores no keys. Slot `i` carries a hash and two chain links;
//! the owner keeps whatever slot `i` stands for in a parallel sequence.
//! Each bucket heads a circular, doubly-linked chain, so appending keeps
//! chains in slot order and `find_prev`/`unlink` are O(1) per step.
//!
//! Unlinked slots (tombstones) keep their position and hash but leave
//! their chain; `put` hands the most recently unlinked slot back out, and
//! `sweep` compacts them away. Any operation that shifts slot numbers
//! (`insert`, `remove`, `remove_sorted`, `sweep`) rebuilds every chain.

use crate::array::Array;
use crate::verify::{is_strictly_ascending, verify};

const NONE: u32 = u32::MAX;
const MIN_BUCKETS: usize = 8;
/// 2^32 / golden ratio: spreads sequential hashes across buckets.
const SPREAD: u32 = 0x9E37_79B9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Link {
    hash: u32,
    next: u32,
    prev: u32,
    unlinked: bool,
}

impl Link {
    fn new(hash: u32) -> Self {
        Link {
            hash,
            next: NONE,
            prev: NONE,
            unlinked: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HashTable {
    links: Array<Link>,
    /// Chain head per bucket; the length is zero or a power of two.
    buckets: Array<u32>,
    shift: u32,
    /// Unlinked slots, most recent last.
    free: Array<u32>,
}

fn bucket_count_for(slots: usize) -> usize {
    slots.next_power_of_two().max(MIN_BUCKETS)
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HashTable {
    pub const fn new() -> Self {
        Self {
            links: Array::new(),
            buckets: Array::new(),
            shift: 32,
            free: Array::new(),
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.links.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Stored hash of slot `i`, linked or not.
    pub fn hash(&self, i: usize) -> u32 {
        self.links[i].hash
    }

    #[inline]
    fn bucket(&self, hash: u32) -> usize {
        (hash.wrapping_mul(SPREAD) >> self.shift) as usize
    }

    fn link_tail(&mut self, i: usize) {
        let b = self.bucket(self.links[i].hash);
        let slot = i as u32;
        let head = self.buckets[b];
        if head == NONE {
            self.buckets[b] = slot;
            let l = &mut self.links[i];
            l.next = slot;
            l.prev = slot;
        } else {
            let tail = self.links[head as usize].prev;
            {
                let l = &mut self.links[i];
                l.next = head;
                l.prev = tail;
            }
            self.links[tail as usize].next = slot;
            self.links[head as usize].prev = slot;
        }
    }

    fn unlink_chain(&mut self, i: usize) {
        let Link { hash, next, prev, .. } = self.links[i];
        let b = self.bucket(hash);
        if next as usize == i {
            self.buckets[b] = NONE;
        } else {
            self.links[prev as usize].next = next;
            self.links[next as usize].prev = prev;
            if self.buckets[b] as usize == i {
                self.buckets[b] = next;
            }
        }
        let l = &mut self.links[i];
        l.next = NONE;
        l.prev = NONE;
    }

    /// Relink every live slot from scratch using `bucket_count` buckets.
    /// The tombstone list is left in its reuse order.
    fn rebuild_with(&mut self, bucket_count: usize) {
        debug_assert!(bucket_count.is_power_of_two());
        if self.buckets.count() != bucket_count {
            log::trace!(
                "HashTable: {} buckets -> {} ({} slots)",
                self.buckets.count(),
                bucket_count,
                self.links.count()
            );
        }
        self.buckets.clear();
        self.buckets.set_count_with(bucket_count, &NONE);
        self.shift = 32 - bucket_count.trailing_zeros();
        for i in 0..self.links.count() {
            if !self.links[i].unlinked {
                self.link_tail(i);
            }
        }
    }

    /// Rebuild every chain and the tombstone list from the stored hashes.
    /// Tombstones are relisted in slot order.
    pub fn reindex(&mut self) {
        let want = bucket_count_for(self.links.count()).max(self.buckets.count());
        self.rebuild_with(want);
        self.free.clear();
        for i in 0..self.links.count() {
            if self.links[i].unlinked {
                self.free.add(i as u32);
            }
        }
    }

    /// Append a new linked slot holding `hash`.
    pub fn add(&mut self, hash: u32) {
        let i = self.links.count();
        assert!(i < NONE as usize, "HashTable::add: slot count overflow");
        self.links.add(Link::new(hash));
        if i + 1 > self.buckets.count() {
            self.rebuild_with(bucket_count_for(i + 1));
        } else {
            self.link_tail(i);
        }
    }

    /// Reuse the most recently unlinked slot for `hash`, or append one.
    /// Returns the slot; it equals the previous `count()` when appended.
    pub fn put(&mut self, hash: u32) -> usize {
        match self.free.pop() {
            Some(i) => {
                let i = i as usize;
                let l = &mut self.links[i];
                l.hash = hash;
                l.unlinked = false;
                self.link_tail(i);
                i
            }
            None => {
                self.add(hash);
                self.links.count() - 1
            }
        }
    }

    /// Give slot `i` a new hash, relinking it if it was unlinked.
    pub fn set(&mut self, i: usize, hash: u32) {
        if self.links[i].unlinked {
            let at = self.free.find(&(i as u32));
            verify!(at.is_some(), "HashTable::set: tombstone {} missing from free list", i);
            if let Some(at) = at {
                self.free.remove(at, 1);
            }
            self.links[i].unlinked = false;
        } else {
            self.unlink_chain(i);
        }
        self.links[i].hash = hash;
        self.link_tail(i);
    }

    /// First linked slot holding `hash`.
    pub fn find(&self, hash: u32) -> Option<usize> {
        if self.buckets.is_empty() {
            return None;
        }
        let head = self.buckets[self.bucket(hash)];
        if head == NONE {
            return None;
        }
        let mut i = head;
        loop {
            let l = &self.links[i as usize];
            if l.hash == hash {
                return Some(i as usize);
            }
            i = l.next;
            if i == head {
                return None;
            }
        }
    }

    /// Next linked slot after `i` in its chain with the same hash.
    pub fn find_next(&self, i: usize) -> Option<usize> {
        verify!(!self.links[i].unlinked, "HashTable::find_next: slot {} is unlinked", i);
        let hash = self.links[i].hash;
        let head = self.buckets[self.bucket(hash)];
        let mut j = self.links[i].next;
        while j != head {
            let l = &self.links[j as usize];
            if l.hash == hash {
                return Some(j as usize);
            }
            j = l.next;
        }
        None
    }

    /// Last linked slot holding `hash`.
    pub fn find_last(&self, hash: u32) -> Option<usize> {
        if self.buckets.is_empty() {
            return None;
        }
        let head = self.buckets[self.bucket(hash)];
        if head == NONE {
            return None;
        }
        let mut j = self.links[head as usize].prev;
        loop {
            let l = &self.links[j as usize];
            if l.hash == hash {
                return Some(j as usize);
            }
            if j == head {
                return None;
            }
            j = l.prev;
        }
    }

    /// Previous linked slot before `i` in its chain with the same hash.
    pub fn find_prev(&self, i: usize) -> Option<usize> {
        verify!(!self.links[i].unlinked, "HashTable::find_prev: slot {} is unlinked", i);
        let hash = self.links[i].hash;
        let head = self.buckets[self.bucket(hash)];
        if i as u32 == head {
            return None;
        }
        let mut j = self.links[i].prev;
        loop {
            let l = &self.links[j as usize];
            if l.hash == hash {
                return Some(j as usize);
            }
            if j == head {
                return None;
            }
            j = l.prev;
        }
    }

    /// Tombstone slot `i`: it stays in place but no search finds it.
    pub fn unlink(&mut self, i: usize) {
        verify!(!self.links[i].unlinked, "HashTable::unlink: slot {} already unlinked", i);
        if self.links[i].unlinked {
            return;
        }
        self.unlink_chain(i);
        self.links[i].unlinked = true;
        self.free.add(i as u32);
    }

    #[inline]
    pub fn is_unlinked(&self, i: usize) -> bool {
        self.links[i].unlinked
    }

    #[inline]
    pub fn has_unlinked(&self) -> bool {
        !self.free.is_empty()
    }

    /// Every tombstoned slot, ascending.
    pub fn unlinked(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self.free.iter().map(|&i| i as usize).collect();
        out.sort_unstable();
        out
    }

    pub fn insert(&mut self, at: usize, hash: u32) -> bool {
        if !self.links.insert(at, Link::new(hash)) {
            return false;
        }
        self.reindex();
        true
    }

    pub fn remove(&mut self, at: usize, count: usize) {
        self.links.remove(at, count);
        self.reindex();
    }

    pub fn remove_sorted(&mut self, sorted: &[usize]) {
        if sorted.is_empty() {
            return;
        }
        self.links.remove_sorted(sorted);
        self.reindex();
    }

    /// Physically remove the tombstones listed in `sorted` (ascending),
    /// keeping the relative order of the remaining slots.
    pub fn sweep(&mut self, sorted: &[usize]) {
        verify!(
            is_strictly_ascending(sorted, self.count()),
            "HashTable::sweep: indices must be strictly ascending"
        );
        verify!(
            sorted.iter().all(|&i| self.links[i].unlinked),
            "HashTable::sweep: only unlinked slots may be swept"
        );
        self.remove_sorted(sorted);
    }

    /// Cut the table down to `count` slots.
    pub fn trim(&mut self, count: usize) {
        let n = self.count();
        assert!(count <= n, "HashTable::trim: {} exceeds count {}", count, n);
        for i in count..n {
            if !self.links[i].unlinked {
                self.unlink_chain(i);
            }
        }
        let bound = count as u32;
        self.free.remove_if(|&i| i >= bound);
        self.links.trim(count);
    }

    pub fn drop_last(&mut self, count: usize) {
        let n = self.count();
        assert!(count <= n, "HashTable::drop_last: {} exceeds count {}", count, n);
        self.trim(n - count);
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.buckets.clear();
        self.free.clear();
        self.shift = 32;
    }

    /// Make room for `total` slots, including their buckets.
    pub fn reserve(&mut self, total: usize) {
        self.links.reserve(total);
        let want = bucket_count_for(total);
        if want > self.buckets.count() {
            self.rebuild_with(want);
        }
    }

    /// Release spare slot capacity and oversized bucket arrays.
    pub fn shrink(&mut self) {
        self.links.shrink();
        self.free.shrink();
        if self.links.is_empty() {
            self.buckets.clear();
            self.buckets.shrink();
            self.shift = 32;
            return;
        }
        let want = bucket_count_for(self.links.count());
        if want < self.buckets.count() {
            self.rebuild_with(want);
        }
        self.buckets.shrink();
    }

    pub fn swap(&mut self, other: &mut HashTable) {
        core::mem::swap(self, other);
    }

    #[cfg(any(test, feature = "bench_internal"))]
    pub fn bucket_count(&self) -> usize {
        self.buckets.count()
    }

    /// Length of the longest bucket chain.
    #[cfg(any(test, feature = "bench_internal"))]
    pub fn longest_chain(&self) -> usize {
        let mut longest = 0;
        for &head in self.buckets.iter() {
            if head == NONE {
                continue;
            }
            let mut len = 1;
            let mut i = self.links[head as usize].next;
            while i != head {
                len += 1;
                i = self.links[i as usize].next;
            }
            longest = longest.max(len);
        }
        longest
    }

    /// Walk every chain and check link symmetry, bucket placement and
    /// tombstone bookkeeping.
    #[cfg(test)]
    pub(crate) fn check(&self) {
        let mut seen = vec![false; self.count()];
        for (b, &head) in self.buckets.iter().enumerate() {
            if head == NONE {
                continue;
            }
            let mut i = head;
            loop {
                let l = self.links[i as usize];
                assert!(!l.unlinked, "unlinked slot {} on a chain", i);
                assert_eq!(self.bucket(l.hash), b, "slot {} in wrong bucket", i);
                assert_eq!(self.links[l.next as usize].prev, i);
                assert!(!seen[i as usize], "slot {} chained twice", i);
                seen[i as usize] = true;
                i = l.next;
                if i == head {
                    break;
                }
            }
        }
        for (i, l) in self.links.iter().enumerate() {
            assert_eq!(seen[i], !l.unlinked, "slot {} chain membership", i);
        }
        let mut free = self.unlinked();
        free.dedup();
        assert_eq!(free.len(), self.free.count());
        assert!(free.iter().all(|&i| self.links[i].unlinked));
        assert_eq!(free.len(), self.links.iter().filter(|l| l.unlinked).count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all(t: &HashTable, hash: u32) -> Vec<usize> {
        let mut out = Vec::new();
        let mut i = t.find(hash);
        while let Some(x) = i {
            out.push(x);
            i = t.find_next(x);
        }
        out
    }

    #[test]
    fn empty_table_finds_nothing() {
        let t = HashTable::new();
        assert_eq!(t.find(0), None);
        assert_eq!(t.find_last(0), None);
        assert_eq!(t.count(), 0);
    }

    #[test]
    fn chains_follow_slot_order() {
        let mut t = HashTable::new();
        for h in [7, 3, 7, 9, 7] {
            t.add(h);
        }
        t.check();
        assert_eq!(all(&t, 7), vec![0, 2, 4]);
        assert_eq!(t.find_last(7), Some(4));
        assert_eq!(t.find_prev(4), Some(2));
        assert_eq!(t.find_prev(2), Some(0));
        assert_eq!(t.find_prev(0), None);
        assert_eq!(t.find(3), Some(1));
        assert_eq!(t.find(4), None);
    }

    #[test]
    fn same_bucket_different_hash_is_skipped() {
        let mut t = HashTable::new();
        t.add(1);
        let b = t.bucket(1);
        // second hash that lands in the same bucket as 1
        let other = (2..10_000u32).find(|&h| t.bucket(h) == b).unwrap();
        t.add(other);
        t.add(1);
        t.check();
        assert_eq!(all(&t, 1), vec![0, 2]);
        assert_eq!(all(&t, other), vec![1]);
        assert_eq!(t.find_prev(2), Some(0));
    }

    #[test]
    fn growth_rebuilds_buckets() {
        let mut t = HashTable::new();
        for h in 0..1000u32 {
            t.add(h);
        }
        t.check();
        assert!(t.bucket_count() >= 1000);
        assert!(t.bucket_count().is_power_of_two());
        for h in 0..1000u32 {
            assert_eq!(t.find(h), Some(h as usize));
        }
    }

    #[test]
    fn unlink_hides_slot_and_put_reuses_it() {
        let mut t = HashTable::new();
        t.add(5);
        t.add(6);
        t.add(5);
        t.unlink(0);
        t.check();
        assert!(t.is_unlinked(0));
        assert!(t.has_unlinked());
        assert_eq!(all(&t, 5), vec![2]);
        assert_eq!(t.unlinked(), vec![0]);

        assert_eq!(t.put(5), 0);
        t.check();
        assert!(!t.has_unlinked());
        assert_eq!(t.put(8), 3);
        assert_eq!(t.count(), 4);
    }

    #[test]
    fn put_reuses_most_recent_tombstone_first() {
        let mut t = HashTable::new();
        for h in 0..4 {
            t.add(h);
        }
        t.unlink(1);
        t.unlink(3);
        assert_eq!(t.put(42), 3);
        assert_eq!(t.put(43), 1);
        assert_eq!(t.put(44), 4);
        t.check();
    }

    #[test]
    fn sweep_removes_tombstones_and_keeps_order() {
        let mut t = HashTable::new();
        for h in [10, 11, 12, 13, 14] {
            t.add(h);
        }
        t.unlink(1);
        t.unlink(3);
        let list = t.unlinked();
        t.sweep(&list);
        t.check();
        assert_eq!(t.count(), 3);
        assert_eq!(t.hash(0), 10);
        assert_eq!(t.hash(1), 12);
        assert_eq!(t.hash(2), 14);
        assert_eq!(t.find(11), None);
        assert_eq!(t.find(14), Some(2));
    }

    #[test]
    fn insert_and_remove_shift_slots() {
        let mut t = HashTable::new();
        for h in [1, 2, 3] {
            t.add(h);
        }
        t.unlink(2);
        assert!(t.insert(0, 9));
        assert!(!t.insert(9, 9));
        t.check();
        assert_eq!(t.find(9), Some(0));
        assert_eq!(t.find(1), Some(1));
        assert!(t.is_unlinked(3));
        t.remove(0, 2);
        t.check();
        assert_eq!(t.find(2), Some(0));
        assert_eq!(t.unlinked(), vec![1]);
    }

    #[test]
    fn set_moves_slot_between_chains() {
        let mut t = HashTable::new();
        t.add(1);
        t.add(2);
        t.set(0, 2);
        t.check();
        assert_eq!(t.find(1), None);
        assert_eq!(all(&t, 2), vec![1, 0]);

        t.unlink(1);
        t.set(1, 3);
        t.check();
        assert!(!t.has_unlinked());
        assert_eq!(t.find(3), Some(1));
    }

    #[test]
    fn trim_detaches_tail() {
        let mut t = HashTable::new();
        for h in 0..10 {
            t.add(h % 3);
        }
        t.unlink(8);
        t.unlink(2);
        t.trim(5);
        t.check();
        assert_eq!(t.count(), 5);
        assert_eq!(t.unlinked(), vec![2]);
        assert_eq!(all(&t, 0), vec![0, 3]);
        t.drop_last(5);
        t.check();
        assert!(t.is_empty());
    }

    #[test]
    fn reserve_and_shrink_keep_lookups() {
        let mut t = HashTable::new();
        t.reserve(100);
        assert!(t.bucket_count() >= 100);
        for h in 0..10 {
            t.add(h);
        }
        t.shrink();
        t.check();
        assert_eq!(t.bucket_count(), 16);
        let before = t.bucket_count();
        t.shrink();
        assert_eq!(t.bucket_count(), before);
        for h in 0..10 {
            assert_eq!(t.find(h), Some(h as usize));
        }
    }

    #[test]
    fn reindex_preserves_tombstones() {
        let mut t = HashTable::new();
        for h in 0..6 {
            t.add(h);
        }
        t.unlink(4);
        t.reindex();
        t.check();
        assert_eq!(t.unlinked(), vec![4]);
        assert_eq!(t.find(4), None);
    }

    #[test]
    fn bucket_resizes_keep_tombstone_reuse_order() {
        // Growth through add.
        let mut t = HashTable::new();
        for h in 0..8 {
            t.add(h);
        }
        t.unlink(5);
        t.unlink(2);
        t.add(100);
        assert_eq!(t.bucket_count(), 16);
        t.check();
        assert_eq!(t.put(200), 2);
        assert_eq!(t.put(201), 5);

        // Growth through reserve.
        let mut t = HashTable::new();
        for h in 0..4 {
            t.add(h);
        }
        t.unlink(3);
        t.unlink(1);
        t.reserve(64);
        t.check();
        assert_eq!(t.put(200), 1);
        assert_eq!(t.put(201), 3);

        // Bucket shrink.
        let mut t = HashTable::new();
        for h in 0..40 {
            t.add(h);
        }
        t.remove(8, 32);
        assert_eq!(t.bucket_count(), 64);
        t.unlink(5);
        t.unlink(2);
        t.shrink();
        assert_eq!(t.bucket_count(), 8);
        t.check();
        assert_eq!(t.put(200), 2);
        assert_eq!(t.put(201), 5);
        t.check();
    }

    #[test]
    fn reindex_relists_tombstones_in_slot_order() {
        let mut t = HashTable::new();
        for h in 0..6 {
            t.add(h);
        }
        t.unlink(1);
        t.unlink(4);
        t.reindex();
        t.check();
        assert_eq!(t.put(10), 4);
        assert_eq!(t.put(11), 1);
    }

    #[test]
    fn longest_chain_counts_collisions() {
        let mut t = HashTable::new();
        for _ in 0..5 {
            t.add(77);
        }
        assert_eq!(t.longest_chain(), 5);
    }
}
