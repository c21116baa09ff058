#![cfg(test)]

// Property tests for Index kept inside the crate so they can check the
// hash table's internal chain consistency after every step.

use crate::index::Index;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: key indices shrink to
// earlier keys, positions shrink towards the front.
#[derive(Clone, Debug)]
enum OpI {
    Add(usize),
    Put(usize),
    FindPut(usize),
    Unlink(usize),
    UnlinkKey(usize),
    Sweep,
    Remove(usize),
    RemoveKey(usize),
    Insert(usize, usize),
    Set(usize, usize),
    Find(usize),
    Contains(String),
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=6).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let pos = 0usize..24;
        let op = prop_oneof![
            idx.clone().prop_map(OpI::Add),
            idx.clone().prop_map(OpI::Put),
            idx.clone().prop_map(OpI::FindPut),
            pos.clone().prop_map(OpI::Unlink),
            idx.clone().prop_map(OpI::UnlinkKey),
            Just(OpI::Sweep),
            pos.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::RemoveKey),
            (pos.clone(), idx.clone()).prop_map(|(p, i)| OpI::Insert(p, i)),
            (pos.clone(), idx.clone()).prop_map(|(p, i)| OpI::Set(p, i)),
            idx.clone().prop_map(OpI::Find),
            "[a-z]{0,4}".prop_map(OpI::Contains),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Slot-level model: the key in each slot, whether it is live, and the
/// tombstone reuse order (most recent last).
#[derive(Default)]
struct Model {
    slots: Vec<(Key, bool)>,
    free: Vec<usize>,
}

impl Model {
    // Shifting operations rebuild the table, which relists tombstones in
    // slot order.
    fn relist_free(&mut self) {
        self.free = (0..self.slots.len()).filter(|&i| !self.slots[i].1).collect();
    }

    fn live_positions(&self, k: &Key) -> BTreeSet<usize> {
        (0..self.slots.len())
            .filter(|&i| self.slots[i].1 && &self.slots[i].0 == k)
            .collect()
    }

    fn put(&mut self, k: Key) -> usize {
        match self.free.pop() {
            Some(i) => {
                self.slots[i] = (k, true);
                i
            }
            None => {
                self.slots.push((k, true));
                self.slots.len() - 1
            }
        }
    }
}

fn occurrences<S: BuildHasher>(sut: &Index<Key, S>, k: &Key) -> BTreeSet<usize> {
    let mut out = BTreeSet::new();
    let mut cur = sut.find(k);
    while let Some(i) = cur {
        out.insert(i);
        cur = sut.find_next(i);
    }
    out
}

fn run_scenario<S: BuildHasher>(
    mut sut: Index<Key, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model = Model::default();
    for op in ops {
        match op {
            OpI::Add(i) => {
                let k = key_from(pool, i);
                let at = sut.add(k.clone());
                model.slots.push((k, true));
                prop_assert_eq!(at, model.slots.len() - 1);
            }
            OpI::Put(i) => {
                let k = key_from(pool, i);
                let at = sut.put(k.clone());
                prop_assert_eq!(at, model.put(k));
            }
            OpI::FindPut(i) => {
                let k = key_from(pool, i);
                let existing = model.live_positions(&k);
                let at = sut.find_put(k.clone());
                if existing.is_empty() {
                    prop_assert_eq!(at, model.put(k));
                } else {
                    prop_assert!(existing.contains(&at), "find_put must return a live match");
                }
            }
            OpI::Unlink(p) => {
                if p < model.slots.len() && model.slots[p].1 {
                    sut.unlink(p);
                    model.slots[p].1 = false;
                    model.free.push(p);
                }
            }
            OpI::UnlinkKey(i) => {
                let k = key_from(pool, i);
                let expected = model.live_positions(&k);
                let n = sut.unlink_key(&k);
                prop_assert_eq!(n, expected.len());
                for p in expected {
                    model.slots[p].1 = false;
                    model.free.push(p);
                }
            }
            OpI::Sweep => {
                let before = model.slots.len();
                model.slots.retain(|(_, live)| *live);
                model.free.clear();
                prop_assert_eq!(sut.sweep(), before - model.slots.len());
            }
            OpI::Remove(p) => {
                if p < model.slots.len() {
                    sut.remove(p, 1);
                    model.slots.remove(p);
                    model.relist_free();
                }
            }
            OpI::RemoveKey(i) => {
                let k = key_from(pool, i);
                let expected = model.live_positions(&k);
                prop_assert_eq!(sut.remove_key(&k), expected.len());
                for &p in expected.iter().rev() {
                    model.slots.remove(p);
                }
                if !expected.is_empty() {
                    model.relist_free();
                }
            }
            OpI::Insert(p, i) => {
                let k = key_from(pool, i);
                let ok = sut.insert(p, k.clone());
                prop_assert_eq!(ok, p <= model.slots.len());
                if ok {
                    model.slots.insert(p, (k, true));
                    model.relist_free();
                }
            }
            OpI::Set(p, i) => {
                if p < model.slots.len() {
                    let k = key_from(pool, i);
                    let old = sut.set(p, k.clone());
                    prop_assert_eq!(&old, &model.slots[p].0);
                    if !model.slots[p].1 {
                        model.free.retain(|&f| f != p);
                    }
                    model.slots[p] = (k, true);
                }
            }
            OpI::Find(i) => {
                let k = key_from(pool, i);
                let expected = model.live_positions(&k);
                match sut.find(&k) {
                    Some(at) => prop_assert!(expected.contains(&at)),
                    None => prop_assert!(expected.is_empty()),
                }
                prop_assert_eq!(occurrences(&sut, &k), expected.clone());
                let last = sut.find_last(&k);
                prop_assert_eq!(last.is_some(), !expected.is_empty());
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.slots.iter().any(|(k, live)| *live && k.0 == s);
                prop_assert_eq!(has, has_model);
            }
        }

        // Post-conditions after each op
        sut.hash_table().check();
        prop_assert_eq!(sut.count(), model.slots.len());
        for (p, (k, live)) in model.slots.iter().enumerate() {
            prop_assert_eq!(sut.get(p), k);
            prop_assert_eq!(sut.is_unlinked(p), !*live);
        }
        let mut free_sorted = model.free.clone();
        free_sorted.sort_unstable();
        prop_assert_eq!(sut.unlinked(), free_sorted);
        prop_assert_eq!(sut.has_unlinked(), !model.free.is_empty());
    }
    Ok(())
}

// Property: Slot-level equivalence with a Vec model across random
// operation sequences:
// - `add` appends; `put` reuses the most recently unlinked slot first.
// - Lookups see exactly the live slots holding the key.
// - `sweep`/`remove*` keep the relative order of the survivors.
// - Tombstones stay in place and readable until swept or reused.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_slot_model((pool, ops) in arb_scenario()) {
        run_scenario(Index::<Key>::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
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
    }
}

// Property: Same model under worst-case collisions, where every key
// shares one chain and only equality tells them apart.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_slot_model_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(Index::<Key, ConstBuildHasher>::with_hasher(ConstBuildHasher), &pool, ops)?;
    }
}
