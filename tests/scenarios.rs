use substrate_containers::{
    Array, CompactString, ContainerError, Index, Map, ObjectArray, ObjectMap, Pool, RingBuffer,
};

#[test]
fn array_remove_middle() {
    let mut a: Array<i32> = Array::new();
    a.add(1);
    a.add(2);
    a.add(3);
    a.remove(1, 1);
    assert_eq!(a.as_slice(), &[1, 3]);
    assert_eq!(a.count(), 2);
}

#[test]
fn map_duplicate_key_walk() {
    let mut m: Map<CompactString, i32> = Map::new();
    m.add("a".into(), 1);
    m.add("b".into(), 2);
    m.add("a".into(), 3);
    let first = m.find("a").expect("a present");
    assert_eq!((first, *m.value(first)), (0, 1));
    let next = m.find_next(first).expect("second a");
    assert_eq!((next, *m.value(next)), (2, 3));
}

#[test]
fn index_put_reuses_tombstone() {
    let mut ix: Index<i32> = Index::new();
    ix.add(5);
    ix.add(6);
    assert!(!ix.has_unlinked());
    assert_eq!(ix.put(5), 2, "no tombstones: put appends");
    ix.unlink(0);
    assert_eq!(ix.put(5), 0, "tombstoned slot is reused");
    assert_eq!(ix.count(), 3);
}

#[test]
fn string_inline_then_shared_copy_on_write() {
    let mut hello = CompactString::from("Hello");
    hello.cat(", World");
    assert_eq!(hello.len(), 12);
    assert!(hello.is_inline());

    let xs = CompactString::repeat_char('x', 20);
    assert_eq!(xs.len(), 20);
    assert!(xs.is_shared());
    let mut copy = xs.clone();
    assert_eq!(xs.ref_count(), 2);
    copy.cat_char('y');
    assert_eq!(xs.ref_count(), 1);
    assert_eq!(xs.len(), 20);
    assert_eq!(copy.len(), 21);
    assert!(xs.as_str().chars().all(|c| c == 'x'));
}

#[test]
fn ring_overwrite_keeps_newest() {
    let mut r = RingBuffer::with_overwrite(3);
    for v in [1, 2, 3, 4] {
        r.add(v).expect("overwrite never fails");
    }
    assert_eq!(r.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    assert_eq!(r.get(), Some(&2));

    let mut strict = RingBuffer::new(1);
    strict.add(1).expect("room for one");
    let err = strict.add(2).unwrap_err();
    assert_eq!(err, ContainerError::RingFull { capacity: 1 });
    assert_eq!(err.to_string(), "ring buffer is full (1 slots)");
}

#[test]
fn tombstone_then_sweep_preserves_order() {
    let mut m: Map<i32, &str> = Map::new();
    for (k, v) in [(1, "one"), (2, "two"), (3, "three"), (4, "four")] {
        m.add(k, v);
    }
    m.unlink(1);
    assert_eq!(m.sweep(), 1);
    assert_eq!(m.find(&2), None);
    let keys: Vec<i32> = m.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![1, 3, 4]);
    assert_eq!(m.keys().count(), m.values().count());
}

#[test]
fn shrink_is_idempotent() {
    let mut a: Array<u64> = (0..100).collect();
    a.trim(10);
    a.shrink();
    let once = (a.capacity(), a.as_slice().as_ptr());
    a.shrink();
    assert_eq!((a.capacity(), a.as_slice().as_ptr()), once);
}

#[test]
fn set_count_round_trip_default_constructs() {
    let mut a: Array<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
    a.set_count(2);
    a.set_count(4);
    assert_eq!(a.as_slice(), &["a", "b", "", ""]);
}

#[test]
fn object_containers_keep_addresses() {
    let mut objs: ObjectArray<[u64; 8]> = ObjectArray::new();
    objs.add([1; 8]);
    let addr: *const [u64; 8] = objs.get(0);
    for i in 0..64 {
        objs.insert(0, [i; 8]);
    }
    assert!(std::ptr::eq(objs.get(64), addr));

    let mut m: ObjectMap<&str, Vec<u8>> = ObjectMap::new();
    m.add("buf", vec![1, 2, 3]);
    let before: *const Vec<u8> = m.value(0);
    for i in 0..50 {
        m.insert(0, "pad", vec![i]);
    }
    let at = m.find(&"buf").expect("still present");
    assert!(std::ptr::eq(m.value(at), before));
}

#[test]
fn string_keys_look_up_by_str() {
    let mut m: Map<CompactString, u32> = Map::new();
    *m.get_add(CompactString::from("a rather long key name")) += 1;
    *m.get_add(CompactString::from("a rather long key name")) += 1;
    *m.get_add(CompactString::from("short")) += 1;
    assert_eq!(m.get("a rather long key name"), Some(&2));
    assert_eq!(m.get("short"), Some(&1));
    assert_eq!(m.count(), 2);
}

#[test]
fn pool_stale_key_is_an_error() {
    let mut pool: Pool<Vec<u32>> = Pool::new();
    let k = pool.acquire();
    pool.release(k).expect("live key");
    assert_eq!(pool.release(k), Err(ContainerError::StaleKey));
}
