//! Object pool: live objects behind generational keys, released objects
//! kept for reuse.
//!
//! A released object is not dropped. It moves to a recycle list and the
//! next `acquire` hands it back out as-is, so callers that need a clean
//! object reset it themselves. Keys are `slotmap` keys: once released,
//! a key never resolves again, even after its slot is reused.

use crate::array::Array;
use crate::error::ContainerError;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to a live pooled object.
    pub struct PoolKey;
}

pub struct Pool<T> {
    live: SlotMap<PoolKey, T>,
    spare: Array<T>,
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            live: SlotMap::with_key(),
            spare: Array::new(),
        }
    }

    /// Reuse a released object, or default-construct one.
    pub fn acquire(&mut self) -> PoolKey
    where
        T: Default,
    {
        self.acquire_with(T::default)
    }

    /// Reuse a released object; `make` runs only when none is left.
    pub fn acquire_with<F>(&mut self, make: F) -> PoolKey
    where
        F: FnOnce() -> T,
    {
        let item = match self.spare.pop() {
            Some(item) => item,
            None => make(),
        };
        self.live.insert(item)
    }

    pub fn get(&self, key: PoolKey) -> Option<&T> {
        self.live.get(key)
    }

    pub fn get_mut(&mut self, key: PoolKey) -> Option<&mut T> {
        self.live.get_mut(key)
    }

    pub fn contains_key(&self, key: PoolKey) -> bool {
        self.live.contains_key(key)
    }

    /// Return the object to the recycle list.
    pub fn release(&mut self, key: PoolKey) -> Result<(), ContainerError> {
        let item = self.live.remove(key).ok_or(ContainerError::StaleKey)?;
        self.spare.add(item);
        Ok(())
    }

    /// Remove the object for good, bypassing the recycle list.
    pub fn take(&mut self, key: PoolKey) -> Option<T> {
        self.live.remove(key)
    }

    /// Live objects.
    #[inline]
    pub fn count(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Released objects waiting for reuse.
    #[inline]
    pub fn free_count(&self) -> usize {
        self.spare.count()
    }

    /// Drop every recycled object.
    pub fn shrink(&mut self) {
        let n = self.spare.count();
        self.spare.clear();
        self.spare.shrink();
        log::debug!("Pool::shrink: dropped {} recycled objects", n);
    }

    /// Drop live and recycled objects alike; outstanding keys go stale.
    pub fn clear(&mut self) {
        self.live.clear();
        self.spare.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolKey, &T)> + '_ {
        self.live.iter()
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn released_objects_are_reused() {
        let mut pool: Pool<Vec<u8>> = Pool::new();
        let a = pool.acquire();
        pool.get_mut(a).unwrap().extend_from_slice(b"keep");
        pool.release(a).unwrap();
        assert_eq!(pool.count(), 0);
        assert_eq!(pool.free_count(), 1);

        let b = pool.acquire();
        assert_eq!(pool.get(b).map(|v| v.as_slice()), Some(&b"keep"[..]));
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn stale_keys_never_resolve() {
        let mut pool: Pool<u32> = Pool::new();
        let a = pool.acquire_with(|| 7);
        pool.release(a).unwrap();
        let b = pool.acquire();
        assert_ne!(a, b);
        assert!(pool.get(a).is_none());
        assert_eq!(pool.release(a), Err(ContainerError::StaleKey));
        assert_eq!(pool.get(b), Some(&7));
    }

    #[test]
    fn factory_runs_only_when_nothing_to_recycle() {
        let made = Cell::new(0);
        let mut pool: Pool<u8> = Pool::new();
        let make = || {
            made.set(made.get() + 1);
            1
        };
        let a = pool.acquire_with(make);
        pool.release(a).unwrap();
        pool.acquire_with(make);
        pool.acquire_with(make);
        assert_eq!(made.get(), 2);
        assert_eq!(pool.count(), 2);
    }

    #[test]
    fn shrink_and_clear() {
        let mut pool: Pool<String> = Pool::new();
        let keys: Vec<PoolKey> = (0..4).map(|_| pool.acquire()).collect();
        for &k in &keys[..3] {
            pool.release(k).unwrap();
        }
        assert_eq!(pool.free_count(), 3);
        pool.shrink();
        assert_eq!(pool.free_count(), 0);
        assert_eq!(pool.count(), 1);
        assert_eq!(pool.take(keys[3]), Some(String::new()));
        assert!(pool.is_empty());

        let k = pool.acquire();
        pool.clear();
        assert!(!pool.contains_key(k));
        assert_eq!(pool.iter().count(), 0);
    }
}
