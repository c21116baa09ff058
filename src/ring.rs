//! Fixed-capacity circular buffer over an `Array` of slots.

use crate::array::Array;
use crate::error::ContainerError;
use core::ops;

/// FIFO ring with a fixed number of slots.
///
/// A full ring either rejects new values or, with overwrite enabled,
/// drops the oldest to make room.
pub struct RingBuffer<T> {
    slots: Array<Option<T>>,
    head: usize,
    len: usize,
    overwrite: bool,
}

impl<T> RingBuffer<T> {
    /// Ring that rejects values once full. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let slots: Array<Option<T>> = (0..capacity).map(|_| None).collect();
        Self {
            slots,
            head: 0,
            len: 0,
            overwrite: false,
        }
    }

    /// Ring that drops its oldest value when a new one arrives while full.
    pub fn with_overwrite(capacity: usize) -> Self {
        let mut ring = Self::new(capacity);
        ring.overwrite = true;
        ring
    }

    pub fn set_overwrite(&mut self, overwrite: bool) {
        self.overwrite = overwrite;
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.count()
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    #[inline]
    fn physical(&self, logical: usize) -> usize {
        (self.head + logical) % self.capacity()
    }

    /// Append at the back.
    pub fn add(&mut self, item: T) -> Result<(), ContainerError> {
        if self.is_full() {
            if !self.overwrite {
                return Err(ContainerError::RingFull {
                    capacity: self.capacity(),
                });
            }
            let head = self.head;
            self.slots[head] = Some(item);
            self.head = self.physical(1);
            return Ok(());
        }
        let tail = self.physical(self.len);
        self.slots[tail] = Some(item);
        self.len += 1;
        Ok(())
    }

    /// Oldest value.
    pub fn get(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.slots[self.head].as_ref()
    }

    /// Newest value.
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.slots[self.physical(self.len - 1)].as_ref()
    }

    /// Remove and return the oldest value.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let head = self.head;
        let item = self.slots[head].take();
        self.head = self.physical(1);
        self.len -= 1;
        item
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }

    /// Values from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |i| self.slots[self.physical(i)].as_ref())
    }
}

/// Indexed by logical position, 0 being the oldest.
impl<T> ops::Index<usize> for RingBuffer<T> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        assert!(i < self.len, "RingBuffer: index {} out of range (count {})", i, self.len);
        match &self.slots[self.physical(i)] {
            Some(item) => item,
            None => unreachable!("RingBuffer: live slot {} is empty", i),
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
