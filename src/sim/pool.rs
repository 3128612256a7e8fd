//! Fixed-capacity object pool
//!
//! A flat array of slots plus a live count. Live objects occupy `slots[..live]`.
//! Removal swaps the removed slot with the last live slot, so it is O(1) and never
//! reallocates. Spawning past capacity is silently dropped.

use serde::{Deserialize, Serialize};

/// Pooled objects return to an inert state before reuse
pub trait Reset {
    fn reset(&mut self);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool<T> {
    slots: Vec<T>,
    live: usize,
}

impl<T: Reset + Default> Pool<T> {
    /// Preallocate `capacity` inert slots
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, T::default);
        Self { slots, live: 0 }
    }
}

impl<T: Reset> Pool<T> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn is_full(&self) -> bool {
        self.live == self.slots.len()
    }

    /// Claim the next free slot, already reset. None when the pool is full.
    pub fn spawn(&mut self) -> Option<&mut T> {
        if self.is_full() {
            log::debug!("pool exhausted ({} slots), spawn dropped", self.slots.len());
            return None;
        }
        let slot = &mut self.slots[self.live];
        slot.reset();
        self.live += 1;
        Some(slot)
    }

    /// Remove the live object at `index`; the last live object moves into its slot
    pub fn swap_remove(&mut self, index: usize) {
        if index >= self.live {
            return;
        }
        let last = self.live - 1;
        self.slots.swap(index, last);
        self.slots[last].reset();
        self.live = last;
    }

    /// Keep only live objects for which `keep` returns true.
    /// Objects moved by swap-remove are still visited.
    pub fn retain_mut(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        let mut i = 0;
        while i < self.live {
            if keep(&mut self.slots[i]) {
                i += 1;
            } else {
                self.swap_remove(i);
            }
        }
    }

    /// Reset every slot and empty the pool
    pub fn clear(&mut self) {
        for slot in &mut self.slots[..self.live] {
            slot.reset();
        }
        self.live = 0;
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.slots[..self.live]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots[..self.live]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Slot {
        value: i32,
    }

    impl Reset for Slot {
        fn reset(&mut self) {
            self.value = 0;
        }
    }

    fn filled(n: usize, capacity: usize) -> Pool<Slot> {
        let mut pool: Pool<Slot> = Pool::new(capacity);
        for i in 0..n {
            pool.spawn().unwrap().value = i as i32 + 1;
        }
        pool
    }

    #[test]
    fn test_spawn_past_capacity_is_dropped() {
        let mut pool = filled(4, 4);
        assert!(pool.is_full());
        assert!(pool.spawn().is_none());
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.capacity(), 4);
    }

    #[test]
    fn test_spawn_hands_out_reset_slot() {
        let mut pool = filled(2, 2);
        pool.swap_remove(0);
        let slot = pool.spawn().unwrap();
        assert_eq!(slot.value, 0);
    }

    #[test]
    fn test_retain_visits_swapped_elements() {
        let mut pool = filled(6, 8);
        pool.retain_mut(|s| s.value % 2 == 0);
        let mut values: Vec<_> = pool.iter().map(|s| s.value).collect();
        values.sort();
        assert_eq!(values, vec![2, 4, 6]);
    }

    proptest! {
        #[test]
        fn prop_swap_remove_moves_last_into_hole(n in 1usize..32, pick in 0usize..32) {
            let index = pick % n;
            let mut pool = filled(n, 32);
            let before: Vec<i32> = pool.iter().map(|s| s.value).collect();

            pool.swap_remove(index);

            prop_assert_eq!(pool.len(), n - 1);
            for (i, slot) in pool.iter().enumerate() {
                if i == index {
                    prop_assert_eq!(slot.value, before[n - 1]);
                } else {
                    prop_assert_eq!(slot.value, before[i]);
                }
            }
        }
    }
}
