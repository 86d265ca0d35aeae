//! Segment: one fixed-capacity slot array of the table.
//!
//! - Power-of-two capacity, constant for the segment's lifetime
//! - Occupancy count maintained by `place`/`vacate`
//! - Exposes the free fraction the insertion policy keys on
//!
//! Segments are passive containers; all probing lives in `probe` and
//! `scheduler`.

use crate::bucket::Bucket;

pub(crate) struct Segment<K, V> {
    slots: Vec<Option<Bucket<K, V>>>,
    count: usize,
}

impl<K, V> Segment<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        let mut slots = Vec::new();
        slots.resize_with(capacity, || None);
        Self { slots, count: 0 }
    }

    /// Number of slots.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.count
    }

    /// Fraction of free slots, in `[0, 1]`.
    #[inline]
    pub(crate) fn free_fraction(&self) -> f64 {
        1.0 - self.count as f64 / self.capacity() as f64
    }

    /// Entry at `index`, if the slot is occupied.
    #[inline]
    pub(crate) fn slot(&self, index: usize) -> Option<&Bucket<K, V>> {
        self.slots[index].as_ref()
    }

    /// Mutable entry at `index`, if the slot is occupied.
    #[inline]
    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut Bucket<K, V>> {
        self.slots[index].as_mut()
    }

    /// Stores `bucket` at `index`. No-op if the slot is occupied.
    pub(crate) fn place(&mut self, index: usize, bucket: Bucket<K, V>) {
        debug_assert!(self.slots[index].is_none(), "placing into occupied slot");
        if self.slots[index].is_none() {
            self.slots[index] = Some(bucket);
            self.count += 1;
        }
    }

    /// Empties the slot at `index`, returning its entry. No-op if the slot
    /// is already empty.
    pub(crate) fn vacate(&mut self, index: usize) -> Option<Bucket<K, V>> {
        let bucket = self.slots[index].take();
        if bucket.is_some() {
            self.count -= 1;
        }
        bucket
    }

    /// Empties every slot, keeping the allocation.
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.count = 0;
    }

    /// The raw slot array, for iterators that walk it directly.
    pub(crate) fn slots(&self) -> &[Option<Bucket<K, V>>] {
        &self.slots
    }

    /// The raw slot array with mutable access to the stored buckets.
    pub(crate) fn slots_mut(&mut self) -> &mut [Option<Bucket<K, V>>] {
        &mut self.slots
    }

    /// Occupied buckets in slot order.
    pub(crate) fn buckets(&self) -> impl Iterator<Item = &Bucket<K, V>> {
        self.slots.iter().flatten()
    }

    /// Consumes the segment, yielding its entries in slot order.
    pub(crate) fn into_buckets(self) -> impl Iterator<Item = Bucket<K, V>> {
        self.slots.into_iter().flatten()
    }

    /// Consumes the segment into its raw slot array.
    pub(crate) fn into_slots(self) -> Vec<Option<Bucket<K, V>>> {
        self.slots
    }
}

impl<K: Clone, V: Clone> Clone for Segment<K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            count: self.count,
        }
    }
}
