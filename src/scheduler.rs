//! Insertion scheduler: the batch state machine deciding which segment
//! receives the next entry.
//!
//! Batch 0 fills segment 0 through the mixed hash alone and hands off once
//! the segment reaches its initial fill ratio. For later batches the
//! policy weighs the free fractions of the current segment (`ε1`) and the
//! next one (`ε2`):
//!
//! - case 1 (`ε1 > δ/2`, `ε2 > 1/4`): bounded probing in the current
//!   segment, then injection into the next one
//! - case 2 (`ε1 ≤ δ/2`): skip the current segment entirely
//! - case 3 (`ε2 ≤ 1/4`, or no next segment): exhaustive sweep of the
//!   current segment
//!
//! Probes into the next segment keep the current batch index in the probe
//! function; this is the paper's injection step, not an off-by-one.

use crate::bucket::Bucket;
use crate::layout::Layout;
use crate::probe;

/// Fill ratio at which segment 0 stops receiving batch-0 insertions.
const INITIAL_FILL_RATIO: f64 = 0.75;

/// Free-fraction floor below which the next segment refuses injections.
const NEXT_SEGMENT_FLOOR: f64 = 0.25;

impl<K, V> Layout<K, V> {
    /// Places `bucket` according to the batch state machine, returning
    /// the `(segment, slot)` coordinates that received it. The caller has
    /// already ruled out a duplicate key and enforced the size threshold.
    pub(crate) fn schedule(&mut self, bucket: Bucket<K, V>) -> (usize, usize) {
        if !self.rehashing
            && self.batch == 0
            && self.segments.len() > 1
            && self.segment_zero_filled()
        {
            self.batch = 1;
        }

        if self.batch == 0 {
            self.schedule_batch_zero(bucket)
        } else {
            self.schedule_batched(bucket)
        }
    }

    fn segment_zero_filled(&self) -> bool {
        let segment = &self.segments[0];
        segment.count() >= (INITIAL_FILL_RATIO * segment.capacity() as f64).ceil() as usize
    }

    fn schedule_batch_zero(&mut self, bucket: Bucket<K, V>) -> (usize, usize) {
        let segment = &self.segments[0];
        let capacity = segment.capacity() as u32;
        let limit = probe::probe_limit(segment.free_fraction(), self.delta) as u32;

        // bounded attempts, then the exhaustive sweep; at segment 0 the
        // probe function is constant in j, so every attempt revisits the
        // slot named by the mixed hash
        let hit = self
            .free_slot(0, 0, 1, limit, bucket.hash)
            .or_else(|| self.free_slot(0, 0, limit + 1, capacity, bucket.hash));

        match hit {
            Some((slot, j)) => self.commit(0, slot, 0, j, bucket),
            None => {
                // segment 0 yielded nothing: grow and start over
                self.resize();
                self.schedule(bucket)
            }
        }
    }

    fn schedule_batched(&mut self, bucket: Bucket<K, V>) -> (usize, usize) {
        let batch = self.batch;
        let has_next = batch + 1 < self.segments.len();
        let current_free = self.segments[batch].free_fraction();
        let next_free = if has_next {
            self.segments[batch + 1].free_fraction()
        } else {
            1.0
        };

        if current_free > self.delta / 2.0 && next_free > NEXT_SEGMENT_FLOOR && has_next {
            // case 1: bounded probing here, then inject into the next
            // segment, still probing with the current batch index
            let limit = probe::probe_limit(current_free, self.delta) as u32;
            if let Some((slot, j)) = self.free_slot(batch, batch, 1, limit, bucket.hash) {
                return self.commit(batch, slot, batch, j, bucket);
            }
            let next_capacity = self.segments[batch + 1].capacity() as u32;
            if let Some((slot, j)) = self.free_slot(batch, batch + 1, 1, next_capacity, bucket.hash)
            {
                return self.commit(batch + 1, slot, batch, j, bucket);
            }
            panic!("insertion failed in segments {} and {}", batch, batch + 1);
        } else if current_free <= self.delta / 2.0 && has_next {
            // case 2: the current segment is within delta/2 of full
            let next_capacity = self.segments[batch + 1].capacity() as u32;
            if let Some((slot, j)) = self.free_slot(batch, batch + 1, 1, next_capacity, bucket.hash)
            {
                return self.commit(batch + 1, slot, batch, j, bucket);
            }
            panic!("insertion failed in segment {}", batch + 1);
        } else {
            // case 3: next segment too full, or none left
            let capacity = self.segments[batch].capacity() as u32;
            if let Some((slot, j)) = self.free_slot(batch, batch, 1, capacity, bucket.hash) {
                return self.commit(batch, slot, batch, j, bucket);
            }
            panic!("insertion failed in segment {}", batch);
        }
    }

    /// Probes `target` for an empty slot with probe counts
    /// `first..=last`, computing indices with segment index
    /// `probe_segment` (which stays at the batch index when the target is
    /// the next segment).
    fn free_slot(
        &self,
        probe_segment: usize,
        target: usize,
        first: u32,
        last: u32,
        hash: u32,
    ) -> Option<(usize, u32)> {
        let segment = &self.segments[target];
        let capacity = segment.capacity();
        for j in first..=last {
            let slot = probe::slot_index(probe_segment as u32, j, hash, capacity);
            if segment.slot(slot).is_none() {
                return Some((slot, j));
            }
        }
        None
    }

    fn commit(
        &mut self,
        target: usize,
        slot: usize,
        probe_segment: usize,
        probe_count: u32,
        mut bucket: Bucket<K, V>,
    ) -> (usize, usize) {
        bucket.segment_index = probe_segment as u32;
        bucket.probe_count = probe_count;
        self.segments[target].place(slot, bucket);
        self.len += 1;
        self.promote_if_filled();
        (target, slot)
    }

    /// Post-insert promotion: batch 0 hands off at the initial fill
    /// ratio, later batches once occupancy crosses `cap − ⌊δ·cap/2⌋`.
    fn promote_if_filled(&mut self) {
        if self.batch == 0 {
            if self.segments.len() > 1 && self.segment_zero_filled() {
                self.batch = 1;
            }
        } else {
            let segment = &self.segments[self.batch];
            let capacity = segment.capacity();
            let target = capacity - (self.delta * capacity as f64 / 2.0).floor() as usize;
            if segment.count() >= target && self.batch + 1 < self.segments.len() {
                self.batch += 1;
            }
        }
    }
}
