//! Probe engine: pure functions translating a hash and a probe count into
//! a slot index, plus the limit on bounded probe attempts.
//!
//! - `probe(i, j, h) = (mix(h) + i·j²) & 0x7FFF_FFFF` over wrapping 32-bit
//!   arithmetic
//! - At segment 0 the probe count contributes nothing: the sequence
//!   collapses to the mixed hash alone
//! - For later segments successive probes spread quadratically in `j`,
//!   scaled by the segment index

/// Multiplier for the probe limit function.
pub(crate) const PROBE_MULTIPLIER: usize = 4;

/// Folds a 64-bit hash into the 32-bit value the probe engine operates on.
#[inline]
pub(crate) fn fold_hash(hash: u64) -> u32 {
    (hash ^ (hash >> 32)) as u32
}

/// Diffuses the high half of the hash into the low bits.
#[inline]
pub(crate) fn mix(hash: u32) -> u32 {
    hash ^ (hash >> 16)
}

/// Nonnegative probe value for segment index `i`, probe count `j`, hash `h`.
#[inline]
pub(crate) fn probe(segment_index: u32, probe_count: u32, hash: u32) -> u32 {
    let offset = segment_index
        .wrapping_mul(probe_count)
        .wrapping_mul(probe_count);
    mix(hash).wrapping_add(offset) & 0x7fff_ffff
}

/// Slot index inside a segment of power-of-two capacity.
#[inline]
pub(crate) fn slot_index(segment_index: u32, probe_count: u32, hash: u32, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    probe(segment_index, probe_count, hash) as usize & (capacity - 1)
}

/// Maximum number of bounded probe attempts for a segment with the given
/// free fraction: `4 · min(⌈log₂(1/ε)⌉, ⌈log₂(1/δ)⌉)`.
///
/// A full segment (`ε ≤ 0`) gets no bounded attempts; the scheduler falls
/// through to its exhaustive sweep.
pub(crate) fn probe_limit(free_fraction: f64, delta: f64) -> usize {
    if free_fraction <= 0.0 {
        return 0;
    }
    let by_occupancy = (1.0 / free_fraction).log2().ceil() as usize;
    let by_delta = (1.0 / delta).log2().ceil() as usize;
    PROBE_MULTIPLIER * by_occupancy.min(by_delta)
}
