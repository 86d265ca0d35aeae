//! Public map type built on the elastic-hashing layout.

use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};

use ahash::RandomState;

use crate::entry::{Entry, OccupiedEntry, VacantEntry};
use crate::error::ConfigError;
use crate::iter::{Iter, IterMut, Keys, Values, ValuesMut};
use crate::layout::Layout;
use crate::probe;

/// Overall capacity used by `new` and `with_hasher`.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Load-gap parameter used by `new` and `with_hasher`.
pub const DEFAULT_DELTA: f64 = 0.125;

/// A hash map using elastic hashing: segmented open addressing that never
/// relocates a placed entry.
///
/// The table reserves a `delta` fraction of its capacity as a load gap. A
/// batch counter walks the segment sequence as segments fill; insertion
/// cost stays bounded by `O(log(1/delta))` probes in expectation while
/// lookups stay amortized constant.
///
/// Removal clears the slot without writing a tombstone. A later lookup
/// whose probe chain ran through the cleared slot stops there, so a key
/// placed further down that chain can become unreachable. This is inherent
/// to reorderless open addressing and is accepted by this implementation;
/// callers that interleave heavy removal with lookups should take it into
/// account.
pub struct ElasticTable<K, V, S = RandomState> {
    pub(crate) layout: Layout<K, V>,
    hash_builder: S,
}

/// Placement diagnostics assembled from entry metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeStats {
    /// Live entries in the table.
    pub entries: usize,
    /// Largest recorded probe count.
    pub max_probe_count: u32,
    /// Mean recorded probe count, 0.0 for an empty table.
    pub mean_probe_count: f64,
    /// Live entries per segment, in segment order.
    pub segment_occupancy: Vec<usize>,
    /// Entries resident in a different segment than the one naming their
    /// probe sequence (next-segment injections).
    pub displaced: usize,
}

impl<K, V> ElasticTable<K, V, RandomState> {
    /// Creates an empty table with the default capacity and load gap.
    #[inline]
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<K, V, S: Default> ElasticTable<K, V, S> {
    /// Creates an empty table with the given overall capacity and the
    /// default load gap.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_capacity_delta_and_hasher(capacity, DEFAULT_DELTA, S::default())
    }

    /// Creates an empty table with the given overall capacity and load-gap
    /// parameter `delta ∈ (0, 1)`.
    #[inline]
    pub fn with_capacity_and_delta(capacity: usize, delta: f64) -> Result<Self, ConfigError> {
        Self::with_capacity_delta_and_hasher(capacity, delta, S::default())
    }
}

impl<K, V, S> ElasticTable<K, V, S> {
    /// Creates an empty table with the provided hasher and the default
    /// capacity and load gap.
    #[inline]
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            layout: Layout::new(DEFAULT_CAPACITY, DEFAULT_DELTA),
            hash_builder,
        }
    }

    /// Creates an empty table with the given capacity and hasher.
    #[inline]
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self, ConfigError> {
        Self::with_capacity_delta_and_hasher(capacity, DEFAULT_DELTA, hash_builder)
    }

    /// Creates an empty table with the given capacity, load-gap parameter,
    /// and hasher.
    pub fn with_capacity_delta_and_hasher(
        capacity: usize,
        delta: f64,
        hash_builder: S,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !(delta > 0.0 && delta < 1.0) {
            return Err(ConfigError::DeltaOutOfRange(delta));
        }
        Ok(Self {
            layout: Layout::new(capacity, delta),
            hash_builder,
        })
    }

    /// Returns the number of entries in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    /// Returns `true` if the table contains no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Returns a reference to the hasher.
    #[inline]
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the effective overall capacity (the sum of segment
    /// capacities; at least the requested capacity).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.layout.capacity
    }

    /// Returns the load-gap parameter.
    #[inline]
    pub fn delta(&self) -> f64 {
        self.layout.delta
    }

    /// Returns the entry count at which the next insertion grows the
    /// table.
    #[inline]
    pub fn threshold(&self) -> usize {
        self.layout.threshold
    }

    /// Returns the number of segments.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.layout.segments.len()
    }

    /// Returns the index of the segment currently receiving insertions.
    #[inline]
    pub fn current_batch(&self) -> usize {
        self.layout.batch
    }

    /// Removes every entry; capacity and segment geometry are kept.
    #[inline]
    pub fn clear(&mut self) {
        self.layout.clear();
    }

    /// Returns an iterator over all key-value pairs in segment-then-slot
    /// order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.layout.segments)
    }

    /// Returns a mutable iterator over all key-value pairs.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.layout.segments)
    }

    /// Returns an iterator over all keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(&self.layout.segments)
    }

    /// Returns an iterator over all values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(&self.layout.segments)
    }

    /// Returns a mutable iterator over all values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(&mut self.layout.segments)
    }

    /// Returns `true` if any entry maps to the given value. Linear scan.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    /// Collects placement diagnostics from entry metadata.
    pub fn probe_stats(&self) -> ProbeStats {
        let mut max_probe_count = 0;
        let mut total_probes = 0u64;
        let mut displaced = 0;
        let mut segment_occupancy = Vec::with_capacity(self.layout.segments.len());

        for (segment_index, segment) in self.layout.segments.iter().enumerate() {
            segment_occupancy.push(segment.count());
            for bucket in segment.buckets() {
                max_probe_count = max_probe_count.max(bucket.probe_count);
                total_probes += u64::from(bucket.probe_count);
                if bucket.segment_index as usize != segment_index {
                    displaced += 1;
                }
            }
        }

        let entries = self.layout.len();
        ProbeStats {
            entries,
            max_probe_count,
            mean_probe_count: if entries == 0 {
                0.0
            } else {
                total_probes as f64 / entries as f64
            },
            segment_occupancy,
            displaced,
        }
    }
}

impl<K, V, S> ElasticTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Folds the 64-bit hash of `key` into the 32-bit value the probe
    /// engine works with.
    #[inline]
    fn hash_key<Q>(&self, key: &Q) -> u32
    where
        Q: Hash + ?Sized,
    {
        probe::fold_hash(self.hash_builder.hash_one(key))
    }

    /// Returns a reference to the value associated with the given key.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.layout.get(self.hash_key(key), key)
    }

    /// Returns a mutable reference to the value associated with the given
    /// key.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_key(key);
        self.layout.get_mut(hash, key)
    }

    /// Returns `true` if the table contains a value for the given key.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.layout.contains(self.hash_key(key), key)
    }

    /// Inserts a key-value pair into the table.
    ///
    /// If the table did not have this key present, `None` is returned.
    /// If it did, the value is updated and the old value returned.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_key(&key);
        self.layout.insert(hash, key, value)
    }

    /// Removes a key from the table, returning its value if it was
    /// present.
    ///
    /// The slot is cleared in place; see the type-level note on what that
    /// means for probe chains running through it.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_key(key);
        self.layout.remove(hash, key)
    }

    /// Grows the table at most once so that `additional` further entries
    /// fit without another resize.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.layout.reserve(additional);
    }

    /// Moves every entry of `other` into `self`, growing at most once up
    /// front.
    pub fn put_all(&mut self, other: Self) {
        self.reserve(other.len());
        for (key, value) in other {
            self.insert(key, value);
        }
    }

    /// Gets the given key's corresponding entry in the table for in-place
    /// manipulation. An occupied entry is pinned to the slot found by the
    /// probe walk.
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, S> {
        let hash = self.hash_key(&key);
        match self.layout.locate(hash, &key) {
            Some((segment, slot)) => Entry::Occupied(OccupiedEntry::new(self, segment, slot)),
            None => Entry::Vacant(VacantEntry::new(self, key, hash)),
        }
    }
}

impl<K, V> Default for ElasticTable<K, V, RandomState> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for ElasticTable<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            layout: self.layout.clone(),
            hash_builder: self.hash_builder.clone(),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for ElasticTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ElasticTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Self::with_hasher(S::default());
        table.extend(iter);
        table
    }
}

impl<K, V, S> PartialEq for ElasticTable<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, V, S> Eq for ElasticTable<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Hash for ElasticTable<K, V, S>
where
    K: Hash,
    V: Hash,
{
    /// Order-independent: the wrapping sum over entries of
    /// `hash(key) XOR hash(value)`, computed with a fixed hasher so equal
    /// tables built on differently seeded states agree.
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let fixed = BuildHasherDefault::<DefaultHasher>::default();
        let mut sum = 0u64;
        for (key, value) in self.iter() {
            sum = sum.wrapping_add(fixed.hash_one(key) ^ fixed.hash_one(value));
        }
        state.write_u64(sum);
    }
}

impl<K, V, S> fmt::Debug for ElasticTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> fmt::Display for ElasticTable<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    /// `{k1=v1, k2=v2}` in iteration order, `{}` when empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let table: ElasticTable<u64, u64> = ElasticTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.capacity(), 1026);
        assert_eq!(table.threshold(), 898);
        assert_eq!(table.segment_count(), 11);
        assert_eq!(table.current_batch(), 0);
    }

    #[test]
    fn test_invalid_config() {
        assert_eq!(
            ElasticTable::<u64, u64>::with_capacity_and_delta(0, 0.125).err(),
            Some(ConfigError::ZeroCapacity)
        );
        assert_eq!(
            ElasticTable::<u64, u64>::with_capacity_and_delta(1024, 0.0).err(),
            Some(ConfigError::DeltaOutOfRange(0.0))
        );
        assert_eq!(
            ElasticTable::<u64, u64>::with_capacity_and_delta(1024, 1.0).err(),
            Some(ConfigError::DeltaOutOfRange(1.0))
        );
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = ElasticTable::new();

        assert!(table.insert(1u64, 100u64).is_none());
        assert!(table.insert(2, 200).is_none());
        assert_eq!(table.len(), 2);

        assert_eq!(table.get(&1), Some(&100));
        assert_eq!(table.get(&2), Some(&200));
        assert_eq!(table.get(&3), None);
        assert!(table.contains_key(&1));
        assert!(!table.contains_key(&3));
    }

    #[test]
    fn test_insert_update() {
        let mut table = ElasticTable::new();

        table.insert(1u64, 100u64);
        let old = table.insert(1, 200);

        assert_eq!(old, Some(100));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&1), Some(&200));
    }

    #[test]
    fn test_get_mut() {
        let mut table = ElasticTable::new();
        table.insert(1u64, 100u64);

        if let Some(v) = table.get_mut(&1) {
            *v = 999;
        }
        assert_eq!(table.get(&1), Some(&999));
    }

    #[test]
    fn test_get_with_borrow() {
        let mut table = ElasticTable::new();
        table.insert("hello".to_string(), 42);

        assert_eq!(table.get("hello"), Some(&42));
        assert_eq!(table.get("world"), None);
        assert!(table.contains_key("hello"));
        assert_eq!(table.remove("hello"), Some(42));
    }

    #[test]
    fn test_remove() {
        let mut table = ElasticTable::new();
        table.insert(1u64, 100u64);

        assert_eq!(table.remove(&1), Some(100));
        assert!(table.is_empty());
        assert_eq!(table.remove(&1), None);
    }

    #[test]
    fn test_contains_value() {
        let mut table = ElasticTable::new();
        table.insert(1u64, 100u64);
        table.insert(2, 200);

        assert!(table.contains_value(&100));
        assert!(!table.contains_value(&300));
    }

    #[test]
    fn test_clear() {
        let mut table = ElasticTable::new();
        for i in 0u64..50 {
            table.insert(i, i * 10);
        }

        let capacity = table.capacity();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.current_batch(), 0);
        assert_eq!(table.get(&1), None);
    }

    #[test]
    fn test_many_inserts_with_growth() {
        let mut table = ElasticTable::new();
        for i in 0u64..500 {
            table.insert(i, i * 10);
        }

        assert_eq!(table.len(), 500);
        for i in 0u64..500 {
            assert_eq!(table.get(&i), Some(&(i * 10)), "missing key {i}");
        }
    }

    #[test]
    fn test_iter() {
        let mut table = ElasticTable::new();
        for i in 0u64..100 {
            table.insert(i, i * 10);
        }

        let mut count = 0;
        for (k, v) in table.iter() {
            assert_eq!(*v, *k * 10);
            count += 1;
        }
        assert_eq!(count, 100);
    }

    #[test]
    fn test_iter_mut() {
        let mut table = ElasticTable::new();
        for i in 0u64..100 {
            table.insert(i, i);
        }

        for (_, v) in table.iter_mut() {
            *v *= 2;
        }
        for i in 0u64..100 {
            assert_eq!(table.get(&i), Some(&(i * 2)));
        }
    }

    #[test]
    fn test_keys_values() {
        let mut table = ElasticTable::new();
        table.insert(1u64, 10u64);
        table.insert(2, 20);
        table.insert(3, 30);

        let keys: Vec<_> = table.keys().copied().collect();
        let values: Vec<_> = table.values().copied().collect();

        assert_eq!(keys.len(), 3);
        assert_eq!(values.len(), 3);
        assert!(keys.contains(&1) && keys.contains(&2) && keys.contains(&3));
        assert!(values.contains(&10) && values.contains(&20) && values.contains(&30));
    }

    #[test]
    fn test_values_mut() {
        let mut table = ElasticTable::new();
        table.insert(1u64, 10u64);
        table.insert(2, 20);

        for v in table.values_mut() {
            *v += 1;
        }
        assert_eq!(table.get(&1), Some(&11));
        assert_eq!(table.get(&2), Some(&21));
    }

    #[test]
    fn test_for_loop() {
        let mut table = ElasticTable::new();
        table.insert("a".to_string(), 1);
        table.insert("b".to_string(), 2);

        let mut sum = 0;
        for (_, v) in &table {
            sum += v;
        }
        assert_eq!(sum, 3);
    }

    #[test]
    fn test_into_iter() {
        let mut table = ElasticTable::new();
        table.insert(1u64, 10u64);
        table.insert(2, 20);

        let mut entries: Vec<_> = table.into_iter().collect();
        entries.sort_unstable();
        assert_eq!(entries, vec![(1, 10), (2, 20)]);
    }

    #[test]
    fn test_extend_and_from_iterator() {
        let mut table: ElasticTable<u64, u64> = (0u64..10).map(|i| (i, i)).collect();
        table.extend((10u64..20).map(|i| (i, i)));

        assert_eq!(table.len(), 20);
        for i in 0u64..20 {
            assert_eq!(table.get(&i), Some(&i));
        }
    }

    #[test]
    fn test_put_all() {
        let mut left = ElasticTable::new();
        left.insert(1u64, 10u64);

        let mut right = ElasticTable::new();
        right.insert(2u64, 20u64);
        right.insert(3, 30);

        left.put_all(right);
        assert_eq!(left.len(), 3);
        assert_eq!(left.get(&2), Some(&20));
        assert_eq!(left.get(&3), Some(&30));
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut a = ElasticTable::new();
        a.insert("apple".to_string(), 1);
        a.insert("banana".to_string(), 2);

        let mut b = ElasticTable::new();
        b.insert("banana".to_string(), 2);
        b.insert("apple".to_string(), 1);

        assert_eq!(a, b);

        b.insert("cherry".to_string(), 3);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let mut table: ElasticTable<String, i32> = ElasticTable::new();
        assert_eq!(table.to_string(), "{}");

        table.insert("a".to_string(), 1);
        assert_eq!(table.to_string(), "{a=1}");

        table.insert("b".to_string(), 2);
        let rendered = table.to_string();
        assert!(rendered == "{a=1, b=2}" || rendered == "{b=2, a=1}");
    }

    #[test]
    fn test_debug() {
        let mut table: ElasticTable<u64, u64> = ElasticTable::new();
        table.insert(1, 10);
        assert_eq!(format!("{table:?}"), "{1: 10}");
    }

    #[test]
    fn test_clone() {
        let mut table = ElasticTable::new();
        table.insert(1u64, 10u64);

        let mut copy = table.clone();
        copy.insert(2, 20);

        assert_eq!(table.len(), 1);
        assert_eq!(copy.len(), 2);
        assert_eq!(copy.get(&1), Some(&10));
    }

    #[test]
    fn test_custom_hasher() {
        use std::collections::hash_map::RandomState;

        let mut table: ElasticTable<u64, u64, _> = ElasticTable::with_hasher(RandomState::new());
        table.insert(1, 100);
        assert!(table.contains_key(&1));
    }

    #[test]
    fn test_probe_stats() {
        let mut table = ElasticTable::new();
        assert_eq!(table.probe_stats().entries, 0);

        for i in 0u64..20 {
            table.insert(i, i);
        }

        let stats = table.probe_stats();
        assert_eq!(stats.entries, 20);
        assert_eq!(stats.segment_occupancy.iter().sum::<usize>(), 20);
        assert_eq!(stats.segment_occupancy.len(), table.segment_count());
        assert!(stats.max_probe_count >= 1);
        assert!(stats.mean_probe_count >= 1.0);
    }

    #[test]
    fn test_entry_or_insert() {
        let mut table = ElasticTable::new();

        table.entry(1u64).or_insert(10u64);
        assert_eq!(table.get(&1), Some(&10));

        table.entry(1).or_insert(20);
        assert_eq!(table.get(&1), Some(&10));
    }

    #[test]
    fn test_entry_and_modify() {
        let mut table = ElasticTable::new();
        table.insert(1u64, 10u64);

        table.entry(1).and_modify(|v| *v += 5).or_insert(0);
        assert_eq!(table.get(&1), Some(&15));

        table.entry(2).and_modify(|v| *v += 5).or_insert(0);
        assert_eq!(table.get(&2), Some(&0));
    }

    #[test]
    fn test_entry_or_default() {
        let mut table: ElasticTable<u64, u64> = ElasticTable::new();

        *table.entry(1).or_default() += 1;
        *table.entry(1).or_default() += 1;
        assert_eq!(table.get(&1), Some(&2));
    }

    #[test]
    fn test_occupied_entry() {
        let mut table = ElasticTable::new();
        table.insert(1u64, 10u64);

        match table.entry(1) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(entry.get(), &10);

                *entry.get_mut() = 20;
                assert_eq!(entry.get(), &20);

                let old = entry.insert(30);
                assert_eq!(old, 20);
            }
            Entry::Vacant(_) => panic!("expected occupied entry"),
        }
        assert_eq!(table.get(&1), Some(&30));
    }

    #[test]
    fn test_vacant_entry() {
        let mut table: ElasticTable<u64, u64> = ElasticTable::new();

        match table.entry(1) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &1);
                let value = entry.insert(100);
                *value += 1;
            }
            Entry::Occupied(_) => panic!("expected vacant entry"),
        }
        assert_eq!(table.get(&1), Some(&101));
    }

    #[test]
    fn test_entry_remove() {
        let mut table = ElasticTable::new();
        table.insert(1u64, 10u64);

        if let Entry::Occupied(entry) = table.entry(1) {
            assert_eq!(entry.remove(), 10);
        }
        assert!(table.get(&1).is_none());
    }
}
