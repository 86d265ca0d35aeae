//! Entry API for `ElasticTable`.
//!
//! A located entry pins its `(segment, slot)` coordinates: the occupied
//! accessors read that slot directly instead of re-running the probe
//! walk, and a vacant insertion lands at whatever slot the scheduler
//! reports, so no second lookup happens anywhere.

use std::mem;

use crate::bucket::Bucket;
use crate::table::ElasticTable;

/// A view into a single entry in an `ElasticTable`, which may either be
/// vacant or occupied.
pub enum Entry<'a, K, V, S> {
    Occupied(OccupiedEntry<'a, K, V, S>),
    Vacant(VacantEntry<'a, K, V, S>),
}

impl<'a, K, V, S> Entry<'a, K, V, S> {
    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }

    /// Inserts `default` if the entry is vacant, then returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Like [`Entry::or_insert`], building the default lazily.
    pub fn or_insert_with<F: FnOnce() -> V>(self, default: F) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Like [`Entry::or_insert_with`], passing the key to the closure.
    pub fn or_insert_with_key<F: FnOnce(&K) -> V>(self, default: F) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let value = default(&entry.key);
                entry.insert(value)
            }
        }
    }

    /// Mutates the value in place if the entry is occupied.
    pub fn and_modify<F: FnOnce(&mut V)>(mut self, f: F) -> Self {
        if let Entry::Occupied(entry) = &mut self {
            f(entry.get_mut());
        }
        self
    }

    /// Inserts `V::default()` if the entry is vacant, then returns a
    /// mutable reference to the value.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into an occupied entry, pinned to the slot holding it.
pub struct OccupiedEntry<'a, K, V, S> {
    table: &'a mut ElasticTable<K, V, S>,
    segment: usize,
    slot: usize,
}

impl<'a, K, V, S> OccupiedEntry<'a, K, V, S> {
    pub(crate) fn new(table: &'a mut ElasticTable<K, V, S>, segment: usize, slot: usize) -> Self {
        Self {
            table,
            segment,
            slot,
        }
    }

    fn bucket(&self) -> &Bucket<K, V> {
        self.table.layout.segments[self.segment]
            .slot(self.slot)
            .expect("slot stays occupied while the view is held")
    }

    fn bucket_mut(&mut self) -> &mut Bucket<K, V> {
        self.table.layout.segments[self.segment]
            .slot_mut(self.slot)
            .expect("slot stays occupied while the view is held")
    }

    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.bucket().key
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.bucket().value
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.bucket_mut().value
    }

    /// Consumes the view, returning a mutable reference that lives as
    /// long as the borrow of the table.
    pub fn into_mut(self) -> &'a mut V {
        let bucket = self.table.layout.segments[self.segment]
            .slot_mut(self.slot)
            .expect("slot stays occupied while the view is held");
        &mut bucket.value
    }

    /// Replaces the value, returning the old one.
    pub fn insert(&mut self, value: V) -> V {
        mem::replace(self.get_mut(), value)
    }

    /// Removes the entry, returning its value. The slot is cleared in
    /// place, exactly as [`ElasticTable::remove`] does.
    pub fn remove(self) -> V {
        self.table
            .layout
            .remove_at(self.segment, self.slot)
            .expect("slot stays occupied while the view is held")
    }
}

/// A view into a vacant entry, holding the key and its folded hash.
pub struct VacantEntry<'a, K, V, S> {
    table: &'a mut ElasticTable<K, V, S>,
    key: K,
    hash: u32,
}

impl<'a, K, V, S> VacantEntry<'a, K, V, S> {
    pub(crate) fn new(table: &'a mut ElasticTable<K, V, S>, key: K, hash: u32) -> Self {
        Self { table, key, hash }
    }

    /// Gets a reference to the key that would be used when inserting.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the key with `value`, returning a mutable reference to the
    /// stored value at the slot the scheduler picked.
    pub fn insert(self, value: V) -> &'a mut V {
        let (segment, slot) = self.table.layout.insert_vacant(self.hash, self.key, value);
        let bucket = self.table.layout.segments[segment]
            .slot_mut(slot)
            .expect("scheduler placed the entry at the reported slot");
        &mut bucket.value
    }
}
