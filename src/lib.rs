//! # elastictable
//!
//! A hash map built on **elastic hashing**, the open-addressing scheme of
//! Farach-Colton, Krapivin, and Kuszmaul ("Optimal Bounds for Open
//! Addressing Without Reordering").
//!
//! The table is a sequence of segments whose power-of-two capacities halve
//! geometrically. Insertions fill the segments in batches: a batch counter
//! names the segment currently being filled, and a three-case policy
//! driven by per-segment free fractions decides between bounded probing in
//! the current segment, injection into the next one, or an exhaustive
//! sweep. A configurable load-gap parameter `delta` keeps a fraction of
//! the capacity empty, which bounds worst-case insertion probing at
//! `O(log(1/delta))` in expectation. Entries are never relocated once
//! placed; growth rebuilds the table and rehashes every entry.
//!
//! ## Basic usage
//!
//! ```rust
//! use elastictable::ElasticTable;
//!
//! let mut map: ElasticTable<String, i32> = ElasticTable::new();
//!
//! map.insert("apple".to_string(), 1);
//! map.insert("banana".to_string(), 2);
//! assert_eq!(map.get("apple"), Some(&1));
//! assert_eq!(map.len(), 2);
//!
//! // updating returns the previous value
//! assert_eq!(map.insert("apple".to_string(), 10), Some(1));
//!
//! assert_eq!(map.remove("banana"), Some(2));
//! assert_eq!(map.get("banana"), None);
//! ```
//!
//! Capacity and load gap are configurable; both are validated:
//!
//! ```rust
//! use elastictable::ElasticTable;
//!
//! let map = ElasticTable::<String, i32>::with_capacity_and_delta(1024, 0.125).unwrap();
//! assert!(map.capacity() >= 1024);
//!
//! assert!(ElasticTable::<String, i32>::with_capacity_and_delta(0, 0.125).is_err());
//! assert!(ElasticTable::<String, i32>::with_capacity_and_delta(1024, 1.0).is_err());
//! ```
//!
//! ## Removal
//!
//! `remove` clears the slot in place; no tombstone is written. Probe
//! chains that ran through the cleared slot end there afterwards, so a key
//! placed further along such a chain can become unreachable. This is the
//! price of never reordering entries; see [`ElasticTable::remove`].
//!
//! ## Not covered
//!
//! The table is single-threaded and grows only; there is no concurrent
//! access, no persistence, and no shrinking on removal. Iteration order
//! follows segment-then-slot placement and is not stable across resizes.

pub mod entry;
pub mod error;
pub mod iter;
pub mod table;

mod bucket;
mod layout;
mod probe;
mod scheduler;
mod segment;

pub use entry::{Entry, OccupiedEntry, VacantEntry};
pub use error::ConfigError;
pub use table::{ElasticTable, ProbeStats, DEFAULT_CAPACITY, DEFAULT_DELTA};
