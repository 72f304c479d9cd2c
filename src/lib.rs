//! compact-hashmap: array-backed hash maps and sets with a small memory
//! footprint, optional insertion/access ordering, and a fallback for
//! hash-flooding inputs.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: store every entry in a handful of dense arrays instead of one
//!   heap node per entry, and keep each layer small enough to reason about
//!   on its own.
//! - Layers:
//!   - CompactTable<K, V>: parallel key/value/hash/next arrays plus a
//!     bucket array of chain heads. Removal moves the last entry into the
//!     hole so the arrays stay dense.
//!   - Links: either array order (nothing stored) or predecessor/successor
//!     arrays giving insertion or access order. The table calls into it on
//!     insert, access, and removal.
//!   - CompactCore<K, V, S>: owns the hasher, the modification counter, and
//!     the representation switch between the compact table and
//!     `FallbackMap` (a slotmap + hashbrown index keyed by a random seed).
//!   - CompactHashMap / CompactLinkedHashMap / CompactHashSet: public
//!     wrappers choosing the links and the default load factor.
//!
//! Constraints
//! - Single-threaded: containers are `Send` when their contents are, never
//!   `Sync`.
//! - Capacity is bounded at 2^30 entries; the bucket array is allocated
//!   lazily on the first insert.
//! - Each entry caches its smeared 32-bit hash; `K: Hash` is never invoked
//!   again after insertion, including during resize.
//!
//! Flood guard
//! - When a bucket chain grows past `max_bucket_len` (default 9) on insert,
//!   after a resize, or at the end of a bulk `extend`, the container moves
//!   every entry, in iteration order, into its fallback representation and
//!   stays there. A `log::warn!` records the switch. `is_fallback` exposes
//!   it.
//!
//! Iteration and removal
//! - Borrowing iterators cannot observe concurrent modification; borrowck
//!   rules it out. `retain` and `Cursor` remove during traversal through
//!   the same swap-with-last path as `remove`, adjusting their position so
//!   no entry is skipped or visited twice.
//! - `Cursor` is detached from the map (each step takes the map) and fails
//!   fast with `IterError::ConcurrentModification` if anything else changed
//!   the map's structure between steps.
//!   It is tied to the container that created it; any other container
//!   gets `IterError::WrongContainer`.
//!
//! Reentrancy
//! - Lookups under `&self` run user `Eq`/`Hash`; a debug-only probe guard
//!   catches a lookup re-entered from inside those impls.

mod compact_core;
mod compact_hash_map;
mod compact_hash_set;
mod compact_linked_hash_map;
mod compact_table;
mod compact_table_proptest;
mod config;
mod cursor;
mod error;
mod fallback;
mod guard;
mod hashing;
pub mod iter;
mod links;

// Public surface
pub use compact_hash_map::CompactHashMap;
pub use compact_hash_set::{CompactHashSet, IntoIter as SetIntoIter};
pub use compact_linked_hash_map::CompactLinkedHashMap;
pub use config::{
    CompactConfig, DEFAULT_LOAD_FACTOR, DEFAULT_MAX_BUCKET_LEN, MIN_LOAD_FACTOR, SET_LOAD_FACTOR,
};
pub use cursor::{Cursor, CursorTarget};
pub use error::{ConfigError, IterError};
pub use hashing::MAX_CAPACITY;
