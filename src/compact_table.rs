//! CompactTable: dense entry store plus chained bucket index.
//!
//! Entries live in parallel vectors (`keys`, `values`, `hashes`, `next`)
//! that are always packed into `[0, len)`. The bucket array maps
//! `hash & mask` to the head of a singly linked chain threaded through
//! `next`. Bucket slots hold `1 + index` so that `0` means empty; chain
//! links hold the index itself with `NONE` as terminator. Converting
//! between the two is `wrapping_sub(1)` / `wrapping_add(1)`.
//!
//! Removal relocates the last entry into the freed slot (swap-with-last),
//! repointing the one bucket slot or chain link that referred to it and,
//! through `Links`, its order neighbours.

use crate::hashing::{grow_threshold, table_size_for, MAX_CAPACITY};
use crate::links::Links;

/// Chain terminator.
pub(crate) const NONE: u32 = u32::MAX;

#[derive(Clone, Debug)]
pub(crate) struct CompactTable<K, V> {
    /// `0` for an empty bucket, otherwise `1 + index` of the chain head.
    /// Empty until the first insert.
    buckets: Vec<u32>,
    keys: Vec<K>,
    values: Vec<V>,
    hashes: Vec<u32>,
    next: Vec<u32>,
    links: Links,
    load_factor: f64,
    /// Sizing hint for the first allocation.
    expected_size: usize,
}

/// What `CompactTable::insert` did.
#[derive(Debug)]
pub(crate) enum Inserted<V> {
    /// The key was present; its value was replaced.
    Updated {
        old: V,
        /// The order links moved the entry (access order).
        reordered: bool,
    },
    /// A new entry was appended.
    New {
        /// Length of the chain the entry joined, itself included.
        chain_len: usize,
        resized: bool,
    },
}

impl<K, V> CompactTable<K, V> {
    pub(crate) fn new(links: Links, load_factor: f64, expected_size: usize) -> Self {
        Self {
            buckets: Vec::new(),
            keys: Vec::new(),
            values: Vec::new(),
            hashes: Vec::new(),
            next: Vec::new(),
            links,
            load_factor,
            expected_size,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn links(&self) -> &Links {
        &self.links
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Entries the table can hold before its next resize.
    pub(crate) fn capacity(&self) -> usize {
        if self.buckets.is_empty() {
            0
        } else {
            grow_threshold(self.buckets.len(), self.load_factor)
        }
    }

    #[inline]
    fn mask(&self) -> usize {
        self.buckets.len() - 1
    }

    #[inline]
    fn bucket_of(&self, hash: u32) -> usize {
        hash as usize & self.mask()
    }

    #[inline]
    fn head(&self, bucket: usize) -> u32 {
        self.buckets[bucket].wrapping_sub(1)
    }

    #[inline]
    fn set_head(&mut self, bucket: usize, index: u32) {
        self.buckets[bucket] = index.wrapping_add(1);
    }

    fn allocate(&mut self) {
        let size = table_size_for(self.expected_size, self.load_factor);
        self.buckets = vec![0; size];
        let n = self.expected_size;
        self.keys.reserve(n);
        self.values.reserve(n);
        self.hashes.reserve(n);
        self.next.reserve(n);
        self.links.reserve(n);
    }

    /// Index of the entry with cached hash `hash` whose key satisfies `eq`.
    pub(crate) fn find(&self, hash: u32, mut eq: impl FnMut(&K) -> bool) -> Option<usize> {
        if self.buckets.is_empty() {
            return None;
        }
        let mut i = self.head(self.bucket_of(hash));
        while i != NONE {
            let idx = i as usize;
            if self.hashes[idx] == hash && eq(&self.keys[idx]) {
                return Some(idx);
            }
            i = self.next[idx];
        }
        None
    }

    /// Inserts or updates. `eq` must match exactly the keys equal to `key`.
    pub(crate) fn insert(
        &mut self,
        hash: u32,
        key: K,
        value: V,
        mut eq: impl FnMut(&K, &K) -> bool,
    ) -> Inserted<V> {
        if self.buckets.is_empty() {
            self.allocate();
        }
        let bucket = self.bucket_of(hash);
        let head = self.head(bucket);
        let mut i = head;
        let mut walked = 0;
        while i != NONE {
            let idx = i as usize;
            if self.hashes[idx] == hash && eq(&self.keys[idx], &key) {
                let old = std::mem::replace(&mut self.values[idx], value);
                let reordered = self.links.on_access(idx);
                return Inserted::Updated { old, reordered };
            }
            walked += 1;
            i = self.next[idx];
        }

        let index = self.len();
        if index >= MAX_CAPACITY {
            panic!("capacity overflow");
        }
        self.keys.push(key);
        self.values.push(value);
        self.hashes.push(hash);
        self.next.push(head);
        self.set_head(bucket, index as u32);
        self.links.on_insert(index);

        let resized = self.len() > self.capacity();
        if resized {
            let mut size = self.buckets.len() * 2;
            while grow_threshold(size, self.load_factor) < self.len() {
                size *= 2;
            }
            self.resize(size);
        }
        Inserted::New {
            chain_len: walked + 1,
            resized,
        }
    }

    /// Rebuilds every chain into a bucket array of `new_size` slots using the
    /// cached hashes.
    pub(crate) fn resize(&mut self, new_size: usize) {
        debug_assert!(new_size.is_power_of_two());
        if new_size > MAX_CAPACITY {
            panic!("capacity overflow");
        }
        log::debug!(
            "compact table resize: {} -> {} buckets ({} entries)",
            self.buckets.len(),
            new_size,
            self.len()
        );
        self.buckets = vec![0; new_size];
        for idx in 0..self.len() {
            let bucket = self.bucket_of(self.hashes[idx]);
            self.next[idx] = self.head(bucket);
            self.set_head(bucket, idx as u32);
        }
    }

    /// Removes the entry at `index`, returning it. The entry previously at
    /// `len - 1` takes its slot.
    pub(crate) fn remove_at(&mut self, index: usize) -> (K, V) {
        self.unlink_chain(index);
        self.swap_remove(index)
    }

    /// Removes the entry with cached hash `hash` satisfying `eq`.
    pub(crate) fn remove(&mut self, hash: u32, mut eq: impl FnMut(&K) -> bool) -> Option<(K, V)> {
        if self.buckets.is_empty() {
            return None;
        }
        let bucket = self.bucket_of(hash);
        let mut prev = NONE;
        let mut i = self.head(bucket);
        while i != NONE {
            let idx = i as usize;
            if self.hashes[idx] == hash && eq(&self.keys[idx]) {
                let after = self.next[idx];
                match prev {
                    NONE => self.set_head(bucket, after),
                    p => self.next[p as usize] = after,
                }
                return Some(self.swap_remove(idx));
            }
            prev = i;
            i = self.next[idx];
        }
        None
    }

    /// Detaches `index` from its bucket chain.
    fn unlink_chain(&mut self, index: usize) {
        let bucket = self.bucket_of(self.hashes[index]);
        let after = self.next[index];
        let target = index as u32;
        if self.head(bucket) == target {
            self.set_head(bucket, after);
            return;
        }
        let link = self.chain_link_to(bucket, target);
        self.next[link] = after;
    }

    /// Index of the entry in `bucket`'s chain whose `next` is `target`.
    fn chain_link_to(&self, bucket: usize, target: u32) -> usize {
        let mut i = self.head(bucket);
        loop {
            assert!(i != NONE, "bucket chain corrupted: entry {target} unreachable");
            if self.next[i as usize] == target {
                return i as usize;
            }
            i = self.next[i as usize];
        }
    }

    /// Physically removes `index`, which must already be out of its chain,
    /// relocating the last entry into the hole.
    fn swap_remove(&mut self, index: usize) -> (K, V) {
        let last = self.len() - 1;
        self.links.on_remove(index, last);
        if index != last {
            // Whatever pointed at `last` must point at `index` instead.
            let bucket = self.bucket_of(self.hashes[last]);
            let from = last as u32;
            if self.head(bucket) == from {
                self.set_head(bucket, index as u32);
            } else {
                let link = self.chain_link_to(bucket, from);
                self.next[link] = index as u32;
            }
        }
        self.hashes.swap_remove(index);
        self.next.swap_remove(index);
        let key = self.keys.swap_remove(index);
        let value = self.values.swap_remove(index);
        (key, value)
    }

    /// Records an access to `index`. Returns true if the order changed.
    pub(crate) fn touch(&mut self, index: usize) -> bool {
        self.links.on_access(index)
    }

    /// Longest bucket chain, in entries.
    pub(crate) fn max_chain_len(&self) -> usize {
        (0..self.buckets.len())
            .map(|b| {
                let mut n = 0;
                let mut i = self.head(b);
                while i != NONE {
                    n += 1;
                    i = self.next[i as usize];
                }
                n
            })
            .max()
            .unwrap_or(0)
    }

    /// Drops every entry; keeps the bucket allocation.
    pub(crate) fn clear(&mut self) {
        self.buckets.fill(0);
        self.keys.clear();
        self.values.clear();
        self.hashes.clear();
        self.next.clear();
        self.links.clear();
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        let wanted = self.len().saturating_add(additional);
        if self.buckets.is_empty() {
            self.expected_size = self.expected_size.max(wanted);
            return;
        }
        if wanted > self.capacity() {
            self.resize(table_size_for(wanted, self.load_factor));
        }
        self.keys.reserve(additional);
        self.values.reserve(additional);
        self.hashes.reserve(additional);
        self.next.reserve(additional);
        self.links.reserve(additional);
    }

    /// Shrinks the bucket array and entry storage to fit the current length.
    /// An empty table returns to the unallocated state.
    pub(crate) fn shrink_to_fit(&mut self) {
        if self.len() == 0 {
            self.buckets = Vec::new();
            self.expected_size = 0;
        } else {
            let size = table_size_for(self.len(), self.load_factor);
            if size < self.buckets.len() {
                self.resize(size);
            }
        }
        log::debug!(
            "compact table shrunk to {} buckets ({} entries)",
            self.buckets.len(),
            self.len()
        );
        self.keys.shrink_to_fit();
        self.values.shrink_to_fit();
        self.hashes.shrink_to_fit();
        self.next.shrink_to_fit();
        self.links.shrink_to_fit();
    }

    #[inline]
    pub(crate) fn key_at(&self, index: usize) -> &K {
        &self.keys[index]
    }

    #[inline]
    pub(crate) fn value_at(&self, index: usize) -> &V {
        &self.values[index]
    }

    #[inline]
    pub(crate) fn value_at_mut(&mut self, index: usize) -> &mut V {
        &mut self.values[index]
    }

    #[inline]
    pub(crate) fn entry_at_mut(&mut self, index: usize) -> (&K, &mut V) {
        (&self.keys[index], &mut self.values[index])
    }

    pub(crate) fn first(&self) -> Option<usize> {
        self.links.first(self.len())
    }

    pub(crate) fn last(&self) -> Option<usize> {
        self.links.last(self.len())
    }

    pub(crate) fn next_of(&self, index: usize) -> Option<usize> {
        self.links.next(index, self.len())
    }

    pub(crate) fn prev_of(&self, index: usize) -> Option<usize> {
        self.links.prev(index)
    }

    /// Traversal indices in order.
    fn order(&self) -> Vec<usize> {
        std::iter::successors(self.first(), |&i| self.next_of(i)).collect()
    }

    /// Mutable entry references in traversal order.
    pub(crate) fn entries_mut(&mut self) -> Vec<(&K, &mut V)> {
        let order = self.order();
        let mut slots: Vec<Option<(&K, &mut V)>> =
            self.keys.iter().zip(self.values.iter_mut()).map(Some).collect();
        order
            .into_iter()
            .map(|i| slots[i].take().expect("order links visit an index twice"))
            .collect()
    }

    /// Array-order mutable entry references.
    pub(crate) fn slices_mut(&mut self) -> (&[K], &mut [V]) {
        (&self.keys, &mut self.values)
    }

    /// Consumes the table into its entries in traversal order.
    pub(crate) fn into_entries(self) -> Vec<(K, V)> {
        if self.links.is_array_order() {
            return self.keys.into_iter().zip(self.values).collect();
        }
        let order = self.order();
        let mut slots: Vec<Option<(K, V)>> =
            self.keys.into_iter().zip(self.values).map(Some).collect();
        order
            .into_iter()
            .map(|i| slots[i].take().expect("order links visit an index twice"))
            .collect()
    }

    /// Empties the table in place, returning its entries in traversal order.
    pub(crate) fn take_entries(&mut self) -> Vec<(K, V)> {
        let emptied = CompactTable {
            buckets: vec![0; self.buckets.len()],
            keys: Vec::new(),
            values: Vec::new(),
            hashes: Vec::new(),
            next: Vec::new(),
            links: self.links.empty_like(),
            load_factor: self.load_factor,
            expected_size: self.expected_size,
        };
        std::mem::replace(self, emptied).into_entries()
    }

    /// Panics unless the density, chain and order invariants hold.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let len = self.len();
        assert_eq!(self.values.len(), len);
        assert_eq!(self.hashes.len(), len);
        assert_eq!(self.next.len(), len);
        if self.buckets.is_empty() {
            assert_eq!(len, 0, "entries without a bucket array");
        } else {
            assert!(self.buckets.len().is_power_of_two());
            assert!(len <= self.capacity(), "load factor exceeded");
        }
        // Every index is reachable exactly once, from the bucket its hash maps to.
        let mut seen = vec![false; len];
        for b in 0..self.buckets.len() {
            let mut i = self.head(b);
            while i != NONE {
                let idx = i as usize;
                assert!(idx < len, "chain points past the dense range");
                assert!(!seen[idx], "index {idx} reachable twice");
                assert_eq!(self.bucket_of(self.hashes[idx]), b, "entry in wrong bucket");
                seen[idx] = true;
                i = self.next[idx];
            }
        }
        assert!(seen.into_iter().all(|s| s), "entry unreachable from buckets");
        self.links.assert_consistent(len);
    }
}
