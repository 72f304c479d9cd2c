//! FallbackMap: the representation a compact container switches to once the
//! flood guard trips.
//!
//! Layout follows a conventional handle map: a `hashbrown::HashTable` of
//! slot keys for lookup and a `SlotMap` for storage. Keys are hashed with a
//! freshly seeded `RandomState`, independent of the container's own
//! `BuildHasher`, so inputs crafted to collide under that hasher spread out
//! here. Entries are threaded on a doubly linked list of slot keys to keep
//! the iteration order (insertion or access order) the compact form had.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_table::Entry as TableEntry;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

#[derive(Clone, Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    hash: u64,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

#[derive(Clone, Debug)]
pub(crate) struct FallbackMap<K, V> {
    hasher: RandomState,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Node<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
    access_order: bool,
}

impl<K, V> FallbackMap<K, V> {
    pub(crate) fn with_capacity(capacity: usize, access_order: bool) -> Self {
        Self {
            hasher: RandomState::new(),
            index: HashTable::with_capacity(capacity),
            slots: SlotMap::with_capacity_and_key(capacity),
            head: None,
            tail: None,
            access_order,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity().min(self.index.capacity())
    }

    pub(crate) fn first(&self) -> Option<DefaultKey> {
        self.head
    }

    pub(crate) fn last(&self) -> Option<DefaultKey> {
        self.tail
    }

    pub(crate) fn next_of(&self, k: DefaultKey) -> Option<DefaultKey> {
        self.slots[k].next
    }

    pub(crate) fn prev_of(&self, k: DefaultKey) -> Option<DefaultKey> {
        self.slots[k].prev
    }

    pub(crate) fn entry(&self, k: DefaultKey) -> (&K, &V) {
        let n = &self.slots[k];
        (&n.key, &n.value)
    }

    pub(crate) fn value_mut(&mut self, k: DefaultKey) -> &mut V {
        &mut self.slots[k].value
    }

    pub(crate) fn entry_mut(&mut self, k: DefaultKey) -> (&K, &mut V) {
        let n = &mut self.slots[k];
        (&n.key, &mut n.value)
    }

    fn unlink(&mut self, k: DefaultKey) {
        let (prev, next) = {
            let n = &self.slots[k];
            (n.prev, n.next)
        };
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
    }

    fn link_as_tail(&mut self, k: DefaultKey) {
        let tail = self.tail;
        {
            let n = &mut self.slots[k];
            n.prev = tail;
            n.next = None;
        }
        match tail {
            Some(t) => self.slots[t].next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    /// Records an access. Returns true if the order changed.
    pub(crate) fn touch(&mut self, k: DefaultKey) -> bool {
        if !self.access_order || self.tail == Some(k) {
            return false;
        }
        self.unlink(k);
        self.link_as_tail(k);
        true
    }

    /// Removes the entry stored under slot key `k`.
    pub(crate) fn remove_slot(&mut self, k: DefaultKey) -> (K, V) {
        self.unlink(k);
        let node = self
            .slots
            .remove(k)
            .expect("fallback cursor points at a vacant slot");
        self.index
            .find_entry(node.hash, |&kk| kk == k)
            .expect("fallback index lost a live slot")
            .remove();
        (node.key, node.value)
    }

    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        let slots = &self.slots;
        self.index.shrink_to_fit(|&kk| slots[kk].hash);
    }

    /// Mutable entry references in list order.
    pub(crate) fn entries_mut(&mut self) -> Vec<(&K, &mut V)> {
        let order: Vec<DefaultKey> =
            std::iter::successors(self.head, |&k| self.slots[k].next).collect();
        let mut by_slot: slotmap::SecondaryMap<DefaultKey, (&K, &mut V)> =
            slotmap::SecondaryMap::with_capacity(self.slots.len());
        for (k, n) in self.slots.iter_mut() {
            by_slot.insert(k, (&n.key, &mut n.value));
        }
        order
            .into_iter()
            .map(|k| by_slot.remove(k).expect("list visits a slot twice"))
            .collect()
    }

    /// Consumes the map into its entries in list order.
    pub(crate) fn into_entries(mut self) -> Vec<(K, V)> {
        let mut out = Vec::with_capacity(self.slots.len());
        let mut cur = self.head;
        while let Some(k) = cur {
            let node = self.slots.remove(k).expect("list visits a slot twice");
            cur = node.next;
            out.push((node.key, node.value));
        }
        out
    }

    /// Empties the map in place, returning its entries in list order.
    pub(crate) fn take_entries(&mut self) -> Vec<(K, V)> {
        let emptied = FallbackMap::with_capacity(0, self.access_order);
        std::mem::replace(self, emptied).into_entries()
    }
}

impl<K, V> FallbackMap<K, V>
where
    K: Eq + Hash,
{
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub(crate) fn find<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.index
            .find(hash, |&k| self.slots[k].key.borrow() == q)
            .copied()
    }

    /// Inserts or updates. On update returns the old value and whether the
    /// entry was moved (access order).
    pub(crate) fn insert(&mut self, key: K, value: V) -> (DefaultKey, Option<(V, bool)>) {
        let hash = self.make_hash(&key);
        match self.index.entry(
            hash,
            |&kk| self.slots[kk].key == key,
            |&kk| self.slots[kk].hash,
        ) {
            TableEntry::Occupied(o) => {
                let k = *o.get();
                let old = std::mem::replace(&mut self.slots[k].value, value);
                let moved = self.touch(k);
                (k, Some((old, moved)))
            }
            TableEntry::Vacant(v) => {
                let k = self.slots.insert(Node {
                    key,
                    value,
                    hash,
                    prev: None,
                    next: None,
                });
                v.insert(k);
                self.link_as_tail(k);
                (k, None)
            }
        }
    }

    pub(crate) fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.find(q)?;
        Some(self.remove_slot(k))
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        let slots = &self.slots;
        self.index.reserve(additional, |&kk| slots[kk].hash);
        self.slots.reserve(additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(m: &FallbackMap<String, i32>) -> Vec<String> {
        std::iter::successors(m.first(), |&k| m.next_of(k))
            .map(|k| m.entry(k).0.clone())
            .collect()
    }

    /// Invariant: insert/update/remove behave like a map and keep list order.
    #[test]
    fn map_semantics_and_order() {
        let mut m = FallbackMap::with_capacity(4, false);
        for (i, k) in ["a", "b", "c"].iter().enumerate() {
            assert!(m.insert(k.to_string(), i as i32).1.is_none());
        }
        let (_, old) = m.insert("b".to_string(), 10);
        assert_eq!(old, Some((1, false)));
        assert_eq!(keys(&m), ["a", "b", "c"]);
        assert_eq!(m.remove("b"), Some(("b".to_string(), 10)));
        assert!(m.remove("b").is_none());
        assert_eq!(keys(&m), ["a", "c"]);
        assert_eq!(m.len(), 2);
    }

    /// Invariant: access order moves touched and updated entries to the tail.
    #[test]
    fn access_order_touch() {
        let mut m = FallbackMap::with_capacity(0, true);
        for k in ["a", "b", "c"] {
            m.insert(k.to_string(), 0);
        }
        let a = m.find("a").unwrap();
        assert!(m.touch(a));
        assert_eq!(keys(&m), ["b", "c", "a"]);
        let (_, old) = m.insert("b".to_string(), 1);
        assert_eq!(old, Some((0, true)));
        assert_eq!(keys(&m), ["c", "a", "b"]);
        let prev: Vec<String> = std::iter::successors(m.last(), |&k| m.prev_of(k))
            .map(|k| m.entry(k).0.clone())
            .collect();
        assert_eq!(prev, ["b", "a", "c"]);
    }

    #[test]
    fn into_entries_in_list_order() {
        let mut m = FallbackMap::with_capacity(0, true);
        for (i, k) in ["x", "y", "z"].iter().enumerate() {
            m.insert(k.to_string(), i as i32);
        }
        let y = m.find("y").unwrap();
        m.touch(y);
        let out: Vec<(String, i32)> = m.take_entries();
        assert_eq!(
            out,
            vec![("x".into(), 0), ("z".into(), 2), ("y".into(), 1)]
        );
        assert_eq!(m.len(), 0);
        assert!(m.first().is_none());
    }

    #[test]
    fn entries_mut_in_list_order() {
        let mut m = FallbackMap::with_capacity(0, false);
        for (i, k) in ["p", "q"].iter().enumerate() {
            m.insert(k.to_string(), i as i32);
        }
        for (_, v) in m.entries_mut() {
            *v += 100;
        }
        let out: Vec<i32> = m.into_entries().into_iter().map(|(_, v)| v).collect();
        assert_eq!(out, vec![100, 101]);
    }
}
