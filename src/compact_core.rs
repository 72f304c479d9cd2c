//! CompactCore: the representation switch shared by every public container.
//!
//! A core starts out as a `CompactTable` and watches bucket chain lengths.
//! The first time a chain grows past `max_bucket_len` (on insert, after a
//! resize, or after a bulk load) it moves every entry, in traversal order,
//! into a `FallbackMap` and stays there. Callers cannot tell the two apart
//! except through `is_fallback`.
//!
//! The core also owns the structural modification counter and the instance
//! id that cursors check on every step, and the debug probe guard for
//! lookups under `&self`.

use crate::compact_table::{CompactTable, Inserted};
use crate::config::CompactConfig;
use crate::error::ConfigError;
use crate::fallback::FallbackMap;
use crate::guard::{ModCount, OwnerId, ProbeGuard};
use crate::hashing::hash_key;
use crate::iter::IterMut;
use crate::links::Links;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use slotmap::DefaultKey;

/// Location of one entry in either representation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    Index(usize),
    Key(DefaultKey),
}

#[derive(Clone, Debug)]
pub(crate) enum Repr<K, V> {
    Compact(CompactTable<K, V>),
    Fallback(FallbackMap<K, V>),
}

impl<K, V> Repr<K, V> {
    pub(crate) fn len(&self) -> usize {
        match self {
            Repr::Compact(t) => t.len(),
            Repr::Fallback(f) => f.len(),
        }
    }

    pub(crate) fn first(&self) -> Option<Slot> {
        match self {
            Repr::Compact(t) => t.first().map(Slot::Index),
            Repr::Fallback(f) => f.first().map(Slot::Key),
        }
    }

    pub(crate) fn last(&self) -> Option<Slot> {
        match self {
            Repr::Compact(t) => t.last().map(Slot::Index),
            Repr::Fallback(f) => f.last().map(Slot::Key),
        }
    }

    pub(crate) fn next(&self, at: Slot) -> Option<Slot> {
        match (self, at) {
            (Repr::Compact(t), Slot::Index(i)) => t.next_of(i).map(Slot::Index),
            (Repr::Fallback(f), Slot::Key(k)) => f.next_of(k).map(Slot::Key),
            _ => unreachable!("slot kind does not match representation"),
        }
    }

    pub(crate) fn prev(&self, at: Slot) -> Option<Slot> {
        match (self, at) {
            (Repr::Compact(t), Slot::Index(i)) => t.prev_of(i).map(Slot::Index),
            (Repr::Fallback(f), Slot::Key(k)) => f.prev_of(k).map(Slot::Key),
            _ => unreachable!("slot kind does not match representation"),
        }
    }

    pub(crate) fn entry(&self, at: Slot) -> (&K, &V) {
        match (self, at) {
            (Repr::Compact(t), Slot::Index(i)) => (t.key_at(i), t.value_at(i)),
            (Repr::Fallback(f), Slot::Key(k)) => f.entry(k),
            _ => unreachable!("slot kind does not match representation"),
        }
    }

    fn value_mut(&mut self, at: Slot) -> &mut V {
        match (self, at) {
            (Repr::Compact(t), Slot::Index(i)) => t.value_at_mut(i),
            (Repr::Fallback(f), Slot::Key(k)) => f.value_mut(k),
            _ => unreachable!("slot kind does not match representation"),
        }
    }

    fn entry_mut(&mut self, at: Slot) -> (&K, &mut V) {
        match (self, at) {
            (Repr::Compact(t), Slot::Index(i)) => t.entry_at_mut(i),
            (Repr::Fallback(f), Slot::Key(k)) => f.entry_mut(k),
            _ => unreachable!("slot kind does not match representation"),
        }
    }

    /// Removes the entry at `at`. Returns it together with the slot a
    /// traversal that was about to visit `upcoming` should visit instead.
    pub(crate) fn remove_slot(
        &mut self,
        at: Slot,
        upcoming: Option<Slot>,
    ) -> ((K, V), Option<Slot>) {
        match (self, at) {
            (Repr::Compact(t), Slot::Index(i)) => {
                let last = t.len() - 1;
                let upcoming = upcoming.map(|s| match s {
                    Slot::Index(u) => u,
                    Slot::Key(_) => unreachable!("slot kind does not match representation"),
                });
                let resume = t.links().adjust_after_remove(upcoming, i, last);
                (t.remove_at(i), resume.map(Slot::Index))
            }
            (Repr::Fallback(f), Slot::Key(k)) => (f.remove_slot(k), upcoming),
            _ => unreachable!("slot kind does not match representation"),
        }
    }

    /// Entries in traversal order, emptying the representation.
    pub(crate) fn take_entries(&mut self) -> Vec<(K, V)> {
        match self {
            Repr::Compact(t) => t.take_entries(),
            Repr::Fallback(f) => f.take_entries(),
        }
    }

    pub(crate) fn into_entries(self) -> Vec<(K, V)> {
        match self {
            Repr::Compact(t) => t.into_entries(),
            Repr::Fallback(f) => f.into_entries(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct CompactCore<K, V, S> {
    hasher: S,
    repr: Repr<K, V>,
    max_bucket_len: usize,
    mod_count: ModCount,
    owner: OwnerId,
    probe: ProbeGuard,
}

impl<K, V, S> CompactCore<K, V, S> {
    pub(crate) fn new(
        config: CompactConfig,
        hasher: S,
        links: Links,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            hasher,
            repr: Repr::Compact(CompactTable::new(
                links,
                config.load_factor,
                config.expected_size,
            )),
            max_bucket_len: config.max_bucket_len,
            mod_count: ModCount::default(),
            owner: OwnerId::fresh(),
            probe: ProbeGuard::default(),
        })
    }

    pub(crate) fn hasher(&self) -> &S {
        &self.hasher
    }

    pub(crate) fn repr(&self) -> &Repr<K, V> {
        &self.repr
    }

    pub(crate) fn len(&self) -> usize {
        self.repr.len()
    }

    pub(crate) fn is_fallback(&self) -> bool {
        matches!(self.repr, Repr::Fallback(_))
    }

    pub(crate) fn capacity(&self) -> usize {
        match &self.repr {
            Repr::Compact(t) => t.capacity(),
            Repr::Fallback(f) => f.capacity(),
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.mod_count.get()
    }

    pub(crate) fn owner(&self) -> u64 {
        self.owner.get()
    }

    pub(crate) fn clear(&mut self) {
        match &mut self.repr {
            Repr::Compact(t) => t.clear(),
            Repr::Fallback(f) => f.clear(),
        }
        self.mod_count.bump();
    }

    /// Removes the entry at `at`; see `Repr::remove_slot`.
    pub(crate) fn remove_slot(
        &mut self,
        at: Slot,
        upcoming: Option<Slot>,
    ) -> ((K, V), Option<Slot>) {
        self.mod_count.bump();
        self.repr.remove_slot(at, upcoming)
    }

    pub(crate) fn value_mut(&mut self, at: Slot) -> &mut V {
        self.repr.value_mut(at)
    }

    /// Records an access to `at` (access order only).
    pub(crate) fn touch(&mut self, at: Slot) {
        let moved = match (&mut self.repr, at) {
            (Repr::Compact(t), Slot::Index(i)) => t.touch(i),
            (Repr::Fallback(f), Slot::Key(k)) => f.touch(k),
            _ => unreachable!("slot kind does not match representation"),
        };
        if moved {
            self.mod_count.bump();
        }
    }

    /// Entries in traversal order; leaves the core empty.
    pub(crate) fn drain_entries(&mut self) -> Vec<(K, V)> {
        self.mod_count.bump();
        self.repr.take_entries()
    }

    pub(crate) fn into_entries(self) -> Vec<(K, V)> {
        self.repr.into_entries()
    }

    /// Mutable traversal. Array order comes straight off the dense store;
    /// link and list order are gathered up front.
    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let array = matches!(&self.repr, Repr::Compact(t) if matches!(t.links(), Links::Array));
        match &mut self.repr {
            Repr::Compact(t) => {
                if array {
                    let (keys, values) = t.slices_mut();
                    IterMut::slices(keys, values)
                } else {
                    IterMut::ordered(t.entries_mut())
                }
            }
            Repr::Fallback(f) => IterMut::ordered(f.entries_mut()),
        }
    }

    /// Keeps only the entries for which `keep` returns true, visiting them in
    /// traversal order.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&K, &mut V) -> bool) {
        let mut cur = self.repr.first();
        while let Some(at) = cur {
            let upcoming = self.repr.next(at);
            let (k, v) = self.repr.entry_mut(at);
            cur = if keep(k, v) {
                upcoming
            } else {
                let (_, resume) = self.remove_slot(at, upcoming);
                resume
            };
        }
    }
}

impl<K, V, S> CompactCore<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn find<Q>(&self, q: &Q) -> Option<Slot>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.probe.enter();
        match &self.repr {
            Repr::Compact(t) => {
                let hash = hash_key(&self.hasher, q);
                t.find(hash, |k| k.borrow() == q).map(Slot::Index)
            }
            Repr::Fallback(f) => f.find(q).map(Slot::Key),
        }
    }

    pub(crate) fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_key_value(q).map(|(_, v)| v)
    }

    pub(crate) fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let at = self.find(q)?;
        Some(self.repr.entry(at))
    }

    /// Looks up `q`, recording the access, and returns its value.
    pub(crate) fn get_touch<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let at = self.find(q)?;
        self.touch(at);
        Some(self.repr.value_mut(at))
    }

    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        match &mut self.repr {
            Repr::Compact(t) => {
                let hash = hash_key(&self.hasher, &key);
                match t.insert(hash, key, value, |a, b| a == b) {
                    Inserted::Updated { old, reordered } => {
                        if reordered {
                            self.mod_count.bump();
                        }
                        Some(old)
                    }
                    Inserted::New { chain_len, resized } => {
                        self.mod_count.bump();
                        if chain_len > self.max_bucket_len {
                            self.degrade(chain_len);
                        } else if resized {
                            self.check_chains();
                        }
                        None
                    }
                }
            }
            Repr::Fallback(f) => match f.insert(key, value) {
                (_, Some((old, moved))) => {
                    if moved {
                        self.mod_count.bump();
                    }
                    Some(old)
                }
                (_, None) => {
                    self.mod_count.bump();
                    None
                }
            },
        }
    }

    pub(crate) fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let removed = match &mut self.repr {
            Repr::Compact(t) => {
                let hash = hash_key(&self.hasher, q);
                t.remove(hash, |k| k.borrow() == q)
            }
            Repr::Fallback(f) => f.remove(q),
        };
        if removed.is_some() {
            self.mod_count.bump();
        }
        removed
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        let resized = match &mut self.repr {
            Repr::Compact(t) => {
                let before = t.bucket_count();
                t.reserve(additional);
                before != 0 && t.bucket_count() != before
            }
            Repr::Fallback(f) => {
                f.reserve(additional);
                false
            }
        };
        if resized {
            self.check_chains();
        }
    }

    /// A smaller bucket array can merge chains, so a compact shrink is
    /// followed by a chain scan.
    pub(crate) fn shrink_to_fit(&mut self) {
        match &mut self.repr {
            Repr::Compact(t) => {
                t.shrink_to_fit();
                self.check_chains();
            }
            Repr::Fallback(f) => f.shrink_to_fit(),
        }
    }

    /// Bulk load. Chains are measured once at the end.
    pub(crate) fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let iter = entries.into_iter();
        let (lower, _) = iter.size_hint();
        // Reserve the full hint only into an empty table, the way std does.
        let reserve = if self.len() == 0 { lower } else { (lower + 1) / 2 };
        self.reserve(reserve);
        for (k, v) in iter {
            self.insert(k, v);
        }
        self.check_chains();
    }

    /// Full scan for an overlong chain.
    fn check_chains(&mut self) {
        if let Repr::Compact(t) = &self.repr {
            let longest = t.max_chain_len();
            if longest > self.max_bucket_len {
                self.degrade(longest);
            }
        }
    }

    /// One-way switch to the fallback representation. Every entry moves
    /// over in traversal order.
    fn degrade(&mut self, chain_len: usize) {
        let Repr::Compact(t) = &mut self.repr else {
            return;
        };
        log::warn!(
            "hash flooding suspected: bucket chain of {} entries exceeds limit {}; \
             switching {} entries to fallback representation",
            chain_len,
            self.max_bucket_len,
            t.len()
        );
        let access_order = t.links().access_order();
        let entries = t.take_entries();
        let mut fallback = FallbackMap::with_capacity(entries.len(), access_order);
        for (k, v) in entries {
            fallback.insert(k, v);
        }
        self.repr = Repr::Fallback(fallback);
        self.mod_count.bump();
    }
}
