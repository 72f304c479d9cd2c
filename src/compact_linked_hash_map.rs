//! CompactLinkedHashMap: the compact map with predecessor/successor links,
//! iterating in insertion order or, optionally, access order.
//!
//! In access order every successful `get`/`get_mut`/`insert` moves the
//! entry to the back, so `pop_front` evicts the least recently used entry.
//! `peek` reads without promoting.

use crate::compact_core::CompactCore;
use crate::config::CompactConfig;
use crate::cursor::{sealed, Cursor, CursorTarget};
use crate::error::{ConfigError, IterError};
use crate::iter::{Drain, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::links::Links;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use std::collections::hash_map::RandomState;

/// Hash map with a predictable iteration order.
pub struct CompactLinkedHashMap<K, V, S = RandomState> {
    core: CompactCore<K, V, S>,
}

impl<K, V> CompactLinkedHashMap<K, V> {
    /// Insertion-ordered map.
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_expected_size(expected_size: usize) -> Self {
        Self::with_expected_size_and_hasher(expected_size, RandomState::new())
    }

    /// Access-ordered map: reads and updates move the entry to the back.
    pub fn with_access_order() -> Self {
        Self::access_order(CompactConfig::default(), RandomState::new())
            .unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<K, V> Default for CompactLinkedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> CompactLinkedHashMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_expected_size_and_hasher(0, hasher)
    }

    /// # Panics
    /// If `expected_size` exceeds the maximum capacity.
    pub fn with_expected_size_and_hasher(expected_size: usize, hasher: S) -> Self {
        let config = CompactConfig::default().with_expected_size(expected_size);
        Self::with_config(config, hasher).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Insertion-ordered map with explicit configuration.
    pub fn with_config(config: CompactConfig, hasher: S) -> Result<Self, ConfigError> {
        Self::build(config, hasher, false)
    }

    /// Access-ordered map with explicit configuration.
    pub fn access_order(config: CompactConfig, hasher: S) -> Result<Self, ConfigError> {
        Self::build(config, hasher, true)
    }

    fn build(config: CompactConfig, hasher: S, access_order: bool) -> Result<Self, ConfigError> {
        Ok(Self {
            core: CompactCore::new(config, hasher, Links::ordered(access_order))?,
        })
    }

    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    pub fn hasher(&self) -> &S {
        self.core.hasher()
    }

    pub fn is_fallback(&self) -> bool {
        self.core.is_fallback()
    }

    pub fn clear(&mut self) {
        self.core.clear();
    }

    /// Oldest entry (least recently used in access order).
    pub fn front(&self) -> Option<(&K, &V)> {
        let repr = self.core.repr();
        repr.first().map(|at| repr.entry(at))
    }

    /// Newest entry (most recently used in access order).
    pub fn back(&self) -> Option<(&K, &V)> {
        let repr = self.core.repr();
        repr.last().map(|at| repr.entry(at))
    }

    pub fn pop_front(&mut self) -> Option<(K, V)> {
        let at = self.core.repr().first()?;
        Some(self.core.remove_slot(at, None).0)
    }

    pub fn pop_back(&mut self) -> Option<(K, V)> {
        let at = self.core.repr().last()?;
        Some(self.core.remove_slot(at, None).0)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.core.repr())
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.core.iter_mut()
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.core.drain_entries().into_iter(),
            _borrow: PhantomData,
        }
    }

    /// Keeps only the entries for which `keep` returns true, visiting them
    /// in link order. Does not count as access.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.core.retain(keep);
    }

    pub fn cursor(&self) -> Cursor {
        Cursor::start(&self.core)
    }
}

impl<K, V, S> CompactLinkedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Looks up `k`. In access order a hit moves the entry to the back.
    pub fn get<Q>(&mut self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.core.get_touch(k).map(|v| &*v)
    }

    pub fn get_mut<Q>(&mut self, k: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.core.get_touch(k)
    }

    /// Looks up `k` without recording an access.
    pub fn peek<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.core.get(k)
    }

    pub fn get_key_value<Q>(&self, k: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.core.get_key_value(k)
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.core.find(k).is_some()
    }

    /// Inserts `key -> value`. A new key goes to the back; an existing key
    /// keeps its place in insertion order and moves to the back in access
    /// order.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.core.insert(key, value)
    }

    pub fn remove<Q>(&mut self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.core.remove_entry(k).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, k: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.core.remove_entry(k)
    }

    pub fn reserve(&mut self, additional: usize) {
        self.core.reserve(additional);
    }

    pub fn shrink_to_fit(&mut self) {
        self.core.shrink_to_fit();
    }
}

impl<K, V, S> sealed::Sealed for CompactLinkedHashMap<K, V, S> {}

impl<K, V, S> CursorTarget for CompactLinkedHashMap<K, V, S> {
    type Key = K;
    type Value = V;

    fn cursor_advance<'m>(&'m self, cursor: &mut Cursor) -> Result<(&'m K, &'m V), IterError> {
        cursor.advance(&self.core)
    }

    fn cursor_remove(&mut self, cursor: &mut Cursor) -> Result<(K, V), IterError> {
        cursor.remove_current(&mut self.core)
    }
}

impl<K, V, S> Clone for CompactLinkedHashMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<K, V, S> fmt::Debug for CompactLinkedHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Equal when both hold the same entries in the same order.
impl<K, V, S> PartialEq for CompactLinkedHashMap<K, V, S>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, S> Eq for CompactLinkedHashMap<K, V, S> {}

impl<K, V, S> FromIterator<(K, V)> for CompactLinkedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::with_hasher(S::default());
        m.extend(iter);
        m
    }
}

impl<K, V, S> Extend<(K, V)> for CompactLinkedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.core.extend(iter);
    }
}

impl<'a, K, V, S> Extend<(&'a K, &'a V)> for CompactLinkedHashMap<K, V, S>
where
    K: Eq + Hash + Copy,
    V: Copy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.core.extend(iter.into_iter().map(|(k, v)| (*k, *v)));
    }
}

impl<K, V, S> IntoIterator for CompactLinkedHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.core.into_entries().into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a CompactLinkedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut CompactLinkedHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
