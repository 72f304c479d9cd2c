//! CompactHashMap: array-backed hash map iterating in array order.

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
use core::ops::Index;
use std::collections::hash_map::RandomState;

/// Hash map storing its entries in dense parallel arrays.
///
/// Iteration order is the physical array order, which is insertion order
/// until the first removal (removal moves the last entry into the hole).
/// If a bucket chain ever grows past the configured limit, the map moves to
/// a randomly seeded fallback table for the rest of its life; see
/// [`is_fallback`](Self::is_fallback).
pub struct CompactHashMap<K, V, S = RandomState> {
    pub(crate) core: CompactCore<K, V, S>,
}

impl<K, V> CompactHashMap<K, V> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// Sized so that `expected_size` entries fit without a resize.
    pub fn with_expected_size(expected_size: usize) -> Self {
        Self::with_expected_size_and_hasher(expected_size, RandomState::new())
    }
}

impl<K, V> Default for CompactHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> CompactHashMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_expected_size_and_hasher(0, hasher)
    }

    /// # Panics
    /// If `expected_size` exceeds the maximum capacity.
    pub fn with_expected_size_and_hasher(expected_size: usize, hasher: S) -> Self {
        let config = CompactConfig::default().with_expected_size(expected_size);
        Self::with_config(config, hasher).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn with_config(config: CompactConfig, hasher: S) -> Result<Self, ConfigError> {
        Ok(Self {
            core: CompactCore::new(config, hasher, Links::Array)?,
        })
    }

    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.len() == 0
    }

    /// Entries the map holds before it next grows.
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    pub fn hasher(&self) -> &S {
        self.core.hasher()
    }

    /// True once the flood guard has replaced the compact arrays.
    pub fn is_fallback(&self) -> bool {
        self.core.is_fallback()
    }

    pub fn clear(&mut self) {
        self.core.clear();
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

    /// Removes every entry, yielding them in iteration order.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.core.drain_entries().into_iter(),
            _borrow: PhantomData,
        }
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.core.retain(keep);
    }

    /// A fail-fast cursor positioned before the first entry.
    pub fn cursor(&self) -> Cursor {
        Cursor::start(&self.core)
    }
}

impl<K, V, S> CompactHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn get<Q>(&self, k: &Q) -> Option<&V>
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

    pub fn get_mut<Q>(&mut self, k: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let at = self.core.find(k)?;
        Some(self.core.value_mut(at))
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.core.find(k).is_some()
    }

    /// Inserts `key -> value`, returning the previous value for `key`.
    /// An existing key keeps its position.
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

    /// Makes room for `additional` more entries without resizing.
    pub fn reserve(&mut self, additional: usize) {
        self.core.reserve(additional);
    }

    pub fn shrink_to_fit(&mut self) {
        self.core.shrink_to_fit();
    }
}

impl<K, V, S> sealed::Sealed for CompactHashMap<K, V, S> {}

impl<K, V, S> CursorTarget for CompactHashMap<K, V, S> {
    type Key = K;
    type Value = V;

    fn cursor_advance<'m>(&'m self, cursor: &mut Cursor) -> Result<(&'m K, &'m V), IterError> {
        cursor.advance(&self.core)
    }

    fn cursor_remove(&mut self, cursor: &mut Cursor) -> Result<(K, V), IterError> {
        cursor.remove_current(&mut self.core)
    }
}

impl<K, V, S> Clone for CompactHashMap<K, V, S>
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

impl<K, V, S> fmt::Debug for CompactHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for CompactHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |ov| v == ov))
    }
}

impl<K, V, S> Eq for CompactHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for CompactHashMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Eq + Hash,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    /// If the key is not present.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found in CompactHashMap")
    }
}

impl<K, V, S> FromIterator<(K, V)> for CompactHashMap<K, V, S>
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

impl<K, V, S> Extend<(K, V)> for CompactHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.core.extend(iter);
    }
}

impl<'a, K, V, S> Extend<(&'a K, &'a V)> for CompactHashMap<K, V, S>
where
    K: Eq + Hash + Copy,
    V: Copy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.core.extend(iter.into_iter().map(|(k, v)| (*k, *v)));
    }
}

impl<K, V, S> IntoIterator for CompactHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.core.into_entries().into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a CompactHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut CompactHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
