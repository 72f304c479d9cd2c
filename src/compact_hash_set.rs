//! CompactHashSet: the compact map with unit values.
//!
//! Sets default to a load factor of 1.0: without values the bucket array is
//! the dominant cost, and the flood guard bounds the chains regardless.

use crate::compact_hash_map::CompactHashMap;
use crate::config::CompactConfig;
use crate::cursor::{sealed, Cursor, CursorTarget};
use crate::error::{ConfigError, IterError};
use crate::iter::{self, Keys};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Hash set iterating in array order.
pub struct CompactHashSet<T, S = RandomState> {
    map: CompactHashMap<T, (), S>,
}

impl<T> CompactHashSet<T> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_expected_size(expected_size: usize) -> Self {
        Self::with_expected_size_and_hasher(expected_size, RandomState::new())
    }
}

impl<T> Default for CompactHashSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> CompactHashSet<T, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_expected_size_and_hasher(0, hasher)
    }

    /// # Panics
    /// If `expected_size` exceeds the maximum capacity.
    pub fn with_expected_size_and_hasher(expected_size: usize, hasher: S) -> Self {
        let config = CompactConfig::for_set().with_expected_size(expected_size);
        Self::with_config(config, hasher).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn with_config(config: CompactConfig, hasher: S) -> Result<Self, ConfigError> {
        Ok(Self {
            map: CompactHashMap::with_config(config, hasher)?,
        })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    pub fn hasher(&self) -> &S {
        self.map.hasher()
    }

    pub fn is_fallback(&self) -> bool {
        self.map.is_fallback()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn iter(&self) -> Keys<'_, T, ()> {
        self.map.keys()
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.map.retain(|t, _| keep(t));
    }

    pub fn cursor(&self) -> Cursor {
        self.map.cursor()
    }
}

impl<T, S> CompactHashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    /// Adds `value`. Returns false if it was already present, in which case
    /// the stored element is kept.
    pub fn insert(&mut self, value: T) -> bool {
        self.map.insert(value, ()).is_none()
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(value)
    }

    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get_key_value(value).map(|(t, _)| t)
    }

    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.remove(value).is_some()
    }

    /// Removes and returns the stored element equal to `value`.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.remove_entry(value).map(|(t, _)| t)
    }

    pub fn reserve(&mut self, additional: usize) {
        self.map.reserve(additional);
    }

    pub fn shrink_to_fit(&mut self) {
        self.map.shrink_to_fit();
    }
}

impl<T, S> sealed::Sealed for CompactHashSet<T, S> {}

impl<T, S> CursorTarget for CompactHashSet<T, S> {
    type Key = T;
    type Value = ();

    fn cursor_advance<'m>(&'m self, cursor: &mut Cursor) -> Result<(&'m T, &'m ()), IterError> {
        cursor.advance(&self.map.core)
    }

    fn cursor_remove(&mut self, cursor: &mut Cursor) -> Result<(T, ()), IterError> {
        cursor.remove_current(&mut self.map.core)
    }
}

impl<T: Clone, S: Clone> Clone for CompactHashSet<T, S> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<T: fmt::Debug, S> fmt::Debug for CompactHashSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> PartialEq for CompactHashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T, S> Eq for CompactHashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
}

impl<T, S> FromIterator<T> for CompactHashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut s = Self::with_hasher(S::default());
        s.extend(iter);
        s
    }
}

impl<T, S> Extend<T> for CompactHashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.map.extend(iter.into_iter().map(|t| (t, ())));
    }
}

/// Owning iterator over the elements of a [`CompactHashSet`].
pub struct IntoIter<T> {
    inner: iter::IntoIter<T, ()>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|(t, _)| t)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T, S> IntoIterator for CompactHashSet<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter {
            inner: self.map.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a CompactHashSet<T, S> {
    type Item = &'a T;
    type IntoIter = Keys<'a, T, ()>;

    fn into_iter(self) -> Keys<'a, T, ()> {
        self.iter()
    }
}
