//! Cursor: a detached, fail-fast iteration position that can remove the
//! element it last returned.
//!
//! A cursor does not borrow its container. Each step takes the container as
//! an argument (like a handle), so the caller may interleave other reads, and
//! removal through the cursor goes through the same swap-with-last path as
//! `remove`. Any structural change made *around* the cursor (insert of a new
//! key, remove, clear, an access-order reorder, or a flood-guard switch)
//! advances the container's generation; the cursor notices on its next step,
//! reports `IterError::ConcurrentModification`, and refuses to continue.
//! A cursor only ever steps the container that created it; any other
//! container, a clone included, gets `IterError::WrongContainer`.

use crate::compact_core::{CompactCore, Slot};
use crate::error::IterError;

/// Fail-fast position in a container's traversal order.
///
/// Obtain one from `cursor()` on a map or set and drive it with
/// [`next`](Cursor::next) / [`remove`](Cursor::remove).
#[derive(Clone, Debug)]
pub struct Cursor {
    owner: u64,
    expected: u64,
    upcoming: Option<Slot>,
    current: Option<Slot>,
    poisoned: Option<IterError>,
}

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Containers a [`Cursor`] can walk. Implemented by every container in this
/// crate; not implementable outside it.
pub trait CursorTarget: sealed::Sealed {
    type Key;
    type Value;

    #[doc(hidden)]
    fn cursor_advance<'m>(
        &'m self,
        cursor: &mut Cursor,
    ) -> Result<(&'m Self::Key, &'m Self::Value), IterError>;

    #[doc(hidden)]
    fn cursor_remove(
        &mut self,
        cursor: &mut Cursor,
    ) -> Result<(Self::Key, Self::Value), IterError>;
}

impl Cursor {
    pub(crate) fn start<K, V, S>(core: &CompactCore<K, V, S>) -> Self {
        Self {
            owner: core.owner(),
            expected: core.generation(),
            upcoming: core.repr().first(),
            current: None,
            poisoned: None,
        }
    }

    /// True if `next` would yield an element, assuming the container was
    /// not modified behind the cursor's back.
    pub fn has_next(&self) -> bool {
        self.poisoned.is_none() && self.upcoming.is_some()
    }

    /// Advances and returns the next entry.
    pub fn next<'m, M: CursorTarget>(
        &mut self,
        target: &'m M,
    ) -> Result<(&'m M::Key, &'m M::Value), IterError> {
        target.cursor_advance(self)
    }

    /// Advances and returns the next key.
    pub fn next_key<'m, M: CursorTarget>(
        &mut self,
        target: &'m M,
    ) -> Result<&'m M::Key, IterError> {
        self.next(target).map(|(k, _)| k)
    }

    /// Advances and returns the next value.
    pub fn next_value<'m, M: CursorTarget>(
        &mut self,
        target: &'m M,
    ) -> Result<&'m M::Value, IterError> {
        self.next(target).map(|(_, v)| v)
    }

    /// Removes the entry most recently returned by `next`. The cursor stays
    /// valid and continues with the element that would have followed.
    pub fn remove<M: CursorTarget>(
        &mut self,
        target: &mut M,
    ) -> Result<(M::Key, M::Value), IterError> {
        target.cursor_remove(self)
    }

    fn check<K, V, S>(&mut self, core: &CompactCore<K, V, S>) -> Result<(), IterError> {
        if core.owner() != self.owner {
            return Err(IterError::WrongContainer);
        }
        if let Some(e) = self.poisoned {
            return Err(e);
        }
        let found = core.generation();
        if found != self.expected {
            let e = IterError::ConcurrentModification {
                expected: self.expected,
                found,
            };
            self.poisoned = Some(e);
            return Err(e);
        }
        Ok(())
    }

    pub(crate) fn advance<'m, K, V, S>(
        &mut self,
        core: &'m CompactCore<K, V, S>,
    ) -> Result<(&'m K, &'m V), IterError> {
        self.check(core)?;
        let at = self.upcoming.ok_or(IterError::Exhausted)?;
        self.upcoming = core.repr().next(at);
        self.current = Some(at);
        Ok(core.repr().entry(at))
    }

    pub(crate) fn remove_current<K, V, S>(
        &mut self,
        core: &mut CompactCore<K, V, S>,
    ) -> Result<(K, V), IterError> {
        self.check(core)?;
        let at = self.current.take().ok_or(IterError::NoCurrentElement)?;
        let (entry, resume) = core.remove_slot(at, self.upcoming);
        self.upcoming = resume;
        self.expected = core.generation();
        Ok(entry)
    }
}
