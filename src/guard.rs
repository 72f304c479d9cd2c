//! Mutation generation counter, container identity and debug-only probe
//! guard.
//!
//! `ModCount` is bumped on every structural change of a container and is
//! what detached cursors compare against to fail fast. `OwnerId` lets a
//! cursor tell its own container from any other. `ProbeGuard` catches
//! user `Eq`/`Hash` impls that call back into a container while it is
//! walking a bucket chain under `&self`; release builds compile it away.

use core::cell::Cell;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU64, Ordering};

/// Structural modification generation. Wraps on overflow; a cursor would
/// need to sleep through exactly `u64::MAX + 1` mutations to miss one.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ModCount(u64);

impl ModCount {
    #[inline]
    pub(crate) fn get(self) -> u64 {
        self.0
    }

    #[inline]
    pub(crate) fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

static NEXT_OWNER: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of one container instance. A clone is a
/// different container and gets a fresh id.
#[derive(Debug, Eq, PartialEq)]
pub(crate) struct OwnerId(u64);

impl OwnerId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub(crate) fn get(&self) -> u64 {
        self.0
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::fresh()
    }
}

impl Clone for OwnerId {
    fn clone(&self) -> Self {
        Self::fresh()
    }
}

/// Tracks whether a chain probe is in flight on this container.
#[derive(Debug, Default)]
pub(crate) struct ProbeGuard {
    #[cfg(debug_assertions)]
    probing: Cell<bool>,
    // Keep containers !Sync in every build profile.
    _unsync: PhantomData<Cell<()>>,
}

impl Clone for ProbeGuard {
    fn clone(&self) -> Self {
        // A clone starts outside any probe.
        Self::default()
    }
}

impl ProbeGuard {
    /// Marks the start of a probe. In debug builds, panics if a probe on the
    /// same container is already running further up the stack.
    #[inline]
    pub(crate) fn enter(&self) -> Probing<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.probing.replace(true),
                "reentrancy detected: container accessed from inside a key's Eq or Hash"
            );
            Probing { owner: self }
        }
        #[cfg(not(debug_assertions))]
        {
            Probing {
                _owner: PhantomData,
            }
        }
    }
}

/// RAII marker returned by `ProbeGuard::enter`.
pub(crate) struct Probing<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ProbeGuard,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ProbeGuard>,
}

impl Drop for Probing<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.probing.set(false);
    }
}
