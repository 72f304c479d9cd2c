//! Error types.

use thiserror::Error;

/// Failure reported by a [`Cursor`](crate::Cursor) step.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterError {
    /// `next` was called with no remaining elements.
    #[error("iterator exhausted")]
    Exhausted,

    /// The container was structurally modified outside this cursor since its
    /// last step. The cursor stays poisoned afterwards.
    #[error("container modified during iteration (expected generation {expected}, found {found})")]
    ConcurrentModification {
        /// Generation the cursor last observed.
        expected: u64,
        /// Generation the container reports now.
        found: u64,
    },

    /// The cursor was stepped on a container other than the one that
    /// created it. The cursor is left unchanged.
    #[error("cursor used with a container that did not create it")]
    WrongContainer,

    /// `remove` was called before `next`, or twice for the same element.
    #[error("no current element to remove")]
    NoCurrentElement,
}

/// Rejected [`CompactConfig`](crate::CompactConfig).
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Load factor must lie in `[MIN_LOAD_FACTOR, 1]`.
    #[error("load factor {0} is outside [0.25, 1]")]
    LoadFactor(f64),

    /// The flood-guard chain limit must be at least 1.
    #[error("maximum bucket length must be at least 1")]
    MaxBucketLen,

    /// The expected-size hint exceeds what a compact table can hold.
    #[error("expected size {0} exceeds the maximum capacity")]
    ExpectedSize(usize),
}
