//! Sizing and flood-guard policy for compact containers.

use crate::error::ConfigError;
use crate::hashing::{MAX_CAPACITY, MIN_TABLE_SIZE};

/// Default load factor for maps.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Smallest accepted load factor: the smallest bucket array must still hold
/// one entry before it grows.
pub const MIN_LOAD_FACTOR: f64 = 1.0 / MIN_TABLE_SIZE as f64;

/// Default load factor for [`CompactHashSet`](crate::CompactHashSet).
pub const SET_LOAD_FACTOR: f64 = 1.0;

/// Longest bucket chain tolerated before a container assumes it is being
/// fed colliding keys and switches to its fallback representation.
pub const DEFAULT_MAX_BUCKET_LEN: usize = 9;

/// Construction-time policy for a compact container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompactConfig {
    /// Number of entries the first allocation should hold without growing.
    pub expected_size: usize,

    /// Ratio of entries to buckets at which the table doubles.
    pub load_factor: f64,

    /// Chain length above which the flood guard trips.
    pub max_bucket_len: usize,
}

impl Default for CompactConfig {
    fn default() -> Self {
        Self {
            expected_size: 0,
            load_factor: DEFAULT_LOAD_FACTOR,
            max_bucket_len: DEFAULT_MAX_BUCKET_LEN,
        }
    }
}

impl CompactConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults used by sets: buckets are filled up to one entry each.
    pub fn for_set() -> Self {
        Self {
            load_factor: SET_LOAD_FACTOR,
            ..Self::default()
        }
    }

    pub fn with_expected_size(mut self, expected_size: usize) -> Self {
        self.expected_size = expected_size;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_max_bucket_len(mut self, max_bucket_len: usize) -> Self {
        self.max_bucket_len = max_bucket_len;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Written to also reject NaN.
        if !(self.load_factor >= MIN_LOAD_FACTOR && self.load_factor <= 1.0) {
            return Err(ConfigError::LoadFactor(self.load_factor));
        }
        if self.max_bucket_len == 0 {
            return Err(ConfigError::MaxBucketLen);
        }
        if self.expected_size as f64 / self.load_factor > MAX_CAPACITY as f64 {
            return Err(ConfigError::ExpectedSize(self.expected_size));
        }
        Ok(())
    }
}
