//! Hash smearing and table sizing shared by every compact container.

use core::hash::{BuildHasher, Hash};

/// Smallest bucket array ever allocated.
pub(crate) const MIN_TABLE_SIZE: usize = 4;

/// Largest bucket array (and therefore entry count) a compact table supports.
/// Indices are stored as `u32` with two values reserved as sentinels.
pub const MAX_CAPACITY: usize = 1 << 30;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// Folds a 64-bit hash to 32 bits and spreads it with a murmur3-style
/// multiply-rotate-multiply so low-entropy hashes still reach every bucket.
#[inline]
pub(crate) fn smear(hash: u64) -> u32 {
    let folded = (hash ^ (hash >> 32)) as u32;
    C2.wrapping_mul(folded.wrapping_mul(C1).rotate_left(15))
}

#[inline]
pub(crate) fn hash_key<S, Q>(hasher: &S, q: &Q) -> u32
where
    S: BuildHasher,
    Q: ?Sized + Hash,
{
    smear(hasher.hash_one(q))
}

/// Bucket count for `expected` entries: a power of two, at least
/// `MIN_TABLE_SIZE`, with `expected <= load_factor * size`.
pub(crate) fn table_size_for(expected: usize, load_factor: f64) -> usize {
    let wanted = (expected as f64 / load_factor).ceil() as usize;
    let mut size = wanted.max(MIN_TABLE_SIZE).next_power_of_two();
    // The division can round down past a power of two.
    while size <= MAX_CAPACITY && grow_threshold(size, load_factor) < expected {
        size *= 2;
    }
    if size > MAX_CAPACITY {
        panic!("capacity overflow");
    }
    size
}

/// Entry count at which a table of `buckets` must grow.
#[inline]
pub(crate) fn grow_threshold(buckets: usize, load_factor: f64) -> usize {
    ((buckets as f64) * load_factor) as usize
}
