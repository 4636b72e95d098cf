//! The ConcurrentHashSet capacity.
//!
//! Index arithmetic, sizing of the bucket array, and budget computations.

use std::{cmp, mem};

/// The number of buckets of a default constructed, or cleared, instance.
pub const DEFAULT_CAPACITY: usize = 31;

/// The maximum number of stripes the lock array may grow to, by default.
pub const DEFAULT_MAX_STRIPES: usize = 1024;

/// The maximum number of buckets of an instance.
///
/// Each bucket is a single pointer, and no allocation may exceed `isize::MAX`
/// bytes.
pub const MAX_BUCKETS: usize = isize::MAX as usize / mem::size_of::<usize>();

/// The index of a bucket within the bucket array.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BucketIndex(pub usize);

/// The index of a stripe within the lock array.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StripeIndex(pub usize);

//  Returns the index of the bucket an element of hash `hash` belongs to.
pub fn bucket_index(hash: u64, number_buckets: usize) -> BucketIndex {
    debug_assert!(number_buckets > 0);

    //  `number_buckets` fits in u64 on all supported platforms, and the result
    //  is strictly less than `number_buckets`, hence fits back.
    let index = (hash % number_buckets as u64) as usize;
    BucketIndex(index)
}

//  Returns the index of the stripe guarding `bucket`.
pub fn stripe_index(bucket: BucketIndex, number_stripes: usize) -> StripeIndex {
    debug_assert!(number_stripes > 0);

    StripeIndex(bucket.0 % number_stripes)
}

//  Returns the number of elements a stripe may hold before growing is
//  considered.
pub fn budget(number_buckets: usize, number_stripes: usize) -> usize {
    debug_assert!(number_stripes > 0);

    cmp::max(1, number_buckets / number_stripes)
}

//  Returns whether the table is sparse relative to its number of buckets.
//
//  A stripe exceeding its budget while the table is that sparse indicates a
//  poor distribution of hashes, rather than a lack of buckets.
pub fn is_sparse(approximate_len: usize, number_buckets: usize) -> bool {
    approximate_len < number_buckets / 4
}

//  Growth of the bucket array.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Growth {
    //  Grow to the specified number of buckets.
    To(usize),
    //  Grow to MAX_BUCKETS; no further growth is possible.
    Maximum,
}

impl Growth {
    //  Computes the growth of a bucket array of `number_buckets`.
    //
    //  The new number of buckets is the smallest odd number strictly greater
    //  than twice the current one which is not divisible by 3, 5, or 7.
    pub fn of(number_buckets: usize) -> Self {
        fn candidate(number_buckets: usize) -> Option<usize> {
            let mut result = number_buckets.checked_mul(2)?.checked_add(1)?;

            while result % 3 == 0 || result % 5 == 0 || result % 7 == 0 {
                result = result.checked_add(2)?;
            }

            debug_assert!(result % 2 != 0);

            Some(result)
        }

        match candidate(number_buckets) {
            Some(result) if result <= MAX_BUCKETS => Growth::To(result),
            _ => Growth::Maximum,
        }
    }

    //  Returns the number of buckets to grow to.
    pub fn number_buckets(self) -> usize {
        match self {
            Growth::To(n) => n,
            Growth::Maximum => MAX_BUCKETS,
        }
    }
}

#[cfg(test)]
mod tests {

use super::*;

#[test]
fn index_bucket() {
    assert_eq!(BucketIndex(0), bucket_index(0, 31));
    assert_eq!(BucketIndex(1), bucket_index(32, 31));
    //  2^64 = 2^4 (mod 31), as 2^5 = 1 (mod 31).
    assert_eq!(BucketIndex(15), bucket_index(u64::MAX, 31));
}

#[test]
fn index_stripe() {
    assert_eq!(StripeIndex(0), stripe_index(BucketIndex(0), 4));
    assert_eq!(StripeIndex(2), stripe_index(BucketIndex(30), 4));
    assert_eq!(StripeIndex(0), stripe_index(BucketIndex(30), 1));
}

#[test]
fn budget_at_least_one() {
    assert_eq!(7, budget(31, 4));
    assert_eq!(1, budget(31, 64));
    assert_eq!(31, budget(31, 1));
}

#[test]
fn sparse() {
    assert!(is_sparse(6, 31));
    assert!(!is_sparse(7, 31));
    assert!(!is_sparse(0, 3));
}

#[test]
fn growth_skips_small_primes() {
    fn grow(n: usize) -> usize { Growth::of(n).number_buckets() }

    //  63 = 3 * 21, 65 = 5 * 13.
    assert_eq!(67, grow(31));
    //  135 = 5 * 27.
    assert_eq!(137, grow(67));
    //  3, 5, 7, 9 are all excluded.
    assert_eq!(11, grow(1));
    assert_eq!(11, grow(4));
    assert_eq!(17, grow(8));
}

#[test]
fn growth_maximum() {
    assert_eq!(Growth::Maximum, Growth::of(MAX_BUCKETS));
    assert_eq!(Growth::Maximum, Growth::of(usize::MAX));
    assert_eq!(MAX_BUCKETS, Growth::Maximum.number_buckets());
}

}
