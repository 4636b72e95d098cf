//! The Failure and Result types of this library.
//!
//! Construction may fail on invalid parameters, and insertion may fail if the number of elements guarded by a single
//! stripe overflows. The cause of the error is then represented as a `Failure`.
//!
//! All faillible methods come in two versions:
//!
//! -   A faillible `try_xxx` version, which returns a `Result` with `Failure` as the error type.
//! -   A convenience `xxx` version, which invokes the `try_xxx` version and panics in case of error.

use std::result;

/// Universal Failure type of this library.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, thiserror::Error)]
pub enum Failure {
    /// The concurrency level must be at least 1.
    #[error("invalid concurrency level {0}, expected at least 1")]
    InvalidConcurrencyLevel(usize),
    /// The initial capacity exceeds the maximum number of buckets.
    #[error("invalid capacity {0}, exceeds the maximum number of buckets")]
    InvalidCapacity(usize),
    /// The number of elements guarded by a stripe cannot be calculated due to overflowing.
    #[error("the number of elements of a stripe overflowed")]
    CountOverflow,
    /// The destination slice cannot accomodate all the elements.
    #[error("insufficient space, {needed} elements needed but only {available} available")]
    InsufficientSpace {
        /// The number of elements to copy.
        needed: usize,
        /// The number of slots available past the requested index.
        available: usize,
    },
}

/// Universal Result type of this library.
pub type Result<T> = result::Result<T, Failure>;

#[cold]
#[inline(never)]
pub(crate) fn panic_from_failure(failure: Failure) -> ! {
    panic!("{}", failure);
}
