//! The lock array.
//!
//! A fixed array of mutexes, each guarding a disjoint stripe of the bucket
//! array: stripe `i` guards every bucket `b` such that `b % len == i`.
//!
//! Whenever multiple stripes are held, they are acquired in strictly
//! ascending order, which rules out deadlocks between whole-table operations.

use std::ops::Range;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::capacity::StripeIndex;

//  The lock array.
//
//  The mutexes are shared, so that a grown lock array reuses the mutexes of
//  the array it grows from: a thread holding stripe `i` of an older array
//  holds stripe `i` of any newer array.
#[derive(Clone)]
pub struct Stripes(Arc<[Arc<Mutex<()>>]>);

impl Stripes {
    //  Creates a new instance of `len` stripes.
    pub fn new(len: usize) -> Self {
        debug_assert!(len > 0);

        Self(std::iter::repeat_with(Default::default).take(len).collect())
    }

    //  Returns the number of stripes.
    pub fn len(&self) -> usize { self.0.len() }

    //  Locks a single stripe.
    pub fn lock(&self, index: StripeIndex) -> MutexGuard<'_, ()> {
        self.0[index.0].lock()
    }

    //  Returns whether `self` and `other` share the mutex guarding `index`.
    pub fn shares(&self, other: &Stripes, index: StripeIndex) -> bool {
        match (self.0.get(index.0), other.0.get(index.0)) {
            (Some(left), Some(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }

    //  Returns a doubled lock array, or None if it would exceed `max` stripes.
    //
    //  The first half of the new array reuses the mutexes of `self`.
    pub fn doubled(&self, max: usize) -> Option<Stripes> {
        let len = self.len().checked_mul(2)?;

        if len > max {
            return None;
        }

        let stripes = self.0.iter()
            .cloned()
            .chain(std::iter::repeat_with(Default::default))
            .take(len)
            .collect();

        Some(Self(stripes))
    }
}

//  A set of held stripes, released on drop.
pub struct StripeGuard<'a>(Vec<MutexGuard<'a, ()>>);

impl<'a> StripeGuard<'a> {
    //  Creates an instance holding no stripe.
    pub fn new() -> Self { Self(Vec::new()) }

    //  Acquires the stripes of `range`, in ascending order.
    //
    //  The stripes must be acquired in ascending order across calls too.
    pub fn acquire(&mut self, stripes: &'a Stripes, range: Range<usize>) {
        self.0.reserve(range.len());

        for index in range {
            self.0.push(stripes.lock(StripeIndex(index)));
        }
    }

    //  Returns the number of stripes held.
    #[cfg(test)]
    pub fn len(&self) -> usize { self.0.len() }
}

#[cfg(test)]
mod tests {

use super::*;

#[test]
fn doubled_shares_mutexes() {
    let stripes = Stripes::new(2);
    let doubled = stripes.doubled(8).unwrap();

    assert_eq!(4, doubled.len());
    assert!(stripes.shares(&doubled, StripeIndex(0)));
    assert!(stripes.shares(&doubled, StripeIndex(1)));
    assert!(!stripes.shares(&doubled, StripeIndex(2)));

    //  Locking through the old array blocks the new one.
    let _held = stripes.lock(StripeIndex(1));
    assert!(doubled.0[1].try_lock().is_none());
    assert!(doubled.0[3].try_lock().is_some());
}

#[test]
fn doubled_bounded() {
    let stripes = Stripes::new(3);

    assert!(stripes.doubled(5).is_none());
    assert_eq!(6, stripes.doubled(6).unwrap().len());
}

#[test]
fn guard_acquire_release() {
    let stripes = Stripes::new(4);

    {
        let mut guard = StripeGuard::new();
        guard.acquire(&stripes, 0..1);
        guard.acquire(&stripes, 1..4);

        assert_eq!(4, guard.len());
        assert!(stripes.0.iter().all(|m| m.is_locked()));
    }

    assert!(stripes.0.iter().all(|m| !m.is_locked()));
}

}
