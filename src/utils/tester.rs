//! Internal testing utilities

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::hashcore::HashHooks;

//  SpyCount
//
//  A counter of the number of instances of elements.
pub struct SpyCount(AtomicUsize);

impl SpyCount {
    pub fn zero() -> Self { SpyCount(AtomicUsize::new(0)) }

    pub fn get(&self) -> usize { self.0.load(Ordering::Relaxed) }

    fn decrement(&self) { self.0.fetch_sub(1, Ordering::Relaxed); }

    fn increment(&self) { self.0.fetch_add(1, Ordering::Relaxed); }
}

//  Spy Element
//
//  An element tracking the number of instances, helpful to ensure proper drop.
//
//  Elements are compared, and hashed, by `id` only.
pub struct SpyElement<'a> {
    id: u64,
    count: &'a SpyCount,
}

impl<'a> SpyElement<'a> {
    pub fn new(id: u64, count: &'a SpyCount) -> Self {
        count.increment();
        SpyElement { id, count }
    }
}

impl<'a> Clone for SpyElement<'a> {
    fn clone(&self) -> Self { Self::new(self.id, self.count) }
}

impl<'a> PartialEq for SpyElement<'a> {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl<'a> Eq for SpyElement<'a> {}

impl<'a> Hash for SpyElement<'a> {
    fn hash<H: Hasher>(&self, state: &mut H) { self.id.hash(state) }
}

impl<'a> Drop for SpyElement<'a> {
    fn drop(&mut self) {
        self.count.decrement();
    }
}

//  Hooks hashing all elements identically.
//
//  Every element lands in the same bucket, the worst possible distribution.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollidingHooks;

impl<T: Eq> HashHooks<T> for CollidingHooks {
    fn hash(&self, _: &T) -> u64 { 0 }

    fn eq(&self, left: &T, right: &T) -> bool { left == right }
}

//  Hooks comparing strings regardless of ASCII case.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaseInsensitiveHooks;

impl<T: AsRef<str>> HashHooks<T> for CaseInsensitiveHooks {
    fn hash(&self, value: &T) -> u64 {
        //  FNV-1a, simple and deterministic.
        value.as_ref().bytes()
            .map(|b| b.to_ascii_lowercase())
            .fold(0xcbf2_9ce4_8422_2325, |h, b| (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3))
    }

    fn eq(&self, left: &T, right: &T) -> bool {
        left.as_ref().eq_ignore_ascii_case(right.as_ref())
    }
}
