//! Iterator over the ConcurrentHashSet.

use std::iter::FusedIterator;

use super::hashcore::set_core;

/// `Iter`
///
/// A weakly consistent iterator over the elements of a `ConcurrentHashSet`,
/// created by `HashSetPinned::iter`.
///
/// #   Iteration order
///
/// The order in which elements are iterated on is not the order in which
/// they were inserted, and changes as the set grows.
pub struct Iter<'a, T>(set_core::Iter<'a, T>);

impl<'a, T> Iter<'a, T> {
    //  Creates a new instance.
    pub(crate) fn new(inner: set_core::Iter<'a, T>) -> Self { Self(inner) }
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> { self.0.next() }
}

impl<'a, T> FusedIterator for Iter<'a, T> {}
