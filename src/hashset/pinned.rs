//! A pinned handle to the ConcurrentHashSet.

use std::fmt;

use crossbeam_epoch::Guard;

use super::failure::{self, Result};
use super::hashcore::HashHooks;
use super::hashcore::set_core::SetCore;
use super::iterator::Iter;

/// `HashSetPinned`
///
/// A `HashSetPinned` is a handle to a `ConcurrentHashSet`, holding the current
/// thread pinned for as long as it lives.
///
/// While pinned, no element observable by the handle is destroyed, hence the
/// handle may lend references to the elements, and iterate over them.
///
/// A handle delays the reclamation of all elements removed while it lives, in
/// this thread and any other, hence handles should be short-lived.
pub struct HashSetPinned<'a, T, H> {
    core: &'a SetCore<T, H>,
    guard: Guard,
}

impl<'a, T, H> HashSetPinned<'a, T, H> {
    //  Creates a new instance.
    pub(crate) fn new(core: &'a SetCore<T, H>, guard: Guard) -> Self {
        Self { core, guard }
    }

    /// Returns the number of elements contained in the set.
    ///
    /// Acquires all stripes.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// let pinned = set.pin();
    ///
    /// pinned.insert(1);
    /// assert_eq!(1, pinned.len());
    /// ```
    pub fn len(&self) -> usize { self.core.len(&self.guard) }

    /// Returns whether the set contains any element, or not.
    ///
    /// Acquires all stripes.
    pub fn is_empty(&self) -> bool { self.core.is_empty(&self.guard) }

    /// Returns a weakly consistent iterator over the elements of the set.
    ///
    /// The iterator never fails, nor blocks, in the presence of concurrent
    /// modifications. It may or may not observe modifications made after its
    /// creation, and only ever observes the storage current at its creation:
    /// elements inserted after a concurrent growth or clear are not observed.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// set.extend([1, 2, 3]);
    ///
    /// let pinned = set.pin();
    /// let sum: i32 = pinned.iter().sum();
    ///
    /// assert_eq!(6, sum);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> { Iter::new(self.core.iter(&self.guard)) }
}

impl<'a, T, H: HashHooks<T>> HashSetPinned<'a, T, H> {
    /// Returns `true` if the set contains an element equal to `item`.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// let pinned = set.pin();
    ///
    /// pinned.insert(1);
    ///
    /// assert!(pinned.contains(&1));
    /// assert!(!pinned.contains(&2));
    /// ```
    pub fn contains(&self, item: &T) -> bool { self.core.contains(item, &self.guard) }

    /// Returns a reference to the element equal to `item`, if any.
    ///
    /// The stored element is returned, which may differ from `item` when
    /// custom hooks are used.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// set.insert(1);
    ///
    /// let pinned = set.pin();
    ///
    /// assert_eq!(Some(&1), pinned.get(&1));
    /// assert_eq!(None, pinned.get(&2));
    /// ```
    pub fn get(&self, item: &T) -> Option<&T> { self.core.get(item, &self.guard) }

    /// Inserts `item`, unless an equal element is already present.
    ///
    /// #   Errors
    ///
    /// Returns an error if the number of elements of the stripe guarding
    /// `item` overflows, in which case `item` is not inserted.
    pub fn try_insert(&self, item: T) -> Result<bool>
    where
        T: Clone,
    {
        self.core.insert(item, &self.guard)
    }

    /// Inserts `item`, unless an equal element is already present.
    ///
    /// Calling this method is equivalent to calling `try_insert` and panicking
    /// on error.
    ///
    /// #   Panics
    ///
    /// Panics if the number of elements of the stripe guarding `item`
    /// overflows.
    pub fn insert(&self, item: T) -> bool
    where
        T: Clone,
    {
        self.try_insert(item).unwrap_or_else(|f| failure::panic_from_failure(f))
    }

    /// Removes the element equal to `item`, if any.
    ///
    /// The removed element remains accessible to references obtained from
    /// this handle, until it is dropped.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// set.insert("Hello".to_string());
    ///
    /// let pinned = set.pin();
    /// let hello = pinned.get(&"Hello".to_string()).unwrap();
    ///
    /// assert!(pinned.remove(&"Hello".to_string()));
    /// assert_eq!("Hello", hello.as_str());
    /// ```
    pub fn remove(&self, item: &T) -> bool { self.core.remove(item, &self.guard) }
}

impl<'a, T: fmt::Debug, H> fmt::Debug for HashSetPinned<'a, T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, 'b, T, H> IntoIterator for &'b HashSetPinned<'a, T, H> {
    type Item = &'b T;
    type IntoIter = Iter<'b, T>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}
