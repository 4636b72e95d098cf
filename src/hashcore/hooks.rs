//! Hooks of the ConcurrentHashSet.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};

/// HashHooks
///
/// There are two important hooks for a ConcurrentHashSet:
/// -   The hashing algorithm.
/// -   The equality of elements.
///
/// The two must agree: elements which are equal must hash identically.
///
/// Also see DefaultHashHooks for the default, relying on `Hash` and `Eq`.
pub trait HashHooks<T: ?Sized> {
    /// Computes the hash of `value`.
    fn hash(&self, value: &T) -> u64;

    /// Returns whether `left` and `right` are to be considered the same element.
    fn eq(&self, left: &T, right: &T) -> bool;
}

/// DefaultHashHooks
///
/// Default hooks for the ConcurrentHashSet:
/// -   hashing with a randomly seeded `RandomState`.
/// -   deferring equality to `Eq`.
#[derive(Clone, Debug, Default)]
pub struct DefaultHashHooks(RandomState);

impl<T: ?Sized + Hash + Eq> HashHooks<T> for DefaultHashHooks {
    fn hash(&self, value: &T) -> u64 { hash_with(&self.0, value) }

    fn eq(&self, left: &T, right: &T) -> bool { left == right }
}

/// BuildHasherHooks
///
/// Hooks for the ConcurrentHashSet relying on a user-provided `BuildHasher`,
/// and deferring equality to `Eq`.
///
/// #   Example
///
/// ```
/// #   use std::collections::hash_map::RandomState;
/// #   use stripes::hashset::{BuildHasherHooks, ConcurrentHashSet};
/// let hooks = BuildHasherHooks::new(RandomState::new());
/// let set = ConcurrentHashSet::with_hooks(hooks);
///
/// assert!(set.insert("Hello"));
/// assert!(set.contains(&"Hello"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct BuildHasherHooks<S>(S);

impl<S> BuildHasherHooks<S> {
    /// Creates an instance hashing with `build_hasher`.
    pub fn new(build_hasher: S) -> Self { Self(build_hasher) }

    /// Returns the underlying `BuildHasher`.
    pub fn build_hasher(&self) -> &S { &self.0 }
}

impl<T, S> HashHooks<T> for BuildHasherHooks<S>
where
    T: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    fn hash(&self, value: &T) -> u64 { hash_with(&self.0, value) }

    fn eq(&self, left: &T, right: &T) -> bool { left == right }
}

fn hash_with<T, S>(build_hasher: &S, value: &T) -> u64
where
    T: ?Sized + Hash,
    S: BuildHasher,
{
    let mut hasher = build_hasher.build_hasher();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {

use super::*;

#[test]
fn default_hooks_agree() {
    let hooks = DefaultHashHooks::default();

    assert!(HashHooks::<str>::eq(&hooks, "a", "a"));
    assert!(!HashHooks::<str>::eq(&hooks, "a", "b"));
    assert_eq!(HashHooks::<str>::hash(&hooks, "a"), HashHooks::<str>::hash(&hooks, "a"));
}

#[test]
fn cloned_hooks_hash_identically() {
    let hooks = DefaultHashHooks::default();
    let cloned = hooks.clone();

    assert_eq!(HashHooks::<u32>::hash(&hooks, &7), HashHooks::<u32>::hash(&cloned, &7));
}

}
