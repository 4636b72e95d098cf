//! The ConcurrentHashSet

use std::fmt;
use std::iter::FromIterator;

use crossbeam_epoch::{Collector, Guard};

use super::HashSetPinned;

use super::config::Config;
use super::failure::{self, Result};
use super::hashcore::set_core::SetCore;
use super::hashcore::{DefaultHashHooks, HashHooks};

//
//  Public Interface
//

/// `ConcurrentHashSet`
///
/// A set safe to read from, and write to, from any number of threads.
///
/// Growing the set clones its elements into the new storage; for elements
/// which are expensive to clone, consider storing them behind an `Arc`.
pub struct ConcurrentHashSet<T, H = DefaultHashHooks> {
    //  Declared first, so as to be dropped before the collector.
    core: SetCore<T, H>,
    //  Reclaims removed elements and replaced storage.
    //
    //  Private to the instance, so that elements need not be 'static: all
    //  garbage left is destroyed when the instance is dropped.
    collector: Collector,
}

impl<T> ConcurrentHashSet<T> {
    /// Creates a new instance with the default configuration: one stripe per
    /// CPU, and 31 buckets.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    ///
    /// assert!(set.insert(1));
    /// assert!(!set.insert(1));
    /// assert!(set.contains(&1));
    /// assert_eq!(1, set.len());
    /// ```
    pub fn new() -> Self { Self::with_hooks(DefaultHashHooks::default()) }

    /// Creates a new instance with `concurrency_level` stripes, and at least
    /// `capacity` buckets.
    ///
    /// The number of stripes never grows.
    ///
    /// #   Errors
    ///
    /// Returns an error if `concurrency_level` is 0, or the capacity exceeds
    /// the maximum number of buckets.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::failure::Failure;
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::<i32>::try_with_concurrency_and_capacity(0, 31);
    /// assert_eq!(Some(Failure::InvalidConcurrencyLevel(0)), set.err());
    ///
    /// let set = ConcurrentHashSet::<i32>::try_with_concurrency_and_capacity(4, 2).unwrap();
    /// assert_eq!(4, set.stripe_count());
    /// assert_eq!(4, set.bucket_count());
    /// ```
    pub fn try_with_concurrency_and_capacity(concurrency_level: usize, capacity: usize)
        -> Result<Self>
    {
        let config = Config::new()
            .with_concurrency_level(concurrency_level)
            .with_capacity(capacity)
            .with_grow_stripes(false);

        Self::try_with_config(config)
    }

    /// Creates a new instance with `concurrency_level` stripes, and at least
    /// `capacity` buckets.
    ///
    /// Calling this method is equivalent to calling
    /// `try_with_concurrency_and_capacity` and panicking on error.
    ///
    /// #   Panics
    ///
    /// Panics if `concurrency_level` is 0, or the capacity exceeds the maximum
    /// number of buckets.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::with_concurrency_and_capacity(4, 31);
    /// set.insert("Hello");
    ///
    /// assert_eq!(4, set.stripe_count());
    /// assert_eq!(31, set.bucket_count());
    /// ```
    pub fn with_concurrency_and_capacity(concurrency_level: usize, capacity: usize) -> Self {
        Self::try_with_concurrency_and_capacity(concurrency_level, capacity)
            .unwrap_or_else(|f| failure::panic_from_failure(f))
    }

    /// Creates a new instance configured by `config`.
    ///
    /// #   Errors
    ///
    /// Returns an error if `config` is invalid, see `Config::validate`.
    pub fn try_with_config(config: Config) -> Result<Self> {
        Self::try_with_config_and_hooks(config, None)
    }

    /// Creates a new instance configured by `config`.
    ///
    /// #   Panics
    ///
    /// Panics if `config` is invalid, see `Config::validate`.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::config::Config;
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let config = Config::new().with_concurrency_level(2).with_capacity(7);
    /// let set = ConcurrentHashSet::with_config(config);
    /// set.insert(1);
    ///
    /// assert_eq!(2, set.stripe_count());
    /// assert_eq!(7, set.bucket_count());
    /// ```
    pub fn with_config(config: Config) -> Self {
        Self::try_with_config(config).unwrap_or_else(|f| failure::panic_from_failure(f))
    }
}

impl<T, H> ConcurrentHashSet<T, H> {
    /// Creates a new instance with the default configuration, and the
    /// specified `hooks`.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::{ConcurrentHashSet, DefaultHashHooks};
    /// let set = ConcurrentHashSet::with_hooks(DefaultHashHooks::default());
    /// set.insert(1);
    ///
    /// assert!(set.contains(&1));
    /// ```
    pub fn with_hooks(hooks: H) -> Self {
        Self::try_create(Config::new(), hooks).unwrap_or_else(|f| failure::panic_from_failure(f))
    }

    /// Creates a new instance configured by `config`, with the specified
    /// `hooks`, or the default ones if `None`.
    ///
    /// #   Errors
    ///
    /// Returns an error if `config` is invalid, see `Config::validate`.
    pub fn try_with_config_and_hooks(config: Config, hooks: Option<H>) -> Result<Self>
    where
        H: Default,
    {
        Self::try_create(config, hooks.unwrap_or_default())
    }

    /// Creates a new instance configured by `config`, with the specified
    /// `hooks`, or the default ones if `None`.
    ///
    /// #   Panics
    ///
    /// Panics if `config` is invalid, see `Config::validate`.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::config::Config;
    /// #   use stripes::hashset::{ConcurrentHashSet, DefaultHashHooks};
    /// let config = Config::new().with_concurrency_level(2);
    /// let set = ConcurrentHashSet::<_, DefaultHashHooks>::with_config_and_hooks(config, None);
    /// set.insert(1);
    ///
    /// assert!(set.contains(&1));
    /// ```
    pub fn with_config_and_hooks(config: Config, hooks: Option<H>) -> Self
    where
        H: Default,
    {
        Self::try_with_config_and_hooks(config, hooks)
            .unwrap_or_else(|f| failure::panic_from_failure(f))
    }

    /// Creates a new instance with the default configuration and the specified
    /// `hooks`, containing the elements of `collection`.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::{ConcurrentHashSet, DefaultHashHooks};
    /// let hooks = DefaultHashHooks::default();
    /// let set = ConcurrentHashSet::from_iter_with_hooks([1, 2, 2, 3], hooks);
    ///
    /// assert_eq!(3, set.len());
    /// ```
    pub fn from_iter_with_hooks<C>(collection: C, hooks: H) -> Self
    where
        C: IntoIterator<Item = T>,
        T: Clone,
        H: HashHooks<T>,
    {
        let result = Self::with_hooks(hooks);
        result.extend(collection);
        result
    }

    /// Creates a new instance configured by `config`, with the specified
    /// `hooks`, or the default ones if `None`, containing the elements of
    /// `collection`.
    ///
    /// #   Errors
    ///
    /// Returns an error if `config` is invalid, or if any element cannot be
    /// inserted.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::config::Config;
    /// #   use stripes::hashset::{ConcurrentHashSet, DefaultHashHooks};
    /// let config = Config::new().with_concurrency_level(2);
    /// let set = ConcurrentHashSet::<_, DefaultHashHooks>::try_from_iter_with_config_and_hooks(
    ///     config,
    ///     0..10,
    ///     None,
    /// );
    ///
    /// assert_eq!(10, set.unwrap().len());
    /// ```
    pub fn try_from_iter_with_config_and_hooks<C>(
        config: Config,
        collection: C,
        hooks: Option<H>,
    )
        -> Result<Self>
    where
        C: IntoIterator<Item = T>,
        T: Clone,
        H: HashHooks<T> + Default,
    {
        let result = Self::try_with_config_and_hooks(config, hooks)?;
        result.try_extend(collection)?;
        Ok(result)
    }

    /// Returns a reference to the hooks.
    pub fn hooks(&self) -> &H { self.core.hooks() }

    /// Pins the current thread, returning a handle to the instance.
    ///
    /// The handle performs any number of operations on a single pin, and
    /// allows borrowing the elements of the instance, and iterating over them.
    ///
    /// Removed elements are not destroyed while a handle which may observe
    /// them is alive; hence, handles should not be kept for long.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// set.extend(["a", "b"]);
    ///
    /// let pinned = set.pin();
    ///
    /// assert_eq!(Some(&"a"), pinned.get(&"a"));
    /// assert_eq!(2, pinned.iter().count());
    /// ```
    pub fn pin(&self) -> HashSetPinned<'_, T, H> {
        HashSetPinned::new(&self.core, self.guard())
    }

    /// Returns the number of elements contained in the instance.
    ///
    /// Acquires all stripes, hence is O(number of stripes), and blocks while
    /// any stripe is held by another thread.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// assert_eq!(0, set.len());
    ///
    /// set.insert(1);
    /// assert_eq!(1, set.len());
    /// ```
    #[doc(alias = "count")]
    pub fn len(&self) -> usize { self.core.len(&self.guard()) }

    /// Returns whether the instance contains any element, or not.
    ///
    /// Acquires all stripes, like `len`.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// assert!(set.is_empty());
    ///
    /// set.insert(1);
    /// assert!(!set.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool { self.core.is_empty(&self.guard()) }

    /// Removes all elements.
    ///
    /// The number of buckets is reset to its default, the number of stripes is
    /// preserved.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// set.extend(0..100);
    ///
    /// set.clear();
    ///
    /// assert!(set.is_empty());
    /// assert!(!set.contains(&42));
    /// assert!(set.insert(42));
    /// ```
    pub fn clear(&self) { self.core.clear(&self.guard()) }

    /// Returns the current number of buckets.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::with_concurrency_and_capacity(4, 31);
    /// assert_eq!(31, set.bucket_count());
    ///
    /// set.extend(0..200);
    /// assert!(set.bucket_count() > 31);
    /// ```
    pub fn bucket_count(&self) -> usize { self.core.number_buckets(&self.guard()) }

    /// Returns the current number of stripes.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::<i32>::with_concurrency_and_capacity(4, 31);
    /// assert_eq!(4, set.stripe_count());
    /// ```
    pub fn stripe_count(&self) -> usize { self.core.number_stripes(&self.guard()) }

    /// Returns the current budget: the number of elements a stripe may hold
    /// before growing is considered.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::<i32>::with_concurrency_and_capacity(4, 31);
    /// assert_eq!(7, set.budget());
    /// ```
    pub fn budget(&self) -> usize { self.core.budget() }

    /// Clones all elements into a `Vec`.
    ///
    /// Acquires all stripes, hence the result is a consistent snapshot.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// set.extend([3, 1, 2]);
    ///
    /// let mut elements = set.to_vec();
    /// elements.sort();
    ///
    /// assert_eq!(vec![1, 2, 3], elements);
    /// ```
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.core.to_vec(&self.guard())
    }

    /// Clones all elements into `destination`, starting at `index`.
    ///
    /// Acquires all stripes, hence the copy is a consistent snapshot.
    ///
    /// #   Errors
    ///
    /// Returns an error if `destination[index..]` cannot accomodate all the
    /// elements, in which case `destination` is left untouched.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::failure::Failure;
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// set.extend([1, 2]);
    ///
    /// let mut destination = [0; 3];
    ///
    /// assert_eq!(
    ///     Err(Failure::InsufficientSpace { needed: 2, available: 1 }),
    ///     set.try_copy_to(&mut destination, 2)
    /// );
    ///
    /// assert_eq!(Ok(()), set.try_copy_to(&mut destination, 1));
    /// assert_eq!(0, destination[0]);
    /// assert_eq!(3, destination[1] + destination[2]);
    /// ```
    pub fn try_copy_to(&self, destination: &mut [T], index: usize) -> Result<()>
    where
        T: Clone,
    {
        self.core.copy_to(destination, index, &self.guard())
    }

    /// Clones all elements into `destination`, starting at `index`.
    ///
    /// Calling this method is equivalent to calling `try_copy_to` and
    /// panicking on error.
    ///
    /// #   Panics
    ///
    /// Panics if `destination[index..]` cannot accomodate all the elements.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// set.insert(7);
    ///
    /// let mut destination = [0; 1];
    /// set.copy_to(&mut destination, 0);
    ///
    /// assert_eq!([7], destination);
    /// ```
    pub fn copy_to(&self, destination: &mut [T], index: usize)
    where
        T: Clone,
    {
        self.try_copy_to(destination, index).unwrap_or_else(|f| failure::panic_from_failure(f));
    }

    //  Pins the current thread.
    //
    //  Registers a fresh participant on each call, see `pin` for amortizing.
    fn guard(&self) -> Guard { self.collector.register().pin() }

    //  Creates an instance, if `config` is valid.
    fn try_create(config: Config, hooks: H) -> Result<Self> {
        let config = config.validate()?;

        Ok(Self { core: SetCore::new(&config, hooks), collector: Collector::new() })
    }
}

impl<T, H: HashHooks<T>> ConcurrentHashSet<T, H> {
    /// Returns `true` if the set contains an element equal to `item`.
    ///
    /// Lock-free: any insertion which completed before the call is observed.
    ///
    /// Each set-level call pins the current thread anew; for repeated
    /// operations, pinning once with `pin` and operating on the handle is
    /// cheaper.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// set.insert(1);
    ///
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&0));
    /// ```
    pub fn contains(&self, item: &T) -> bool { self.core.contains(item, &self.guard()) }

    /// Inserts `item`, unless an equal element is already present.
    ///
    /// Returns whether `item` was inserted.
    ///
    /// #   Errors
    ///
    /// Returns an error if the number of elements of the stripe guarding
    /// `item` overflows, in which case `item` is not inserted.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    ///
    /// assert_eq!(Ok(true), set.try_insert(3));
    /// assert_eq!(Ok(false), set.try_insert(3));
    /// ```
    pub fn try_insert(&self, item: T) -> Result<bool>
    where
        T: Clone,
    {
        self.core.insert(item, &self.guard())
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
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    ///
    /// assert!(set.insert(3));
    /// assert!(!set.insert(3));
    /// ```
    #[doc(alias = "add")]
    pub fn insert(&self, item: T) -> bool
    where
        T: Clone,
    {
        self.try_insert(item).unwrap_or_else(|f| failure::panic_from_failure(f))
    }

    /// Removes the element equal to `item`, if any.
    ///
    /// Returns whether an element was removed.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// assert!(!set.remove(&42));
    ///
    /// set.insert(42);
    /// assert!(set.remove(&42));
    /// assert!(!set.remove(&42));
    /// ```
    #[doc(alias = "try_remove")]
    pub fn remove(&self, item: &T) -> bool { self.core.remove(item, &self.guard()) }

    /// Inserts multiple elements.
    ///
    /// Elements already present are dropped.
    ///
    /// #   Errors
    ///
    /// Returns an error on the first element which cannot be inserted, see
    /// `try_insert`; the elements before it remain inserted.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// assert_eq!(Ok(()), set.try_extend([1, 2, 3, 2]));
    /// assert_eq!(3, set.len());
    /// ```
    pub fn try_extend<C>(&self, collection: C) -> Result<()>
    where
        C: IntoIterator<Item = T>,
        T: Clone,
    {
        let guard = self.guard();

        for item in collection {
            self.core.insert(item, &guard)?;
        }

        Ok(())
    }

    /// Inserts multiple elements.
    ///
    /// Calling this method is equivalent to calling `try_extend` and panicking
    /// on error.
    ///
    /// #   Panics
    ///
    /// Panics if any element cannot be inserted.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::hashset::ConcurrentHashSet;
    /// let set = ConcurrentHashSet::new();
    /// set.extend([1, 2, 3]);
    /// assert_eq!(3, set.len());
    /// ```
    pub fn extend<C>(&self, collection: C)
    where
        C: IntoIterator<Item = T>,
        T: Clone,
    {
        self.try_extend(collection).unwrap_or_else(|f| failure::panic_from_failure(f));
    }
}

impl<T> Default for ConcurrentHashSet<T> {
    fn default() -> Self { Self::new() }
}

impl<T: fmt::Debug, H> fmt::Debug for ConcurrentHashSet<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pinned = self.pin();
        f.debug_set().entries(pinned.iter()).finish()
    }
}

impl<T, H> FromIterator<T> for ConcurrentHashSet<T, H>
where
    T: Clone,
    H: HashHooks<T> + Default,
{
    fn from_iter<C>(collection: C) -> Self
    where
        C: IntoIterator<Item = T>
    {
        Self::from_iter_with_hooks(collection, H::default())
    }
}

impl<T, H> Extend<T> for ConcurrentHashSet<T, H>
where
    T: Clone,
    H: HashHooks<T>,
{
    fn extend<C>(&mut self, collection: C)
    where
        C: IntoIterator<Item = T>
    {
        ConcurrentHashSet::extend(self, collection);
    }
}

impl<'a, T, H> Extend<T> for &'a ConcurrentHashSet<T, H>
where
    T: Clone,
    H: HashHooks<T>,
{
    fn extend<C>(&mut self, collection: C)
    where
        C: IntoIterator<Item = T>
    {
        ConcurrentHashSet::extend(*self, collection);
    }
}

/// A `ConcurrentHashSet<T>` can be shared across threads whenever `T` is both
/// `Send` and `Sync`.
///
/// #   Example of Sync.
///
/// ```
/// # use stripes::hashset::ConcurrentHashSet;
/// fn ensure_sync<T: Sync>(_: T) {}
///
/// let set = ConcurrentHashSet::new();
/// set.insert("Hello, World".to_string());
///
/// ensure_sync(set);
/// ```
///
/// #   Example of not Sync.
///
/// ```compile_fail
/// # use std::rc::Rc;
/// # use stripes::hashset::ConcurrentHashSet;
/// fn ensure_sync<T: Sync>(_: T) {}
///
/// let set = ConcurrentHashSet::new();
/// set.insert(Rc::new(3));
///
/// ensure_sync(set);
/// ```
#[allow(dead_code)]
struct SyncDocumentation;
