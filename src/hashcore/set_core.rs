//! The core of the ConcurrentHashSet.
//!
//! The `SetCore` holds the current Tables, and implements the operations of
//! the set over an explicit epoch `Guard`:
//!
//! -   The read paths, lock-free, in this module.
//! -   The whole-table aggregates, holding all stripes, in this module.
//! -   The mutation engine, in `mutate`.
//! -   The resize engine, in `grow`.
//!
//! All guards passed to a given `SetCore` must be pinned on the same
//! collector.

use std::sync::atomic::Ordering;

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};
use tracing::debug;

use super::atomic::RelaxedUsize;
use super::capacity::{self, DEFAULT_CAPACITY};
use super::config::Config;
use super::failure::{Failure, Result};
use super::hooks::HashHooks;
use super::node::{Chain, Node};
use super::stripes::{StripeGuard, Stripes};
use super::tables::Tables;

pub struct SetCore<T, H> {
    //  The current Tables, never null.
    //
    //  Swapped only while holding all stripes.
    pub(super) tables: Atomic<Tables<T>>,
    pub(super) hooks: H,
    //  The maximum number of elements per stripe before growing is considered.
    //
    //  Written only while holding stripe 0.
    pub(super) budget: RelaxedUsize,
    pub(super) grow_stripes: bool,
    pub(super) max_stripes: usize,
}

impl<T, H> SetCore<T, H> {
    //  Creates a new instance.
    //
    //  `config` is assumed to have been validated.
    pub fn new(config: &Config, hooks: H) -> Self {
        debug_assert_eq!(Ok(*config), config.validate());

        let stripes = Stripes::new(config.concurrency_level);
        let tables = Tables::new(config.capacity, stripes);
        let budget = capacity::budget(config.capacity, config.concurrency_level);

        debug!(
            buckets = config.capacity,
            stripes = config.concurrency_level,
            budget,
            grow_stripes = config.grow_stripes,
            "created set"
        );

        Self {
            tables: Atomic::new(tables),
            hooks,
            budget: RelaxedUsize::new(budget),
            grow_stripes: config.grow_stripes,
            max_stripes: config.max_stripes,
        }
    }

    //  Returns the hooks.
    pub fn hooks(&self) -> &H { &self.hooks }

    //  Returns the current budget.
    pub fn budget(&self) -> usize { self.budget.load() }

    //  Loads the current Tables.
    pub fn load<'g>(&self, guard: &'g Guard) -> Shared<'g, Tables<T>> {
        self.tables.load(Ordering::Acquire, guard)
    }

    //  Returns the current Tables.
    pub fn current<'g>(&self, guard: &'g Guard) -> &'g Tables<T> {
        //  Safety:
        //  -   `tables` is never null.
        //  -   Tables are only destroyed through the collector, once replaced.
        unsafe { self.load(guard).deref() }
    }

    //  Returns whether the current Tables is still `tables`.
    pub fn is_current(&self, tables: Shared<'_, Tables<T>>, guard: &Guard) -> bool {
        self.load(guard) == tables
    }

    //  Returns the number of buckets of the current Tables.
    pub fn number_buckets(&self, guard: &Guard) -> usize {
        self.current(guard).number_buckets()
    }

    //  Returns the number of stripes of the current Tables.
    pub fn number_stripes(&self, guard: &Guard) -> usize {
        self.current(guard).number_stripes()
    }

    //  Returns whether `item` is present.
    pub fn contains(&self, item: &T, guard: &Guard) -> bool
    where
        H: HashHooks<T>,
    {
        self.get(item, guard).is_some()
    }

    //  Returns the stored element equal to `item`, if any.
    //
    //  Lock-free: a stale Tables is still a structurally valid one, so there is
    //  no need to validate it.
    pub fn get<'g>(&self, item: &T, guard: &'g Guard) -> Option<&'g T>
    where
        H: HashHooks<T>,
    {
        let hash = self.hooks.hash(item);

        let tables = self.current(guard);
        let (bucket, _) = tables.locate(hash);

        tables.chain(bucket, guard)
            .find(|node| node.hash == hash && self.hooks.eq(&node.item, item))
            .map(|node| &node.item)
    }

    //  Returns a weakly consistent iterator over the elements.
    pub fn iter<'g>(&self, guard: &'g Guard) -> Iter<'g, T> {
        Iter::new(self.current(guard), guard)
    }

    //  Acquires all stripes, in ascending order.
    //
    //  Returns the current Tables, which cannot be replaced while the stripes
    //  are held.
    pub fn lock_all<'g>(&self, guard: &'g Guard) -> (Shared<'g, Tables<T>>, StripeGuard<'g>) {
        let mut stripes = StripeGuard::new();

        //  Stripe 0 is shared by all Tables, and replacing the Tables requires
        //  it, hence once it is held the current Tables is stable.
        let first = self.current(guard);
        stripes.acquire(&first.stripes, 0..1);

        let tables = self.load(guard);

        //  Safety:
        //  -   Same as `current`.
        let current = unsafe { tables.deref() };
        debug_assert!(first.stripes.shares(&current.stripes, capacity::StripeIndex(0)));

        stripes.acquire(&current.stripes, 1..current.number_stripes());

        (tables, stripes)
    }

    //  Returns the number of elements.
    pub fn len(&self, guard: &Guard) -> usize {
        let (tables, _stripes) = self.lock_all(guard);

        //  Safety:
        //  -   Same as `current`.
        unsafe { tables.deref() }.approximate_len()
    }

    //  Returns whether there is no element.
    pub fn is_empty(&self, guard: &Guard) -> bool {
        let (tables, _stripes) = self.lock_all(guard);

        //  Safety:
        //  -   Same as `current`.
        unsafe { tables.deref() }.counts.iter().all(|c| c.load() == 0)
    }

    //  Removes all elements.
    //
    //  The stripes are preserved, the buckets are reset to the default
    //  capacity.
    pub fn clear(&self, guard: &Guard) {
        let (tables, _stripes) = self.lock_all(guard);

        //  Safety:
        //  -   Same as `current`.
        let current = unsafe { tables.deref() };

        let cleared = Tables::new(DEFAULT_CAPACITY, current.stripes.clone());
        let budget = capacity::budget(cleared.number_buckets(), cleared.number_stripes());

        debug!(
            elements = current.approximate_len(),
            buckets = cleared.number_buckets(),
            budget,
            "cleared set"
        );

        self.tables.store(Owned::new(cleared), Ordering::Release);
        self.budget.store(budget);

        //  Safety:
        //  -   `tables` is no longer reachable from `self`.
        unsafe { guard.defer_destroy(tables) };
    }

    //  Copies all elements into `destination`, starting at `index`.
    pub fn copy_to(&self, destination: &mut [T], index: usize, guard: &Guard) -> Result<()>
    where
        T: Clone,
    {
        let (tables, _stripes) = self.lock_all(guard);

        //  Safety:
        //  -   Same as `current`.
        let current = unsafe { tables.deref() };

        let needed = current.approximate_len();
        let available = destination.len().saturating_sub(index);

        if index > destination.len() || needed > available {
            return Err(Failure::InsufficientSpace { needed, available });
        }

        let elements = Iter::new(current, guard);

        for (slot, item) in destination[index..].iter_mut().zip(elements) {
            slot.clone_from(item);
        }

        Ok(())
    }

    //  Clones all elements into a `Vec`.
    pub fn to_vec(&self, guard: &Guard) -> Vec<T>
    where
        T: Clone,
    {
        let (tables, _stripes) = self.lock_all(guard);

        //  Safety:
        //  -   Same as `current`.
        let current = unsafe { tables.deref() };

        let mut result = Vec::with_capacity(current.approximate_len());
        result.extend(Iter::new(current, guard).cloned());
        result
    }
}

impl<T, H> Drop for SetCore<T, H> {
    fn drop(&mut self) {
        //  Safety:
        //  -   Exclusive access, due to `&mut self`.
        //  -   Former Tables, and removed nodes, are owned by the collector.
        unsafe {
            let tables = self.tables.load(Ordering::Relaxed, epoch::unprotected());
            drop(tables.into_owned());
        }
    }
}

//  A weakly consistent iterator over the elements of a Tables.
//
//  The bucket array is captured on creation. Concurrent insertions and
//  removals may, or may not, be observed; a concurrent growth or clear is not
//  observed at all, the iteration carrying on over the captured buckets.
pub struct Iter<'g, T> {
    buckets: &'g [Atomic<Node<T>>],
    next_bucket: usize,
    chain: Chain<'g, T>,
    guard: &'g Guard,
}

impl<'g, T> Iter<'g, T> {
    //  Creates a new instance.
    pub fn new(tables: &'g Tables<T>, guard: &'g Guard) -> Self {
        Self { buckets: &tables.buckets, next_bucket: 0, chain: Chain::empty(guard), guard }
    }
}

impl<'g, T> Clone for Iter<'g, T> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets,
            next_bucket: self.next_bucket,
            chain: self.chain.clone(),
            guard: self.guard,
        }
    }
}

impl<'g, T> Iterator for Iter<'g, T> {
    type Item = &'g T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.chain.next() {
                return Some(&node.item);
            }

            let head = self.buckets.get(self.next_bucket)?;
            self.next_bucket += 1;

            self.chain = Chain::new(head, self.guard);
        }
    }
}

#[cfg(test)]
mod tests {

use crossbeam_epoch::Collector;

use crate::utils::tester::CollidingHooks;
use crate::hashcore::DefaultHashHooks;

use super::*;

fn new_core<T>(concurrency_level: usize, capacity: usize) -> SetCore<T, DefaultHashHooks> {
    let config = Config::new()
        .with_concurrency_level(concurrency_level)
        .with_capacity(capacity)
        .validate()
        .unwrap();

    SetCore::new(&config, DefaultHashHooks::default())
}

#[test]
fn new_budget() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    let core = new_core::<u32>(4, 31);

    assert_eq!(7, core.budget());
    assert_eq!(31, core.number_buckets(&guard));
    assert_eq!(4, core.number_stripes(&guard));
    assert!(core.is_empty(&guard));
    assert_eq!(0, core.len(&guard));
}

#[test]
fn lock_all_holds_every_stripe() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    let core = new_core::<u32>(3, 31);

    let (tables, stripes) = core.lock_all(&guard);

    assert!(core.is_current(tables, &guard));
    assert_eq!(3, stripes.len());
}

#[test]
fn iter_colliding() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    let config = Config::new().with_concurrency_level(1).validate().unwrap();
    let core = SetCore::new(&config, CollidingHooks);

    for i in 0..5u32 {
        assert_eq!(Ok(true), core.insert(i, &guard));
    }

    let mut items: Vec<_> = core.iter(&guard).copied().collect();
    items.sort_unstable();

    assert_eq!(vec![0, 1, 2, 3, 4], items);
    assert_eq!(Some(&3), core.get(&3, &guard));
    assert_eq!(None, core.get(&5, &guard));
}

#[test]
fn copy_to_bounds() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    let core = new_core::<u32>(2, 31);

    for i in 0..3 {
        core.insert(i, &guard).unwrap();
    }

    let mut destination = [7u32; 5];

    assert_eq!(
        Err(Failure::InsufficientSpace { needed: 3, available: 2 }),
        core.copy_to(&mut destination, 3, &guard)
    );
    assert_eq!(
        Err(Failure::InsufficientSpace { needed: 3, available: 0 }),
        core.copy_to(&mut destination, 6, &guard)
    );

    assert_eq!(Ok(()), core.copy_to(&mut destination, 1, &guard));
    assert_eq!(7, destination[0]);
    assert_eq!(7, destination[4]);

    let mut copied = destination[1..4].to_vec();
    copied.sort_unstable();
    assert_eq!(vec![0, 1, 2], copied);

    let mut all = core.to_vec(&guard);
    all.sort_unstable();
    assert_eq!(vec![0, 1, 2], all);
}

#[test]
fn clear_resets() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    let core = new_core::<u32>(2, 5);

    for i in 0..50 {
        core.insert(i, &guard).unwrap();
    }

    assert!(core.number_buckets(&guard) > 5);

    core.clear(&guard);

    assert_eq!(0, core.len(&guard));
    assert!(core.is_empty(&guard));
    assert_eq!(DEFAULT_CAPACITY, core.number_buckets(&guard));
    assert_eq!(capacity::budget(DEFAULT_CAPACITY, core.number_stripes(&guard)), core.budget());
    assert!(!core.contains(&7, &guard));
}

}
