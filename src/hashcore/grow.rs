//! The resize engine of the ConcurrentHashSet.
//!
//! Growing builds an entirely new Tables off to the side, while holding all
//! stripes, then publishes it with a single atomic store. The replaced Tables
//! is left untouched, and remains valid for the readers still observing it.

use std::sync::atomic::Ordering;

use crossbeam_epoch::{Guard, Owned, Shared};
use tracing::debug;

use super::capacity::{self, Growth};
use super::set_core::SetCore;
use super::stripes::StripeGuard;
use super::tables::Tables;

impl<T, H> SetCore<T, H> {
    //  Grows the Tables, if `tables_ptr` is still current.
    //
    //  Must be called without holding any stripe.
    pub fn grow(&self, tables_ptr: Shared<'_, Tables<T>>, guard: &Guard)
    where
        T: Clone,
    {
        //  Safety:
        //  -   Same as `SetCore::current`.
        let tables = unsafe { tables_ptr.deref() };

        //  Stripe 0 elects the thread performing the resize.
        let mut stripes = StripeGuard::new();
        stripes.acquire(&tables.stripes, 0..1);

        //  Another thread already grew, or cleared, the Tables.
        if !self.is_current(tables_ptr, guard) {
            return;
        }

        let number_buckets = tables.number_buckets();
        let approximate_len = tables.approximate_len();

        //  Few elements for many buckets: the hashes are poorly distributed,
        //  and more buckets would not help.
        if capacity::is_sparse(approximate_len, number_buckets) {
            let budget = self.budget.load().saturating_mul(2);
            self.budget.store(budget);

            debug!(elements = approximate_len, buckets = number_buckets, budget, "doubled budget");
            return;
        }

        let growth = Growth::of(number_buckets);

        stripes.acquire(&tables.stripes, 1..tables.number_stripes());

        let new_stripes = if self.grow_stripes {
            tables.stripes.doubled(self.max_stripes)
        } else {
            None
        };

        let new_stripes = new_stripes.unwrap_or_else(|| tables.stripes.clone());

        let grown = tables.rehash(growth.number_buckets(), new_stripes, guard);

        let budget = match growth {
            Growth::To(_) => capacity::budget(grown.number_buckets(), grown.number_stripes()),
            Growth::Maximum => usize::MAX,
        };

        debug!(
            elements = approximate_len,
            from_buckets = number_buckets,
            to_buckets = grown.number_buckets(),
            stripes = grown.number_stripes(),
            budget,
            "grew set"
        );

        self.budget.store(budget);
        self.tables.store(Owned::new(grown), Ordering::Release);

        //  Safety:
        //  -   `tables_ptr` is no longer reachable from `self`.
        unsafe { guard.defer_destroy(tables_ptr) };
    }
}

#[cfg(test)]
mod tests {

use crossbeam_epoch::Collector;

use crate::config::Config;
use crate::hashcore::DefaultHashHooks;
use crate::utils::tester::{CollidingHooks, SpyCount, SpyElement};

use super::*;

#[test]
fn grow_on_budget() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    let config = Config::new()
        .with_concurrency_level(4)
        .with_capacity(31)
        .with_grow_stripes(false)
        .validate()
        .unwrap();

    let core = SetCore::new(&config, DefaultHashHooks::default());

    for i in 1..=200 {
        assert_eq!(Ok(true), core.insert(i, &guard));
    }

    assert!(core.number_buckets(&guard) > 31);
    assert_eq!(4, core.number_stripes(&guard));
    assert_eq!(200, core.len(&guard));

    for i in 1..=200 {
        assert!(core.contains(&i, &guard), "{}", i);
    }
}

#[test]
fn grow_doubles_stripes() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    let config = Config::new()
        .with_concurrency_level(2)
        .with_capacity(2)
        .with_max_stripes(8)
        .validate()
        .unwrap();

    let core = SetCore::new(&config, DefaultHashHooks::default());

    for i in 0..1_000 {
        core.insert(i, &guard).unwrap();
    }

    assert_eq!(8, core.number_stripes(&guard));
    assert_eq!(1_000, core.len(&guard));
}

#[test]
fn grow_stale_is_noop() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    let config = Config::new().with_concurrency_level(1).with_capacity(3).validate().unwrap();
    let core: SetCore<u32, _> = SetCore::new(&config, DefaultHashHooks::default());

    let stale = core.load(&guard);
    core.clear(&guard);

    let budget = core.budget();
    core.grow(stale, &guard);

    assert_eq!(budget, core.budget());
    assert_eq!(capacity::DEFAULT_CAPACITY, core.number_buckets(&guard));
}

#[test]
fn grow_sparse_doubles_budget() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    let config = Config::new().with_concurrency_level(1).with_capacity(64).validate().unwrap();
    let core = SetCore::new(&config, CollidingHooks);

    //  Budget of 64 for a single stripe, shrunk to force the issue.
    core.budget.store(2);

    for i in 0..3 {
        core.insert(i, &guard).unwrap();
    }

    //  3 elements for 64 buckets: sparse, the budget doubles instead.
    assert_eq!(64, core.number_buckets(&guard));
    assert_eq!(4, core.budget());
}

#[test]
fn grow_reclaims() {
    let count = SpyCount::zero();

    {
        let collector = Collector::new();
        let config = Config::new().with_concurrency_level(1).with_capacity(1).validate().unwrap();
        let core = SetCore::new(&config, DefaultHashHooks::default());

        {
            let guard = collector.register().pin();

            for i in 0..100 {
                core.insert(SpyElement::new(i, &count), &guard).unwrap();
            }

            assert!(core.number_buckets(&guard) > 1);
        }

        //  Former Tables may linger until the collector is dropped.
        assert!(count.get() >= 100);
    }

    assert_eq!(0, count.get());
}

}
