//! The mutation engine of the ConcurrentHashSet.
//!
//! Both insertion and removal follow the same protocol:
//!
//! 1.  Load the current Tables, without lock.
//! 2.  Locate the bucket and stripe of the element in this Tables.
//! 3.  Lock the stripe.
//! 4.  Validate that the Tables is still current, or unlock and retry: the
//!     location depends on the lengths of the arrays, which a concurrent
//!     growth may have changed.
//! 5.  Mutate the chain of the bucket.

use std::sync::atomic::Ordering;

use crossbeam_epoch::{Guard, Owned};
use tracing::trace;

use super::set_core::SetCore;
use super::failure::{Failure, Result};
use super::hooks::HashHooks;
use super::node::Node;

impl<T, H: HashHooks<T>> SetCore<T, H> {
    //  Inserts `item`, unless an equal element is already present.
    //
    //  Returns whether `item` was inserted.
    //
    //  #   Errors
    //
    //  Returns an error if the count of the stripe guarding `item` overflows,
    //  in which case `item` is not inserted.
    pub fn insert(&self, item: T, guard: &Guard) -> Result<bool>
    where
        T: Clone,
    {
        let hash = self.hooks.hash(&item);

        loop {
            let tables_ptr = self.load(guard);

            //  Safety:
            //  -   Same as `SetCore::current`.
            let tables = unsafe { tables_ptr.deref() };

            let (bucket, stripe) = tables.locate(hash);

            let grow = {
                let _stripe = tables.stripes.lock(stripe);

                if !self.is_current(tables_ptr, guard) {
                    trace!("stale tables on insert, retrying");
                    continue;
                }

                let present = tables.chain(bucket, guard)
                    .any(|node| node.hash == hash && self.hooks.eq(&node.item, &item));

                if present {
                    return Ok(false);
                }

                let count = &tables.counts[stripe.0];
                let new_count = count.load().checked_add(1).ok_or(Failure::CountOverflow)?;

                let head = tables.head(bucket);
                let next = head.load(Ordering::Relaxed, guard);

                head.store(Owned::new(Node::new(item, hash, next)), Ordering::Release);
                count.store(new_count);

                new_count > self.budget.load()
            };

            //  Growing acquires stripe 0 then all others, hence must not be
            //  attempted while holding any stripe.
            if grow {
                self.grow(tables_ptr, guard);
            }

            return Ok(true);
        }
    }

    //  Removes the element equal to `item`, if any.
    //
    //  Returns whether an element was removed.
    pub fn remove(&self, item: &T, guard: &Guard) -> bool {
        let hash = self.hooks.hash(item);

        loop {
            let tables_ptr = self.load(guard);

            //  Safety:
            //  -   Same as `SetCore::current`.
            let tables = unsafe { tables_ptr.deref() };

            let (bucket, stripe) = tables.locate(hash);

            let _stripe = tables.stripes.lock(stripe);

            if !self.is_current(tables_ptr, guard) {
                trace!("stale tables on remove, retrying");
                continue;
            }

            let mut link = tables.head(bucket);
            let mut current = link.load(Ordering::Acquire, guard);

            //  Safety:
            //  -   Same as `Chain::next`.
            while let Some(node) = unsafe { current.as_ref() } {
                let next = node.next.load(Ordering::Acquire, guard);

                if node.hash == hash && self.hooks.eq(&node.item, item) {
                    //  Readers positioned on `node` still reach `next`.
                    link.store(next, Ordering::Release);

                    let count = &tables.counts[stripe.0];
                    debug_assert!(count.load() > 0);
                    count.store(count.load() - 1);

                    //  Safety:
                    //  -   `node` is no longer reachable from the Tables.
                    unsafe { guard.defer_destroy(current) };

                    return true;
                }

                link = &node.next;
                current = next;
            }

            return false;
        }
    }
}

#[cfg(test)]
mod tests {

use crossbeam_epoch::Collector;

use crate::hashcore::DefaultHashHooks;
use crate::utils::tester::{CaseInsensitiveHooks, CollidingHooks, SpyCount, SpyElement};

use crate::config::Config;

use super::*;

fn config(concurrency_level: usize, capacity: usize) -> Config {
    Config::new()
        .with_concurrency_level(concurrency_level)
        .with_capacity(capacity)
        .validate()
        .unwrap()
}

#[test]
fn insert_no_duplicate() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    let core = SetCore::new(&config(2, 7), DefaultHashHooks::default());

    assert_eq!(Ok(true), core.insert(1, &guard));
    assert_eq!(Ok(false), core.insert(1, &guard));
    assert!(core.contains(&1, &guard));
    assert_eq!(1, core.len(&guard));
}

#[test]
fn insert_custom_equality() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    let core = SetCore::new(&config(2, 7), CaseInsensitiveHooks);

    assert_eq!(Ok(true), core.insert("Hello".to_string(), &guard));
    assert_eq!(Ok(false), core.insert("HELLO".to_string(), &guard));

    assert_eq!(Some("Hello"), core.get(&"hello".to_string(), &guard).map(String::as_str));
    assert!(core.remove(&"hELLo".to_string(), &guard));
    assert!(core.is_empty(&guard));
}

#[test]
fn remove_from_chain() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    //  All elements in one chain: exercise head, middle, and tail removal.
    let core = SetCore::new(&config(1, 1), CollidingHooks);

    for i in 0..5 {
        core.insert(i, &guard).unwrap();
    }

    //  Chain is 4 -> 3 -> 2 -> 1 -> 0, unless grown.
    assert!(core.remove(&4, &guard));
    assert!(core.remove(&2, &guard));
    assert!(core.remove(&0, &guard));
    assert!(!core.remove(&0, &guard));

    let mut items: Vec<_> = core.iter(&guard).copied().collect();
    items.sort_unstable();

    assert_eq!(vec![1, 3], items);
    assert_eq!(2, core.len(&guard));
}

#[test]
fn remove_absent() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    let core = SetCore::new(&config(2, 7), DefaultHashHooks::default());

    assert!(!core.remove(&42, &guard));
    assert_eq!(Ok(true), core.insert(42, &guard));
    assert!(core.remove(&42, &guard));
    assert!(!core.remove(&42, &guard));
    assert_eq!(0, core.len(&guard));
}

#[test]
fn insert_overflow() {
    let collector = Collector::new();
    let guard = collector.register().pin();

    let core = SetCore::new(&config(1, 7), DefaultHashHooks::default());

    //  Saturate the single stripe, and the budget so as not to grow.
    core.current(&guard).counts[0].store(usize::MAX);
    core.budget.store(usize::MAX);

    assert_eq!(Err(Failure::CountOverflow), core.insert(1, &guard));
    assert!(!core.contains(&1, &guard));
}

#[test]
fn remove_reclaims() {
    let count = SpyCount::zero();

    {
        let collector = Collector::new();
        let core = SetCore::new(&config(2, 7), DefaultHashHooks::default());

        {
            let guard = collector.register().pin();

            for i in 0..4 {
                core.insert(SpyElement::new(i, &count), &guard).unwrap();
            }

            assert!(core.remove(&SpyElement::new(2, &count), &guard));
        }

        assert_eq!(3, core.len(&collector.register().pin()));
    }

    assert_eq!(0, count.get());
}

}
