//! The Tables snapshot.
//!
//! The aggregate of bucket array, lock array, and per-stripe counts which is
//! published atomically as a unit, and constitutes one "version" of the
//! storage of the set.

use std::sync::atomic::Ordering;

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned};

use super::atomic::RelaxedUsize;
use super::capacity::{self, BucketIndex, StripeIndex};
use super::node::{Chain, Node};
use super::stripes::Stripes;

//  The Tables snapshot.
//
//  Once published, the only mutations of a Tables are edits of the chain of
//  a bucket, and of the count of a stripe, while holding the relevant stripe.
//
//  Dropping a Tables destroys the nodes still linked in its buckets.
pub struct Tables<T> {
    pub buckets: Box<[Atomic<Node<T>>]>,
    pub stripes: Stripes,
    pub counts: Box<[RelaxedUsize]>,
}

impl<T> Tables<T> {
    //  Creates an empty instance.
    pub fn new(number_buckets: usize, stripes: Stripes) -> Self {
        debug_assert!(number_buckets > 0);

        let buckets = std::iter::repeat_with(Atomic::null).take(number_buckets).collect();
        let counts = std::iter::repeat_with(RelaxedUsize::default).take(stripes.len()).collect();

        Self { buckets, stripes, counts }
    }

    //  Returns the number of buckets.
    pub fn number_buckets(&self) -> usize { self.buckets.len() }

    //  Returns the number of stripes.
    pub fn number_stripes(&self) -> usize { self.stripes.len() }

    //  Returns the bucket and stripe an element of hash `hash` belongs to.
    pub fn locate(&self, hash: u64) -> (BucketIndex, StripeIndex) {
        let bucket = capacity::bucket_index(hash, self.number_buckets());
        let stripe = capacity::stripe_index(bucket, self.number_stripes());

        (bucket, stripe)
    }

    //  Returns the head of `bucket`.
    pub fn head(&self, bucket: BucketIndex) -> &Atomic<Node<T>> { &self.buckets[bucket.0] }

    //  Returns the chain of `bucket`.
    pub fn chain<'g>(&'g self, bucket: BucketIndex, guard: &'g Guard) -> Chain<'g, T> {
        Chain::new(self.head(bucket), guard)
    }

    //  Returns the sum of the counts of all stripes.
    //
    //  The result is only exact if all stripes are held.
    pub fn approximate_len(&self) -> usize {
        self.counts.iter().fold(0, |acc, c| acc.saturating_add(c.load()))
    }

    //  Creates a new instance containing all the elements of `self`,
    //  distributed over `number_buckets` buckets and `stripes`.
    //
    //  Fresh nodes are allocated, the nodes of `self` are left untouched.
    //
    //  All stripes of `self` should be held, lest the copy misses concurrent
    //  updates.
    pub fn rehash(&self, number_buckets: usize, stripes: Stripes, guard: &Guard) -> Self
    where
        T: Clone,
    {
        let result = Self::new(number_buckets, stripes);

        for head in self.buckets.iter() {
            for node in Chain::new(head, guard) {
                let (bucket, stripe) = result.locate(node.hash);

                let head = result.head(bucket);
                let next = head.load(Ordering::Relaxed, guard);

                head.store(Owned::new(Node::new(node.item.clone(), node.hash, next)), Ordering::Relaxed);

                let count = &result.counts[stripe.0];
                count.store(count.load() + 1);
            }
        }

        result
    }
}

impl<T> Drop for Tables<T> {
    fn drop(&mut self) {
        //  Safety:
        //  -   Exclusive access, due to `&mut self`: the instance was either
        //      never published, or it was retired and no pinned thread can
        //      observe it any longer.
        let guard = unsafe { epoch::unprotected() };

        for head in self.buckets.iter() {
            let mut current = head.load(Ordering::Relaxed, guard);

            while !current.is_null() {
                //  Safety:
                //  -   Nodes linked in a bucket are owned by the Tables.
                //  -   Removed nodes are unlinked before being retired, hence
                //      are not encountered here.
                let node = unsafe { current.into_owned() };
                current = node.next.load(Ordering::Relaxed, guard);
            }
        }
    }
}

#[cfg(test)]
mod tests {

use std::collections::HashSet;

use crate::utils::tester::{SpyCount, SpyElement};

use super::*;

fn insert<T>(tables: &Tables<T>, item: T, hash: u64, guard: &Guard) {
    let (bucket, stripe) = tables.locate(hash);
    let head = tables.head(bucket);

    head.store(Owned::new(Node::new(item, hash, head.load(Ordering::Relaxed, guard))), Ordering::Release);

    let count = &tables.counts[stripe.0];
    count.store(count.load() + 1);
}

#[test]
fn locate_within_bounds() {
    let tables: Tables<u32> = Tables::new(31, Stripes::new(4));

    for hash in 0..100 {
        let (bucket, stripe) = tables.locate(hash);

        assert!(bucket.0 < 31);
        assert_eq!(bucket.0 % 4, stripe.0);
    }
}

#[test]
fn rehash_preserves_elements() {
    let guard = epoch::pin();

    let tables = Tables::new(3, Stripes::new(1));

    for i in 0..20u32 {
        insert(&tables, i, u64::from(i) * 7, &guard);
    }

    assert_eq!(20, tables.approximate_len());

    let rehashed = tables.rehash(11, tables.stripes.doubled(2).unwrap(), &guard);

    assert_eq!(11, rehashed.number_buckets());
    assert_eq!(2, rehashed.number_stripes());
    assert_eq!(20, rehashed.approximate_len());

    let items: HashSet<_> = rehashed.buckets.iter()
        .flat_map(|head| Chain::new(head, &guard))
        .map(|node| node.item)
        .collect();

    assert_eq!((0..20).collect::<HashSet<_>>(), items);

    for bucket in 0..11 {
        for node in rehashed.chain(BucketIndex(bucket), &guard) {
            assert_eq!(bucket, rehashed.locate(node.hash).0 .0);
        }
    }
}

#[test]
fn drop_destroys_nodes() {
    let count = SpyCount::zero();

    {
        let guard = epoch::pin();
        let tables = Tables::new(5, Stripes::new(2));

        for i in 0..12 {
            insert(&tables, SpyElement::new(i, &count), i, &guard);
        }

        assert_eq!(12, count.get());
    }

    assert_eq!(0, count.get());
}

}
