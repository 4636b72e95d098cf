//! The Node of a bucket chain.

use std::sync::atomic::Ordering;

use crossbeam_epoch::{Atomic, Guard, Shared};

//  A Node of a bucket chain.
//
//  The `item` and `hash` are immutable once the Node is constructed.
//
//  The `next` link is published with Release semantics and read with Acquire
//  semantics, and only ever rewritten while holding the stripe lock guarding
//  the bucket, to splice around a removed Node.
pub struct Node<T> {
    pub item: T,
    pub hash: u64,
    pub next: Atomic<Node<T>>,
}

impl<T> Node<T> {
    //  Creates a new instance, linked in front of `next`.
    pub fn new(item: T, hash: u64, next: Shared<'_, Node<T>>) -> Self {
        Self { item, hash, next: Atomic::from(next) }
    }
}

//  An iterator over the Nodes of a bucket chain.
pub struct Chain<'g, T> {
    current: Shared<'g, Node<T>>,
    guard: &'g Guard,
}

impl<'g, T> Chain<'g, T> {
    //  Creates a new instance, starting from the Node pointed to by `link`.
    pub fn new(link: &Atomic<Node<T>>, guard: &'g Guard) -> Self {
        Self { current: link.load(Ordering::Acquire, guard), guard }
    }

    //  Creates an empty instance.
    pub fn empty(guard: &'g Guard) -> Self {
        Self { current: Shared::null(), guard }
    }
}

impl<'g, T> Clone for Chain<'g, T> {
    fn clone(&self) -> Self { Self { current: self.current, guard: self.guard } }
}

impl<'g, T> Iterator for Chain<'g, T> {
    type Item = &'g Node<T>;

    fn next(&mut self) -> Option<Self::Item> {
        //  Safety:
        //  -   Nodes are only ever destroyed through the collector, once
        //      unreachable, hence any Node reachable while `guard` is pinned
        //      outlives `guard`.
        let node = unsafe { self.current.as_ref() }?;

        self.current = node.next.load(Ordering::Acquire, self.guard);

        Some(node)
    }
}

#[cfg(test)]
mod tests {

use crossbeam_epoch::{self as epoch, Owned};

use super::*;

#[test]
fn chain_walk() {
    let head: Atomic<Node<u32>> = Atomic::null();

    let guard = epoch::pin();

    for i in 0..3 {
        let current = head.load(Ordering::Relaxed, &guard);
        head.store(Owned::new(Node::new(i, i as u64, current)), Ordering::Release);
    }

    let items: Vec<_> = Chain::new(&head, &guard).map(|n| n.item).collect();
    assert_eq!(vec![2, 1, 0], items);

    assert_eq!(0, Chain::<u32>::empty(&guard).count());

    //  Safety:
    //  -   Nodes were never shared with another thread.
    unsafe {
        let mut current = head.load(Ordering::Relaxed, &guard);
        while !current.is_null() {
            let owned = current.into_owned();
            current = owned.next.load(Ordering::Relaxed, &guard);
        }
    }
}

}
