//! A collection of specialized atomics.
//!
//! In theory, it is perfectly possible to use a mixed of Ordering on the same
//! instance of an Atomic, depending on the situation.
//!
//! In practice, it is the author's experience that this is a rarely needed
//! capability which only makes auditing/reviewing harder.
//!
//! Thus, these little types come with pre-established memory ordering.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

macro_rules! atomic {
    ($name:ident, $underlying:ident, $raw:ident, $load_ordering:expr, $store_ordering:expr) => {
        pub struct $name($underlying);

        impl $name {
            pub fn new(v: $raw) -> Self { Self($underlying::new(v)) }
            pub fn load(&self) -> $raw { self.0.load($load_ordering) }
            pub fn store(&self, v: $raw) { self.0.store(v, $store_ordering); }
        }

        impl Default for $name {
            fn default() -> Self { Self::new(Default::default()) }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:?}", self.load())
            }
        }
    }
}

//  Relaxed ordering suffices for:
//
//  -   The per-stripe counts, which are only written under their stripe lock,
//      and only summed under all stripe locks.
//  -   The budget, which is a mere heuristic.
atomic!{ RelaxedUsize, AtomicUsize, usize, Ordering::Relaxed, Ordering::Relaxed }

#[cfg(test)]
mod tests {

use super::*;

#[test]
fn relaxed_default() {
    let counter = RelaxedUsize::default();
    assert_eq!(0, counter.load());

    counter.store(3);
    assert_eq!(3, counter.load());
    assert_eq!("3", format!("{:?}", counter));
}

}
