//! #   The ConcurrentHashSet.
//!
//! The `ConcurrentHashSet` is the concurrent equivalent of the standard
//! `HashSet`: any number of threads may insert, remove, and look up elements
//! concurrently.
//!
//! ##  Under the covers.
//!
//! Under the covers the `ConcurrentHashSet` is an array of buckets, each the
//! head of a linked chain of elements, and a smaller array of locks, the
//! stripes, each guarding a subset of the buckets.
//!
//! The main consequences are:
//!
//! -   Look ups and iteration never block.
//! -   Insertions and removals only block if another thread is modifying a
//!     bucket guarded by the same stripe.
//! -   Growing the set, and the aggregate operations such as `len`, block all
//!     writers for their duration.
//!
//! #   Example: basic
//!
//! General usage of `ConcurrentHashSet` involves inserting elements, either
//! using `insert`, to insert one element at a time, or `extend`, to insert
//! multiple elements at once.
//!
//! The faillible equivalents exist too: `try_insert` and `try_extend` will
//! return a `Result` indicating whether the operation succeeded, and the cause
//! of its failure if it did not.
//!
//! ```
//! use stripes::hashset::ConcurrentHashSet;
//!
//! let set = ConcurrentHashSet::new();
//! set.insert(1);
//! set.insert(2);
//!
//! assert_eq!(2, set.len());
//! assert!(set.contains(&1));
//!
//! set.extend([3, 4, 5]);
//!
//! assert_eq!(5, set.len());
//! assert!(set.remove(&4));
//! assert!(!set.contains(&4));
//! ```
//!
//! #   Example: accessing elements
//!
//! Borrowing elements requires pinning the current thread, so that they are
//! not reclaimed while borrowed; this is achieved with `pin`.
//!
//! ```
//! use stripes::hashset::ConcurrentHashSet;
//!
//! let set = ConcurrentHashSet::new();
//! set.extend([1, 2, 3, 4, 5]);
//!
//! let pinned = set.pin();
//!
//! assert_eq!(Some(&1), pinned.get(&1));
//! assert_eq!(None, pinned.get(&6));
//!
//! for e in &pinned {
//!     println!("{}", e);
//! }
//! ```
//!
//! #   Example: managing capacity
//!
//! `ConcurrentHashSet` grows on its own, yet its initial geometry can be
//! specified:
//!
//! -   The constructors `with_concurrency_and_capacity` specify the number of
//!     stripes, which then never grows, and the initial number of buckets.
//! -   The constructors `with_config` and `with_config_and_hooks` take a
//!     `Config`, which also specifies whether, and how far, the number of
//!     stripes grows.
//!
//! ```
//! use stripes::hashset::ConcurrentHashSet;
//!
//! let set = ConcurrentHashSet::with_concurrency_and_capacity(4, 31);
//!
//! assert_eq!(4, set.stripe_count());
//! assert_eq!(31, set.bucket_count());
//!
//! set.extend(0..1_000);
//!
//! assert_eq!(4, set.stripe_count());
//! assert!(set.bucket_count() > 31);
//! ```
//!
//! #   Example: sharing is caring
//!
//! The core property of `ConcurrentHashSet` is its ability to be written to
//! from multiple threads at once.
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use stripes::hashset::ConcurrentHashSet;
//!
//! let set = Arc::new(ConcurrentHashSet::new());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let set = Arc::clone(&set);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 set.insert(t * 100 + i);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(400, set.len());
//! ```

pub mod iterator;

mod hashset;
mod pinned;

pub use super::hashcore::{BuildHasherHooks, DefaultHashHooks, HashHooks};
pub use self::hashset::ConcurrentHashSet;
pub use self::pinned::HashSetPinned;

use super::config;
use super::failure;
use super::hashcore;
