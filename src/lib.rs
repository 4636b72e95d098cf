//  Lints
#![allow(clippy::module_inception)]

//! #   The Stripes Library
//!
//! A concurrent, dynamically resizable, hash set.
//! -   The `ConcurrentHashSet`: a lock-striped `HashSet`.
//!
//! Reads are lock-free, writes only contend on their stripe, and memory is
//! reclaimed with epochs.

pub mod config;
pub mod failure;
pub mod hashset;

mod hashcore;
mod utils;

use self::utils::atomic;
