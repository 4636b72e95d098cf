//! Utilities shared across the library.

pub mod atomic;

#[cfg(test)]
pub mod tester;
