//! Internal definition of the ConcurrentHashSet storage.

pub mod capacity;
pub mod set_core;

mod grow;
mod hooks;
mod mutate;
mod node;
mod stripes;
mod tables;

pub use self::hooks::{BuildHasherHooks, DefaultHashHooks, HashHooks};

use super::atomic;
use super::config;
use super::failure;
