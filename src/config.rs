//! The Config of a ConcurrentHashSet.
//!
//! The construction parameters of a `ConcurrentHashSet`, and their
//! validation.
//!
//! ```
//! use stripes::config::Config;
//!
//! let config = Config::new()
//!     .with_concurrency_level(4)
//!     .with_capacity(2)
//!     .validate()
//!     .unwrap();
//!
//! //  Each stripe guards at least one bucket.
//! assert_eq!(4, config.capacity);
//! ```

use std::cmp;

use super::failure::{Failure, Result};
use super::hashcore::capacity::{DEFAULT_CAPACITY, DEFAULT_MAX_STRIPES, MAX_BUCKETS};

/// `Config`
///
/// The construction parameters of a `ConcurrentHashSet`.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct Config {
    /// The initial number of stripes, i.e. the number of threads expected to
    /// update the set concurrently.
    pub concurrency_level: usize,
    /// The initial number of buckets.
    pub capacity: usize,
    /// Whether the number of stripes doubles on growth.
    pub grow_stripes: bool,
    /// The maximum number of stripes, when `grow_stripes` is set.
    pub max_stripes: usize,
}

impl Config {
    /// Creates the default instance.
    ///
    /// -   One stripe per CPU.
    /// -   31 buckets.
    /// -   Stripes doubling on growth, up to 1024.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::config::Config;
    /// let config = Config::new();
    ///
    /// assert_eq!(num_cpus::get(), config.concurrency_level);
    /// assert_eq!(31, config.capacity);
    /// assert!(config.grow_stripes);
    /// assert_eq!(1024, config.max_stripes);
    /// ```
    pub fn new() -> Self {
        Self {
            concurrency_level: num_cpus::get(),
            capacity: DEFAULT_CAPACITY,
            grow_stripes: true,
            max_stripes: DEFAULT_MAX_STRIPES,
        }
    }

    /// Sets the concurrency level.
    pub fn with_concurrency_level(mut self, concurrency_level: usize) -> Self {
        self.concurrency_level = concurrency_level;
        self
    }

    /// Sets the initial number of buckets.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets whether the number of stripes doubles on growth.
    pub fn with_grow_stripes(mut self, grow_stripes: bool) -> Self {
        self.grow_stripes = grow_stripes;
        self
    }

    /// Sets the maximum number of stripes.
    pub fn with_max_stripes(mut self, max_stripes: usize) -> Self {
        self.max_stripes = max_stripes;
        self
    }

    /// Validates the instance, and returns its normalized version.
    ///
    /// Normalization raises `capacity` to at least `concurrency_level`, so
    /// that each stripe guards at least one bucket, and `max_stripes` to at
    /// least `concurrency_level`.
    ///
    /// #   Errors
    ///
    /// Returns an error if:
    ///
    /// -   `concurrency_level` is 0.
    /// -   The normalized `capacity` exceeds the maximum number of buckets.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use stripes::config::Config;
    /// #   use stripes::failure::Failure;
    /// let config = Config::new().with_concurrency_level(0);
    /// assert_eq!(Err(Failure::InvalidConcurrencyLevel(0)), config.validate());
    ///
    /// let config = Config::new().with_capacity(usize::MAX);
    /// assert_eq!(Err(Failure::InvalidCapacity(usize::MAX)), config.validate());
    ///
    /// let config = Config::new().with_concurrency_level(8).with_capacity(0);
    /// assert_eq!(8, config.validate().unwrap().capacity);
    /// ```
    pub fn validate(self) -> Result<Self> {
        if self.concurrency_level == 0 {
            return Err(Failure::InvalidConcurrencyLevel(self.concurrency_level));
        }

        let capacity = cmp::max(self.capacity, self.concurrency_level);

        if capacity > MAX_BUCKETS {
            return Err(Failure::InvalidCapacity(capacity));
        }

        let max_stripes = cmp::max(self.max_stripes, self.concurrency_level);

        Ok(Self { capacity, max_stripes, ..self })
    }
}

impl Default for Config {
    fn default() -> Self { Self::new() }
}
