//! Cache builder.
//!
//! Collects configuration for an [`LruCache`] and validates it once, in
//! [`CacheBuilder::build`].
//!
//! ## Example
//!
//! ```rust
//! use lrukit::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new(100)
//!     .preallocate(100)
//!     .build::<u64, String>()
//!     .unwrap();
//! cache.add(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use tracing::warn;

use crate::error::ConfigError;
use crate::policy::lru::{LruCache, LruCore};

/// Builder for [`LruCache`] instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheBuilder {
    capacity: usize,
    preallocate: usize,
}

impl CacheBuilder {
    /// Create a new cache builder with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            preallocate: 0,
        }
    }

    /// Reserve room for `slots` entries up front (clamped to the capacity).
    ///
    /// Without this the index and the list grow on demand.
    pub fn preallocate(mut self, slots: usize) -> Self {
        self.preallocate = slots;
        self
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Build the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the capacity is 0.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lrukit::builder::CacheBuilder;
    ///
    /// assert!(CacheBuilder::new(0).build::<u64, u64>().is_err());
    /// ```
    pub fn build<K, V>(self) -> Result<LruCache<K, V>, ConfigError>
    where
        K: Eq + Hash,
    {
        if self.capacity == 0 {
            warn!("rejected lru cache with zero capacity");
            return Err(ConfigError::zero_capacity());
        }
        let preallocate = self.preallocate.min(self.capacity);
        Ok(LruCache::from_core(LruCore::new(self.capacity, preallocate)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_with_defaults() {
        let cache = CacheBuilder::new(8).build::<u32, u32>().unwrap();
        assert_eq!(cache.capacity(), 8);
        assert!(cache.is_empty());
    }

    #[test]
    fn build_rejects_zero_capacity() {
        let err = CacheBuilder::new(0)
            .preallocate(16)
            .build::<u32, u32>()
            .unwrap_err();
        assert_eq!(err, ConfigError::zero_capacity());
    }

    #[test]
    fn preallocation_is_clamped_to_capacity() {
        let cache = CacheBuilder::new(2)
            .preallocate(1 << 20)
            .build::<u32, u32>()
            .unwrap();
        cache.add(1, 1);
        cache.add(2, 2);
        cache.add(3, 3);
        assert_eq!(cache.keys(), vec![3, 2]);
    }

    #[test]
    fn builder_is_reusable() {
        let builder = CacheBuilder::new(4).preallocate(4);
        let a = builder.build::<u8, u8>().unwrap();
        let b = builder.build::<u8, u8>().unwrap();
        a.add(1, 1);
        assert_eq!(b.len(), 0);
        assert_eq!(builder.capacity(), 4);
    }
}
