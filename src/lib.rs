//! lrukit: a thread-safe, fixed-capacity LRU cache.
//!
//! Two layers:
//!
//! - [`ds::IntrusiveList`]: arena-backed doubly linked ring with O(1)
//!   push, remove and move-to-front/back on stable node handles.
//! - [`policy::lru::LruCache`]: the list plus a key index under one lock,
//!   with promote-on-get and evict-on-full.
//!
//! ```
//! use lrukit::prelude::*;
//!
//! let cache = LruCache::new(2)?;
//! cache.add("a", 1);
//! cache.add("b", 2);
//! cache.add("c", 3);
//! assert_eq!(cache.keys(), vec!["c", "b"]);
//! # Ok::<(), ConfigError>(())
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
