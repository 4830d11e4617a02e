//! # Least Recently Used (LRU) Cache
//!
//! Fixed-capacity, thread-safe LRU cache. One [`IntrusiveList`] keeps the
//! recency order and one `FxHashMap` indexes every key to the list node that
//! holds it. Both live behind a single `parking_lot::Mutex`.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LruCache<K, V>                              │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │                   Mutex<LruCore<K, V>>                       │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   │                               │                                      │
//!   │                               ▼                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  FxHashMap<K, NodeRef<Entry<K, V>>>   (index)                │   │
//!   │   │     "a" ──────────┐      "b" ───────┐     "c" ──┐            │   │
//!   │   └───────────────────┼─────────────────┼───────────┼────────────┘   │
//!   │                       ▼                 ▼           ▼                │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  IntrusiveList<Entry<K, V>>   (recency ring)                 │   │
//!   │   │                                                              │   │
//!   │   │  root ──► [a,1] ◄──► [b,2] ◄──► [c,3] ──► root               │   │
//!   │   │           MRU                   LRU                          │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The index stores the very handles the list handed out, so promotion and
//! removal through a handle found in the index act on the one ring in place.
//!
//! ## Operations
//!
//! | Method          | Complexity | Description                               |
//! |-----------------|------------|-------------------------------------------|
//! | `new(capacity)` | O(1)       | Create cache, rejects capacity 0          |
//! | `add(k, v)`     | O(1)       | Evict LRU when full, then insert at MRU   |
//! | `get(&k)`       | O(1)       | Lookup, promotes hit to MRU               |
//! | `contains(&k)`  | O(1)       | Membership without promotion              |
//! | `keys()`        | O(n)       | Snapshot of keys, MRU to LRU              |
//! | `purge()`       | O(n)       | Drop every entry                          |
//! | `len()`         | O(1)       | Current number of entries                 |
//!
//! ## Eviction on `add`
//!
//! ```text
//!   Before (capacity = 3):
//!     root ──► [A] ◄──► [B] ◄──► [C] ──► root
//!
//!   add(D):
//!     1. len == capacity: remove back node [C], drop "C" from index
//!     2. push [D] at the front, index "D"
//!
//!   After:
//!     root ──► [D] ◄──► [A] ◄──► [B] ──► root
//! ```
//!
//! The capacity check runs before anything else, so re-adding a key that is
//! already present evicts the back entry whenever the cache is full, even
//! when that back entry is the key being re-added. An existing node for the
//! key is then unlinked before the new one is pushed.
//!
//! ## Concurrency Model
//!
//! Every public method takes the exclusive lock for its whole duration,
//! including `get` (it reorders the ring). The lock is never held across
//! blocking calls. Operations on one cache are linearizable; separate caches
//! share nothing.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::policy::lru::LruCache;
//!
//! let cache = LruCache::new(2).unwrap();
//! cache.add("one", 1);
//! cache.add("two", 2);
//!
//! assert_eq!(cache.get(&"one"), Some(1));
//! assert_eq!(cache.keys(), vec!["one", "two"]);
//!
//! cache.add("three", 3);
//! assert_eq!(cache.keys(), vec!["three", "one"]);
//! assert_eq!(cache.get(&"two"), None);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::builder::CacheBuilder;
use crate::ds::intrusive_list::{IntrusiveList, NodeRef};
use crate::error::{ConfigError, InvariantError};

/// Immutable `(key, value)` payload of one list node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

/// Single-threaded core: recency list, key index and capacity.
///
/// Not synchronized; [`LruCache`] is the only owner.
pub(crate) struct LruCore<K, V> {
    list: IntrusiveList<Entry<K, V>>,
    index: FxHashMap<K, NodeRef<Entry<K, V>>>,
    capacity: usize,
    preallocate: usize,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash,
{
    /// `capacity` must be non-zero; the builder validates it.
    pub(crate) fn new(capacity: usize, preallocate: usize) -> Self {
        Self {
            list: IntrusiveList::with_capacity(preallocate),
            index: FxHashMap::with_capacity_and_hasher(preallocate, Default::default()),
            capacity,
            preallocate,
        }
    }

    fn len(&self) -> usize {
        self.list.len()
    }

    fn add(&mut self, key: K, value: V)
    where
        K: Clone,
    {
        if self.list.len() == self.capacity {
            self.evict_back();
        }
        if let Some(stale) = self.index.remove(&key) {
            self.list.remove(&stale);
            trace!("replaced existing entry");
        }
        let node = self.list.push_front(Entry::new(key.clone(), value));
        self.index.insert(key, node);
    }

    fn evict_back(&mut self) {
        let Some(back) = self.list.back() else {
            return;
        };
        let entry = self.list.remove(&back);
        self.index.remove(&entry.key);
        trace!(len = self.list.len(), "evicted least recently used entry");
    }

    fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let node = self.index.get(key)?;
        self.list.move_to_front(node);
        Some(&node.value().value)
    }

    fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.list.iter().map(|entry| entry.key.clone()).collect()
    }

    fn purge(&mut self) -> usize {
        let dropped = self.list.len();
        self.index = FxHashMap::with_capacity_and_hasher(self.preallocate, Default::default());
        self.list.init();
        dropped
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;

        if self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "list holds {} entries, capacity is {}",
                self.list.len(),
                self.capacity
            )));
        }
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list holds {} entries",
                self.index.len(),
                self.list.len()
            )));
        }
        for (position, entry) in self.list.iter().enumerate() {
            let node = self.index.get(&entry.key).ok_or_else(|| {
                InvariantError::new(format!("list entry at position {position} is not indexed"))
            })?;
            if !self.list.contains(node) || !std::ptr::eq(node.value(), entry) {
                return Err(InvariantError::new(format!(
                    "index handle for position {position} points at a different node"
                )));
            }
        }
        Ok(())
    }
}

/// Thread-safe, fixed-capacity LRU cache.
///
/// Share it between threads with `Arc<LruCache<K, V>>`; it is `Send + Sync`
/// when `K` and `V` are `Send + Sync`.
pub struct LruCache<K, V> {
    inner: Mutex<LruCore<K, V>>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `capacity` is 0.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::lru::LruCache;
    ///
    /// let cache: LruCache<u32, String> = LruCache::new(100).unwrap();
    /// assert_eq!(cache.capacity(), 100);
    /// assert!(cache.is_empty());
    ///
    /// assert!(LruCache::<u32, String>::new(0).is_err());
    /// ```
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        CacheBuilder::new(capacity).build()
    }

    pub(crate) fn from_core(core: LruCore<K, V>) -> Self {
        let capacity = core.capacity;
        debug!(capacity, "created lru cache");
        Self {
            inner: Mutex::new(core),
            capacity,
        }
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the keys from most to least recently used.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::lru::LruCache;
    ///
    /// let cache = LruCache::new(3).unwrap();
    /// cache.add(1, "a");
    /// cache.add(2, "b");
    /// assert_eq!(cache.keys(), vec![2, 1]);
    /// ```
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.inner.lock().keys()
    }

    /// Inserts `value` under `key` as the most recently used entry.
    ///
    /// When the cache is full the least recently used entry is evicted first,
    /// regardless of whether `key` is already present. Any older entry for
    /// `key` is then replaced.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::lru::LruCache;
    ///
    /// let cache = LruCache::new(1).unwrap();
    /// cache.add("one", 1);
    /// cache.add("two", 2);
    /// assert_eq!(cache.keys(), vec!["two"]);
    /// assert_eq!(cache.get(&"one"), None);
    /// ```
    pub fn add(&self, key: K, value: V)
    where
        K: Clone,
    {
        self.inner.lock().add(key, value);
    }

    /// Looks up `key`, promoting it to most recently used on a hit.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::lru::LruCache;
    ///
    /// let cache = LruCache::new(2).unwrap();
    /// cache.add("one", 1);
    /// cache.add("two", 2);
    ///
    /// assert_eq!(cache.get(&"one"), Some(1));
    /// assert_eq!(cache.keys(), vec!["one", "two"]);
    /// assert_eq!(cache.get(&"missing"), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Returns `true` if `key` is cached. Does not change recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().contains(key)
    }

    /// Drops every entry.
    pub fn purge(&self) {
        let dropped = self.inner.lock().purge();
        debug!(dropped, "purged lru cache");
    }

    /// Verifies that the recency ring is well formed and that the index
    /// names exactly the nodes in it.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LruCache")
            .field("len", &core.list.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
