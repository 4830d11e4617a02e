pub use crate::builder::CacheBuilder;
pub use crate::ds::{IntrusiveList, NodeRef};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::lru::{Entry, LruCache};
