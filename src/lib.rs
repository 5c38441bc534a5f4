//! # triekv
//!
//! Persistent key-value stores backed by two linearly grown byte regions,
//! indexed by a compressed fixed-arity trie over fixed-length binary keys.
//!
//! All dynamic state lives inside the two regions — packed internal nodes
//! in one, packed `key ++ value` records in the other — tied together by
//! fixed-width tagged pointers. The heap footprint outside the regions is
//! O(1), so a store can be torn down to its regions plus a tiny header and
//! resumed later ([`Enumeration::share`] / [`Enumeration::unshare`], same
//! on [`Map`]).
//!
//! Two facades share the engine:
//!
//! - [`Enumeration`]: insertion-ordered; every key gets the next dense
//!   index, nothing is ever removed.
//! - [`Map`]: supports removal; freed slots are threaded into free lists
//!   inside the regions and reused in place.
//!
//! ## Example
//!
//! ```rust
//! use triekv::{Config, Map};
//!
//! let mut map = Map::new(Config {
//!     pointer_size: 4,
//!     aridity: 16,
//!     root_aridity: 256,
//!     key_size: 8,
//!     value_size: 8,
//! })
//! .unwrap();
//!
//! map.put(b"usr:1001", b"balance1");
//! map.put(b"usr:1002", b"balance2");
//!
//! assert_eq!(map.get(b"usr:1001"), Some(&b"balance1"[..]));
//! for (key, value) in map.entries() {
//!     println!("{:?} -> {:?}", key, value);
//! }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod bits;
pub mod config;
pub mod engine;
pub mod enumeration;
pub mod map;
pub mod pointer;
pub mod region;

pub use config::{Config, ConfigError};
pub use engine::{Entries, LimitExceeded, MemoryStats};
pub use enumeration::{Enumeration, EnumerationData};
pub use map::{Map, MapData};
pub use region::Region;

use parking_lot::RwLock;

/// A thread-safe wrapper around [`Map`].
///
/// Every operation takes a single lock, mirroring the engine's exclusive
/// ownership of its regions; iteration materializes under the read lock
/// and returns owned pairs.
///
/// ```rust
/// use triekv::{Config, SharedMap};
///
/// let map = SharedMap::new(Config {
///     pointer_size: 4,
///     aridity: 16,
///     root_aridity: 16,
///     key_size: 4,
///     value_size: 4,
/// })
/// .unwrap();
///
/// map.put(b"key1", b"val1");
/// assert_eq!(map.get(b"key1"), Some(b"val1".to_vec()));
/// ```
pub struct SharedMap {
    inner: RwLock<Map>,
}

impl SharedMap {
    /// Create an empty shared map.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: RwLock::new(Map::new(config)?),
        })
    }

    /// Insert or overwrite `key`.
    pub fn put(&self, key: &[u8], value: &[u8]) {
        self.inner.write().put(key, value);
    }

    /// Insert or overwrite `key`; pool exhaustion is an error rather than
    /// fatal.
    pub fn try_put(&self, key: &[u8], value: &[u8]) -> Result<(), LimitExceeded> {
        self.inner.write().try_put(key, value)
    }

    /// Value stored under `key`, if present.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.inner.read().get(key).map(<[u8]>::to_vec)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.inner.read().contains(key)
    }

    /// Remove `key`, returning its value.
    pub fn remove(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.inner.write().remove(key)
    }

    /// Number of live entries.
    pub fn len(&self) -> u64 {
        self.inner.read().len()
    }

    /// Whether the map holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries in ascending key order, materialized under the read
    /// lock.
    pub fn entries(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.inner
            .read()
            .entries()
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect()
    }

    /// Storage footprint counters.
    pub fn memory_stats(&self) -> MemoryStats {
        self.inner.read().memory_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn config() -> Config {
        Config {
            pointer_size: 4,
            aridity: 16,
            root_aridity: 16,
            key_size: 4,
            value_size: 4,
        }
    }

    #[test]
    fn test_shared_map_basics() {
        let map = SharedMap::new(config()).unwrap();
        map.put(b"key1", b"val1");
        map.put(b"key2", b"val2");
        assert_eq!(map.get(b"key1"), Some(b"val1".to_vec()));
        assert!(map.contains(b"key2"));
        assert_eq!(map.len(), 2);
        assert_eq!(map.remove(b"key1"), Some(b"val1".to_vec()));
        assert_eq!(map.len(), 1);
        assert_eq!(map.entries(), vec![(b"key2".to_vec(), b"val2".to_vec())]);
    }

    #[test]
    fn test_shared_map_across_threads() {
        let map = Arc::new(SharedMap::new(config()).unwrap());
        let handles: Vec<_> = (0u32..4)
            .map(|t| {
                let map = Arc::clone(&map);
                thread::spawn(move || {
                    for i in 0u32..256 {
                        let key = (t * 1000 + i).to_be_bytes();
                        map.put(&key, &i.to_be_bytes());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(map.len(), 4 * 256);
        assert_eq!(
            map.get(&2042u32.to_be_bytes()),
            Some(42u32.to_be_bytes().to_vec())
        );
    }
}

#[cfg(test)]
mod proptests;
