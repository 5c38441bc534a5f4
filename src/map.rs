//! Deletion-capable store: removed entries free their slots for reuse
//! through intrusive free lists.

use crate::config::{Config, ConfigError};
use crate::engine::{Engine, Entries, LimitExceeded, MemoryStats, Parts};
use crate::region::Region;

/// A key-value store over two byte regions, with deletion.
///
/// Removing a key frees its leaf and every internal node left covering a
/// single leaf; freed slots are threaded into LIFO free lists inside the
/// regions themselves and handed back out by later insertions, so heap
/// metadata stays O(1). The regions never shrink.
///
/// Keys and values are byte strings of the fixed per-store lengths from
/// [`Config`]; passing a slice of any other length panics. A map
/// additionally requires `key_size + value_size >= pointer_size` so a
/// freed record can hold its free-list link.
///
/// # Example
///
/// ```rust
/// use triekv::{Config, Map};
///
/// let mut m = Map::new(Config {
///     pointer_size: 4,
///     aridity: 16,
///     root_aridity: 16,
///     key_size: 4,
///     value_size: 4,
/// })
/// .unwrap();
///
/// m.put(b"key1", b"val1");
/// assert_eq!(m.get(b"key1"), Some(&b"val1"[..]));
/// assert_eq!(m.remove(b"key1"), Some(b"val1".to_vec()));
/// assert_eq!(m.get(b"key1"), None);
/// ```
pub struct Map {
    engine: Engine,
}

/// The resumable state of a [`Map`]: the two regions, the slot counters
/// and both free-list heads.
pub struct MapData {
    /// Region holding the root and internal nodes.
    pub nodes: Region,
    /// Region holding the packed leaf records.
    pub leaves: Region,
    /// Allocated node slots, root included.
    pub node_count: u64,
    /// Allocated leaf slots, free-listed ones included.
    pub leaf_count: u64,
    /// Head of the node free list, or the all-ones pointer mask when
    /// empty.
    pub last_empty_node: u64,
    /// Head of the leaf free list, or the all-ones pointer mask when
    /// empty.
    pub last_empty_leaf: u64,
}

impl Map {
    /// Create an empty map. No region memory is claimed until the first
    /// operation touches the map.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: Engine::new(config.validate(true)?),
        })
    }

    fn check_key(&self, key: &[u8]) {
        assert_eq!(
            key.len(),
            self.engine.params().key_size,
            "key length does not match the configured key size"
        );
    }

    fn check_value(&self, value: &[u8]) {
        assert_eq!(
            value.len(),
            self.engine.params().value_size,
            "value length does not match the configured value size"
        );
    }

    /// Insert or overwrite `key`.
    pub fn try_put(&mut self, key: &[u8], value: &[u8]) -> Result<(), LimitExceeded> {
        self.check_key(key);
        self.check_value(value);
        let (_, index) = self.engine.put_key(key)?;
        self.engine.write_value(index, value);
        Ok(())
    }

    /// [`try_put`](Map::try_put), but pool exhaustion is fatal.
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        if let Err(err) = self.try_put(key, value) {
            panic!("{err}");
        }
    }

    /// Insert or overwrite `key`, returning the previous value.
    pub fn try_replace(
        &mut self,
        key: &[u8],
        value: &[u8],
    ) -> Result<Option<Vec<u8>>, LimitExceeded> {
        self.check_key(key);
        self.check_value(value);
        let (added, index) = self.engine.put_key(key)?;
        let old = if added {
            None
        } else {
            self.engine.entry(index).map(|(_, v)| v.to_vec())
        };
        self.engine.write_value(index, value);
        Ok(old)
    }

    /// [`try_replace`](Map::try_replace), but pool exhaustion is fatal.
    pub fn replace(&mut self, key: &[u8], value: &[u8]) -> Option<Vec<u8>> {
        match self.try_replace(key, value) {
            Ok(old) => old,
            Err(err) => panic!("{err}"),
        }
    }

    /// Return the value of `key`, inserting `value` first if the key is
    /// absent. An existing value is returned as-is, not overwritten.
    pub fn try_get_or_put(
        &mut self,
        key: &[u8],
        value: &[u8],
    ) -> Result<Option<Vec<u8>>, LimitExceeded> {
        self.check_key(key);
        self.check_value(value);
        let (added, index) = self.engine.put_key(key)?;
        if added {
            self.engine.write_value(index, value);
            Ok(None)
        } else {
            Ok(self.engine.entry(index).map(|(_, v)| v.to_vec()))
        }
    }

    /// [`try_get_or_put`](Map::try_get_or_put), but pool exhaustion is
    /// fatal.
    pub fn get_or_put(&mut self, key: &[u8], value: &[u8]) -> Option<Vec<u8>> {
        match self.try_get_or_put(key, value) {
            Ok(old) => old,
            Err(err) => panic!("{err}"),
        }
    }

    /// Value stored under `key`, if present.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.lookup(key).map(|(value, _)| value)
    }

    /// Value and leaf index of `key`, if present. The index is only
    /// stable until the entry is removed.
    pub fn lookup(&self, key: &[u8]) -> Option<(&[u8], u64)> {
        self.check_key(key);
        let index = self.engine.lookup(key)?;
        let (_, value) = self.engine.entry(index)?;
        Some((value, index))
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.check_key(key);
        self.engine.lookup(key).is_some()
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        self.check_key(key);
        self.engine.remove(key)
    }

    /// Remove `key`, discarding its value.
    pub fn delete(&mut self, key: &[u8]) {
        self.check_key(key);
        self.engine.remove(key);
    }

    /// Entries in ascending key order.
    pub fn entries(&self) -> Entries<'_> {
        self.engine.entries(false)
    }

    /// Entries in descending key order.
    pub fn entries_rev(&self) -> Entries<'_> {
        self.engine.entries(true)
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.engine.entries(false).map(|(k, _)| k)
    }

    /// Keys in descending order.
    pub fn keys_rev(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.engine.entries(true).map(|(k, _)| k)
    }

    /// Values in ascending key order.
    pub fn vals(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.engine.entries(false).map(|(_, v)| v)
    }

    /// Values in descending key order.
    pub fn vals_rev(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.engine.entries(true).map(|(_, v)| v)
    }

    /// Number of live entries.
    pub fn len(&self) -> u64 {
        self.engine.len()
    }

    /// Whether the map holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocated leaf slots, free-listed ones included.
    pub fn leaf_count(&self) -> u64 {
        self.engine.leaf_count()
    }

    /// Allocated node slots, the root included.
    pub fn node_count(&self) -> u64 {
        self.engine.node_count()
    }

    /// Storage footprint counters.
    pub fn memory_stats(&self) -> MemoryStats {
        self.engine.memory_stats()
    }

    /// Surrender the map's regions and header for persistence,
    /// initializing first so the result always describes a region pair.
    pub fn share(self) -> MapData {
        let parts = self.engine.into_parts();
        MapData {
            nodes: parts.nodes,
            leaves: parts.leaves,
            node_count: parts.node_count,
            leaf_count: parts.leaf_count,
            last_empty_node: parts.empty_node,
            last_empty_leaf: parts.empty_leaf,
        }
    }

    /// Resume over a previously [`share`](Map::share)d region pair. Must
    /// be the first operation on the map; panics otherwise.
    pub fn unshare(&mut self, data: MapData) {
        self.engine.restore(Parts {
            nodes: data.nodes,
            leaves: data.leaves,
            node_count: data.node_count,
            leaf_count: data.leaf_count,
            empty_node: data.last_empty_node,
            empty_leaf: data.last_empty_leaf,
        });
    }
}
