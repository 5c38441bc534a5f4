//! Insertion-ordered store: every distinct key gets the next dense index
//! and is never removed.

use crate::config::{Config, ConfigError};
use crate::engine::{Engine, Entries, LimitExceeded, MemoryStats, Parts};
use crate::region::Region;

/// An insertion-ordered key-value store over two byte regions.
///
/// Every distinct key is assigned the next free index, starting at zero;
/// re-adding a key keeps its index and overwrites the value. Entries are
/// never removed, so indices stay dense and double as stable handles for
/// O(1) access through [`Enumeration::get`].
///
/// Keys and values are byte strings of the fixed per-store lengths from
/// [`Config`]; passing a slice of any other length panics.
///
/// # Example
///
/// ```rust
/// use triekv::{Config, Enumeration};
///
/// let mut e = Enumeration::new(Config {
///     pointer_size: 2,
///     aridity: 2,
///     root_aridity: 2,
///     key_size: 2,
///     value_size: 1,
/// })
/// .unwrap();
///
/// assert_eq!(e.add(b"ab", b"X"), 0);
/// assert_eq!(e.add(b"cd", b"Y"), 1);
/// assert_eq!(e.add(b"ab", b"Z"), 0); // same index, new value
///
/// assert_eq!(e.lookup(b"ab"), Some((&b"Z"[..], 0)));
/// assert_eq!(e.get(1), Some((&b"cd"[..], &b"Y"[..])));
/// ```
pub struct Enumeration {
    engine: Engine,
}

/// The resumable state of an [`Enumeration`]: the two regions plus the
/// O(1) header counters. How this reaches stable storage is up to the
/// host; [`Region::into_bytes`] and [`Region::from_bytes`] bridge to raw
/// bytes.
pub struct EnumerationData {
    /// Region holding the root and internal nodes.
    pub nodes: Region,
    /// Region holding the packed leaf records.
    pub leaves: Region,
    /// Allocated node slots, root included.
    pub node_count: u64,
    /// Allocated leaf slots.
    pub leaf_count: u64,
}

impl Enumeration {
    /// Create an empty store. No region memory is claimed until the first
    /// operation touches the store.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: Engine::new(config.validate(false)?),
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

    /// Insert `key` or overwrite its value, returning its index.
    ///
    /// A fresh key gets index `leaf_count − 1` at the time of insertion;
    /// indices grow strictly by one because nothing is ever freed.
    pub fn try_add(&mut self, key: &[u8], value: &[u8]) -> Result<u64, LimitExceeded> {
        self.check_key(key);
        self.check_value(value);
        let (_, index) = self.engine.put_key(key)?;
        self.engine.write_value(index, value);
        Ok(index)
    }

    /// [`try_add`](Enumeration::try_add), but pool exhaustion is fatal.
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> u64 {
        match self.try_add(key, value) {
            Ok(index) => index,
            Err(err) => panic!("{err}"),
        }
    }

    /// Value and index of `key`, if present.
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

    /// Key and value stored under `index`, or `None` past the end.
    pub fn get(&self, index: u64) -> Option<(&[u8], &[u8])> {
        self.engine.entry(index)
    }

    /// Entries `left..right` in insertion order. Panics when the bounds
    /// are inverted or reach past the last entry.
    pub fn slice(&self, left: u64, right: u64) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
        assert!(
            left <= right && right <= self.engine.leaf_count(),
            "slice bounds out of range"
        );
        (left..right).map(move |i| self.engine.entry(i).expect("index below the leaf count"))
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

    /// Number of entries.
    pub fn len(&self) -> u64 {
        self.engine.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocated leaf slots; equals [`len`](Enumeration::len) here
    /// because enumerations never free slots.
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

    /// Surrender the store's regions and header for persistence,
    /// initializing first so the result always describes a region pair.
    pub fn share(self) -> EnumerationData {
        let parts = self.engine.into_parts();
        EnumerationData {
            nodes: parts.nodes,
            leaves: parts.leaves,
            node_count: parts.node_count,
            leaf_count: parts.leaf_count,
        }
    }

    /// Resume over a previously [`share`](Enumeration::share)d region
    /// pair. Must be the first operation on the store; panics otherwise.
    pub fn unshare(&mut self, data: EnumerationData) {
        let sentinel = self.engine.params().load_mask;
        self.engine.restore(Parts {
            nodes: data.nodes,
            leaves: data.leaves,
            node_count: data.node_count,
            leaf_count: data.leaf_count,
            empty_node: sentinel,
            empty_leaf: sentinel,
        });
    }
}
