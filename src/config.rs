//! Store configuration and derived trie geometry.
//!
//! All geometry is fixed at construction: pointer width, node fan-out,
//! root fan-out and the byte lengths of keys and values. Validation
//! happens once, producing the precomputed sizes and masks the engine
//! works with.

use thiserror::Error;

/// Largest encodable entry (key plus value), in bytes.
pub const MAX_ENTRY_SIZE: usize = 65536;

/// A configuration the store cannot be built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Pointer width outside the supported set.
    #[error("pointer size must be 2, 4, 5, 6 or 8 bytes, got {0}")]
    PointerSize(usize),
    /// Node fan-out outside the supported set.
    #[error("aridity must be 2, 4, 16 or 256, got {0}")]
    Aridity(usize),
    /// Root fan-out is not a power of two, does not cover a whole number
    /// of child steps, or is wider than the key.
    #[error("root aridity {0} is invalid for this key size and aridity")]
    RootAridity(usize),
    /// Keys must be at least one byte long.
    #[error("key size must be at least 1 byte")]
    KeySize,
    /// Key plus value exceeds the largest encodable entry.
    #[error("key size plus value size must not exceed 65536 bytes, got {0}")]
    EntrySize(usize),
    /// With slot reuse an entry must have room for a free-list link.
    #[error("key size plus value size must be at least the pointer size ({0} bytes) for slot reuse")]
    EntryTooSmall(usize),
}

/// Fixed geometry of a store.
///
/// `value_size` of zero turns the store into a set of keys. Wider
/// pointers raise the slot capacity of both pools (`2^(8·pointer_size−1)`
/// each) at the cost of fatter nodes; higher aridity shortens paths at
/// the cost of sparser nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Width in bytes of every stored pointer: 2, 4, 5, 6 or 8.
    pub pointer_size: usize,
    /// Children per non-root internal node: 2, 4, 16 or 256.
    pub aridity: usize,
    /// Children of the root node: a power of two, at least `aridity`, at
    /// most `2^(8 · key_size)`.
    pub root_aridity: usize,
    /// Byte length of every key; at least 1.
    pub key_size: usize,
    /// Byte length of every value; zero makes the store a set.
    pub value_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pointer_size: 8,
            aridity: 256,
            root_aridity: 256,
            key_size: 8,
            value_size: 8,
        }
    }
}

impl Config {
    /// Validate and derive the engine parameters. `reuse` adds the Map
    /// facade's extra requirement that a freed entry can hold a
    /// free-list link.
    pub(crate) fn validate(&self, reuse: bool) -> Result<Params, ConfigError> {
        match self.pointer_size {
            2 | 4 | 5 | 6 | 8 => {}
            other => return Err(ConfigError::PointerSize(other)),
        }
        match self.aridity {
            2 | 4 | 16 | 256 => {}
            other => return Err(ConfigError::Aridity(other)),
        }
        if self.key_size < 1 {
            return Err(ConfigError::KeySize);
        }
        let entry_size = self.key_size + self.value_size;
        if entry_size > MAX_ENTRY_SIZE {
            return Err(ConfigError::EntrySize(entry_size));
        }
        if !self.root_aridity.is_power_of_two() {
            return Err(ConfigError::RootAridity(self.root_aridity));
        }
        let bit_step = self.aridity.trailing_zeros();
        let root_bits = self.root_aridity.trailing_zeros();
        if root_bits == 0 || root_bits % bit_step != 0 || root_bits as usize > 8 * self.key_size {
            return Err(ConfigError::RootAridity(self.root_aridity));
        }
        if reuse && entry_size < self.pointer_size {
            return Err(ConfigError::EntryTooSmall(self.pointer_size));
        }

        let pointer_size = self.pointer_size as u64;
        let load_mask = if pointer_size == 8 {
            u64::MAX
        } else {
            (1u64 << (8 * pointer_size)) - 1
        };
        Ok(Params {
            pointer_size,
            aridity: self.aridity as u64,
            root_aridity: self.root_aridity as u64,
            key_size: self.key_size,
            value_size: self.value_size,
            bit_step,
            root_bits,
            node_size: self.aridity as u64 * pointer_size,
            root_size: self.root_aridity as u64 * pointer_size,
            leaf_size: entry_size as u64,
            load_mask,
            max_address: 1u64 << (8 * pointer_size - 1),
            tail_pad: 8 - pointer_size,
        })
    }
}

/// Precomputed geometry shared by every engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Params {
    pub pointer_size: u64,
    pub aridity: u64,
    pub root_aridity: u64,
    pub key_size: usize,
    pub value_size: usize,
    /// Key bits consumed per level below the root (`log2 aridity`).
    pub bit_step: u32,
    /// Key bits consumed by the root (`log2 root_aridity`).
    pub root_bits: u32,
    /// Bytes per internal node.
    pub node_size: u64,
    /// Bytes of the root node.
    pub root_size: u64,
    /// Bytes per leaf (key plus value).
    pub leaf_size: u64,
    /// Mask reducing an 8-byte load to the pointer width.
    pub load_mask: u64,
    /// Slot capacity of each pool: `2^(8·pointer_size − 1)`.
    pub max_address: u64,
    /// Bytes reserved past the last pointer so 8-byte loads stay in
    /// bounds.
    pub tail_pad: u64,
}
