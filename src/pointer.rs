//! Tagged pointers and the fixed-width pointer codec.
//!
//! A stored pointer is a little-endian unsigned integer of the configured
//! width (2, 4, 5, 6 or 8 bytes). The value `0` is the null child.
//! Otherwise the low bit selects the pool — `1` for leaves, `0` for
//! internal nodes — and the remaining bits are the index into that pool.
//!
//! Loads always read a full 8-byte window and mask down to the configured
//! width; the engine reserves tail padding in each region so the window of
//! the last pointer stays in bounds.

use crate::region::Region;

/// A decoded pointer: pool tag in the low bit, pool index above it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct Ptr(u64);

impl Ptr {
    /// The null child pointer.
    pub const NULL: Ptr = Ptr(0);

    /// The root node. The root is never referenced from a child slot, so
    /// it shares the `0` encoding with [`Ptr::NULL`]; which meaning
    /// applies is decided by position (descent cursor vs. slot content).
    pub const ROOT: Ptr = Ptr(0);

    /// Reference to the internal node at `index`. Index 0 is reserved for
    /// the root and never produced by allocation.
    #[inline]
    pub fn node(index: u64) -> Self {
        Ptr(index << 1)
    }

    /// Reference to the leaf at `index`. Leaf index 0 is a valid slot.
    #[inline]
    pub fn leaf(index: u64) -> Self {
        Ptr((index << 1) | 1)
    }

    /// Whether the pointer is the null child.
    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Whether the pointer references a leaf.
    #[inline]
    pub fn is_leaf(self) -> bool {
        self.0 & 1 == 1
    }

    /// Index into the pool selected by the tag bit.
    #[inline]
    pub fn index(self) -> u64 {
        self.0 >> 1
    }

    /// The packed integer as it is stored in a region.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Load a pointer of the width described by `load_mask`.
#[inline]
pub(crate) fn load(region: &Region, offset: u64, load_mask: u64) -> Ptr {
    Ptr(load_raw(region, offset, load_mask))
}

/// Load the raw masked integer at `offset`. Also used for free-list links,
/// which hold pool indices rather than tagged pointers.
#[inline]
pub(crate) fn load_raw(region: &Region, offset: u64, load_mask: u64) -> u64 {
    region.load_u64(offset) & load_mask
}

/// Store a pointer in `size` little-endian bytes.
#[inline]
pub(crate) fn store(region: &mut Region, offset: u64, size: u64, ptr: Ptr) {
    store_raw(region, offset, size, ptr.raw());
}

/// Store a raw integer in `size` little-endian bytes. One specialized
/// encoder per supported width; the odd widths compose narrower stores.
#[inline]
pub(crate) fn store_raw(region: &mut Region, offset: u64, size: u64, value: u64) {
    match size {
        2 => region.store_u16(offset, value as u16),
        4 => region.store_u32(offset, value as u32),
        5 => {
            region.store_u32(offset, value as u32);
            region.store_u8(offset + 4, (value >> 32) as u8);
        }
        6 => {
            region.store_u32(offset, value as u32);
            region.store_u16(offset + 4, (value >> 32) as u16);
        }
        8 => region.store_u64(offset, value),
        _ => panic!("unsupported pointer width {size}"),
    }
}
