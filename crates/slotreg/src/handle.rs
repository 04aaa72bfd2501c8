//! # Handle — Packed Generational Identifiers
//!
//! A [`Handle`] names one slot of a [`Registry`](crate::registry::Registry)
//! *and* one lifetime of that slot. It is a plain `u64` with no ownership
//! attached: copy it, store it in a component, compare it, hash it.
//!
//! ## Bit Layout
//!
//! ```text
//!  63      56 55      48 47                                         0
//! ┌──────────┬──────────┬────────────────────────────────────────────┐
//! │generation│  flags   │                  index                     │
//! │  8 bits  │  8 bits  │                 48 bits                    │
//! └──────────┴──────────┴────────────────────────────────────────────┘
//! ```
//!
//! The generation is bumped every time a slot is handed out again, so a
//! handle kept around after its object was freed stops resolving:
//!
//! ```text
//! Handle(3v1)        ← original
//! Handle(3v1 dead)   ← what the slot stores after free
//! Handle(3v2)        ← the slot's next occupant
//! ```
//!
//! ## The Zero Handle
//!
//! The all-zero value is reserved to mean "no object". The registry bumps the
//! generation *before* storing it, so slot 0's first handle is `0v1` with the
//! alive flag set and is never zero.
//!
//! ## Comparison
//!
//! - **hecs**: `Entity` is a `u32` index plus a `NonZeroU32` generation.
//! - **slotmap**: `KeyData` packs a `u32` index and `u32` version.
//!
//! Here the generation is only 8 bits, leaving room for flags and a 48-bit
//! index in one word. A wrapped generation can in principle let a very old
//! handle resolve again; the free-list reuse threshold makes that unlikely.

use std::fmt;

use bitflags::bitflags;

/// Bit offset of the generation byte.
pub const GENERATION_SHIFT: u32 = 64 - 8;
/// Bit offset of the flags byte.
pub const FLAGS_SHIFT: u32 = 64 - 16;
/// Mask selecting the 48 index bits.
pub const INDEX_MASK: u64 = 0x0000_FFFF_FFFF_FFFF;
/// Largest slot index a handle can address.
pub const MAX_INDEX: u64 = INDEX_MASK;

bitflags! {
    /// Per-slot state bits carried in a handle's flag byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HandleFlags: u8 {
        /// The slot currently holds a live object.
        const ALIVE = 1 << 0;
    }
}

/// An opaque reference to an object stored in a
/// [`Registry`](crate::registry::Registry).
///
/// Handles are only meaningful for the registry that produced them. Resolve
/// them with [`Registry::get`](crate::registry::Registry::get) every time the
/// object is needed; a `None` there is the normal "object is gone" answer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// The reserved "no object" handle.
    pub const ZERO: Self = Self(0);

    /// Pack a generation, flag set and slot index into a handle.
    ///
    /// `index` must fit in 48 bits. Only the registry builds handles this way,
    /// and it never exceeds [`MAX_INDEX`].
    pub fn new(generation: u8, flags: HandleFlags, index: u64) -> Self {
        debug_assert!(index <= MAX_INDEX, "handle index {index} does not fit in 48 bits");
        Self(
            (index & INDEX_MASK)
                | (u64::from(generation) << GENERATION_SHIFT)
                | (u64::from(flags.bits()) << FLAGS_SHIFT),
        )
    }

    /// Reinterpret a raw `u64` as a handle.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw packed value.
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    pub fn generation(self) -> u8 {
        (self.0 >> GENERATION_SHIFT) as u8
    }

    pub fn flags(self) -> HandleFlags {
        HandleFlags::from_bits_retain((self.0 >> FLAGS_SHIFT) as u8)
    }

    pub fn index(self) -> u64 {
        self.0 & INDEX_MASK
    }

    /// True if any bit of `flag` is set on this handle.
    pub fn has_flag(self, flag: HandleFlags) -> bool {
        self.flags().intersects(flag)
    }

    /// True for the reserved "no object" handle.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Slot index as a `usize`, for indexing the registry's arrays.
    pub(crate) fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "Handle(none)");
        }
        write!(f, "Handle({}v{}", self.index(), self.generation())?;
        if !self.has_flag(HandleFlags::ALIVE) {
            write!(f, " dead")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}
