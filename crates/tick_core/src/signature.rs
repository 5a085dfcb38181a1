//! Fixed-capacity bit signatures.
//!
//! A [`Signature`] records which component types an entity holds, and
//! which component types a system requires. An entity belongs to a system
//! exactly when its signature [is a superset of](BitSet::is_superset_of)
//! the system's.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Maximum number of distinct component types.
pub const MAX_COMPONENTS: usize = 32;

/// Component signature used by entities and systems.
pub type Signature = BitSet<MAX_COMPONENTS>;

/// A bit vector holding `N` bits (`N <= 64`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BitSet<const N: usize> {
    bits: u64,
}

impl<const N: usize> BitSet<N> {
    /// Mask with every valid bit set.
    const MASK: u64 = if N >= 64 { u64::MAX } else { (1u64 << N) - 1 };

    /// Empty bit set.
    #[must_use]
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Build from a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfRange`] if `bits` has a bit at or above `N`.
    pub fn from_bits(bits: u64) -> Result<Self> {
        if bits & !Self::MASK != 0 {
            return Err(GameError::OutOfRange {
                what: "bit set value",
                index: bits,
                limit: Self::MASK,
            });
        }
        Ok(Self { bits })
    }

    /// Raw value.
    #[must_use]
    pub const fn bits(&self) -> u64 {
        self.bits
    }

    /// Number of bits this set can hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    fn bit(index: usize) -> Result<u64> {
        if index >= N {
            return Err(GameError::OutOfRange {
                what: "bit index",
                index: index as u64,
                limit: N as u64,
            });
        }
        Ok(1u64 << index)
    }

    /// Whether the bit at `index` is set. Out-of-range indices read as unset.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        index < N && self.bits & (1u64 << index) != 0
    }

    /// Set one bit.
    pub fn set(&mut self, index: usize) -> Result<()> {
        self.bits |= Self::bit(index)?;
        Ok(())
    }

    /// Clear one bit.
    pub fn reset(&mut self, index: usize) -> Result<()> {
        self.bits &= !Self::bit(index)?;
        Ok(())
    }

    /// Toggle one bit.
    pub fn flip(&mut self, index: usize) -> Result<()> {
        self.bits ^= Self::bit(index)?;
        Ok(())
    }

    /// Set every bit.
    pub fn set_all(&mut self) {
        self.bits = Self::MASK;
    }

    /// Clear every bit.
    pub fn reset_all(&mut self) {
        self.bits = 0;
    }

    /// Toggle every bit.
    pub fn flip_all(&mut self) {
        self.bits = !self.bits & Self::MASK;
    }

    /// Number of set bits.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.bits.count_ones()
    }

    /// Every bit is set.
    #[must_use]
    pub const fn all(&self) -> bool {
        self.bits == Self::MASK
    }

    /// At least one bit is set.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.bits != 0
    }

    /// No bit is set.
    #[must_use]
    pub const fn none(&self) -> bool {
        self.bits == 0
    }

    /// Bitwise AND.
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        Self {
            bits: self.bits & other.bits,
        }
    }

    /// Bitwise OR.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Bitwise XOR.
    #[must_use]
    pub const fn xor(self, other: Self) -> Self {
        Self {
            bits: self.bits ^ other.bits,
        }
    }

    /// Bitwise NOT, limited to the set's capacity.
    #[must_use]
    pub const fn not(self) -> Self {
        Self {
            bits: !self.bits & Self::MASK,
        }
    }

    /// `self` has every bit that `required` has.
    #[must_use]
    pub fn is_superset_of(&self, required: &Self) -> bool {
        self.and(*required) == *required
    }

    /// Indices of the set bits, ascending.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..N).filter(move |&index| self.contains(index))
    }
}

impl<const N: usize> BitAnd for BitSet<N> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl<const N: usize> BitOr for BitSet<N> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl<const N: usize> BitXor for BitSet<N> {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        self.xor(rhs)
    }
}

impl<const N: usize> Not for BitSet<N> {
    type Output = Self;

    fn not(self) -> Self::Output {
        BitSet::not(self)
    }
}

impl<const N: usize> fmt::Display for BitSet<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.bits, width = N)
    }
}
