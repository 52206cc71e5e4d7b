//! Slot filters: possibly co-finite sets of slot indices.
//!
//! A slot is an abstract selection axis identified by a non-negative index.
//! A filter is stored as an arbitrary-width two's-complement-style bit
//! pattern: bit *i* set means slot *i* is allowed. Little-endian `u64` limbs
//! hold the low bits and a fill bit gives the value of every bit beyond
//! them, so "everything except a finite set" fits in finite storage and the
//! whole algebra reduces to bitwise limb operations.

use serde::{Deserialize, Serialize};

/// A slot index - one abstract choice axis
pub type SlotIndex = u32;

/// A (possibly co-finite) set of slot indices
///
/// Canonical form strips trailing limbs equal to the fill pattern, so
/// structural equality is set equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotFilter {
    /// Little-endian limbs holding the low bits of the pattern
    words: Vec<u64>,
    /// Value of every bit beyond the stored limbs
    fill: bool,
}

impl SlotFilter {
    /// The universal set - every slot allowed
    pub const ALLOW_ALL: Self = Self {
        words: Vec::new(),
        fill: true,
    };

    /// The empty set - every slot blocked
    pub const BLOCK_ALL: Self = Self {
        words: Vec::new(),
        fill: false,
    };

    /// Build a white list: exactly the given slots are allowed
    ///
    /// An empty index set yields [`Self::BLOCK_ALL`].
    #[must_use]
    pub fn white_list<I>(indices: I) -> Self
    where
        I: IntoIterator<Item = SlotIndex>,
    {
        let mut words = Vec::new();
        for index in indices {
            let limb = (index / 64) as usize;
            if words.len() <= limb {
                words.resize(limb + 1, 0);
            }
            words[limb] |= 1 << (index % 64);
        }
        Self { words, fill: false }.canonicalized()
    }

    /// Build a black list: exactly the given slots are blocked
    ///
    /// An empty index set yields [`Self::ALLOW_ALL`].
    #[must_use]
    pub fn black_list<I>(indices: I) -> Self
    where
        I: IntoIterator<Item = SlotIndex>,
    {
        Self::white_list(indices).invert()
    }

    /// Slots allowed by either filter
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.zip_limbs(other, |a, b| a | b)
    }

    /// Slots allowed by both filters
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.zip_limbs(other, |a, b| a & b)
    }

    /// Slots allowed by this filter but not the other
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        self.zip_limbs(other, |a, b| a & !b)
    }

    /// The complement set
    #[must_use]
    pub fn invert(&self) -> Self {
        Self {
            words: self.words.iter().map(|w| !w).collect(),
            fill: !self.fill,
        }
        .canonicalized()
    }

    /// True when the filter is a finite allowed set (non-negative pattern)
    #[must_use]
    pub fn is_white_list(&self) -> bool {
        !self.fill
    }

    /// True when the filter is a finite blocked set (negative pattern)
    #[must_use]
    pub fn is_black_list(&self) -> bool {
        self.fill
    }

    /// True when every slot is allowed
    #[must_use]
    pub fn is_allow_all(&self) -> bool {
        self.words.is_empty() && self.fill
    }

    /// True when every slot is blocked
    #[must_use]
    pub fn is_block_all(&self) -> bool {
        self.words.is_empty() && !self.fill
    }

    /// True when the given slot is allowed
    #[must_use]
    pub fn allows(&self, index: SlotIndex) -> bool {
        let limb = (index / 64) as usize;
        match self.words.get(limb) {
            Some(word) => (word >> (index % 64)) & 1 == 1,
            None => self.fill,
        }
    }

    /// True when the two filters share at least one allowed slot
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        !self.intersection(other).is_block_all()
    }

    /// True when every slot allowed by `other` is also allowed here
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        self.intersection(other) == *other
    }

    /// Allowed slots within the interesting region of the pattern
    ///
    /// The interesting region covers every bit up to the point where the
    /// pattern reaches its steady state (the fill bit). For a white list
    /// this is the complete allowed set.
    #[must_use]
    pub fn allowed_slots(&self) -> Vec<SlotIndex> {
        (0..self.interesting_bits()).filter(|&i| self.allows(i)).collect()
    }

    /// Blocked slots within the interesting region of the pattern
    ///
    /// For a black list this is the complete blocked set.
    #[must_use]
    pub fn blocked_slots(&self) -> Vec<SlotIndex> {
        (0..self.interesting_bits()).filter(|&i| !self.allows(i)).collect()
    }

    /// Number of bits before the pattern settles into its fill value
    fn interesting_bits(&self) -> SlotIndex {
        match self.words.last() {
            None => 0,
            Some(&last) => {
                // Canonical form guarantees the last limb differs from fill.
                let diff = last ^ Self::fill_word(self.fill);
                (self.words.len() as u32 - 1) * 64 + (64 - diff.leading_zeros())
            }
        }
    }

    /// Limb value of the fill region
    const fn fill_word(fill: bool) -> u64 {
        if fill { u64::MAX } else { 0 }
    }

    /// Limb at position `i`, extending past the stored limbs with fill
    fn limb(&self, i: usize) -> u64 {
        self.words.get(i).copied().unwrap_or(Self::fill_word(self.fill))
    }

    /// Combine two filters limb by limb
    fn zip_limbs(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Self {
        let len = self.words.len().max(other.words.len());
        let words = (0..len).map(|i| op(self.limb(i), other.limb(i))).collect();
        let fill = op(Self::fill_word(self.fill), Self::fill_word(other.fill)) != 0;
        Self { words, fill }.canonicalized()
    }

    /// Strip trailing limbs equal to the fill pattern
    fn canonicalized(mut self) -> Self {
        let fill_word = Self::fill_word(self.fill);
        while self.words.last() == Some(&fill_word) {
            self.words.pop();
        }
        self
    }
}

impl std::fmt::Display for SlotFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_allow_all() {
            return write!(f, "any");
        }
        if self.is_block_all() {
            return write!(f, "none");
        }
        let (slots, negated) = if self.is_white_list() {
            (self.allowed_slots(), false)
        } else {
            (self.blocked_slots(), true)
        };
        if negated {
            write!(f, "~(")?;
        }
        for (i, slot) in slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{slot}")?;
        }
        if negated {
            write!(f, ")")?;
        }
        Ok(())
    }
}
