//! Category bitmask attached to every discovered test case.
//!
//! The low five bits are reserved for test tiers. Bit 5 is the "none-tier" marker. Feature
//! categories occupy the bits from 8 upward and carry no special meaning to the engine.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A set of tier and category flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CategoryMask(pub u64);

impl CategoryMask {
    pub const EMPTY: CategoryMask = CategoryMask(0);

    pub const TIER0: CategoryMask = CategoryMask(1 << 0);
    pub const TIER1: CategoryMask = CategoryMask(1 << 1);
    pub const TIER2: CategoryMask = CategoryMask(1 << 2);
    pub const TIER3: CategoryMask = CategoryMask(1 << 3);
    pub const TIER4: CategoryMask = CategoryMask(1 << 4);

    /// Marker for the untiered reporting bucket.
    pub const TIER_NONE: CategoryMask = CategoryMask(1 << 5);

    /// Union of the five reserved tier bits.
    pub const TIERS: CategoryMask = CategoryMask(0b1_1111);

    /// First bit available for feature categories.
    pub const FIRST_FEATURE_BIT: u32 = 8;

    /// Build a feature category flag from its ordinal (0 → bit 8, 1 → bit 9, ...).
    ///
    /// Returns `None` when the ordinal does not fit in the mask.
    pub const fn feature(ordinal: u32) -> Option<CategoryMask> {
        let bit = Self::FIRST_FEATURE_BIT + ordinal;
        if bit >= u64::BITS {
            None
        } else {
            Some(CategoryMask(1 << bit))
        }
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: CategoryMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: CategoryMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether any of the reserved tier bits is set.
    pub const fn has_tier(self) -> bool {
        self.intersects(Self::TIERS)
    }

    /// Apply the tier post-processing rule.
    ///
    /// A mask that carries any tier bit also gets [`CategoryMask::TIER_NONE`]. Masks without tier
    /// bits are returned untouched. Reporting relies on tier-tagged tests also appearing in the
    /// untiered bucket, so this must stay exactly as is.
    pub const fn with_tier_marker(self) -> CategoryMask {
        if self.has_tier() {
            CategoryMask(self.0 | Self::TIER_NONE.0)
        } else {
            self
        }
    }
}

impl BitOr for CategoryMask {
    type Output = CategoryMask;

    fn bitor(self, rhs: CategoryMask) -> CategoryMask {
        CategoryMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for CategoryMask {
    fn bitor_assign(&mut self, rhs: CategoryMask) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for CategoryMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
