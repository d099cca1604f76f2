//! Generic register abstractions for type-safe MSR programming

/// Trait for register layouts that can be converted to/from raw MSR values
///
/// Implemented by [`crate::pstate::PstateDef`]. Decoding a raw value is
/// always total; `to_msr_value` packs only the known fields, so reserved
/// bits come out as zero and live registers are mutated field-by-field via
/// [`BitField::set`] instead of a full re-encode.
///
/// # Example
///
/// ```ignore
/// use zentune_raw::pstate::PstateDef;
/// use zentune_raw::RegisterLayout;
///
/// let def = PstateDef::from_msr_value(0x8000_0000_0000_1234);
/// assert_eq!(def.fid, 0x34);
/// ```
pub trait RegisterLayout: Sized {
    /// Convert this register layout to a raw MSR value
    fn to_msr_value(&self) -> u64;

    /// Parse a raw MSR value into this register layout
    fn from_msr_value(value: u64) -> Self;

    /// Validate that the register values are within acceptable ranges
    ///
    /// Returns `Ok(())` if valid, or an error message if invalid.
    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

/// A named, contiguous bit range within a 64-bit register
///
/// Field definitions live in one static table per register (see
/// [`crate::pstate::fields`]) and all masking goes through the generic
/// [`get`](BitField::get)/[`set`](BitField::set) pair below, so no call
/// site carries its own shift-and-mask arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Field name, as printed in register dumps
    pub name: &'static str,
    /// Bit offset of the least significant bit
    pub offset: u32,
    /// Field width in bits (1-63)
    pub width: u32,
}

impl BitField {
    pub const fn new(name: &'static str, offset: u32, width: u32) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    /// Mask covering exactly `[offset, offset + width)`
    pub const fn mask(&self) -> u64 {
        ((1u64 << self.width) - 1) << self.offset
    }

    /// Extract this field from a raw register value
    pub const fn get(&self, raw: u64) -> u64 {
        (raw >> self.offset) & ((1u64 << self.width) - 1)
    }

    /// Replace this field in `raw` with `new`, leaving every bit outside
    /// `[offset, offset + width)` untouched.
    ///
    /// A `new` wider than the field is silently truncated to its low
    /// `width` bits by the masking arithmetic.
    pub const fn set(&self, raw: u64, new: u64) -> u64 {
        (raw & !self.mask()) | ((new << self.offset) & self.mask())
    }
}
