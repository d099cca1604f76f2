//! P-state register definitions for AMD Ryzen (Zen family) processors
//!
//! Each of the eight architectural P-states is described by one definition
//! register encoding a frequency identifier (FID), a divisor identifier
//! (DID), a voltage identifier (VID) and an enable bit. Core frequency and
//! voltage are derived, not stored:
//!
//! - ratio = 25 * FID / (12.5 * DID)
//! - vCore = 1.55 - 0.00625 * VID
//!
//! ## References
//!
//! - AMD Processor Programming Reference (PPR) for Family 17h,
//!   MSRC001_0064...MSRC001_006B \[P-state \[7:0\]\]

use crate::register::{BitField, RegisterLayout};

/// MSR addresses for P-state control
pub mod msr {
    /// P-state definition register for P0; P1-P7 follow contiguously
    pub const MSR_PSTATE_DEF_BASE: u64 = 0xC001_0064;

    /// Number of architecturally defined P-state registers
    pub const PSTATE_COUNT: usize = 8;

    /// Address of the P-state definition register for `index` (0-7)
    ///
    /// Out-of-range indices address unrelated MSRs; callers validate the
    /// index before touching the device.
    pub const fn pstate_def(index: usize) -> u64 {
        MSR_PSTATE_DEF_BASE + index as u64
    }
}

/// Bit fields of a P-state definition register
///
/// ## Register Format
///
/// | Bits   | Field    | Description                 |
/// |--------|----------|-----------------------------|
/// | 0-7    | CpuFid   | Frequency identifier        |
/// | 8-13   | CpuDid   | Divisor identifier          |
/// | 14-21  | CpuVid   | Voltage identifier (SVI2)   |
/// | 22-62  | reserved |                             |
/// | 63     | PstateEn | P-state is defined/enabled  |
pub mod fields {
    use crate::register::BitField;

    pub const FID: BitField = BitField::new("FID", 0, 8);
    pub const DID: BitField = BitField::new("DID", 8, 6);
    // SVI2 voltage IDs are 8 bits wide, bits 14-21. Some tools read this
    // field through a 6-bit mask; the width here is the authoritative one
    // for both directions.
    pub const VID: BitField = BitField::new("VID", 14, 8);
    pub const ENABLE: BitField = BitField::new("Enable", 63, 1);

    /// All fields of the register, in ascending bit order
    pub const ALL: [BitField; 4] = [FID, DID, VID, ENABLE];
}

/// P-state definition register layout
///
/// Note that `to_msr_value` only packs the known fields; reserved bits come
/// out as zero. Mutating a live register therefore goes through
/// [`BitField::set`] on the raw value read from hardware, never through a
/// full re-encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PstateDef {
    /// PstateEn (bit 63)
    pub enabled: bool,

    /// Frequency identifier
    pub fid: u8,

    /// Divisor identifier (6 bits)
    pub did: u8,

    /// Voltage identifier (SVI2 encoding)
    pub vid: u8,
}

impl RegisterLayout for PstateDef {
    fn to_msr_value(&self) -> u64 {
        let mut value = 0;
        value = fields::FID.set(value, self.fid as u64);
        value = fields::DID.set(value, self.did as u64);
        value = fields::VID.set(value, self.vid as u64);
        value = fields::ENABLE.set(value, self.enabled as u64);
        value
    }

    fn from_msr_value(value: u64) -> Self {
        Self {
            enabled: fields::ENABLE.get(value) != 0,
            fid: fields::FID.get(value) as u8,
            did: fields::DID.get(value) as u8,
            vid: fields::VID.get(value) as u8,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.did > 63 {
            return Err("DID must be <= 63 (6 bits)");
        }
        Ok(())
    }
}

impl PstateDef {
    /// Core frequency multiplier, `25 * FID / (12.5 * DID)`
    ///
    /// Returns `f64::INFINITY` when DID is zero; hardware does not program
    /// a zero divisor on an enabled state, and the decode stays total.
    pub fn ratio(&self) -> f64 {
        25.0 * self.fid as f64 / (12.5 * self.did as f64)
    }

    /// Core voltage in volts, `1.55 - 0.00625 * VID`
    pub fn vcore(&self) -> f64 {
        1.55 - 0.00625 * self.vid as f64
    }
}

/// Decoded view of a P-state definition register
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pstate {
    /// PstateEn is clear; the remaining bits are not interpreted
    Disabled,
    /// PstateEn is set; FID/DID/VID extracted per the field table
    Enabled(PstateDef),
}

impl Pstate {
    /// Decode a raw P-state definition register value
    pub fn decode(raw: u64) -> Self {
        if fields::ENABLE.get(raw) == 0 {
            Pstate::Disabled
        } else {
            Pstate::Enabled(PstateDef::from_msr_value(raw))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_disabled_ignores_other_bits() {
        // Bit 63 clear is Disabled no matter what the rest says
        for raw in [0u64, 0x1234, 0x7FFF_FFFF_FFFF_FFFF, 0x3F_C000] {
            assert_eq!(Pstate::decode(raw), Pstate::Disabled);
        }
    }

    #[test]
    fn test_decode_known_value() {
        let pstate = Pstate::decode(0x8000_0000_0000_1234);
        let def = match pstate {
            Pstate::Enabled(def) => def,
            Pstate::Disabled => panic!("bit 63 is set, state must be enabled"),
        };
        assert_eq!(def.fid, 0x34);
        assert_eq!(def.did, 0x12);
        assert_eq!(def.vid, 0x00);
    }

    #[test]
    fn test_ratio_formula() {
        let def = PstateDef {
            enabled: true,
            fid: 0x34, // 52
            did: 0x08,
            vid: 0,
        };
        assert!((def.ratio() - 13.0).abs() < 1e-9);

        let def = PstateDef { did: 0x12, ..def }; // 1300 / 225
        assert!((def.ratio() - 5.77778).abs() < 1e-5);
    }

    #[test]
    fn test_ratio_with_zero_did_is_infinite() {
        let def = PstateDef {
            enabled: true,
            fid: 0x34,
            did: 0,
            vid: 0,
        };
        assert!(def.ratio().is_infinite());
    }

    #[test]
    fn test_vcore_formula() {
        let def = PstateDef {
            enabled: true,
            fid: 0,
            did: 0,
            vid: 0x40, // 64
        };
        assert!((def.vcore() - 1.15).abs() < 1e-9);

        let def = PstateDef { vid: 0, ..def };
        assert!((def.vcore() - 1.55).abs() < 1e-9);
    }

    #[test]
    fn test_pstate_def_round_trip() {
        let def = PstateDef {
            enabled: true,
            fid: 0x88,
            did: 0x0C,
            vid: 0x2E,
        };

        let value = def.to_msr_value();
        let decoded = PstateDef::from_msr_value(value);

        assert_eq!(decoded, def);
    }

    #[test]
    fn test_field_round_trip_preserves_raw_value() {
        // Re-encoding each field with its own extracted value must
        // reproduce the original register exactly, reserved bits included.
        let raw = 0x8000_0110_4A0C_1288u64;
        let mut value = raw;
        for field in fields::ALL {
            value = field.set(value, field.get(value));
        }
        assert_eq!(value, raw);
    }

    #[test]
    fn test_validation() {
        let mut def = PstateDef::default();
        assert!(def.validate().is_ok());

        def.did = 64; // Too large (6 bits = max 63)
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_pstate_def_addresses() {
        assert_eq!(msr::pstate_def(0), 0xC001_0064);
        assert_eq!(msr::pstate_def(7), 0xC001_006B);
    }
}
