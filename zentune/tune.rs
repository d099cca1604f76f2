//! P-state read-modify-write logic
//!
//! A register update is one strictly sequential cycle: validate the index,
//! read the current raw value, fold the requested field changes into it,
//! and write the result back only if it differs. The raw value is never
//! cached across invocations.

use zentune_raw::pstate::{fields, msr, Pstate};

use crate::device::MsrDevice;
use crate::error::{Result, ZentuneError};

/// Requested changes to a single P-state register
///
/// `None` fields are left untouched in the register.
#[derive(Debug, Clone, Copy, Default)]
pub struct PstateRequest {
    pub index: usize,
    pub enable: Option<bool>,
    pub fid: Option<u8>,
    pub did: Option<u8>,
    pub vid: Option<u8>,
}

impl PstateRequest {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }
}

/// Outcome of one read-modify-write cycle
#[derive(Debug, Clone, Copy)]
pub struct PstateUpdate {
    /// Raw value read from the register
    pub old: u64,
    /// Raw value after applying the requested changes
    pub new: u64,
    /// Whether a write was issued (`new != old`)
    pub written: bool,
}

/// Fold the requested field changes into `old`, leaving all other bits
/// intact. Pure; touches no device.
pub fn plan(old: u64, request: &PstateRequest) -> u64 {
    let mut value = old;
    if let Some(enable) = request.enable {
        value = fields::ENABLE.set(value, enable as u64);
    }
    if let Some(fid) = request.fid {
        value = fields::FID.set(value, fid as u64);
    }
    if let Some(did) = request.did {
        value = fields::DID.set(value, did as u64);
    }
    if let Some(vid) = request.vid {
        value = fields::VID.set(value, vid as u64);
    }
    value
}

/// Read the target register, apply the requested changes, and write the
/// result back only if it differs from what was read.
///
/// The index is validated before the device is touched, so bad input never
/// reaches the hardware. An unchanged value issues no write at all.
pub fn apply(device: &impl MsrDevice, request: &PstateRequest) -> Result<PstateUpdate> {
    if request.index >= msr::PSTATE_COUNT {
        return Err(ZentuneError::InvalidArgument(format!(
            "P-state index {} out of range (0-{})",
            request.index,
            msr::PSTATE_COUNT - 1
        )));
    }

    let address = msr::pstate_def(request.index);
    let old = device.read(address)?;
    let new = plan(old, request);

    if new == old {
        tracing::debug!("P{} unchanged, skipping write", request.index);
        return Ok(PstateUpdate {
            old,
            new,
            written: false,
        });
    }

    device.write(address, new)?;
    tracing::info!(
        "P{}: 0x{:016x} -> 0x{:016x}",
        request.index,
        old,
        new
    );

    Ok(PstateUpdate {
        old,
        new,
        written: true,
    })
}

/// Read and decode all P-state registers, in index order
pub fn list(device: &impl MsrDevice) -> Result<Vec<Pstate>> {
    (0..msr::PSTATE_COUNT)
        .map(|index| Ok(Pstate::decode(device.read(msr::pstate_def(index))?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use zentune_raw::pstate::PstateDef;
    use zentune_raw::RegisterLayout;

    use super::*;
    use crate::device::fake::FakeMsr;

    const P0: u64 = 0xC001_0064;

    #[test]
    fn test_apply_skips_write_when_unchanged() {
        let device = FakeMsr::with_reg(P0, 0x8000_0000_0000_1234);

        // No field changes requested
        let update = apply(&device, &PstateRequest::new(0)).unwrap();
        assert!(!update.written);
        assert_eq!(update.old, update.new);

        // Fields set to the values the register already holds
        let request = PstateRequest {
            fid: Some(0x34),
            did: Some(0x12),
            enable: Some(true),
            ..PstateRequest::new(0)
        };
        let update = apply(&device, &request).unwrap();
        assert!(!update.written);
        assert!(device.writes.borrow().is_empty());
    }

    #[test]
    fn test_apply_writes_once_on_change() {
        let device = FakeMsr::with_reg(P0, 0x8000_0000_0000_1234);

        let request = PstateRequest {
            fid: Some(0x88),
            ..PstateRequest::new(0)
        };
        let update = apply(&device, &request).unwrap();

        assert!(update.written);
        assert_eq!(update.new, 0x8000_0000_0000_1288);
        assert_eq!(*device.writes.borrow(), vec![(P0, 0x8000_0000_0000_1288)]);
    }

    #[test]
    fn test_apply_disable_clears_only_bit_63() {
        let device = FakeMsr::with_reg(P0, 0x8000_0000_0000_1234);

        let request = PstateRequest {
            enable: Some(false),
            ..PstateRequest::new(0)
        };
        let update = apply(&device, &request).unwrap();

        assert!(update.written);
        assert_eq!(update.new, 0x0000_0000_0000_1234);
        assert_eq!(Pstate::decode(update.new), Pstate::Disabled);
    }

    #[test]
    fn test_apply_rejects_out_of_range_index_before_device_access() {
        let device = FakeMsr::default();

        let err = apply(&device, &PstateRequest::new(9)).unwrap_err();
        assert!(matches!(err, ZentuneError::InvalidArgument(_)));
        assert!(device.reads.borrow().is_empty());
        assert!(device.writes.borrow().is_empty());
    }

    #[test]
    fn test_plan_wires_each_field_independently() {
        // DID and VID must land in their own fields, not FID's value
        let request = PstateRequest {
            fid: Some(0x20),
            did: Some(0x0A),
            vid: Some(0x30),
            enable: Some(true),
            ..PstateRequest::new(0)
        };
        let def = PstateDef::from_msr_value(plan(0, &request));

        assert_eq!(def.fid, 0x20);
        assert_eq!(def.did, 0x0A);
        assert_eq!(def.vid, 0x30);
        assert!(def.enabled);
    }

    #[test]
    fn test_plan_preserves_reserved_bits() {
        let old = 0x8000_0110_4A0C_1288u64;
        let request = PstateRequest {
            fid: Some(0xFF),
            ..PstateRequest::new(0)
        };
        let new = plan(old, &request);
        assert_eq!(new & !0xFFu64, old & !0xFFu64);
    }

    #[test]
    fn test_list_decodes_all_eight_states() {
        let device = FakeMsr::default();
        device
            .regs
            .borrow_mut()
            .insert(msr::pstate_def(0), 0x8000_0000_0000_1234);
        device.regs.borrow_mut().insert(
            msr::pstate_def(3),
            PstateDef {
                enabled: true,
                fid: 0x34,
                did: 0x08,
                vid: 0x40,
            }
            .to_msr_value(),
        );

        let states = list(&device).unwrap();
        assert_eq!(states.len(), msr::PSTATE_COUNT);
        assert!(matches!(states[0], Pstate::Enabled(_)));
        assert_eq!(states[1], Pstate::Disabled);
        match states[3] {
            Pstate::Enabled(def) => {
                assert_eq!(def.fid, 0x34);
                assert_eq!(def.vid, 0x40);
            }
            Pstate::Disabled => panic!("P3 was programmed enabled"),
        }
    }
}
