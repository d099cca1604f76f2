//! MSR device capability
//!
//! Register access goes through the [`MsrDevice`] trait so the P-state
//! logic can run against an in-memory fake in tests, without privileged
//! access to real hardware.

use crate::error::Result;

/// Read/write access to the model-specific register file.
///
/// The register file is system-wide mutable state shared with every other
/// process on the machine; nothing here serializes access, so concurrent
/// read-modify-write cycles can race.
pub trait MsrDevice {
    /// Read the 8-byte register at `msr`
    fn read(&self, msr: u64) -> Result<u64>;

    /// Write the 8-byte register at `msr`
    fn write(&self, msr: u64, value: u64) -> Result<()>;
}

/// `/dev/cpu/<cpu>/msr`-backed device
///
/// Each read or write opens and closes its own handle; handles are not
/// pooled or reused across calls.
pub struct SysMsr {
    cpu: u32,
}

impl SysMsr {
    pub fn new(cpu: u32) -> Self {
        Self { cpu }
    }
}

impl MsrDevice for SysMsr {
    fn read(&self, msr: u64) -> Result<u64> {
        let value = zentune_raw::read_msr(self.cpu, msr)?;
        tracing::debug!(
            "MSR read: CPU {} MSR 0x{:08x} = 0x{:016x}",
            self.cpu,
            msr,
            value
        );
        Ok(value)
    }

    fn write(&self, msr: u64, value: u64) -> Result<()> {
        tracing::debug!(
            "MSR write: CPU {} MSR 0x{:08x} = 0x{:016x}",
            self.cpu,
            msr,
            value
        );
        zentune_raw::write_msr(self.cpu, msr, value)?;
        Ok(())
    }
}
