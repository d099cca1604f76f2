//! MSR (Model-Specific Register) read/write primitives
//!
//! This module provides low-level MSR access through `/dev/cpu/*/msr`.
//! Every call opens its own handle and closes it before returning; nothing
//! is cached or pooled. The register file itself is system-wide mutable
//! state with no locking discipline, so concurrent writers from other
//! processes can race with a read-modify-write cycle.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;

pub type Result<T> = std::result::Result<T, MsrError>;

/// Errors that can occur during MSR operations
///
/// Every OS-level failure collapses into the single `DeviceUnavailable`
/// kind: whether the open, seek, read or write failed, the causes are the
/// same (the `msr` kernel module is not loaded, or the caller lacks
/// root/CAP_SYS_RAWIO) and so is the remediation. The failed operation and
/// register address are kept for context only.
#[derive(Debug, thiserror::Error)]
pub enum MsrError {
    #[error("MSR device unavailable: failed to {op} MSR 0x{msr:08X} on CPU {cpu}: {source}; load the msr kernel module (modprobe msr) and retry")]
    DeviceUnavailable {
        cpu: u32,
        msr: u64,
        op: &'static str,
        source: std::io::Error,
    },
}

/// Read a 64-bit value from an MSR
///
/// Opens `/dev/cpu/<cpu>/msr` read-only, seeks to the register address
/// (MSR addresses are absolute byte offsets into the device), reads exactly
/// 8 bytes and decodes them little-endian. The handle is dropped on every
/// exit path. A short read is a failure.
///
/// # Errors
///
/// Returns [`MsrError::DeviceUnavailable`] if the device cannot be opened
/// (requires root/CAP_SYS_RAWIO and the `msr` kernel module), the seek
/// fails, or fewer than 8 bytes can be read.
///
/// # Example
///
/// ```ignore
/// use zentune_raw::read_msr;
///
/// let value = read_msr(0, 0xC0010064)?;
/// println!("MSR 0xC0010064 = 0x{:016X}", value);
/// ```
pub fn read_msr(cpu: u32, msr: u64) -> Result<u64> {
    let path = format!("/dev/cpu/{cpu}/msr");
    let mut file = File::open(&path).map_err(|e| MsrError::DeviceUnavailable {
        cpu,
        msr,
        op: "open device for reading",
        source: e,
    })?;

    file.seek(SeekFrom::Start(msr))
        .map_err(|e| MsrError::DeviceUnavailable {
            cpu,
            msr,
            op: "seek to",
            source: e,
        })?;

    let mut buffer = [0u8; 8];
    file.read_exact(&mut buffer)
        .map_err(|e| MsrError::DeviceUnavailable {
            cpu,
            msr,
            op: "read",
            source: e,
        })?;

    Ok(u64::from_le_bytes(buffer))
}

/// Write a 64-bit value to an MSR
///
/// Opens `/dev/cpu/<cpu>/msr` write-only with `O_SYNC`, seeks to the
/// register address and writes exactly 8 bytes little-endian. A short
/// write is a failure; there are no retries.
///
/// # Errors
///
/// Returns [`MsrError::DeviceUnavailable`] on any open/seek/write failure.
///
/// # Safety
///
/// Writing incorrect values to P-state registers can destabilize or crash
/// the machine. Nothing here validates that a value is hardware-safe;
/// callers decide what to write and must never call this speculatively.
pub fn write_msr(cpu: u32, msr: u64, value: u64) -> Result<()> {
    let path = format!("/dev/cpu/{cpu}/msr");
    let mut file = OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_SYNC) // Ensure synchronous writes
        .open(&path)
        .map_err(|e| MsrError::DeviceUnavailable {
            cpu,
            msr,
            op: "open device for writing",
            source: e,
        })?;

    file.seek(SeekFrom::Start(msr))
        .map_err(|e| MsrError::DeviceUnavailable {
            cpu,
            msr,
            op: "seek to",
            source: e,
        })?;

    file.write_all(&value.to_le_bytes())
        .map_err(|e| MsrError::DeviceUnavailable {
            cpu,
            msr,
            op: "write",
            source: e,
        })?;

    Ok(())
}
