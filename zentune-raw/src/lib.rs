//! # zentune-raw
//!
//! Hardware register definitions for AMD Ryzen P-state control.
//!
//! This crate provides type-safe abstractions over MSR (Model-Specific
//! Register) access and the Zen-family P-state definition registers
//! (MSRC001_0064 through MSRC001_006B), which encode each performance
//! operating point as a FID/DID/VID triple plus an enable bit.
//!
//! ## Usage
//!
//! ```ignore
//! use zentune_raw::pstate::{self, Pstate};
//! use zentune_raw::{read_msr, write_msr};
//!
//! // Decode the P0 definition register
//! let raw = read_msr(0, pstate::msr::pstate_def(0))?;
//! println!("P0 = {:?}", Pstate::decode(raw));
//!
//! // Bump the FID without disturbing any other bit
//! let new = pstate::fields::FID.set(raw, 0x88);
//! write_msr(0, pstate::msr::pstate_def(0), new)?;
//! ```

pub mod msr;
pub mod pstate;
pub mod register;

// Re-export for convenience
pub use msr::{read_msr, write_msr, MsrError, Result};
pub use register::{BitField, RegisterLayout};
