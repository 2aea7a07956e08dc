//! This crate provides an interface for polling and controlling UPS ("no-break") units that speak
//! the `Q`/`I`/`F`... single-byte-opcode serial protocol.
//!
//! It supports `no-std` environments by use of the `no_std` feature flag.
//!
//! The protocol layer is pure: [`command`] builds request frames, [`response`] decodes the
//! replies. [`ups::NoBreak`] ties both to any transport implementing the embedded-io traits.
//!
//! Every request frame is an opcode, four parameter bytes, a checksum and `0x0D`:
//!
//! ```
//! use nobreak_ups::command::Command;
//!
//! let frame = Command::Query.encode();
//! assert_eq!(frame.as_bytes(), &[0x51, 0xFF, 0xFF, 0xFF, 0xFF, 0xB3, 0x0D]);
//! ```
//!
//! The serial port used for UPS comms should be configured like so:
//! * Default baud rate: 2400
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//! * Read timeout: around 1 second, the device answers slowly.

#![cfg_attr(feature = "no_std", no_std)]

use fugit::MillisDurationU32;

pub mod command;
pub mod error;
pub mod frame;
pub mod response;
pub mod scaled;
pub mod status;
pub mod ups;

#[cfg(test)]
mod mock_serial;

/// Baud rate the units ship with.
pub const DEFAULT_BAUD_RATE: u32 = 2400;

/// How long to wait for a reply before giving up on it.
pub const DEFAULT_TIMEOUT: MillisDurationU32 = MillisDurationU32::millis(1000);

/// Default response buffer size of [`ups::NoBreak`].
pub const MAX_RESPONSE_LEN: usize = 32;

/// Telemetry polling period used by the reference driver loop.
pub const POLL_INTERVAL: MillisDurationU32 = MillisDurationU32::millis(2000);
