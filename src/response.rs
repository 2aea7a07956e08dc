//! Decoding of the responses sent back by the UPS.
//!
//! Only the telemetry reply to [`Command::Query`](crate::command::Command::Query) has a
//! structure. It is 18 bytes long and split at fixed offsets:
//!
//! | Offset | Len | Field                       |
//! |--------|-----|-----------------------------|
//! | 0      | 1   | identifier, always `0x3D`   |
//! | 1      | 2   | last input voltage (V/10)   |
//! | 3      | 2   | input voltage (V/10)        |
//! | 5      | 2   | output voltage (V/10)       |
//! | 7      | 2   | output power (/10)          |
//! | 9      | 2   | output frequency (Hz/10)    |
//! | 11     | 2   | battery level (/10)         |
//! | 13     | 2   | temperature (°C/10)         |
//! | 15     | 1   | status bits                 |
//! | 16     | 1   | reserved                    |
//! | 17     | 1   | checksum                    |
//!
//! Numeric fields are big-endian. The `I` and `F` replies are plain text.

use crate::{error::ProtocolError, frame, scaled::Scaled, status::StatusFlags};

/// First byte of every telemetry frame.
pub const TELEMETRY_IDENTIFIER: u8 = 0x3D;

pub const TELEMETRY_FRAME_LEN: usize = 18;

mod offset {
    pub const LAST_INPUT_VOLTAGE: usize = 1;
    pub const INPUT_VOLTAGE: usize = 3;
    pub const OUTPUT_VOLTAGE: usize = 5;
    pub const OUTPUT_POWER: usize = 7;
    pub const OUTPUT_FREQUENCY: usize = 9;
    pub const BATTERY_LEVEL: usize = 11;
    pub const TEMPERATURE: usize = 13;
    pub const STATUS: usize = 15;
    pub const RESERVED: usize = 16;
    pub const CHECKSUM: usize = 17;
}

/// A decoded telemetry reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryReading {
    /// Input voltage at the previous sample.
    pub last_input_voltage: Scaled,
    pub input_voltage: Scaled,
    pub output_voltage: Scaled,
    pub output_power: Scaled,
    pub output_frequency: Scaled,
    pub battery_level: Scaled,
    /// Degrees celsius.
    pub temperature: Scaled,
    pub status: StatusFlags,
    /// Meaning unknown, kept as sent.
    pub reserved: u8,
}

/// A telemetry reply whose identifier and length have been checked.
///
/// Checksum validation is a separate step, see [`TelemetryFrame::verify_checksum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryFrame {
    bytes: [u8; TELEMETRY_FRAME_LEN],
}

impl TelemetryFrame {
    /// Check the identifier byte and that all fields are present.
    ///
    /// Bytes after the checksum are ignored.
    pub fn parse(raw: &[u8]) -> Result<Self, ProtocolError> {
        let truncated = ProtocolError::TruncatedFrame {
            expected: TELEMETRY_FRAME_LEN,
            actual: raw.len(),
        };

        match raw.first() {
            None => return Err(truncated),
            Some(&id) if id != TELEMETRY_IDENTIFIER => return Err(ProtocolError::InvalidFrame),
            Some(_) => {}
        }

        let bytes = raw
            .get(..TELEMETRY_FRAME_LEN)
            .and_then(|field| <[u8; TELEMETRY_FRAME_LEN]>::try_from(field).ok())
            .ok_or(truncated)?;

        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn word(&self, at: usize) -> Scaled {
        Scaled::from_raw(u16::from_be_bytes([self.bytes[at], self.bytes[at + 1]]))
    }

    pub fn status(&self) -> StatusFlags {
        StatusFlags::from_byte(self.bytes[offset::STATUS])
    }

    pub fn reserved(&self) -> u8 {
        self.bytes[offset::RESERVED]
    }

    /// The checksum byte as received.
    pub fn checksum(&self) -> u8 {
        self.bytes[offset::CHECKSUM]
    }

    /// The checksum the received bytes call for.
    pub fn expected_checksum(&self) -> u8 {
        frame::checksum(&self.bytes[..offset::CHECKSUM])
    }

    pub fn verify_checksum(&self) -> Result<(), ProtocolError> {
        let expected = self.expected_checksum();
        let actual = self.checksum();
        if expected == actual {
            Ok(())
        } else {
            Err(ProtocolError::ChecksumMismatch { expected, actual })
        }
    }

    pub fn decode(&self) -> TelemetryReading {
        TelemetryReading {
            last_input_voltage: self.word(offset::LAST_INPUT_VOLTAGE),
            input_voltage: self.word(offset::INPUT_VOLTAGE),
            output_voltage: self.word(offset::OUTPUT_VOLTAGE),
            output_power: self.word(offset::OUTPUT_POWER),
            output_frequency: self.word(offset::OUTPUT_FREQUENCY),
            battery_level: self.word(offset::BATTERY_LEVEL),
            temperature: self.word(offset::TEMPERATURE),
            status: self.status(),
            reserved: self.reserved(),
        }
    }
}

/// Decode a telemetry reply without looking at its checksum.
pub fn decode_telemetry(raw: &[u8]) -> Result<TelemetryReading, ProtocolError> {
    TelemetryFrame::parse(raw).map(|frame| frame.decode())
}

/// Decode a telemetry reply, rejecting it if the checksum does not match.
pub fn decode_telemetry_checked(raw: &[u8]) -> Result<TelemetryReading, ProtocolError> {
    let frame = TelemetryFrame::parse(raw)?;
    frame.verify_checksum()?;
    Ok(frame.decode())
}

/// Interpret a reply as ASCII text.
///
/// Non-ASCII bytes are dropped. Output stops once `N` characters are collected.
pub fn decode_text<const N: usize>(raw: &[u8]) -> heapless::String<N> {
    let mut text = heapless::String::new();
    for &byte in raw.iter().filter(|byte| byte.is_ascii()) {
        if text.push(byte as char).is_err() {
            break;
        }
    }
    text
}
