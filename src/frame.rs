//! Command frames and the additive checksum shared by requests and telemetry replies.

use core::fmt;

/// Every checked frame ends with this byte.
pub const TERMINATOR: u8 = 0x0D;

/// Opcode, four parameter bytes, checksum, terminator.
pub const MAX_FRAME_LEN: usize = 7;

/// Returns the checksum byte for the given preceding bytes.
///
/// The device expects the byte sum of a frame, checksum included, to be `0` mod 256.
/// So the checksum is the two's complement of the low byte of the sum.
///
/// ```
/// use nobreak_ups::frame::checksum;
///
/// assert_eq!(checksum(&[0x51, 0xFF, 0xFF, 0xFF, 0xFF]), 0xB3);
/// ```
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |acc, &byte| acc.wrapping_add(byte))
        .wrapping_neg()
}

/// Check that `bytes`, whose last byte is a checksum, sum to zero.
pub fn verify_checksum(bytes: &[u8]) -> bool {
    match bytes.split_last() {
        Some((&sum, preceding)) => checksum(preceding) == sum,
        None => false,
    }
}

/// An encoded command ready to be written to the serial line.
///
/// Built by [`Command::encode`](crate::command::Command::encode) and friends, never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: [u8; MAX_FRAME_LEN],
    len: usize,
    checked: bool,
}

impl CommandFrame {
    /// Assemble opcode and optional parameter bytes, appending checksum and terminator when `checked`.
    pub(crate) fn new(opcode: u8, parameters: Option<[u8; 4]>, checked: bool) -> Self {
        let mut bytes = [0u8; MAX_FRAME_LEN];
        bytes[0] = opcode;
        let mut len = 1;
        if let Some(parameters) = parameters {
            bytes[1..5].copy_from_slice(&parameters);
            len = 5;
        }
        if checked {
            bytes[len] = checksum(&bytes[..len]);
            bytes[len + 1] = TERMINATOR;
            len += 2;
        }
        Self {
            bytes,
            len,
            checked,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Frames always carry at least an opcode.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// The checksum byte, for frames that carry one.
    pub fn checksum(&self) -> Option<u8> {
        self.checked.then(|| self.bytes[self.len - 2])
    }

    /// Whether the frame ends with [`TERMINATOR`].
    pub fn is_terminated(&self) -> bool {
        self.checked && self.bytes[self.len - 1] == TERMINATOR
    }

    /// Re-checks the checksum of this frame. Bare frames have nothing to check and return `true`.
    pub fn verify_checksum(&self) -> bool {
        !self.checked || verify_checksum(&self.bytes[..self.len - 1])
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::LowerHex for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&HexBytes(self.as_bytes()), f)
    }
}

impl fmt::UpperHex for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&HexBytes(self.as_bytes()), f)
    }
}

/// Formats a byte slice as contiguous hex digits, e.g. `51ffffffffb30d`.
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::LowerHex for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::UpperHex for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}
