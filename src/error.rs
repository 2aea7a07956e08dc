//! Our error types for the no-break protocol and client.

use thiserror::Error;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Failures raised while encoding command frames or decoding responses.
///
/// These never touch the transport, so they are plain values that can be
/// compared and copied around.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown command")]
    UnknownCommand,
    #[error("Parameter out of encodable range")]
    InvalidParameter,
    #[error("Frame does not start with the expected identifier byte")]
    InvalidFrame,
    #[error("Frame truncated: expected {expected} bytes, got {actual}")]
    TruncatedFrame { expected: usize, actual: usize },
    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },
    #[error("Buffer overflow")]
    BufferOverflow,
}

/// Error type for talking to a UPS over some serial transport.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error("Transport error")]
    Transport(I),
    #[error("Protocol error: {0}")]
    Protocol(ProtocolError),
    #[error("No response received")]
    NoResponse,
}

impl<I: embedded_io::Error> From<ProtocolError> for Error<I> {
    fn from(err: ProtocolError) -> Self {
        Error::Protocol(err)
    }
}
