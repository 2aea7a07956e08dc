//! Client driving a no-break over any embedded-io serial transport.

use fugit::SecsDurationU32;
use log::{debug, trace, warn};
use strum::IntoEnumIterator;

use crate::{
    MAX_RESPONSE_LEN,
    command::{self, Command},
    error::{Error, ProtocolError, Result},
    frame::{CommandFrame, HexBytes},
    response::{self, TELEMETRY_FRAME_LEN, TelemetryFrame, TelemetryReading},
};
use embedded_io::Error as _;

/// Client side behaviour that is not dictated by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Reject telemetry frames whose trailing checksum does not match.
    ///
    /// Off by default, the device has not been seen to send bad checksums.
    pub verify_telemetry_checksum: bool,
}

/// You can create a NoBreak using any interface which implements [embedded_io::Read] & [embedded_io::Write].
///
/// The client owns the interface for its whole lifetime, so only one exchange can ever be
/// in flight. `L` bounds how many response bytes are collected per command.
pub struct NoBreak<S: embedded_io::Read + embedded_io::Write, const L: usize = MAX_RESPONSE_LEN> {
    interface: S,
    config: Config,
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> NoBreak<S, L> {
    /// Create a new NoBreak instance with the default [`Config`].
    pub fn new(interface: S) -> Self {
        Self::with_config(interface, Config::default())
    }

    pub fn with_config(interface: S, config: Config) -> Self {
        Self { interface, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Give the interface back, e.g. to close the port.
    pub fn into_inner(self) -> S {
        self.interface
    }

    /// Query and decode the current telemetry.
    pub fn read_telemetry(&mut self) -> Result<TelemetryReading, S::Error> {
        let frame = Command::Query.encode();
        let response = self.exchange(frame.as_bytes(), Some(TELEMETRY_FRAME_LEN))?;
        if response.is_empty() {
            warn!("No reply to telemetry query");
            return Err(Error::NoResponse);
        }

        let telemetry = TelemetryFrame::parse(&response).inspect_err(|err| {
            warn!("Rejected telemetry frame {:x}: {}", HexBytes(&response), err)
        })?;
        if self.config.verify_telemetry_checksum {
            telemetry.verify_checksum().inspect_err(|err| {
                warn!("Rejected telemetry frame {:x}: {}", HexBytes(&response), err)
            })?;
        }
        Ok(telemetry.decode())
    }

    /// Return the device name.
    pub fn identify(&mut self) -> Result<heapless::String<L>, S::Error> {
        let response = self.transact(Command::Identify)?;
        Ok(response::decode_text(&response))
    }

    /// Return the device characteristics string.
    pub fn characteristics(&mut self) -> Result<heapless::String<L>, S::Error> {
        let response = self.transact(Command::Characteristics)?;
        Ok(response::decode_text(&response))
    }

    /// Turn the beeper on if it's off, and vice versa.
    pub fn toggle_beep(&mut self) -> Result<heapless::Vec<u8, L>, S::Error> {
        self.transact(Command::ToggleBeep)
    }

    pub fn trigger_battery_test(&mut self) -> Result<heapless::Vec<u8, L>, S::Error> {
        self.transact(Command::BatteryTestTrigger)
    }

    /// Run a battery test for the given duration.
    ///
    /// Durations with a preset in the command table are sent exactly as the preset,
    /// anything else is encoded in whole seconds.
    pub fn start_battery_test(
        &mut self,
        duration: SecsDurationU32,
    ) -> Result<heapless::Vec<u8, L>, S::Error> {
        let preset = Command::iter().find(|c| c.battery_test_duration() == Some(duration));
        let frame = match preset {
            Some(command) => command.encode(),
            None => command::encode_battery_test(duration)?,
        };
        self.send_frame(&frame)
    }

    /// Run a battery test until the battery reports low.
    pub fn low_battery_test(&mut self) -> Result<heapless::Vec<u8, L>, S::Error> {
        self.transact(Command::LowBatteryTest)
    }

    pub fn cancel_shutdown(&mut self) -> Result<heapless::Vec<u8, L>, S::Error> {
        self.transact(Command::CancelShutdown)
    }

    /// Shut down, then restore output. `delay` and `restore` are sent as raw words.
    pub fn shutdown_and_restore(
        &mut self,
        delay: u16,
        restore: u16,
    ) -> Result<heapless::Vec<u8, L>, S::Error> {
        self.send_frame(&command::encode_shutdown_restore(delay, restore))
    }

    pub fn command_g(&mut self) -> Result<heapless::Vec<u8, L>, S::Error> {
        self.transact(Command::CommandG)
    }

    /// Send any command from the table and return whatever comes back.
    ///
    /// An empty vector means the device stayed silent until the read timed out.
    pub fn transact(&mut self, command: Command) -> Result<heapless::Vec<u8, L>, S::Error> {
        debug!("Sending {} ({:?})", command.name(), command);
        self.send_frame(&command.encode())
    }

    pub fn send_frame(&mut self, frame: &CommandFrame) -> Result<heapless::Vec<u8, L>, S::Error> {
        self.exchange(frame.as_bytes(), None)
    }

    /// Send caller-assembled bytes, e.g. a complete `S` frame.
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<heapless::Vec<u8, L>, S::Error> {
        self.exchange(bytes, None)
    }

    /// Write the request then collect the reply.
    ///
    /// Reading stops at `expected` bytes, at `L` bytes, at end of stream or when the
    /// interface times out. Any other read error aborts the exchange, even mid-reply.
    fn exchange(
        &mut self,
        request: &[u8],
        expected: Option<usize>,
    ) -> Result<heapless::Vec<u8, L>, S::Error> {
        debug!("Command sent: {:x}", HexBytes(request));
        self.interface
            .write_all(request)
            .map_err(Error::Transport)?;
        self.interface.flush().map_err(Error::Transport)?;

        let limit = expected.map_or(L, |expected| expected.min(L));
        let mut response: heapless::Vec<u8, L> = heapless::Vec::new();
        let mut chunk = [0u8; 8];
        while response.len() < limit {
            let wanted = chunk.len().min(limit - response.len());
            match self.interface.read(&mut chunk[..wanted]) {
                Ok(0) => break,
                Ok(bytes_read) => {
                    trace!("Read {:x}", HexBytes(&chunk[..bytes_read]));
                    response
                        .extend_from_slice(&chunk[..bytes_read])
                        .map_err(|_| ProtocolError::BufferOverflow)?;
                }
                Err(e) => match e.kind() {
                    embedded_io::ErrorKind::TimedOut => break,
                    embedded_io::ErrorKind::Interrupted => continue,
                    _ => return Err(Error::Transport(e)),
                },
            }
        }

        debug!("Response received: {:x}", HexBytes(&response));
        Ok(response)
    }
}
