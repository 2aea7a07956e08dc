//! This module defines the fixed command set understood by the no-break.
//!
//! Each [`Command`] maps to exactly one [`CommandSpec`] in [`COMMAND_TABLE`]. Frames are
//! produced from the table, so the opcode, parameter layout and framing of every
//! command live in one place.

use fugit::SecsDurationU32;
use strum::EnumCount;
use strum_macros::{EnumCount as EnumCountMacro, EnumIter};

use crate::{error::ProtocolError, frame::CommandFrame};

/// Placeholder for unused parameter bytes.
pub const SENTINEL: u8 = 0xFF;

/// Every command the device is known to accept.
///
/// Variants are declared in the same order as [`COMMAND_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCountMacro)]
pub enum Command {
    /// `Q` - Query telemetry. Answered with an 18 byte telemetry frame.
    Query,
    /// `I` - Return the device name as text.
    Identify,
    /// `D` - Battery test trigger.
    BatteryTestTrigger,
    /// `F` - Return the device characteristics as text.
    Characteristics,
    /// `G` - Purpose undocumented, first parameter byte is `0x01`.
    CommandG,
    /// `M` - Toggle the beeper on/off.
    ToggleBeep,
    /// `T` - Battery test, 10 second preset.
    BatteryTest10s,
    /// `T1` - Battery test, 100 second preset.
    BatteryTest100s,
    /// `T2` - Battery test, 200 second preset.
    BatteryTest200s,
    /// `T3` - Battery test, 300 second preset.
    BatteryTest300s,
    /// `T9` - Battery test, 900 second preset.
    BatteryTest900s,
    /// `C` - Cancel a pending shutdown.
    CancelShutdown,
    /// `L` - Test until low battery.
    ///
    /// __Note:__ Sent without checksum or terminator.
    LowBatteryTest,
    /// `R` - Shutdown and restore.
    ShutdownRestore,
    /// `zzz` - Shutdown and restore preset.
    ///
    /// __Note:__ Device tables list this frame with checksum `0xE0`, which does not make
    /// the frame sum to zero. The computed checksum `0xE8` is sent instead.
    ShutdownRestoreZzz,
    /// `zz1` - Shutdown and restore preset.
    ShutdownRestoreZz1,
    /// `S` - Shutdown in N seconds.
    ///
    /// Only the opcode is known. The rest of the frame has to be assembled by the
    /// caller and sent with [`NoBreak::send_raw`](crate::ups::NoBreak::send_raw).
    Shutdown,
}

/// How the four parameter bytes following the opcode are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameters {
    /// No parameter bytes at all.
    None,
    /// `FF FF FF FF`.
    Sentinel,
    /// First byte fixed, the rest [`SENTINEL`].
    Leading(u8),
    /// Big-endian word at bytes 1-2, zero at bytes 3-4.
    Duration(u16),
    /// Two big-endian words. Units are device defined.
    DelayRestore { delay: u16, restore: u16 },
}

impl Parameters {
    /// The parameter bytes as they appear on the wire.
    pub const fn bytes(&self) -> Option<[u8; 4]> {
        match *self {
            Parameters::None => None,
            Parameters::Sentinel => Some([SENTINEL; 4]),
            Parameters::Leading(first) => Some([first, SENTINEL, SENTINEL, SENTINEL]),
            Parameters::Duration(word) => {
                let [hi, lo] = word.to_be_bytes();
                Some([hi, lo, 0x00, 0x00])
            }
            Parameters::DelayRestore { delay, restore } => {
                let [delay_hi, delay_lo] = delay.to_be_bytes();
                let [restore_hi, restore_lo] = restore.to_be_bytes();
                Some([delay_hi, delay_lo, restore_hi, restore_lo])
            }
        }
    }
}

/// Whether a frame is closed with checksum and terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Checksum byte then `0x0D`.
    Checked,
    /// Sent exactly as the opcode and parameters stand.
    Bare,
}

/// What the device sends back for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Fixed-width telemetry frame, see [`crate::response`].
    Telemetry,
    /// Free-form, mostly ASCII text.
    Text,
    /// Nothing structured; passed through untouched.
    Raw,
}

/// Static definition of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub command: Command,
    /// Short key used by the device documentation, e.g. `"Q"`.
    pub name: &'static str,
    /// Kebab-case descriptive name, e.g. `"query"`.
    pub long_name: &'static str,
    pub opcode: u8,
    pub parameters: Parameters,
    pub framing: Framing,
    pub response: ResponseKind,
}

impl CommandSpec {
    const fn new(
        command: Command,
        name: &'static str,
        long_name: &'static str,
        opcode: u8,
        parameters: Parameters,
    ) -> Self {
        Self {
            command,
            name,
            long_name,
            opcode,
            parameters,
            framing: Framing::Checked,
            response: ResponseKind::Raw,
        }
    }

    const fn bare(mut self) -> Self {
        self.framing = Framing::Bare;
        self
    }

    const fn responds_with(mut self, response: ResponseKind) -> Self {
        self.response = response;
        self
    }

    /// Build the frame for this entry.
    pub fn encode(&self) -> CommandFrame {
        CommandFrame::new(
            self.opcode,
            self.parameters.bytes(),
            self.framing == Framing::Checked,
        )
    }
}

const OP_QUERY: u8 = 0x51;
const OP_IDENTIFY: u8 = 0x49;
const OP_BATTERY_TEST_TRIGGER: u8 = 0x44;
const OP_CHARACTERISTICS: u8 = 0x46;
const OP_G: u8 = 0x47;
const OP_TOGGLE_BEEP: u8 = 0x4D;
const OP_BATTERY_TEST: u8 = 0x54;
const OP_CANCEL_SHUTDOWN: u8 = 0x43;
const OP_LOW_BATTERY_TEST: u8 = 0x4C;
const OP_SHUTDOWN_RESTORE: u8 = 0x52;
const OP_SHUTDOWN: u8 = 0x53;

/// The complete command table, indexed by `Command as usize`.
pub static COMMAND_TABLE: [CommandSpec; Command::COUNT] = {
    use Command as C;
    use Parameters as P;
    [
        CommandSpec::new(C::Query, "Q", "query", OP_QUERY, P::Sentinel)
            .responds_with(ResponseKind::Telemetry),
        CommandSpec::new(C::Identify, "I", "identify", OP_IDENTIFY, P::Sentinel)
            .responds_with(ResponseKind::Text),
        CommandSpec::new(
            C::BatteryTestTrigger,
            "D",
            "battery-test-trigger",
            OP_BATTERY_TEST_TRIGGER,
            P::Sentinel,
        ),
        CommandSpec::new(
            C::Characteristics,
            "F",
            "characteristics",
            OP_CHARACTERISTICS,
            P::Sentinel,
        )
        .responds_with(ResponseKind::Text),
        CommandSpec::new(C::CommandG, "G", "command-g", OP_G, P::Leading(0x01)),
        CommandSpec::new(C::ToggleBeep, "M", "toggle-beep", OP_TOGGLE_BEEP, P::Sentinel),
        // The 10 s preset really is 0x0010 on the wire.
        CommandSpec::new(
            C::BatteryTest10s,
            "T",
            "battery-test-10s",
            OP_BATTERY_TEST,
            P::Duration(0x0010),
        ),
        CommandSpec::new(
            C::BatteryTest100s,
            "T1",
            "battery-test-100s",
            OP_BATTERY_TEST,
            P::Duration(100),
        ),
        CommandSpec::new(
            C::BatteryTest200s,
            "T2",
            "battery-test-200s",
            OP_BATTERY_TEST,
            P::Duration(200),
        ),
        CommandSpec::new(
            C::BatteryTest300s,
            "T3",
            "battery-test-300s",
            OP_BATTERY_TEST,
            P::Duration(300),
        ),
        CommandSpec::new(
            C::BatteryTest900s,
            "T9",
            "battery-test-900s",
            OP_BATTERY_TEST,
            P::Duration(900),
        ),
        CommandSpec::new(
            C::CancelShutdown,
            "C",
            "cancel-shutdown",
            OP_CANCEL_SHUTDOWN,
            P::Sentinel,
        ),
        CommandSpec::new(
            C::LowBatteryTest,
            "L",
            "low-battery-test",
            OP_LOW_BATTERY_TEST,
            P::Sentinel,
        )
        .bare(),
        CommandSpec::new(
            C::ShutdownRestore,
            "R",
            "shutdown-restore",
            OP_SHUTDOWN_RESTORE,
            P::DelayRestore {
                delay: 0x00C8,
                restore: 0x270F,
            },
        ),
        CommandSpec::new(
            C::ShutdownRestoreZzz,
            "zzz",
            "shutdown-restore-zzz",
            OP_SHUTDOWN_RESTORE,
            P::DelayRestore {
                delay: 0x00C8,
                restore: 0x0FEF,
            },
        ),
        CommandSpec::new(
            C::ShutdownRestoreZz1,
            "zz1",
            "shutdown-restore-zz1",
            OP_SHUTDOWN_RESTORE,
            P::DelayRestore {
                delay: 0x012C,
                restore: 0x270F,
            },
        ),
        CommandSpec::new(C::Shutdown, "S", "shutdown", OP_SHUTDOWN, P::None).bare(),
    ]
};

impl Command {
    /// Look up a command by its short key (`"T1"`) or long name (`"battery-test-100s"`).
    ///
    /// This is the only place an arbitrary string enters the protocol layer.
    pub fn from_name(name: &str) -> Result<Self, ProtocolError> {
        COMMAND_TABLE
            .iter()
            .find(|spec| spec.name == name || spec.long_name == name)
            .map(|spec| spec.command)
            .ok_or(ProtocolError::UnknownCommand)
    }

    pub fn spec(&self) -> &'static CommandSpec {
        &COMMAND_TABLE[*self as usize]
    }

    /// Short key, e.g. `"Q"`.
    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    pub fn opcode(&self) -> u8 {
        self.spec().opcode
    }

    pub fn response_kind(&self) -> ResponseKind {
        self.spec().response
    }

    /// Build the frame to transmit for this command.
    pub fn encode(&self) -> CommandFrame {
        self.spec().encode()
    }

    /// Nominal duration of the battery test presets.
    pub fn battery_test_duration(&self) -> Option<SecsDurationU32> {
        let secs = match self {
            Command::BatteryTest10s => 10,
            Command::BatteryTest100s => 100,
            Command::BatteryTest200s => 200,
            Command::BatteryTest300s => 300,
            Command::BatteryTest900s => 900,
            _ => return None,
        };
        Some(SecsDurationU32::secs(secs))
    }
}

impl core::str::FromStr for Command {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// Encode a battery test of arbitrary length.
///
/// The duration is sent in whole seconds as a 16-bit word, so anything above
/// 65535 seconds is rejected.
pub fn encode_battery_test(duration: SecsDurationU32) -> Result<CommandFrame, ProtocolError> {
    let secs = u16::try_from(duration.to_secs()).map_err(|_| ProtocolError::InvalidParameter)?;
    let parameters = Parameters::Duration(secs);
    Ok(CommandFrame::new(OP_BATTERY_TEST, parameters.bytes(), true))
}

/// Encode a shutdown-and-restore frame with raw delay and restore words.
pub fn encode_shutdown_restore(delay: u16, restore: u16) -> CommandFrame {
    let parameters = Parameters::DelayRestore { delay, restore };
    CommandFrame::new(OP_SHUTDOWN_RESTORE, parameters.bytes(), true)
}
