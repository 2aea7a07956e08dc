//! Poll a UPS over a serial port.
//!
//! `cargo run --example poll [PORT] [COMMAND]`
//!
//! Without a command the telemetry is queried every couple of seconds. With one (`I`, `T1`,
//! `cancel-shutdown`, ...) that command is sent once and the reply printed.

use std::env;

use inquire::Select;
use nobreak_ups::{
    DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT, POLL_INTERVAL,
    command::{Command, ResponseKind},
    error::Error,
    frame::HexBytes,
    response::{self, TelemetryFrame},
    ups::NoBreak,
};
use serialport::SerialPort;

pub struct PortWrapper(Box<dyn SerialPort>);

#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            // serialport reports an expired read timeout as TimedOut, which ends a reply.
            std::io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            std::io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for PortWrapper {
    type Error = IoError;
}

impl embedded_io::Read for PortWrapper {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        std::io::Read::read(&mut self.0, buf).map_err(IoError)
    }
}

impl embedded_io::Write for PortWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

fn run_once(ups: &mut NoBreak<PortWrapper>, command: Command) -> Result<(), Error<IoError>> {
    println!("Command sent: {:x}", command.encode());
    let reply = ups.transact(command)?;
    if reply.is_empty() {
        println!("No reply");
        return Ok(());
    }
    println!("Raw reply: {:x}", HexBytes(&reply));

    match command.response_kind() {
        ResponseKind::Telemetry => {
            let frame = TelemetryFrame::parse(&reply)?;
            if let Err(err) = frame.verify_checksum() {
                println!("Warning: {}", err);
            }
            let reading = frame.decode();
            println!("{:#?}", reading);
            println!("Status bits: {:b}", reading.status);
        }
        ResponseKind::Text => {
            let text: heapless::String<32> = response::decode_text(&reply);
            println!("Text: {}", text);
        }
        ResponseKind::Raw => {}
    }
    Ok(())
}

fn main() {
    // Get serial port from command line arg or interactive selection
    let port_name = env::args().nth(1).unwrap_or_else(|| {
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    let command = match env::args().nth(2) {
        Some(name) => Some(Command::from_name(&name).unwrap_or_else(|err| {
            eprintln!("{}: {}", name, err);
            std::process::exit(2);
        })),
        None => None,
    };

    let port = serialport::new(&port_name, DEFAULT_BAUD_RATE)
        .timeout(std::time::Duration::from_millis(
            DEFAULT_TIMEOUT.to_millis() as u64,
        ))
        .open()
        .expect("Failed to open serial port");
    println!("Connected to {} at {} baud", port_name, DEFAULT_BAUD_RATE);

    let mut ups: NoBreak<PortWrapper> = NoBreak::new(PortWrapper(port));

    if let Some(command) = command {
        if let Err(err) = run_once(&mut ups, command) {
            eprintln!("Communication error: {}", err);
        }
        return;
    }

    // A failed poll is reported and simply retried on the next tick.
    loop {
        if let Err(err) = run_once(&mut ups, Command::Query) {
            eprintln!("Communication error: {}", err);
        }
        std::thread::sleep(std::time::Duration::from_millis(
            POLL_INTERVAL.to_millis() as u64,
        ));
    }
}
