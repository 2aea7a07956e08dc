//! The UPS status byte.

use core::fmt;

use modular_bitfield::prelude::*;

/// Eight independent condition flags packed into the telemetry status byte.
///
/// Bit positions are part of the wire format, most significant bit first:
///
/// | Bit | Flag            |
/// |-----|-----------------|
/// | 7   | beep enabled    |
/// | 6   | shutdown active |
/// | 5   | test active     |
/// | 4   | UPS OK          |
/// | 3   | boost active    |
/// | 2   | bypass active   |
/// | 1   | low battery     |
/// | 0   | battery in use  |
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFlags {
    pub battery_in_use: bool,
    pub low_battery: bool,
    pub bypass_active: bool,
    pub boost_active: bool,
    pub ups_ok: bool,
    pub test_active: bool,
    pub shutdown_active: bool,
    pub beep_enabled: bool,
}

impl StatusFlags {
    pub fn from_byte(byte: u8) -> Self {
        Self::from_bytes([byte])
    }

    pub fn into_byte(self) -> u8 {
        self.into_bytes()[0]
    }
}

impl Default for StatusFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the raw byte as eight binary digits, bit 7 first.
impl fmt::Binary for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08b}", self.into_byte())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_bit_maps_to_one_flag() {
        let flag_of = |byte: u8| {
            let s = StatusFlags::from_byte(byte);
            [
                s.battery_in_use(),
                s.low_battery(),
                s.bypass_active(),
                s.boost_active(),
                s.ups_ok(),
                s.test_active(),
                s.shutdown_active(),
                s.beep_enabled(),
            ]
        };
        for bit in 0..8 {
            let flags = flag_of(1 << bit);
            for (index, set) in flags.iter().enumerate() {
                assert_eq!(*set, index == bit, "bit {} flag {}", bit, index);
            }
        }
    }

    #[test]
    fn msb_is_beep_and_lsb_is_battery() {
        let flags = StatusFlags::from_byte(0b1000_0000);
        assert!(flags.beep_enabled());
        assert!(!flags.battery_in_use());

        let flags = StatusFlags::from_byte(0b0000_0001);
        assert!(flags.battery_in_use());
        assert!(!flags.beep_enabled());
    }

    #[test]
    fn byte_round_trip_and_binary_rendering() {
        let flags = StatusFlags::new().with_ups_ok(true).with_beep_enabled(true);
        assert_eq!(flags.into_byte(), 0x90);
        assert_eq!(format!("{:b}", flags), "10010000");
        assert_eq!(format!("{:b}", StatusFlags::default()), "00000000");
    }
}
