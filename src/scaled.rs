//! Fixed-point values reported by the UPS.
//!
//! Every numeric telemetry field is sent as a 16-bit integer holding ten times the
//! real value, so `2345` on the wire means `234.5`.

use core::fmt;

/// A measurement with one implied decimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Scaled(u16);

impl Scaled {
    /// Raw wire units per whole unit.
    pub const DIVISOR: u16 = 10;

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// The value as sent by the device, in tenths.
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Integer part, e.g. `234` for `234.5`.
    pub const fn whole(&self) -> u16 {
        self.0 / Self::DIVISOR
    }

    /// Fractional digit, e.g. `5` for `234.5`.
    pub const fn tenths(&self) -> u8 {
        (self.0 % Self::DIVISOR) as u8
    }

    pub fn as_f32(&self) -> f32 {
        self.0 as f32 / Self::DIVISOR as f32
    }
}

impl From<Scaled> for f32 {
    fn from(value: Scaled) -> Self {
        value.as_f32()
    }
}

impl fmt::Display for Scaled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.whole(), self.tenths())
    }
}
