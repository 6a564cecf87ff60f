//! Acquisition configuration and its 8-bit wire encoding.

use crate::{Error, Result};

const WIDTH_SHIFT: u8 = 0;
const WIDTH_MASK: u8 = 0x0f;
const NULL_SHIFT: u8 = 4;
const NULL_MASK: u8 = 0x03;
const CLKDIV_SHIFT: u8 = 6;
const CLKDIV_MASK: u8 = 0x03;

pub const MAX_WIDTH: u8 = 16;
pub const MAX_NULL_CYCLES: u8 = 3;

/// Ratio between the system clock and SCLK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockDivisor {
    #[default]
    Div2,
    Div4,
    Div8,
    Div16,
}

impl ClockDivisor {
    pub fn from_select(select: u8) -> Self {
        match select & CLKDIV_MASK {
            0b00 => Self::Div2,
            0b01 => Self::Div4,
            0b10 => Self::Div8,
            _    => Self::Div16,
        }
    }

    pub fn select(self) -> u8 {
        match self {
            Self::Div2  => 0b00,
            Self::Div4  => 0b01,
            Self::Div8  => 0b10,
            Self::Div16 => 0b11,
        }
    }

    /// Number of system clocks between two SCLK toggles.
    pub fn half_period(self) -> u8 {
        1 << self.select()
    }

    /// Number of system clocks in one SCLK period.
    pub fn period(self) -> u32 {
        2 * self.half_period() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    width: u8,
    null_cycles: u8,
    clock_divisor: ClockDivisor,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            width: 12,
            null_cycles: 2,
            clock_divisor: ClockDivisor::default(),
        }
    }
}

impl Configuration {
    pub fn new(width: u8, null_cycles: u8, clock_divisor: ClockDivisor) -> Result<Configuration> {
        if width == 0 || width > MAX_WIDTH {
            return Err(Error::InvalidConfiguration("width must be within 1..=16"))
        }
        if null_cycles > MAX_NULL_CYCLES {
            return Err(Error::InvalidConfiguration("null cycle count must be within 0..=3"))
        }
        Ok(Configuration { width, null_cycles, clock_divisor })
    }

    /// Decode the configuration input. Every byte value is a valid configuration.
    pub fn from_bits(bits: u8) -> Configuration {
        Configuration {
            width: ((bits >> WIDTH_SHIFT) & WIDTH_MASK) + 1,
            null_cycles: (bits >> NULL_SHIFT) & NULL_MASK,
            clock_divisor: ClockDivisor::from_select((bits >> CLKDIV_SHIFT) & CLKDIV_MASK),
        }
    }

    pub fn bits(&self) -> u8 {
        ((self.width - 1) & WIDTH_MASK) << WIDTH_SHIFT |
        (self.null_cycles & NULL_MASK) << NULL_SHIFT |
        (self.clock_divisor.select() & CLKDIV_MASK) << CLKDIV_SHIFT
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn null_cycles(&self) -> u8 {
        self.null_cycles
    }

    pub fn clock_divisor(&self) -> ClockDivisor {
        self.clock_divisor
    }

    /// SCLK periods spent with chip-select asserted.
    pub fn total_cycles(&self) -> u8 {
        self.null_cycles + self.width
    }

    /// Bits shifted out on the serial output per acquisition.
    pub fn serial_len(&self) -> usize {
        self.width as usize * crate::CHANNEL_COUNT
    }
}

/// Holds the configuration captured at the start of an acquisition cycle.
///
/// The controller captures the latch on the edge that leaves `Idle`; the captured value is frozen
/// for as long as the latch lives, regardless of what the configuration input does meanwhile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigLatch {
    config: Configuration,
}

impl ConfigLatch {
    pub fn capture(input: u8) -> ConfigLatch {
        ConfigLatch { config: Configuration::from_bits(input) }
    }

    pub fn get(&self) -> &Configuration {
        &self.config
    }
}
