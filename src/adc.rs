//! Behavioural models of the serial ADCs that feed the MISO lines.

use crate::config::Configuration;

/// A single-bit serial ADC as seen from the controller's pins.
///
/// The bench calls these on the edges it observes on the controller outputs. A converter is
/// expected to update `miso` on chip-select assertion and on every SCLK falling edge, so that
/// the level is stable at the next SCLK rising edge.
pub trait Adc {
    /// CS_N went low: start a new conversion frame.
    fn select(&mut self);
    /// CS_N went high.
    fn deselect(&mut self);
    /// SCLK fell: shift out the next bit.
    fn shift(&mut self);
    fn miso(&self) -> bool;
}

/// Converter that returns a fixed code, framed as `null_cycles` leading zeroes followed by
/// `width` data bits, most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternAdc {
    code: u16,
    width: u8,
    null_cycles: u8,
    position: Option<u8>, // bit being driven, counted from the start of the frame
    conversions: usize,
}

impl PatternAdc {
    pub fn new(code: u16, frame: &Configuration) -> PatternAdc {
        PatternAdc {
            code,
            width: frame.width(),
            null_cycles: frame.null_cycles(),
            position: None,
            conversions: 0,
        }
    }

    pub fn set_code(&mut self, code: u16) {
        self.code = code;
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    /// Change the frame layout; takes effect on the next selection.
    pub fn set_frame(&mut self, frame: &Configuration) {
        self.width = frame.width();
        self.null_cycles = frame.null_cycles();
    }

    /// Frames started so far.
    pub fn conversions(&self) -> usize {
        self.conversions
    }
}

impl Adc for PatternAdc {
    fn select(&mut self) {
        self.position = Some(0);
        self.conversions += 1;
    }

    fn deselect(&mut self) {
        self.position = None;
    }

    fn shift(&mut self) {
        if let Some(position) = self.position.as_mut() {
            *position = position.saturating_add(1);
        }
    }

    fn miso(&self) -> bool {
        match self.position {
            Some(position) if position >= self.null_cycles => {
                let index = position - self.null_cycles;
                index < self.width && (self.code >> (self.width - 1 - index)) & 1 != 0
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::ClockDivisor;

    fn frame_bits(adc: &mut PatternAdc, len: usize) -> Vec<bool> {
        adc.select();
        let mut bits = Vec::new();
        for _ in 0..len {
            bits.push(adc.miso());
            adc.shift();
        }
        adc.deselect();
        bits
    }

    #[test]
    fn test_null_then_msb_first() {
        let frame = Configuration::new(4, 2, ClockDivisor::Div2).unwrap();
        let mut adc = PatternAdc::new(0b1011, &frame);
        assert!(!adc.miso());
        assert_eq!(frame_bits(&mut adc, 7), [false, false, true, false, true, true, false]);
        assert!(!adc.miso());
        assert_eq!(adc.conversions(), 1);
    }

    #[test]
    fn test_leading_null_bits_are_low() {
        let frame = Configuration::new(3, 3, ClockDivisor::Div2).unwrap();
        let mut adc = PatternAdc::new(0b111, &frame);
        assert_eq!(frame_bits(&mut adc, 6), [false, false, false, true, true, true]);
    }

    #[test]
    fn test_reframe() {
        let mut adc = PatternAdc::new(0xFF00, &Configuration::new(16, 0, ClockDivisor::Div2).unwrap());
        assert_eq!(frame_bits(&mut adc, 1), [true]);
        adc.set_frame(&Configuration::new(16, 1, ClockDivisor::Div2).unwrap());
        assert_eq!(frame_bits(&mut adc, 2), [false, true]);
    }
}
