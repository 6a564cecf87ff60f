use bitflags::bitflags;

use crate::CHANNEL_COUNT;

bitflags! {
    /// Dedicated outputs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UoOut: u8 {
        const Sclk      = 1<<0;
        const CsN       = 1<<1;
        const TxData    = 1<<3;
    }
}

impl UoOut {
    /// Outputs while no acquisition is in progress: SCLK low, chip-select released, TX low.
    pub const IDLE: UoOut = UoOut::CsN;

    pub fn sclk(self) -> bool {
        self.contains(UoOut::Sclk)
    }

    pub fn cs_n(self) -> bool {
        self.contains(UoOut::CsN)
    }

    pub fn tx_data(self) -> bool {
        self.contains(UoOut::TxData)
    }
}

bitflags! {
    /// Bidirectional pins, input direction. The low nibble carries the MISO lines.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UioIn: u8 {
        const Miso0     = 1<<0;
        const Miso1     = 1<<1;
        const Miso2     = 1<<2;
        const Miso3     = 1<<3;
    }
}

impl UioIn {
    pub fn miso(index: usize) -> Self {
        match index {
            0 => UioIn::Miso0,
            1 => UioIn::Miso1,
            2 => UioIn::Miso2,
            3 => UioIn::Miso3,
            _ => unreachable!()
        }
    }

    pub fn from_miso(bits: [bool; CHANNEL_COUNT]) -> Self {
        let mut value = UioIn::empty();
        for (index, bit) in bits.into_iter().enumerate() {
            value.set(UioIn::miso(index), bit);
        }
        value
    }

    pub fn miso_bits(self) -> [bool; CHANNEL_COUNT] {
        [0, 1, 2, 3].map(|index| self.contains(UioIn::miso(index)))
    }
}

bitflags! {
    /// Bidirectional pins, output direction (and output enable).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UioOut: u8 {
        const TxMosi    = 1<<7;
    }
}

impl UioOut {
    /// Only the TX MOSI pin is ever driven; the MISO nibble stays an input.
    pub const OUTPUT_ENABLE: UioOut = UioOut::TxMosi;

    pub fn tx_mosi(self) -> bool {
        self.contains(UioOut::TxMosi)
    }
}

/// Everything presented to the controller on one system clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inputs {
    pub rst_n: bool,
    pub ena: bool,
    pub ui_in: u8,
    pub uio_in: UioIn,
}

impl Default for Inputs {
    fn default() -> Self {
        Inputs { rst_n: false, ena: true, ui_in: 0, uio_in: UioIn::empty() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outputs {
    pub uo_out: UoOut,
    pub uio_out: UioOut,
    pub uio_oe: UioOut,
}

impl Outputs {
    pub const IDLE: Outputs = Outputs {
        uo_out: UoOut::IDLE,
        uio_out: UioOut::empty(),
        uio_oe: UioOut::OUTPUT_ENABLE,
    };

    pub fn sclk(&self) -> bool {
        self.uo_out.sclk()
    }

    pub fn cs_n(&self) -> bool {
        self.uo_out.cs_n()
    }

    pub fn tx(&self) -> bool {
        self.uo_out.tx_data()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_miso_packing() {
        let uio_in = UioIn::from_miso([true, false, true, true]);
        assert_eq!(uio_in.bits(), 0b1101);
        assert_eq!(uio_in.miso_bits(), [true, false, true, true]);
    }

    #[test]
    fn test_idle_levels() {
        assert!(!Outputs::IDLE.sclk());
        assert!(Outputs::IDLE.cs_n());
        assert!(!Outputs::IDLE.tx());
        assert_eq!(Outputs::IDLE.uio_oe.bits(), 0x80);
    }
}
