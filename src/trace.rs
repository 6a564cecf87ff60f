//! Per-clock pin recording.

use std::io::Write;

use bytemuck::{Pod, Zeroable};

use crate::regs::pins::{Inputs, Outputs, UoOut};
use crate::{Error, Result};

const CONTROL_RST_N: u8 = 1<<0;
const CONTROL_ENA: u8   = 1<<1;

/// Pin levels right after one system clock edge. The layout is also the raw dump format.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct PinSample {
    pub control: u8,
    pub ui_in: u8,
    pub uio_in: u8,
    pub uo_out: u8,
    pub uio_out: u8,
}

impl PinSample {
    pub fn new(inputs: &Inputs, outputs: &Outputs) -> PinSample {
        PinSample {
            control: (inputs.rst_n as u8) * CONTROL_RST_N | (inputs.ena as u8) * CONTROL_ENA,
            ui_in: inputs.ui_in,
            uio_in: inputs.uio_in.bits(),
            uo_out: outputs.uo_out.bits(),
            uio_out: outputs.uio_out.bits(),
        }
    }

    pub fn rst_n(&self) -> bool {
        self.control & CONTROL_RST_N != 0
    }

    pub fn ena(&self) -> bool {
        self.control & CONTROL_ENA != 0
    }

    pub fn uo_out(&self) -> UoOut {
        UoOut::from_bits_retain(self.uo_out)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    samples: Vec<PinSample>,
}

impl Trace {
    pub fn new() -> Trace {
        Trace::default()
    }

    pub fn push(&mut self, sample: PinSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[PinSample] {
        &self.samples[..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.samples[..])
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Trace> {
        let samples = bytemuck::try_cast_slice::<u8, PinSample>(bytes)
            .map_err(|error| Error::Other(format!("malformed trace: {}", error).into()))?;
        Ok(Trace { samples: samples.to_vec() })
    }

    /// Write the trace as a value change dump, one system clock period of `period_ns` per sample.
    pub fn write_vcd<W: Write>(&self, mut writer: W, period_ns: u64) -> Result<()> {
        const SIGNALS: [(&str, &str, u32); 8] = [
            ("!", "clk", 1),
            ("\"", "rst_n", 1),
            ("#", "ena", 1),
            ("$", "ui_in", 8),
            ("%", "miso", 4),
            ("&", "sclk", 1),
            ("'", "cs_n", 1),
            ("(", "tx", 1),
        ];

        writeln!(writer, "$timescale 1ns $end")?;
        writeln!(writer, "$scope module quadadc $end")?;
        for (id, name, width) in SIGNALS {
            writeln!(writer, "$var wire {} {} {} $end", width, id, name)?;
        }
        writeln!(writer, "$upscope $end")?;
        writeln!(writer, "$enddefinitions $end")?;

        let half_period = (period_ns / 2).max(1);
        let mut previous: Option<[u8; 8]> = None;
        for (index, sample) in self.samples.iter().enumerate() {
            let uo_out = sample.uo_out();
            let values = [
                1,
                sample.rst_n() as u8,
                sample.ena() as u8,
                sample.ui_in,
                sample.uio_in & 0x0f,
                uo_out.sclk() as u8,
                uo_out.cs_n() as u8,
                uo_out.tx_data() as u8,
            ];
            writeln!(writer, "#{}", index as u64 * half_period * 2)?;
            for (signal, (id, _, width)) in SIGNALS.iter().enumerate() {
                if signal != 0 && previous.map(|previous| previous[signal]) == Some(values[signal]) {
                    continue
                }
                if *width == 1 {
                    writeln!(writer, "{}{}", values[signal], id)?;
                } else {
                    writeln!(writer, "b{:b} {}", values[signal], id)?;
                }
            }
            writeln!(writer, "#{}", index as u64 * half_period * 2 + half_period)?;
            writeln!(writer, "0!")?;
            previous = Some(values);
        }
        Ok(())
    }
}
