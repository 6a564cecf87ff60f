use crate::adc::{Adc, PatternAdc};
use crate::config::Configuration;
use crate::controller::Controller;
use crate::regs::pins::{Inputs, Outputs, UioIn};
use crate::trace::{PinSample, Trace};
use crate::{Error, Result, CHANNEL_COUNT};

/// System clocks to hold `rst_n` low during startup.
pub const RESET_TICKS: usize = 10;

/// Upper bound on system clocks spent in any single phase of an acquisition. The slowest
/// possible cycle (16 data bits, 3 null cycles, SCLK at 1/16) selects for 304 clocks.
pub const ACQUIRE_TIMEOUT_TICKS: usize = 1024;

/// Everything observed on the pins during one acquisition cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub config: Configuration,
    /// SCLK rising edges while CS_N was low.
    pub sclk_rising_edges: usize,
    /// System clocks with CS_N low.
    pub select_ticks: usize,
    /// Serial output, one entry per system clock of the drain.
    pub bits: Vec<bool>,
}

impl Acquisition {
    /// Reassemble the per-channel codes from the serial stream.
    pub fn words(&self) -> [u16; CHANNEL_COUNT] {
        let width = self.config.width() as usize;
        let mut words = [0u16; CHANNEL_COUNT];
        for (word, chunk) in words.iter_mut().zip(self.bits.chunks(width)) {
            *word = chunk.iter().fold(0, |word, &bit| word << 1 | bit as u16);
        }
        words
    }
}

/// The controller wired to four ADC front ends, driven the way a board would drive it.
#[derive(Debug)]
pub struct Device<A: Adc> {
    controller: Controller,
    adcs: [A; CHANNEL_COUNT],
    inputs: Inputs,
    outputs: Outputs,
    trace: Option<Trace>,
}

impl Device<PatternAdc> {
    /// Front ends that return the fixed `codes`, framed to match `config`.
    pub fn with_codes(config: Configuration, codes: [u16; CHANNEL_COUNT]) -> Device<PatternAdc> {
        Device::new(config, codes.map(|code| PatternAdc::new(code, &config)))
    }
}

impl<A: Adc> Device<A> {
    pub fn new(config: Configuration, adcs: [A; CHANNEL_COUNT]) -> Device<A> {
        let controller = Controller::new();
        let outputs = controller.outputs();
        Device {
            controller,
            adcs,
            inputs: Inputs { ui_in: config.bits(), ..Inputs::default() },
            outputs,
            trace: None,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn adcs(&self) -> &[A; CHANNEL_COUNT] {
        &self.adcs
    }

    pub fn adcs_mut(&mut self) -> &mut [A; CHANNEL_COUNT] {
        &mut self.adcs
    }

    pub fn outputs(&self) -> Outputs {
        self.outputs
    }

    /// Present a new configuration; the controller picks it up at the start of its next cycle.
    pub fn configure(&mut self, config: &Configuration) {
        log::debug!("configure({:?})", config);
        self.inputs.ui_in = config.bits();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.inputs.ena = enabled;
    }

    pub fn start_trace(&mut self) {
        self.trace = Some(Trace::new());
    }

    pub fn take_trace(&mut self) -> Option<Trace> {
        self.trace.take()
    }

    /// Hold reset for `ticks` system clocks, then release it.
    pub fn reset(&mut self, ticks: usize) {
        log::debug!("reset({})", ticks);
        self.inputs.rst_n = false;
        for _ in 0..ticks {
            self.tick();
        }
        self.inputs.rst_n = true;
    }

    pub fn startup(&mut self) {
        self.reset(RESET_TICKS);
    }

    /// Advance one system clock and let the front ends react to the resulting pin edges.
    pub fn tick(&mut self) -> Outputs {
        self.inputs.uio_in = UioIn::from_miso([0, 1, 2, 3].map(|index| self.adcs[index].miso()));
        self.controller.tick(&self.inputs);
        let before = self.outputs;
        let after = self.controller.outputs();
        self.outputs = after;

        if before.cs_n() && !after.cs_n() {
            self.adcs.iter_mut().for_each(|adc| adc.select());
        } else if !before.cs_n() && after.cs_n() {
            self.adcs.iter_mut().for_each(|adc| adc.deselect());
        } else if before.sclk() && !after.sclk() {
            self.adcs.iter_mut().for_each(|adc| adc.shift());
        }

        if let Some(trace) = self.trace.as_mut() {
            trace.push(PinSample::new(&self.inputs, &after));
        }
        after
    }

    fn tick_until<F: Fn(&Outputs) -> bool>(&mut self, what: &str, cond: F) -> Result<()> {
        for _ in 0..ACQUIRE_TIMEOUT_TICKS {
            if cond(&self.outputs) {
                return Ok(())
            }
            self.tick();
        }
        log::debug!("timed out waiting for {}", what);
        Err(Error::Timeout { ticks: ACQUIRE_TIMEOUT_TICKS })
    }

    /// Run one full acquisition cycle and return what appeared on the pins.
    ///
    /// Waits for the next chip-select assertion, so a cycle already in flight is skipped.
    /// The frame geometry is taken from the configuration presented when chip-select asserts.
    pub fn acquire(&mut self) -> Result<Acquisition> {
        if !self.inputs.rst_n {
            return Err(Error::Protocol("acquisition requested while held in reset".into()))
        }
        // let a cycle in flight finish, then wait for a fresh one
        self.tick_until("CS_N high", |outputs| outputs.cs_n())?;
        self.tick_until("CS_N low", |outputs| !outputs.cs_n())?;
        let config = Configuration::from_bits(self.inputs.ui_in);

        let mut sclk_rising_edges = 0;
        let mut select_ticks = 0;
        while !self.outputs.cs_n() {
            if self.outputs.tx() || self.outputs.uio_out.tx_mosi() {
                return Err(Error::Protocol("TX active during sampling".into()))
            }
            select_ticks += 1;
            if select_ticks > ACQUIRE_TIMEOUT_TICKS {
                return Err(Error::Timeout { ticks: ACQUIRE_TIMEOUT_TICKS })
            }
            let sclk = self.outputs.sclk();
            let outputs = self.tick();
            if !sclk && outputs.sclk() {
                sclk_rising_edges += 1;
            }
        }
        if sclk_rising_edges != config.total_cycles() as usize {
            return Err(Error::Protocol(format!(
                "{} SCLK rising edges while selected, expected {}",
                sclk_rising_edges, config.total_cycles())))
        }

        let mut bits = Vec::with_capacity(config.serial_len());
        for index in 0..config.serial_len() {
            if index > 0 {
                self.tick();
            }
            if !self.outputs.cs_n() || self.outputs.sclk() {
                return Err(Error::Protocol(format!("select or SCLK active at drain bit {}", index)))
            }
            bits.push(self.outputs.tx());
        }
        let outputs = self.tick();
        if outputs.tx() || outputs.uio_out.tx_mosi() {
            return Err(Error::Protocol(format!("TX still active after {} drain bits", bits.len())))
        }
        log::debug!("acquired {} bits in {} select ticks", bits.len(), select_ticks);
        Ok(Acquisition { config, sclk_rising_edges, select_ticks, bits })
    }
}
