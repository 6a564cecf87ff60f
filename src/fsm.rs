//! Acquisition state machine.
//!
//! The machine is expressed as a pure function from the current state and one clock-edge event
//! to the next state and the side effects of that edge. All storage of an in-flight cycle
//! lives inside the state, so leaving a state discards it.

use crate::buffers::ChannelBuffers;
use crate::config::{ConfigLatch, Configuration};
use crate::divider::{ClockDivider, Edge};
use crate::regs::pins::{Outputs, UioOut, UoOut};
use crate::serializer::Serializer;
use crate::CHANNEL_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Idle,
    Sampling,
    Draining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampling {
    latch: ConfigLatch,
    divider: ClockDivider,
    cycle: u8, // SCLK rising edges since chip-select asserted
    buffers: ChannelBuffers,
}

impl Sampling {
    fn new(latch: ConfigLatch) -> Sampling {
        let config = *latch.get();
        Sampling {
            latch,
            divider: ClockDivider::new(config.clock_divisor()),
            cycle: 0,
            buffers: ChannelBuffers::new(config.width()),
        }
    }

    pub fn config(&self) -> &Configuration {
        self.latch.get()
    }

    pub fn cycle(&self) -> u8 {
        self.cycle
    }

    pub fn buffers(&self) -> &ChannelBuffers {
        &self.buffers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Idle,
    Sampling(Sampling),
    Draining(Serializer),
}

impl State {
    pub fn kind(&self) -> AcquisitionState {
        match self {
            State::Idle => AcquisitionState::Idle,
            State::Sampling(_) => AcquisitionState::Sampling,
            State::Draining(_) => AcquisitionState::Draining,
        }
    }

    /// Pin levels driven while in this state.
    pub fn outputs(&self) -> Outputs {
        match self {
            State::Idle => Outputs::IDLE,
            State::Sampling(sampling) => {
                let mut uo_out = UoOut::empty();
                uo_out.set(UoOut::Sclk, sampling.divider.level());
                Outputs { uo_out, ..Outputs::IDLE }
            }
            State::Draining(serializer) => {
                let tx = serializer.current();
                let mut outputs = Outputs::IDLE;
                outputs.uo_out.set(UoOut::TxData, tx);
                outputs.uio_out.set(UioOut::TxMosi, tx);
                outputs
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// `rst_n` held low.
    Reset,
    /// `ena` held low.
    Disable,
    /// A system clock rising edge with the current input levels.
    Clock { config: u8, miso: [bool; CHANNEL_COUNT] },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Select {
    Assert,
    Deassert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Lead-in sample, thrown away.
    Null { cycle: u8 },
    Data { index: u8, bits: [bool; CHANNEL_COUNT] },
}

/// What happened on an edge, beyond the state change itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Effects {
    pub latched: Option<Configuration>,
    pub select: Option<Select>,
    pub capture: Option<Capture>,
    pub emit: Option<bool>,
    /// In-flight data dropped by a reset or disable.
    pub aborted: bool,
}

pub fn step(state: State, event: Event) -> (State, Effects) {
    let mut effects = Effects::default();
    let (config, miso) = match event {
        Event::Reset | Event::Disable => {
            match state {
                State::Idle => (),
                State::Sampling(_) => {
                    effects.select = Some(Select::Deassert);
                    effects.aborted = true;
                }
                State::Draining(_) => effects.aborted = true,
            }
            return (State::Idle, effects)
        }
        Event::Clock { config, miso } => (config, miso),
    };

    let next = match state {
        State::Idle => {
            let latch = ConfigLatch::capture(config);
            effects.latched = Some(*latch.get());
            effects.select = Some(Select::Assert);
            State::Sampling(Sampling::new(latch))
        }
        State::Sampling(mut sampling) => {
            let null_cycles = sampling.config().null_cycles();
            let total = sampling.config().total_cycles();
            match sampling.divider.tick() {
                Some(Edge::Rising) if sampling.cycle < total => {
                    effects.capture = Some(if sampling.cycle < null_cycles {
                        Capture::Null { cycle: sampling.cycle }
                    } else {
                        let index = sampling.cycle - null_cycles;
                        sampling.buffers.push(index, miso);
                        Capture::Data { index, bits: miso }
                    });
                    sampling.cycle += 1;
                    State::Sampling(sampling)
                }
                Some(Edge::Falling) if sampling.cycle == total => {
                    let serializer = Serializer::new(sampling.buffers);
                    effects.select = Some(Select::Deassert);
                    effects.emit = Some(serializer.current());
                    State::Draining(serializer)
                }
                _ => State::Sampling(sampling),
            }
        }
        State::Draining(mut serializer) => {
            match serializer.advance() {
                Some(bit) => {
                    effects.emit = Some(bit);
                    State::Draining(serializer)
                }
                None => State::Idle,
            }
        }
    };
    (next, effects)
}
