//! Cycle-accurate model of a four-channel serial ADC acquisition controller.
//!
//! The controller selects four single-bit ADCs at once, clocks `null_cycles + width` bits out of
//! each on a divided serial clock, keeps the last `width` of them, and then shifts all four
//! samples out on one line at the full system clock rate.

mod regs;
mod config;
mod divider;
mod buffers;
mod serializer;
mod fsm;
mod controller;
mod adc;
mod device;
mod trace;

/// Number of ADC channels sampled in lock-step.
pub const CHANNEL_COUNT: usize = 4;

#[derive(Debug)]
pub enum Error {
    InvalidConfiguration(&'static str),
    Protocol(String),
    Timeout { ticks: usize },
    Io(std::io::Error),
    Other(Box<dyn std::error::Error + Sync + Send + 'static>),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InvalidConfiguration(reason) =>
                write!(f, "invalid configuration: {}", reason),
            Self::Protocol(violation) =>
                write!(f, "protocol violation: {}", violation),
            Self::Timeout { ticks } =>
                write!(f, "no progress after {} system clocks", ticks),
            Self::Io(io_error) =>
                write!(f, "I/O error: {}", io_error),
            Self::Other(error) =>
                write!(f, "{}", error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            &Self::Io(ref io_error) => Some(io_error),
            _ => None
        }
    }
}

impl From<Error> for std::io::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::Io(io_error) =>
                io_error,
            Error::Timeout { .. } =>
                Self::new(io::ErrorKind::TimedOut, error),
            Error::InvalidConfiguration(_) =>
                Self::new(io::ErrorKind::InvalidInput, error),
            error =>
                Self::new(io::ErrorKind::Other, error),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        // round-trip errors that were converted from `Error` in the first place
        match error.downcast::<Self>() {
            Ok(error) => error,
            Err(error) => Error::Io(error),
        }
    }
}

pub type Result<T> =
    core::result::Result<T, Error>;

use std::io;

pub use config::{
    ClockDivisor,
    ConfigLatch,
    Configuration,
    MAX_NULL_CYCLES,
    MAX_WIDTH,
};

pub use divider::{
    ClockDivider,
    Edge,
};

pub use buffers::{
    ChannelBuffer,
    ChannelBuffers,
};

pub use serializer::Serializer;

pub use fsm::{
    step,
    AcquisitionState,
    Capture,
    Effects,
    Event,
    Sampling,
    Select,
    State,
};

pub use controller::Controller;

pub use regs::pins::{
    Inputs,
    Outputs,
    UioIn,
    UioOut,
    UoOut,
};

pub use adc::{
    Adc,
    PatternAdc,
};

pub use device::{
    Acquisition,
    Device,
    ACQUIRE_TIMEOUT_TICKS,
    RESET_TICKS,
};

pub use trace::{
    PinSample,
    Trace,
};

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_io_error_round_trip() {
        let io_error: io::Error = Error::Timeout { ticks: 7 }.into();
        assert_eq!(io_error.kind(), io::ErrorKind::TimedOut);
        assert!(matches!(Error::from(io_error), Error::Timeout { ticks: 7 }));

        let io_error = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(Error::from(io_error), Error::Io(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Error::InvalidConfiguration("width must be within 1..=16").to_string(),
                   "invalid configuration: width must be within 1..=16");
        assert_eq!(Error::Protocol("TX active during sampling".into()).to_string(),
                   "protocol violation: TX active during sampling");
    }
}
