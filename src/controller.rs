use crate::fsm::{self, AcquisitionState, Capture, Effects, Event, Select, State};
use crate::regs::pins::{Inputs, Outputs};

/// The acquisition controller as seen from its pins.
///
/// Each call to [`Controller::tick`] is one rising edge of the system clock. Outputs are
/// registered: they change only on a tick (or on an asynchronous reset) and reflect the state
/// entered on that tick.
#[derive(Debug, Clone, Default)]
pub struct Controller {
    state: State,
    ticks: u64,
    cycles: u64,
}

impl Controller {
    pub fn new() -> Controller {
        Controller::default()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn acquisition_state(&self) -> AcquisitionState {
        self.state.kind()
    }

    pub fn outputs(&self) -> Outputs {
        self.state.outputs()
    }

    /// System clock edges seen so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Acquisition cycles that ran to the end of their drain.
    pub fn completed_cycles(&self) -> u64 {
        self.cycles
    }

    /// Asynchronous reset: takes effect without waiting for a clock edge.
    pub fn reset(&mut self) {
        self.apply(Event::Reset);
    }

    pub fn tick(&mut self, inputs: &Inputs) -> Effects {
        self.ticks += 1;
        let event = if !inputs.rst_n {
            Event::Reset
        } else if !inputs.ena {
            Event::Disable
        } else {
            Event::Clock { config: inputs.ui_in, miso: inputs.uio_in.miso_bits() }
        };
        self.apply(event)
    }

    fn apply(&mut self, event: Event) -> Effects {
        let before = self.state.kind();
        let (state, effects) = fsm::step(self.state, event);
        self.state = state;
        let after = self.state.kind();

        if let Some(config) = effects.latched {
            log::debug!("latched {:?} (input {:#010b})", config, config.bits());
        }
        match effects.select {
            Some(Select::Assert) => log::trace!("CS_N low"),
            Some(Select::Deassert) => log::trace!("CS_N high"),
            None => (),
        }
        match effects.capture {
            Some(Capture::Null { cycle }) =>
                log::trace!("null cycle {}", cycle),
            Some(Capture::Data { index, bits }) =>
                log::trace!("captured bit {}: {:?}", index, bits),
            None => (),
        }
        if let Some(bit) = effects.emit {
            log::trace!("tx {}", bit as u8);
        }
        if effects.aborted {
            log::debug!("{:?} aborted by {:?}", before, event);
        }
        if before == AcquisitionState::Draining && after == AcquisitionState::Idle && !effects.aborted {
            self.cycles += 1;
        }
        if before != after {
            log::debug!("{:?} -> {:?} at tick {}", before, after, self.ticks);
        }
        effects
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{ClockDivisor, Configuration};
    use crate::regs::pins::UioIn;

    fn running(config: &Configuration) -> Inputs {
        Inputs { rst_n: true, ena: true, ui_in: config.bits(), uio_in: UioIn::empty() }
    }

    #[test]
    fn test_held_in_reset() {
        let mut ctrl = Controller::new();
        let inputs = Inputs::default();
        for _ in 0..10 {
            ctrl.tick(&inputs);
            assert_eq!(ctrl.outputs(), Outputs::IDLE);
        }
        assert_eq!(ctrl.acquisition_state(), AcquisitionState::Idle);
    }

    #[test]
    fn test_disabled_outputs_idle() {
        let config = Configuration::default();
        let mut ctrl = Controller::new();
        ctrl.tick(&running(&config));
        assert_eq!(ctrl.acquisition_state(), AcquisitionState::Sampling);
        let disabled = Inputs { ena: false, ..running(&config) };
        for _ in 0..20 {
            ctrl.tick(&disabled);
            assert_eq!(ctrl.outputs(), Outputs::IDLE);
        }
    }

    #[test]
    fn test_chip_select_spans_sampling() {
        let config = Configuration::new(5, 2, ClockDivisor::Div4).unwrap();
        let inputs = running(&config);
        let mut ctrl = Controller::new();
        let mut low_ticks = 0;
        let mut rising = 0;
        let mut sclk = false;
        ctrl.tick(&inputs);
        while ctrl.acquisition_state() == AcquisitionState::Sampling {
            assert!(!ctrl.outputs().cs_n());
            assert!(!ctrl.outputs().tx());
            low_ticks += 1;
            ctrl.tick(&inputs);
            if ctrl.outputs().sclk() && !sclk {
                rising += 1;
            }
            sclk = ctrl.outputs().sclk();
        }
        assert_eq!(rising, 7);
        assert_eq!(low_ticks, 7 * 4);
        assert!(ctrl.outputs().cs_n());
        assert!(!ctrl.outputs().sclk());
    }

    #[test]
    fn test_async_reset_mid_sampling() {
        let config = Configuration::new(16, 0, ClockDivisor::Div2).unwrap();
        let inputs = running(&config);
        let mut ctrl = Controller::new();
        for _ in 0..9 {
            ctrl.tick(&inputs);
        }
        assert_eq!(ctrl.acquisition_state(), AcquisitionState::Sampling);
        ctrl.reset();
        assert_eq!(ctrl.acquisition_state(), AcquisitionState::Idle);
        assert_eq!(ctrl.outputs(), Outputs::IDLE);
        assert_eq!(ctrl.completed_cycles(), 0);
    }

    #[test]
    fn test_abort_mid_drain() {
        let config = Configuration::new(4, 0, ClockDivisor::Div2).unwrap();
        let inputs = Inputs { uio_in: UioIn::all(), ..running(&config) };
        let aborts = [
            Inputs { rst_n: false, ..inputs },
            Inputs { ena: false, ..inputs },
        ];
        for abort in aborts {
            let mut ctrl = Controller::new();
            while ctrl.acquisition_state() != AcquisitionState::Draining {
                ctrl.tick(&inputs);
            }
            ctrl.tick(&inputs);
            assert_eq!(ctrl.acquisition_state(), AcquisitionState::Draining);
            assert!(ctrl.outputs().tx());

            let effects = ctrl.tick(&abort);
            assert!(effects.aborted);
            assert_eq!(ctrl.acquisition_state(), AcquisitionState::Idle);
            assert_eq!(ctrl.outputs(), Outputs::IDLE);
            for _ in 0..16 {
                ctrl.tick(&abort);
                assert_eq!(ctrl.outputs(), Outputs::IDLE);
            }
            assert_eq!(ctrl.completed_cycles(), 0);
        }
    }

    #[test]
    fn test_back_to_back_cycles() {
        let config = Configuration::new(1, 0, ClockDivisor::Div2).unwrap();
        let inputs = running(&config);
        let mut ctrl = Controller::new();
        // idle, rise, fall/drain 0, drain 1..3, idle: 7 ticks per cycle
        for _ in 0..21 {
            ctrl.tick(&inputs);
        }
        assert_eq!(ctrl.completed_cycles(), 3);
        assert_eq!(ctrl.acquisition_state(), AcquisitionState::Idle);
    }
}
