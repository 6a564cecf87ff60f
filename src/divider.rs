//! SCLK generation from the system clock.

use crate::config::ClockDivisor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising  = 0b01,
    Falling = 0b10,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockDivider {
    divisor: ClockDivisor,
    count: u8, // system clocks since the last toggle
    level: bool,
}

impl ClockDivider {
    /// Create a divider with its phase reset: SCLK low, first rising edge `half_period` ticks away.
    pub fn new(divisor: ClockDivisor) -> ClockDivider {
        ClockDivider { divisor, count: 0, level: false }
    }

    pub fn divisor(&self) -> ClockDivisor {
        self.divisor
    }

    pub fn level(&self) -> bool {
        self.level
    }

    /// Advance by one system clock, returning the SCLK edge produced on this clock, if any.
    pub fn tick(&mut self) -> Option<Edge> {
        self.count += 1;
        if self.count < self.divisor.half_period() {
            return None
        }
        self.count = 0;
        self.level = !self.level;
        Some(if self.level { Edge::Rising } else { Edge::Falling })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn edges(divisor: ClockDivisor, ticks: usize) -> Vec<Option<Edge>> {
        let mut divider = ClockDivider::new(divisor);
        (0..ticks).map(|_| divider.tick()).collect()
    }

    #[test]
    fn test_div2() {
        use Edge::*;
        assert_eq!(edges(ClockDivisor::Div2, 4),
                   [Some(Rising), Some(Falling), Some(Rising), Some(Falling)]);
    }

    #[test]
    fn test_div8() {
        use Edge::*;
        let edges = edges(ClockDivisor::Div8, 8);
        assert_eq!(edges, [None, None, None, Some(Rising), None, None, None, Some(Falling)]);
    }

    #[test]
    fn test_period_matches_divisor() {
        for select in 0..4 {
            let divisor = ClockDivisor::from_select(select);
            let edges = edges(divisor, 64);
            let rising = edges.iter()
                .enumerate()
                .filter(|(_, edge)| **edge == Some(Edge::Rising))
                .map(|(index, _)| index)
                .collect::<Vec<_>>();
            assert_eq!(rising[1] - rising[0], divisor.period() as usize);
            assert_eq!(rising.len(), 64 / divisor.period() as usize);
        }
    }

    #[test]
    fn test_starts_low() {
        let divider = ClockDivider::new(ClockDivisor::Div16);
        assert!(!divider.level());
    }
}
