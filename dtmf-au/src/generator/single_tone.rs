use std::f64::consts::TAU;

use super::ToneGenerator;

/// `sin(2π·f·n / sample_rate)` for n = 0, 1, 2, ...
pub struct SineGenerator {
    phase_advance: f64,
    n: u64,
    output: f32,
}

impl SineGenerator {
    pub fn new(frequency_hz: f32, sample_rate: u32) -> Self {
        Self {
            phase_advance: TAU * frequency_hz as f64 / sample_rate as f64,
            n: 0,
            output: 0.0,
        }
    }
}

impl ToneGenerator for SineGenerator {
    fn output(&self) -> f32 {
        self.output
    }

    fn advance(&mut self) {
        // Phase from the sample index, not an accumulator.
        self.output = (self.phase_advance * self.n as f64).sin() as f32;
        self.n += 1;
    }
}

#[derive(Default)]
pub struct Silence;

impl ToneGenerator for Silence {
    fn output(&self) -> f32 {
        0.0
    }

    fn advance(&mut self) {}
}
