use super::single_tone::SineGenerator;
use super::ToneGenerator;

/// Average of two sines, so the sum stays within +/-1.0.
pub struct DualToneGenerator {
    tone_0: SineGenerator,
    tone_1: SineGenerator,
    output: f32,
}

impl DualToneGenerator {
    pub fn new(freq_1_hz: f32, freq_2_hz: f32, sample_rate: u32) -> Self {
        Self {
            tone_0: SineGenerator::new(freq_1_hz, sample_rate),
            tone_1: SineGenerator::new(freq_2_hz, sample_rate),
            output: 0.0,
        }
    }
}

impl ToneGenerator for DualToneGenerator {
    fn output(&self) -> f32 {
        self.output
    }

    fn advance(&mut self) {
        self.tone_0.advance();
        self.tone_1.advance();
        self.output = (self.tone_0.output() + self.tone_1.output()) * 0.5;
    }
}
