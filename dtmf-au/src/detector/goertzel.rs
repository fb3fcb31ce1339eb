use std::f64::consts::TAU;

use num_complex::Complex;

use crate::codec::pcm::Sample;

const FULL_SCALE: f32 = Sample::MAX as f32;

/// Recursion state for one resonator over one block. Starts at zero and is
/// thrown away once the block's power has been read out.
#[derive(Copy, Clone, Default, Debug)]
pub struct GoertzelState {
    w_n_z1: f32,
    w_n_z2: f32,
}

impl GoertzelState {
    pub fn iterate(&mut self, k_fb: f32, x_n: f32) {
        let w_n = x_n + self.w_n_z1 * k_fb - self.w_n_z2;
        self.w_n_z2 = self.w_n_z1;
        self.w_n_z1 = w_n;
    }

    pub fn previous(&self) -> f32 {
        self.w_n_z1
    }

    pub fn previous_previous(&self) -> f32 {
        self.w_n_z2
    }
}

/// Single-bin DFT at an arbitrary frequency.
///
/// Only the coefficients live here; they are fixed at construction. Each
/// call to [`power`](Self::power) or [`dft_bin`](Self::dft_bin) runs a
/// fresh [`GoertzelState`] over the block it is given.
///
#[derive(Copy, Clone, Debug)]
pub struct GoertzelFilter {
    frequency_hz: f32,
    k_fb: f32,
    k_ff: Complex<f32>,
}

impl GoertzelFilter {
    pub fn from_hz(frequency_hz: f32, sample_rate: u32) -> Self {
        let omega = TAU * frequency_hz as f64 / sample_rate as f64;
        Self {
            frequency_hz,
            k_fb: (omega.cos() * 2.0) as f32,
            k_ff: -Complex::new(omega.cos() as f32, -omega.sin() as f32),
        }
    }

    pub fn frequency_hz(&self) -> f32 {
        self.frequency_hz
    }

    /// `2·cos(2π·f/sample_rate)`
    pub fn coefficient(&self) -> f32 {
        self.k_fb
    }

    pub fn run(&self, block: &[Sample]) -> GoertzelState {
        let mut state = GoertzelState::default();
        for &x_n in block {
            state.iterate(self.k_fb, x_n as f32);
        }
        state
    }

    /// Squared magnitude of the bin, without the complex feed-forward step.
    pub fn power_of(&self, state: &GoertzelState) -> f32 {
        let w_n_z1 = state.previous();
        let w_n_z2 = state.previous_previous();
        w_n_z1 * w_n_z1 + w_n_z2 * w_n_z2 - self.k_fb * w_n_z1 * w_n_z2
    }

    pub fn power(&self, block: &[Sample]) -> f32 {
        self.power_of(&self.run(block))
    }

    /// The complex bin itself. Its phase is referenced to the last sample
    /// of the block; `dft_bin(b).norm_sqr()` equals `power(b)`.
    pub fn dft_bin(&self, block: &[Sample]) -> Complex<f32> {
        let state = self.run(block);
        Complex::from(state.previous()) + self.k_ff * state.previous_previous()
    }

    /// Level relative to a full-scale sine at this frequency, in dB.
    /// Silence gives negative infinity.
    pub fn level_dbfs(&self, block: &[Sample]) -> f32 {
        if block.is_empty() {
            return f32::NEG_INFINITY;
        }
        let amplitude = self.dft_bin(block).norm() * 2.0 / block.len() as f32;
        (amplitude / FULL_SCALE).log10() * 20.0
    }
}

///////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(frequency_hz: f64, amplitude: f64, n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| (amplitude * (TAU * frequency_hz * i as f64 / 8000.0).sin()) as Sample)
            .collect()
    }

    fn direct_dft_power(block: &[Sample], frequency_hz: f64) -> f64 {
        let omega = TAU * frequency_hz / 8000.0;
        let (mut re, mut im) = (0.0, 0.0);
        for (n, &x) in block.iter().enumerate() {
            re += x as f64 * (omega * n as f64).cos();
            im -= x as f64 * (omega * n as f64).sin();
        }
        re * re + im * im
    }

    #[test]
    fn coefficient() {
        let filter = GoertzelFilter::from_hz(2000.0, 8000);
        assert!(filter.coefficient().abs() < 1e-6);

        let filter = GoertzelFilter::from_hz(697.0, 8000);
        assert!((filter.coefficient() - 1.7077).abs() < 1e-3);
    }

    #[test]
    fn matches_direct_dft() {
        let block = tone(697.0, 100.0, 205);
        for frequency_hz in [697.0, 770.0, 1209.0, 1633.0] {
            let filter = GoertzelFilter::from_hz(frequency_hz as f32, 8000);
            let expected = direct_dft_power(&block, frequency_hz);
            let actual = filter.power(&block) as f64;
            assert!((actual - expected).abs() <= expected * 1e-3 + 1.0,
                "{frequency_hz}Hz: goertzel {actual} vs dft {expected}");
        }
    }

    #[test]
    fn complex_bin_agrees_with_power() {
        let block = tone(852.0, 60.0, 320);
        let filter = GoertzelFilter::from_hz(852.0, 8000);

        let power = filter.power(&block);
        let bin = filter.dft_bin(&block);
        assert!((bin.norm_sqr() - power).abs() <= power * 1e-3);
    }

    #[test]
    fn different_block_lengths() {
        for n in [150, 200, 250, 350, 500, 1000] {
            let block = tone(697.0, 120.0, n);
            let on = GoertzelFilter::from_hz(697.0, 8000).power(&block);
            let off = GoertzelFilter::from_hz(1209.0, 8000).power(&block);
            assert!(on > off * 100.0, "n={n}: on {on} off {off}");
        }
    }

    #[test]
    fn full_scale_level() {
        // 1 kHz lands exactly on a bin for n = 400.
        let block = tone(1000.0, 127.0, 400);
        let level = GoertzelFilter::from_hz(1000.0, 8000).level_dbfs(&block);
        assert!(level.abs() < 0.5, "level {level}dB");

        let quiet = tone(1000.0, 12.7, 400);
        let level = GoertzelFilter::from_hz(1000.0, 8000).level_dbfs(&quiet);
        assert!((level + 20.0).abs() < 1.0, "level {level}dB");
    }

    #[test]
    fn silence() {
        let filter = GoertzelFilter::from_hz(941.0, 8000);
        assert_eq!(filter.power(&[0; 120]), 0.0);
        assert_eq!(filter.level_dbfs(&[0; 120]), f32::NEG_INFINITY);
        assert_eq!(filter.power(&[]), 0.0);
    }
}
