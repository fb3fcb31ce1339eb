use thiserror::Error;

use crate::keypad::{self, FrequencyHz};

use self::dual_tone::DualToneGenerator;
use self::single_tone::{SineGenerator, Silence};

pub mod dual_tone;
pub mod single_tone;

pub trait ToneGenerator {
    fn output(&self) -> f32;
    fn advance(&mut self);
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GenerateError {
    #[error("{row}Hz/{column}Hz is not a DTMF row/column pair")]
    InvalidFrequency { row: FrequencyHz, column: FrequencyHz },
    #[error("unknown symbol {0:?}")]
    UnknownSymbol(char),
}

pub type Result<T> = std::result::Result<T, GenerateError>;

/// Number of samples covering `duration_ms` at `sample_rate`.
///
/// Rounds down, matching integer division of `sample_rate * duration_ms` by
/// 1000. Waveform lengths are reproducible only if every producer agrees on
/// this, so it is deliberately not rounded to nearest.
///
pub fn sample_count(sample_rate: u32, duration_ms: u32) -> usize {
    (sample_rate as u64 * duration_ms as u64 / 1000) as usize
}

fn take<G: ToneGenerator>(mut generator: G, count: usize) -> Vec<f32> {
    (0..count)
        .map(|_| {
            generator.advance();
            generator.output()
        })
        .collect()
}

pub fn single_frequency_wave(frequency_hz: f32, sample_rate: u32, duration_ms: u32) -> Vec<f32> {
    take(SineGenerator::new(frequency_hz, sample_rate), sample_count(sample_rate, duration_ms))
}

pub fn dual_frequency_wave(row: FrequencyHz, column: FrequencyHz, sample_rate: u32, duration_ms: u32) -> Result<Vec<f32>> {
    if !keypad::is_row(row) || !keypad::is_column(column) {
        return Err(GenerateError::InvalidFrequency { row, column });
    }

    let generator = DualToneGenerator::new(row as f32, column as f32, sample_rate);
    Ok(take(generator, sample_count(sample_rate, duration_ms)))
}

pub fn silence(sample_rate: u32, duration_ms: u32) -> Vec<f32> {
    take(Silence, sample_count(sample_rate, duration_ms))
}

fn symbol_wave(symbol: char, sample_rate: u32, duration_ms: u32) -> Result<Vec<f32>> {
    if symbol == ' ' {
        return Ok(silence(sample_rate, duration_ms));
    }

    let pair = keypad::pair_for_symbol(symbol).ok_or(GenerateError::UnknownSymbol(symbol))?;
    dual_frequency_wave(pair.row, pair.column, sample_rate, duration_ms)
}

/// Concatenated tones for `symbols`, one `duration_ms` slot per character.
/// A space is a slot of silence; `S` and `H` stand in for `*` and `#`.
///
pub fn synthesize_sequence(symbols: &str, sample_rate: u32, duration_ms: u32) -> Result<Vec<f32>> {
    synthesize_with_pause(symbols, sample_rate, duration_ms, 0)
}

/// Like [`synthesize_sequence`], with `pause_ms` of silence appended after
/// every tone (but not after an explicit space).
///
pub fn synthesize_with_pause(symbols: &str, sample_rate: u32, tone_ms: u32, pause_ms: u32) -> Result<Vec<f32>> {
    let pause = silence(sample_rate, pause_ms);

    let mut samples = Vec::new();
    for symbol in symbols.chars() {
        samples.extend(symbol_wave(symbol, sample_rate, tone_ms)?);
        if symbol != ' ' {
            samples.extend_from_slice(&pause);
        }
    }

    Ok(samples)
}

///////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use super::*;

    #[test]
    fn one_second_at_8khz() {
        assert_eq!(single_frequency_wave(440.0, 8000, 1000).len(), 8000);
        assert_eq!(dual_frequency_wave(697, 1209, 8000, 1000).unwrap().len(), 8000);
        assert_eq!(silence(8000, 1000).len(), 8000);
    }

    #[test]
    fn length_scales_with_duration() {
        for duration_ms in [0, 40, 80, 1000, 2500] {
            let expected = 8 * duration_ms as usize;
            assert_eq!(single_frequency_wave(1000.0, 8000, duration_ms).len(), expected);
            assert_eq!(dual_frequency_wave(941, 1633, 8000, duration_ms).unwrap().len(), expected);
            assert_eq!(silence(8000, duration_ms).len(), expected);
        }
    }

    #[test]
    fn sample_count_rounds_down() {
        assert_eq!(sample_count(44100, 1), 44);
        assert_eq!(sample_count(11025, 40), 441);
        assert_eq!(sample_count(8000, 0), 0);
        assert_eq!(sample_count(22050, 3), 66);
    }

    #[test]
    fn sine_values() {
        let wave = single_frequency_wave(1000.0, 8000, 1);
        assert_eq!(wave[0], 0.0);
        // Quarter period at 1 kHz / 8 kHz is sample 2.
        assert!((wave[2] - 1.0).abs() < 1e-6);
        assert!((wave[6] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn dual_tone_is_average_of_sines() {
        let wave = dual_frequency_wave(770, 1336, 8000, 10).unwrap();
        for (n, &value) in wave.iter().enumerate() {
            let a = (TAU * 770.0 * n as f64 / 8000.0).sin();
            let b = (TAU * 1336.0 * n as f64 / 8000.0).sin();
            let expected = ((a + b) / 2.0) as f32;
            assert!((value - expected).abs() < 1e-5, "sample {n}: {value} vs {expected}");
            assert!(value.abs() <= 1.0);
        }
    }

    #[test]
    fn dual_tone_rejects_non_keypad_frequencies() {
        assert_eq!(
            dual_frequency_wave(697, 770, 8000, 40),
            Err(GenerateError::InvalidFrequency { row: 697, column: 770 })
        );
        assert_eq!(
            dual_frequency_wave(1209, 697, 8000, 40),
            Err(GenerateError::InvalidFrequency { row: 1209, column: 697 })
        );
        assert!(dual_frequency_wave(700, 1209, 8000, 40).is_err());
    }

    #[test]
    fn silence_is_zero() {
        assert!(silence(8000, 40).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn sequence_concatenates_slots() {
        let wave = synthesize_sequence("1 2", 8000, 40).unwrap();
        assert_eq!(wave.len(), 3 * 320);

        assert_eq!(&wave[..320], &dual_frequency_wave(697, 1209, 8000, 40).unwrap()[..]);
        assert!(wave[320..640].iter().all(|&x| x == 0.0));
        assert_eq!(&wave[640..], &dual_frequency_wave(697, 1336, 8000, 40).unwrap()[..]);
    }

    #[test]
    fn aliases_match_symbols() {
        assert_eq!(synthesize_sequence("S", 8000, 40), synthesize_sequence("*", 8000, 40));
        assert_eq!(synthesize_sequence("H", 8000, 40), synthesize_sequence("#", 8000, 40));
        assert_eq!(synthesize_sequence("1S2H", 8000, 40), synthesize_sequence("1*2#", 8000, 40));
    }

    #[test]
    fn unknown_symbol() {
        assert_eq!(synthesize_sequence("12x", 8000, 40), Err(GenerateError::UnknownSymbol('x')));
        assert_eq!(synthesize_sequence("a", 8000, 40), Err(GenerateError::UnknownSymbol('a')));
    }

    #[test]
    fn empty_sequence() {
        assert_eq!(synthesize_sequence("", 8000, 40), Ok(Vec::new()));
    }

    #[test]
    fn pause_follows_each_tone() {
        let wave = synthesize_with_pause("12", 8000, 40, 20).unwrap();
        assert_eq!(wave.len(), 2 * (320 + 160));
        assert!(wave[320..480].iter().all(|&x| x == 0.0));
        assert!(wave[800..].iter().all(|&x| x == 0.0));

        // Explicit spaces don't get an extra pause.
        assert_eq!(synthesize_with_pause(" ", 8000, 40, 20).unwrap().len(), 320);
        assert_eq!(synthesize_with_pause("5 9", 8000, 40, 0), synthesize_sequence("5 9", 8000, 40));
    }
}
