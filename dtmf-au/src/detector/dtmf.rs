use std::iter::FusedIterator;
use std::slice::ChunksExact;

use tracing::trace;

use crate::codec::pcm::Sample;
use crate::keypad::{self, FrequencyHz, FREQUENCIES};

use super::goertzel::GoertzelFilter;
use super::DetectionEvent;

/// Squared Goertzel magnitude of each keypad tone over one block, in the
/// order of [`keypad::FREQUENCIES`] (four rows, then four columns).
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Magnitudes(pub [f32; 8]);

impl Magnitudes {
    /// Strongest first. Equal magnitudes keep ascending frequency order.
    pub fn ranked(&self) -> [(FrequencyHz, f32); 8] {
        let mut ranked = [0, 1, 2, 3, 4, 5, 6, 7].map(|n| (FREQUENCIES[n], self.0[n]));
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// The outcome for one block. `symbol` is `None` when nothing was
/// detected; that is an ordinary result, not an error.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Detection {
    pub symbol: Option<char>,
    pub strongest: f32,
    pub second: f32,
    pub magnitudes: Magnitudes,
}

pub struct Detector {
    sample_rate: u32,
    threshold: f32,
    filters: [GoertzelFilter; 8],
}

impl Detector {
    /// The resonators run in `f32`. Over very long blocks (tens of seconds)
    /// rounding leaves a noise floor in the off-tone bins, so keep the
    /// threshold well above zero there.
    pub fn new(sample_rate: u32, threshold: f32) -> Self {
        let filters = FREQUENCIES.map(|frequency| GoertzelFilter::from_hz(frequency as f32, sample_rate));

        for filter in &filters {
            trace!("goertzel {:4}Hz @ {sample_rate}Hz: coeff={:.6}", filter.frequency_hz(), filter.coefficient());
        }

        Self {
            sample_rate,
            threshold,
            filters,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn filters(&self) -> &[GoertzelFilter; 8] {
        &self.filters
    }

    pub fn magnitudes(&self, block: &[Sample]) -> Magnitudes {
        Magnitudes(self.filters.map(|filter| filter.power(block)))
    }

    pub fn process(&self, block: &[Sample]) -> Detection {
        self.decide(self.magnitudes(block))
    }

    fn decide(&self, magnitudes: Magnitudes) -> Detection {
        let ranked = magnitudes.ranked();
        let (frequency_0, strongest) = ranked[0];
        let (frequency_1, second) = ranked[1];

        // Both tones must clear the threshold, whatever the pair maps to.
        let energetic = strongest > self.threshold && second > self.threshold;
        let symbol = if energetic {
            keypad::symbol_for_pair(frequency_0, frequency_1)
        } else {
            None
        };

        Detection {
            symbol,
            strongest,
            second,
            magnitudes,
        }
    }

    /// One [`Detection`] per full block of `block_length` samples, lazily and
    /// in sample order. A trailing partial block is dropped. A block length
    /// of zero yields nothing.
    pub fn process_stream<'a>(&'a self, samples: &'a [Sample], block_length: usize) -> Blocks<'a> {
        let chunks = if block_length == 0 {
            samples[..0].chunks_exact(1)
        } else {
            samples.chunks_exact(block_length)
        };

        Blocks {
            detector: self,
            chunks,
        }
    }

    /// Same output as collecting [`process_stream`](Self::process_stream),
    /// with the blocks shared out over `jobs` threads.
    pub fn process_stream_parallel(&self, samples: &[Sample], block_length: usize, jobs: usize) -> Vec<Detection> {
        let blocks = if block_length == 0 { 0 } else { samples.len() / block_length };
        if blocks == 0 {
            return Vec::new();
        }

        let jobs = jobs.clamp(1, blocks);
        let blocks_per_job = (blocks + jobs - 1) / jobs;
        let samples = &samples[..blocks * block_length];

        crossbeam::scope(|scope| {
            let handles: Vec<_> = samples
                .chunks(blocks_per_job * block_length)
                .map(|part| scope.spawn(move |_| self.process_stream(part, block_length).collect::<Vec<_>>()))
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
        .unwrap_or_else(|e| std::panic::resume_unwind(e))
    }
}

pub struct Blocks<'a> {
    detector: &'a Detector,
    chunks: ChunksExact<'a, Sample>,
}

impl Iterator for Blocks<'_> {
    type Item = Detection;

    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next().map(|block| self.detector.process(block))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Blocks<'_> {}
impl FusedIterator for Blocks<'_> {}

///////////////////////////////////////////////////////////////////////

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum DetectionState {
    Idle,
    Pending { symbol: char, blocks: usize },
    Held(char),
}

/// Turns per-block detections into key presses. A key is reported once it
/// has been seen in `min_blocks` consecutive blocks, and not again until a
/// block with no detection or a different symbol breaks the run.
struct DetectionStateMachine {
    state: DetectionState,
    min_blocks: usize,
}

impl DetectionStateMachine {
    fn new(min_blocks: usize) -> Self {
        Self {
            state: DetectionState::Idle,
            min_blocks: min_blocks.max(1),
        }
    }

    fn feed(&mut self, detection: Option<char>) -> Option<DetectionEvent> {
        use DetectionState::*;

        let symbol = match detection {
            Some(symbol) => symbol,
            None => {
                self.state = Idle;
                return None;
            },
        };

        let blocks = match self.state {
            Held(held) if held == symbol => return None,
            Pending { symbol: pending, blocks } if pending == symbol => blocks + 1,
            _ => 1,
        };

        if blocks >= self.min_blocks {
            self.state = Held(symbol);
            Some(DetectionEvent::Key(symbol))
        } else {
            self.state = Pending { symbol, blocks };
            None
        }
    }
}

/// Pushes samples one at a time through a block [`Detector`], reporting
/// debounced key presses. A block length of zero never completes a block,
/// so nothing is reported.
pub struct KeyDetector {
    detector: Detector,
    block: Vec<Sample>,
    block_length: usize,
    state_machine: DetectionStateMachine,
}

impl KeyDetector {
    pub fn new(detector: Detector, block_length: usize, min_blocks: usize) -> Self {
        Self {
            detector,
            block: Vec::with_capacity(block_length),
            block_length,
            state_machine: DetectionStateMachine::new(min_blocks),
        }
    }
}

impl super::Detector for KeyDetector {
    fn advance(&mut self, sample: Sample) -> Option<DetectionEvent> {
        if self.block_length == 0 {
            return None;
        }

        self.block.push(sample);
        if self.block.len() < self.block_length {
            return None;
        }

        let detection = self.detector.process(&self.block);
        self.block.clear();
        self.state_machine.feed(detection.symbol)
    }
}

/// Collapses per-block symbols into the keys that were pressed:
/// `1 1 1 . . 2 2` becomes `12`, while `1 1 . 1` is two presses of `1`.
pub fn collapse_symbols<I>(detections: I) -> String
where
    I: IntoIterator<Item = Option<char>>,
{
    let mut state_machine = DetectionStateMachine::new(1);
    detections
        .into_iter()
        .filter_map(|detection| state_machine.feed(detection))
        .map(|DetectionEvent::Key(key)| key)
        .collect()
}

///////////////////////////////////////////////////////////////////////
