use std::path::PathBuf;

use clap::{Parser, Subcommand, Args};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dtmf_au::codec::au::{AudioContainer, FormatError};
use dtmf_au::codec::pcm;
use dtmf_au::detector::dtmf::{Detector, KeyDetector};
use dtmf_au::detector::{DetectionEvent, Detector as _};
use dtmf_au::generator::{self, GenerateError};

mod file;
mod report;

#[derive(Error, Debug)]
pub(crate) enum ToolError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("sample rate {0}Hz is below 4000Hz")]
    SampleRate(u32),
    #[error("volume {0} is outside [0, 1]")]
    Volume(f32),
}

pub(crate) type Result<T> = std::result::Result<T, ToolError>;

#[derive(Parser)]
#[clap(author, version, about, long_about=None)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Keys to dial, e.g. "1 2 3". Space is a silent slot, S and H stand in for * and #.
    symbols: String,

    output: PathBuf,

    #[clap(long, short, env = "DTMF_SAMPLE_RATE", default_value_t = 8000)]
    sample_rate: u32,

    /// Signal volume in the range [0,1].
    #[clap(long, short, env = "DTMF_VOLUME", default_value_t = 0.5)]
    volume: f32,

    /// Tone duration in ms.
    #[clap(long, short, env = "DTMF_DURATION_MS", default_value_t = 40)]
    duration: u32,

    /// Silence after each tone, in ms.
    #[clap(long, short, default_value_t = 0)]
    pause: u32,
}

#[derive(Args)]
pub(crate) struct ToneArgs {
    output: PathBuf,

    frequency: f32,

    #[clap(long, short, env = "DTMF_SAMPLE_RATE", default_value_t = 8000)]
    sample_rate: u32,

    #[clap(long, short, default_value_t = 0.8)]
    volume: f32,

    #[clap(long, short, default_value_t = 128)]
    duration: u32,
}

#[derive(Args)]
pub(crate) struct DetectorArgs {
    /// Both of the two strongest tones must exceed this squared magnitude.
    #[clap(long, short, env = "DTMF_THRESHOLD", default_value_t = 1000.0)]
    threshold: f32,

    /// Samples per analysis block.
    #[clap(long, short, env = "DTMF_BLOCK_LENGTH", default_value_t = 120)]
    block_length: usize,
}

#[derive(Args)]
pub(crate) struct DetectArgs {
    input: PathBuf,

    #[clap(flatten)]
    detector: DetectorArgs,

    /// Print only the keys pressed, not every block.
    #[clap(long, short)]
    keys: bool,

    /// Consecutive blocks a key must persist to count as pressed.
    #[clap(long, default_value_t = 1)]
    min_blocks: usize,

    /// Worker threads for block analysis. Ignored with --keys, which
    /// pushes samples through one at a time.
    #[clap(long, short, default_value_t = 1)]
    jobs: usize,
}

#[derive(Args)]
pub(crate) struct MagnitudesArgs {
    input: PathBuf,

    #[clap(long, short, env = "DTMF_BLOCK_LENGTH", default_value_t = 120)]
    block_length: usize,

    /// Levels in dB relative to a full-scale sine, instead of raw magnitudes.
    #[clap(long)]
    db: bool,
}

#[derive(Args)]
pub(crate) struct InfoArgs {
    input: PathBuf,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Write a DTMF key sequence to a .snd file.
    #[clap(name="generate")]
    Generate(GenerateArgs),

    /// Write a single sine tone to a .snd file.
    #[clap(name="tone")]
    Tone(ToneArgs),

    /// Detect keys in a .snd file, one line per block.
    #[clap(name="detect")]
    Detect(DetectArgs),

    /// Dump the eight per-tone magnitudes for every block.
    #[clap(name="magnitudes")]
    Magnitudes(MagnitudesArgs),

    /// Describe a .snd file header.
    #[clap(name="info")]
    Info(InfoArgs),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Cli) -> Result<()> {
    match args.command {
        Commands::Generate(a) => generate(a),
        Commands::Tone(a) => tone(a),
        Commands::Detect(a) => detect(a),
        Commands::Magnitudes(a) => magnitudes(a),
        Commands::Info(a) => {
            let header = file::read_header(&a.input)?;
            println!("{}: {header}", a.input.display());
            Ok(())
        },
    }
}

///////////////////////////////////////////////////////////////////////

fn check_output_format(sample_rate: u32, volume: f32) -> Result<()> {
    // Nothing below 4kHz can carry the 1633Hz column tone.
    if sample_rate < 4000 {
        return Err(ToolError::SampleRate(sample_rate));
    }
    if !(0.0..=1.0).contains(&volume) {
        return Err(ToolError::Volume(volume));
    }
    Ok(())
}

fn generate(a: GenerateArgs) -> Result<()> {
    check_output_format(a.sample_rate, a.volume)?;

    let wave = generator::synthesize_with_pause(&a.symbols, a.sample_rate, a.duration, a.pause)?;
    let container = AudioContainer::new(a.sample_rate, pcm::quantize(&wave, a.volume));
    info!("{:?}: {} samples, {}ms", a.symbols, container.samples.len(), container.duration_ms());

    file::write_container(&a.output, &container)
}

fn tone(a: ToneArgs) -> Result<()> {
    check_output_format(a.sample_rate, a.volume)?;

    let wave = generator::single_frequency_wave(a.frequency, a.sample_rate, a.duration);
    let container = AudioContainer::new(a.sample_rate, pcm::quantize(&wave, a.volume));

    file::write_container(&a.output, &container)
}

fn detect(a: DetectArgs) -> Result<()> {
    let container = file::read_container(&a.input)?;
    let detector = Detector::new(container.sample_rate, a.detector.threshold);
    let block_length = a.detector.block_length;

    if a.keys {
        let mut key_detector = KeyDetector::new(detector, block_length, a.min_blocks);
        let keys: String = container.samples
            .iter()
            .filter_map(|&sample| key_detector.advance(sample))
            .map(|DetectionEvent::Key(key)| key)
            .collect();
        println!("{keys}");
        return Ok(());
    }

    println!("{}: {}Hz, threshold {}", a.input.display(), detector.sample_rate(), detector.threshold());

    if a.jobs > 1 {
        let detections = detector.process_stream_parallel(&container.samples, block_length, a.jobs);
        for (index, detection) in detections.iter().enumerate() {
            println!("{}", report::detection_line(index * block_length, detection));
        }
    } else {
        for (index, detection) in detector.process_stream(&container.samples, block_length).enumerate() {
            println!("{}", report::detection_line(index * block_length, &detection));
        }
    }

    Ok(())
}

fn magnitudes(a: MagnitudesArgs) -> Result<()> {
    let container = file::read_container(&a.input)?;
    let detector = Detector::new(container.sample_rate, 0.0);

    println!("{}", report::magnitudes_header());

    if a.block_length == 0 {
        return Ok(());
    }

    for (index, block) in container.samples.chunks_exact(a.block_length).enumerate() {
        let values = if a.db {
            detector.filters().map(|filter| filter.level_dbfs(block))
        } else {
            detector.magnitudes(block).0
        };
        println!("{}", report::magnitudes_line(index * a.block_length, &values));
    }

    Ok(())
}

///////////////////////////////////////////////////////////////////////
