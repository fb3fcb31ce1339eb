//! Sun/NeXT `.snd` container, restricted to mono 8-bit linear PCM.
//!
//! ```text
//! offset 0  : magic ".snd"
//! offset 4  : header length (24)
//! offset 8  : sample count
//! offset 12 : encoding (2 = 8-bit linear PCM)
//! offset 16 : sample rate (Hz)
//! offset 20 : channel count (1)
//! offset 24 : signed 8-bit samples
//! ```
//!
//! All header words are big-endian `u32`.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::pcm::Sample;

pub const MAGIC: [u8; 4] = *b".snd";
pub const HEADER_LENGTH: u32 = 24;
pub const ENCODING_LINEAR_8: u32 = 2;
pub const CHANNELS_MONO: u32 = 1;

const HEADER_LENGTH_BYTES: usize = HEADER_LENGTH as usize;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("bad magic number: {0:02x?}")]
    BadMagic([u8; 4]),
    #[error("truncated: need {needed} bytes, have {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("header length {0} is shorter than 24")]
    HeaderLength(u32),
    #[error("unsupported encoding type {0}")]
    UnsupportedEncoding(u32),
    #[error("unsupported channel count {0}")]
    UnsupportedChannels(u32),
    #[error("sample rate must be non-zero")]
    InvalidSampleRate,
    #[error("{0} samples do not fit the header")]
    SampleCountOverflow(usize),
}

pub type Result<T> = std::result::Result<T, FormatError>;

/// Decoded samples and the rate they were captured at.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AudioContainer {
    pub sample_rate: u32,
    pub samples: Vec<Sample>,
}

impl AudioContainer {
    pub fn new(sample_rate: u32, samples: Vec<Sample>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Header {
    pub header_length: u32,
    pub sample_count: u32,
    pub encoding: u32,
    pub sample_rate: u32,
    pub channels: u32,
}

impl Header {
    fn for_container(container: &AudioContainer) -> Result<Self> {
        let sample_count = container.samples.len();
        let sample_count = u32::try_from(sample_count)
            .map_err(|_| FormatError::SampleCountOverflow(sample_count))?;

        Ok(Self {
            header_length: HEADER_LENGTH,
            sample_count,
            encoding: ENCODING_LINEAR_8,
            sample_rate: container.sample_rate,
            channels: CHANNELS_MONO,
        })
    }

    fn words(&self) -> [u32; 5] {
        [self.header_length, self.sample_count, self.encoding, self.sample_rate, self.channels]
    }

    /// Byte offset one past the last sample.
    fn data_end(&self) -> Result<usize> {
        (self.header_length as usize)
            .checked_add(self.sample_count as usize)
            .ok_or(FormatError::SampleCountOverflow(self.sample_count as usize))
    }

    fn validate(&self) -> Result<()> {
        if self.header_length < HEADER_LENGTH {
            return Err(FormatError::HeaderLength(self.header_length));
        }
        if self.encoding != ENCODING_LINEAR_8 {
            return Err(FormatError::UnsupportedEncoding(self.encoding));
        }
        if self.channels != CHANNELS_MONO {
            return Err(FormatError::UnsupportedChannels(self.channels));
        }
        if self.sample_rate == 0 {
            return Err(FormatError::InvalidSampleRate);
        }
        Ok(())
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} header bytes, {} samples, encoding type: {}, {}Hz, {} channels",
            self.header_length, self.sample_count, self.encoding, self.sample_rate, self.channels)
    }
}

fn read_word(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_be_bytes(word)
}

/// Parse and validate the fixed header without touching sample data.
///
pub fn read_header(bytes: &[u8]) -> Result<Header> {
    if bytes.len() < MAGIC.len() {
        return Err(FormatError::Truncated { needed: HEADER_LENGTH_BYTES, actual: bytes.len() });
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&bytes[0..4]);
    if magic != MAGIC {
        return Err(FormatError::BadMagic(magic));
    }

    if bytes.len() < HEADER_LENGTH_BYTES {
        return Err(FormatError::Truncated { needed: HEADER_LENGTH_BYTES, actual: bytes.len() });
    }

    let header = Header {
        header_length: read_word(bytes,  4),
        sample_count:  read_word(bytes,  8),
        encoding:      read_word(bytes, 12),
        sample_rate:   read_word(bytes, 16),
        channels:      read_word(bytes, 20),
    };
    header.validate()?;

    debug!("au header: {header}");

    Ok(header)
}

pub fn encode(container: &AudioContainer) -> Result<Vec<u8>> {
    let header = Header::for_container(container)?;

    let mut bytes = Vec::with_capacity(header.data_end()?);
    bytes.extend_from_slice(&MAGIC);
    for word in header.words() {
        bytes.extend_from_slice(&word.to_be_bytes());
    }
    bytes.extend_from_slice(bytemuck::cast_slice::<Sample, u8>(&container.samples));

    Ok(bytes)
}

/// Rebuild a container from its encoded bytes. Annotation bytes between the
/// fixed header and `header_length` are skipped, and anything after the
/// declared sample count is ignored.
///
pub fn decode(bytes: &[u8]) -> Result<AudioContainer> {
    let header = read_header(bytes)?;

    let start = header.header_length as usize;
    let end = header.data_end()?;
    if bytes.len() < end {
        return Err(FormatError::Truncated { needed: end, actual: bytes.len() });
    }

    let samples = bytemuck::cast_slice::<u8, Sample>(&bytes[start..end]).to_vec();

    Ok(AudioContainer::new(header.sample_rate, samples))
}

///////////////////////////////////////////////////////////////////////
