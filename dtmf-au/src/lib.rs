//! DTMF tone synthesis and Goertzel detection over 8-bit `.snd` audio.
//!
//! ```text
//! symbols -> generator -> f32 samples -> codec::pcm -> codec::au -> bytes
//! bytes -> codec::au -> i8 samples -> detector::dtmf -> symbol per block
//! ```

pub mod codec;
pub mod detector;
pub mod generator;
pub mod keypad;
