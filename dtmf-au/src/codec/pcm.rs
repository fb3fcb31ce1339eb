//! Signed 8-bit linear PCM.

pub type Sample = i8;

const SCALE_PCM_FLOAT: f32 = 127.0;

/// Map +/-1.0 to +/-127, scaled by `volume`.
///
/// The product is clamped to the signed byte range and then truncated
/// toward zero, so out-of-range input saturates instead of wrapping.
///
pub fn encode(linear: f32, volume: f32) -> Sample {
    let scaled = linear * SCALE_PCM_FLOAT * volume;
    scaled.clamp(Sample::MIN as f32, Sample::MAX as f32) as Sample
}

pub fn quantize(linear: &[f32], volume: f32) -> Vec<Sample> {
    linear.iter().map(|&x| encode(x, volume)).collect()
}

///////////////////////////////////////////////////////////////////////
