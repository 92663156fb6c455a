mod memory;
mod pcm;
mod wav;

pub use memory::MemorySource;
pub use pcm::{PcmFormat, PcmSource};
pub use wav::WavSource;

use crate::error::AlignmentError;

/// Sequential supplier of interleaved PCM samples.
///
/// Samples keep their raw integer scale (e.g. `i16` range for 16-bit audio);
/// the detectors are calibrated against that scale.
pub trait SampleSource {
    fn sample_rate_hz(&self) -> u32;

    fn channels(&self) -> u16;

    /// Number of sample frames (one sample per channel) in the whole stream.
    fn total_frames(&self) -> u64;

    /// Appends up to `max_frames` interleaved frames to `out` and returns how
    /// many frames were read. Zero means the stream is exhausted.
    fn read_frames(&mut self, max_frames: usize, out: &mut Vec<f64>)
        -> Result<usize, AlignmentError>;

    fn duration_ms(&self) -> u64 {
        let rate = self.sample_rate_hz();
        if rate == 0 {
            return 0;
        }
        self.total_frames() * 1000 / rate as u64
    }
}

pub(crate) fn validate_stream_shape(sample_rate_hz: u32, channels: u16) -> Result<(), AlignmentError> {
    if sample_rate_hz == 0 {
        return Err(AlignmentError::malformed_audio("sample rate must be positive"));
    }
    if channels == 0 {
        return Err(AlignmentError::malformed_audio("channel count must be at least 1"));
    }
    Ok(())
}
