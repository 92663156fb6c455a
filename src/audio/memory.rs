use super::{validate_stream_shape, SampleSource};
use crate::error::AlignmentError;

/// Already-decoded interleaved samples held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    samples: Vec<f64>,
    sample_rate_hz: u32,
    channels: u16,
    position: usize,
}

impl MemorySource {
    pub fn new(samples: Vec<f64>, sample_rate_hz: u32, channels: u16) -> Result<Self, AlignmentError> {
        validate_stream_shape(sample_rate_hz, channels)?;
        Ok(Self {
            samples,
            sample_rate_hz,
            channels,
            position: 0,
        })
    }

    pub fn mono(samples: Vec<f64>, sample_rate_hz: u32) -> Result<Self, AlignmentError> {
        Self::new(samples, sample_rate_hz, 1)
    }
}

impl SampleSource for MemorySource {
    fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn total_frames(&self) -> u64 {
        (self.samples.len() / self.channels as usize) as u64
    }

    fn read_frames(
        &mut self,
        max_frames: usize,
        out: &mut Vec<f64>,
    ) -> Result<usize, AlignmentError> {
        let channels = self.channels as usize;
        let whole = self.samples.len() - self.samples.len() % channels;
        let available = (whole.saturating_sub(self.position)) / channels;
        let frames = available.min(max_frames);
        let end = self.position + frames * channels;
        out.extend_from_slice(&self.samples[self.position..end]);
        self.position = end;
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_chunks_and_drops_partial_frame() {
        let mut source = MemorySource::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], 8000, 2).unwrap();
        assert_eq!(source.total_frames(), 2);
        let mut out = Vec::new();
        assert_eq!(source.read_frames(1, &mut out).unwrap(), 1);
        assert_eq!(source.read_frames(8, &mut out).unwrap(), 1);
        assert_eq!(source.read_frames(8, &mut out).unwrap(), 0);
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn rejects_zero_channels() {
        assert!(matches!(
            MemorySource::new(vec![0.0], 8000, 0),
            Err(AlignmentError::MalformedAudio { .. })
        ));
    }

    #[test]
    fn duration_from_frames() {
        let source = MemorySource::mono(vec![0.0; 16_000], 8000).unwrap();
        assert_eq!(source.duration_ms(), 2000);
    }
}
