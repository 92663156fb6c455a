use std::borrow::Cow;

use crate::audio::SampleSource;
use crate::config::VadConfig;
use crate::error::AlignmentError;
use crate::vad::spectrum::SpectrumAnalyzer;

/// Whole recording downmixed to one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoSignal {
    pub samples: Vec<f64>,
    pub sample_rate_hz: u32,
}

impl MonoSignal {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate_hz == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate_hz as u64
    }
}

/// Maps analysis frame indices onto the configured millisecond grid.
///
/// Frame `i` covers `[i * step_ms, (i + 1) * step_ms)` whatever the sample
/// rate, so bounds stay on the grid when a frame holds a fractional number
/// of samples (22050 Hz, 11025 Hz).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    pub step_ms: u64,
}

impl FrameTiming {
    /// Start of frame `index`; `start_ms(len)` is the end of the last step.
    pub fn start_ms(&self, index: usize) -> u64 {
        index as u64 * self.step_ms
    }
}

#[derive(Debug, Clone)]
pub struct FrameSegmenter {
    frame_length_ms: u32,
    overlap_ms: u32,
    read_chunk_frames: usize,
}

impl FrameSegmenter {
    const RESERVE_CHUNKS: usize = 64;

    pub fn new(config: &VadConfig) -> Self {
        Self {
            frame_length_ms: config.frame_length_ms,
            overlap_ms: config.overlap_ms,
            read_chunk_frames: config.read_chunk_frames.max(1),
        }
    }

    fn samples_for_ms(sample_rate_hz: u32, ms: u32) -> usize {
        (sample_rate_hz as u64 * ms as u64 / 1000) as usize
    }

    /// Reads the whole source, downmixing chunk by chunk so only mono
    /// samples are retained.
    pub fn read_mono(&self, source: &mut dyn SampleSource) -> Result<MonoSignal, AlignmentError> {
        let sample_rate_hz = source.sample_rate_hz();
        let channels = source.channels() as usize;
        let chunk_frames =
            (Self::samples_for_ms(sample_rate_hz, self.frame_length_ms).max(1)) * self.read_chunk_frames;

        // total_frames() is an upper bound at best (PCM streams, damaged WAV headers).
        let reserve = source
            .total_frames()
            .min((chunk_frames * Self::RESERVE_CHUNKS) as u64) as usize;
        let mut mono = Vec::with_capacity(reserve);
        let mut chunk = Vec::with_capacity(chunk_frames * channels);
        loop {
            chunk.clear();
            let read = source.read_frames(chunk_frames, &mut chunk)?;
            if read == 0 {
                break;
            }
            downmix_into(&chunk, channels, &mut mono);
        }
        tracing::debug!(
            sample_rate_hz,
            channels,
            mono_samples = mono.len(),
            chunk_frames,
            "vad: decoded and downmixed audio"
        );
        Ok(MonoSignal {
            samples: mono,
            sample_rate_hz,
        })
    }

    pub fn segment<'a>(&self, signal: &'a MonoSignal) -> Result<Frames<'a>, AlignmentError> {
        let frame_len = Self::samples_for_ms(signal.sample_rate_hz, self.frame_length_ms);
        let overlap = Self::samples_for_ms(signal.sample_rate_hz, self.overlap_ms);
        if frame_len == 0 {
            return Err(AlignmentError::invalid_config(format!(
                "{} ms frames hold no samples at {} Hz",
                self.frame_length_ms, signal.sample_rate_hz
            )));
        }
        if overlap >= frame_len {
            return Err(AlignmentError::invalid_config(format!(
                "overlap of {overlap} samples leaves no step in {frame_len}-sample frames"
            )));
        }
        let step = frame_len - overlap;
        let count = if signal.samples.len() < frame_len {
            0
        } else {
            (signal.samples.len() - frame_len) / step + 1
        };
        let window = (overlap > 0).then(|| hann_window(frame_len));
        Ok(Frames {
            samples: &signal.samples,
            sample_rate_hz: signal.sample_rate_hz,
            frame_len,
            step,
            step_ms: u64::from(self.frame_length_ms.saturating_sub(self.overlap_ms)),
            count,
            window,
        })
    }
}

/// Per-instant arithmetic mean over interleaved channels.
pub fn downmix(interleaved: &[f64], channels: usize) -> Vec<f64> {
    let mut mono = Vec::with_capacity(interleaved.len() / channels.max(1));
    downmix_into(interleaved, channels, &mut mono);
    mono
}

fn downmix_into(interleaved: &[f64], channels: usize, out: &mut Vec<f64>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f64>() / channels as f64),
    );
}

/// Symmetric Hann window, `0.5 - 0.5 cos(2πn / (N - 1))`.
pub fn hann_window(len: usize) -> Vec<f64> {
    if len == 1 {
        return vec![1.0];
    }
    let denom = (len - 1) as f64;
    (0..len)
        .map(|n| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * n as f64 / denom).cos())
        .collect()
}

/// Fixed-length analysis frames over a mono signal. Frames are produced on
/// demand; only the signal itself is held in memory.
pub struct Frames<'a> {
    samples: &'a [f64],
    sample_rate_hz: u32,
    frame_len: usize,
    step: usize,
    step_ms: u64,
    count: usize,
    window: Option<Vec<f64>>,
}

impl<'a> Frames<'a> {
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    pub fn timing(&self) -> FrameTiming {
        FrameTiming {
            step_ms: self.step_ms,
        }
    }

    /// Frame `index`, windowed when the segmenter overlaps frames.
    pub fn frame(&self, index: usize) -> Cow<'a, [f64]> {
        let start = index * self.step;
        let raw = &self.samples[start..start + self.frame_len];
        match &self.window {
            Some(window) => Cow::Owned(raw.iter().zip(window).map(|(s, w)| s * w).collect()),
            None => Cow::Borrowed(raw),
        }
    }

    /// One value per frame from the frame samples.
    pub fn map<F>(&self, mut f: F) -> Vec<f64>
    where
        F: FnMut(&[f64]) -> f64,
    {
        (0..self.count).map(|i| f(&self.frame(i))).collect()
    }

    /// One value per frame from the frame samples and their magnitude spectrum.
    pub fn map_spectra<F>(&self, mut f: F) -> Vec<f64>
    where
        F: FnMut(&[f64], &[f64]) -> f64,
    {
        let analyzer = SpectrumAnalyzer::new(self.frame_len);
        let mut magnitudes = Vec::with_capacity(analyzer.spectrum_len());
        (0..self.count)
            .map(|i| {
                let frame = self.frame(i);
                analyzer.magnitudes_into(&frame, &mut magnitudes);
                f(&frame, &magnitudes)
            })
            .collect()
    }
}
