use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::{SampleFormat, WavReader};

use super::{validate_stream_shape, SampleSource};
use crate::error::AlignmentError;

/// RIFF/WAVE file decoded with `hound`.
///
/// Integer WAV keeps its raw sample scale (8-bit audio is re-centred around
/// zero by `hound`); float WAV is rescaled to the 16-bit range so the same
/// detector margins apply.
pub struct WavSource {
    reader: WavReader<BufReader<File>>,
    sample_rate_hz: u32,
    channels: u16,
    sample_format: SampleFormat,
    total_frames: u64,
}

const FLOAT_TO_I16_SCALE: f64 = i16::MAX as f64;

impl WavSource {
    pub fn open(path: &Path) -> Result<Self, AlignmentError> {
        let reader = WavReader::open(path).map_err(|e| AlignmentError::wav("open WAV file", e))?;
        let spec = reader.spec();
        validate_stream_shape(spec.sample_rate, spec.channels)?;
        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 8 | 16 | 24 | 32) | (SampleFormat::Float, 32) => {}
            (format, bits) => {
                return Err(AlignmentError::malformed_audio(format!(
                    "unsupported WAV sample format {format:?} with {bits} bits per sample"
                )))
            }
        }
        let total_frames = reader.duration() as u64;
        tracing::debug!(
            path = %path.display(),
            sample_rate_hz = spec.sample_rate,
            channels = spec.channels,
            bits_per_sample = spec.bits_per_sample,
            total_frames,
            "wav: opened"
        );
        Ok(Self {
            reader,
            sample_rate_hz: spec.sample_rate,
            channels: spec.channels,
            sample_format: spec.sample_format,
            total_frames,
        })
    }
}

impl SampleSource for WavSource {
    fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn total_frames(&self) -> u64 {
        self.total_frames
    }

    fn read_frames(
        &mut self,
        max_frames: usize,
        out: &mut Vec<f64>,
    ) -> Result<usize, AlignmentError> {
        let channels = self.channels as usize;
        let wanted = max_frames * channels;
        let before = out.len();
        match self.sample_format {
            SampleFormat::Int => {
                for sample in self.reader.samples::<i32>().take(wanted) {
                    let sample = sample.map_err(|e| AlignmentError::wav("read WAV samples", e))?;
                    out.push(sample as f64);
                }
            }
            SampleFormat::Float => {
                for sample in self.reader.samples::<f32>().take(wanted) {
                    let sample = sample.map_err(|e| AlignmentError::wav("read WAV samples", e))?;
                    out.push(sample as f64 * FLOAT_TO_I16_SCALE);
                }
            }
        }
        let read = out.len() - before;
        // Drop a trailing partial frame so `out` stays frame-aligned.
        out.truncate(before + read - read % channels);
        Ok(read / channels)
    }
}

#[cfg(test)]
mod tests {
    use hound::{WavSpec, WavWriter};

    use super::*;

    #[test]
    fn reads_sixteen_bit_stereo() {
        let path = std::env::temp_dir().join("subalign_wav_source_stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).expect("create wav");
        for s in [100i16, -100, 200, -200, 300, -300] {
            writer.write_sample(s).expect("write sample");
        }
        writer.finalize().expect("finalize wav");

        let mut source = WavSource::open(&path).expect("open wav");
        assert_eq!(source.sample_rate_hz(), 8000);
        assert_eq!(source.channels(), 2);
        assert_eq!(source.total_frames(), 3);

        let mut out = Vec::new();
        assert_eq!(source.read_frames(2, &mut out).unwrap(), 2);
        assert_eq!(source.read_frames(2, &mut out).unwrap(), 1);
        assert_eq!(source.read_frames(2, &mut out).unwrap(), 0);
        assert_eq!(out, vec![100.0, -100.0, 200.0, -200.0, 300.0, -300.0]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_wav_error() {
        let result = WavSource::open(Path::new("/nonexistent/subalign.wav"));
        assert!(matches!(result, Err(AlignmentError::Wav { .. })));
    }
}
