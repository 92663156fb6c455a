use std::io::{ErrorKind, Read};

use super::{validate_stream_shape, SampleSource};
use crate::error::AlignmentError;

const SUPPORTED_WIDTHS: [u16; 5] = [1, 2, 3, 4, 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate_hz: u32,
    pub channels: u16,
    /// Bytes per sample: 1 (unsigned), 2, 3, 4 or 8 (little-endian signed).
    pub sample_width_bytes: u16,
}

impl PcmFormat {
    fn frame_bytes(&self) -> usize {
        self.channels as usize * self.sample_width_bytes as usize
    }
}

/// Headerless little-endian PCM read from any byte stream.
pub struct PcmSource<R> {
    reader: R,
    format: PcmFormat,
    total_frames: u64,
    frames_read: u64,
    buffer: Vec<u8>,
}

impl<R: Read> PcmSource<R> {
    pub fn new(reader: R, format: PcmFormat, total_frames: u64) -> Result<Self, AlignmentError> {
        validate_stream_shape(format.sample_rate_hz, format.channels)?;
        if !SUPPORTED_WIDTHS.contains(&format.sample_width_bytes) {
            return Err(AlignmentError::malformed_audio(format!(
                "can't read {}-byte audio",
                format.sample_width_bytes
            )));
        }
        Ok(Self {
            reader,
            format,
            total_frames,
            frames_read: 0,
            buffer: Vec::new(),
        })
    }

    /// Fills `self.buffer` as far as the stream allows; returns bytes read.
    fn fill_buffer(&mut self, wanted: usize) -> Result<usize, AlignmentError> {
        self.buffer.resize(wanted, 0);
        let mut filled = 0usize;
        while filled < wanted {
            match self.reader.read(&mut self.buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(AlignmentError::io("read PCM samples", e)),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> SampleSource for PcmSource<R> {
    fn sample_rate_hz(&self) -> u32 {
        self.format.sample_rate_hz
    }

    fn channels(&self) -> u16 {
        self.format.channels
    }

    fn total_frames(&self) -> u64 {
        self.total_frames
    }

    fn read_frames(
        &mut self,
        max_frames: usize,
        out: &mut Vec<f64>,
    ) -> Result<usize, AlignmentError> {
        let remaining = self.total_frames.saturating_sub(self.frames_read);
        let frames = (max_frames as u64).min(remaining) as usize;
        if frames == 0 {
            return Ok(0);
        }
        let frame_bytes = self.format.frame_bytes();
        let filled = self.fill_buffer(frames * frame_bytes)?;
        // A truncated trailing frame is dropped.
        let whole_frames = filled / frame_bytes;
        let width = self.format.sample_width_bytes as usize;
        out.extend(
            self.buffer[..whole_frames * frame_bytes]
                .chunks_exact(width)
                .map(decode_sample),
        );
        self.frames_read += whole_frames as u64;
        if whole_frames < frames {
            tracing::warn!(
                expected_frames = self.total_frames,
                read_frames = self.frames_read,
                "pcm: stream ended before the announced frame count"
            );
            self.total_frames = self.frames_read;
        }
        Ok(whole_frames)
    }
}

fn decode_sample(bytes: &[u8]) -> f64 {
    match bytes.len() {
        1 => bytes[0] as f64 - 128.0,
        2 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64,
        3 => {
            // Sign-extend by placing the 24 bits in the top of an i32.
            let raw = i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]);
            (raw >> 8) as f64
        }
        4 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(bytes);
            i64::from_le_bytes(raw) as f64
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn format(width: u16, channels: u16) -> PcmFormat {
        PcmFormat {
            sample_rate_hz: 8000,
            channels,
            sample_width_bytes: width,
        }
    }

    #[test]
    fn unsupported_width_is_malformed_audio() {
        let err = PcmSource::new(Cursor::new(Vec::new()), format(5, 1), 0)
            .err()
            .expect("width 5 must be rejected");
        assert!(matches!(err, AlignmentError::MalformedAudio { .. }));
    }

    #[test]
    fn eight_bit_is_unsigned() {
        let mut source = PcmSource::new(Cursor::new(vec![0u8, 128, 255]), format(1, 1), 3).unwrap();
        let mut out = Vec::new();
        assert_eq!(source.read_frames(16, &mut out).unwrap(), 3);
        assert_eq!(out, vec![-128.0, 0.0, 127.0]);
    }

    #[test]
    fn sixteen_bit_little_endian_signed() {
        let bytes = [(-2i16).to_le_bytes(), 300i16.to_le_bytes()].concat();
        let mut source = PcmSource::new(Cursor::new(bytes), format(2, 1), 2).unwrap();
        let mut out = Vec::new();
        source.read_frames(2, &mut out).unwrap();
        assert_eq!(out, vec![-2.0, 300.0]);
    }

    #[test]
    fn twenty_four_bit_sign_extends() {
        let bytes = vec![0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x40];
        let mut source = PcmSource::new(Cursor::new(bytes), format(3, 1), 2).unwrap();
        let mut out = Vec::new();
        source.read_frames(2, &mut out).unwrap();
        assert_eq!(out, vec![-1.0, 4_194_304.0]);
    }

    #[test]
    fn sixty_four_bit_samples() {
        let bytes = (-5i64).to_le_bytes().to_vec();
        let mut source = PcmSource::new(Cursor::new(bytes), format(8, 1), 1).unwrap();
        let mut out = Vec::new();
        source.read_frames(1, &mut out).unwrap();
        assert_eq!(out, vec![-5.0]);
    }

    #[test]
    fn short_stream_truncates_total_frames() {
        let bytes = [1i16.to_le_bytes(), 2i16.to_le_bytes(), 3i16.to_le_bytes()].concat();
        let mut source = PcmSource::new(Cursor::new(bytes), format(2, 2), 4).unwrap();
        let mut out = Vec::new();
        assert_eq!(source.read_frames(4, &mut out).unwrap(), 1);
        assert_eq!(out, vec![1.0, 2.0]);
        assert_eq!(source.total_frames(), 1);
        assert_eq!(source.read_frames(4, &mut out).unwrap(), 0);
    }
}
