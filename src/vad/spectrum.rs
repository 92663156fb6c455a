use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Magnitude spectrum of real frames of one fixed length.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f64>>,
    frame_len: usize,
}

impl SpectrumAnalyzer {
    pub fn new(frame_len: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            fft: planner.plan_fft_forward(frame_len),
            frame_len,
        }
    }

    /// Bins of a real DFT: `n / 2 + 1`.
    pub fn spectrum_len(&self) -> usize {
        self.frame_len / 2 + 1
    }

    pub fn magnitudes(&self, frame: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.spectrum_len());
        self.magnitudes_into(frame, &mut out);
        out
    }

    pub fn magnitudes_into(&self, frame: &[f64], out: &mut Vec<f64>) {
        debug_assert_eq!(frame.len(), self.frame_len, "frame length mismatch");
        let mut buffer: Vec<Complex<f64>> = frame.iter().map(|&x| Complex::new(x, 0.0)).collect();
        self.fft.process(&mut buffer);
        out.clear();
        out.extend(buffer[..self.spectrum_len()].iter().map(|c| c.norm()));
    }
}

/// Spectrum bin nearest to `hz` for a DFT of `frame_len` samples.
pub fn hz_to_bin(hz: f64, frame_len: usize, sample_rate_hz: u32) -> usize {
    (hz * frame_len as f64 / sample_rate_hz as f64).round().max(0.0) as usize
}

pub fn bin_to_hz(bin: usize, frame_len: usize, sample_rate_hz: u32) -> f64 {
    bin as f64 * sample_rate_hz as f64 / frame_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f64, sample_rate_hz: u32, len: usize, amplitude: f64) -> Vec<f64> {
        (0..len)
            .map(|n| {
                amplitude
                    * (2.0 * std::f64::consts::PI * freq_hz * n as f64 / sample_rate_hz as f64).sin()
            })
            .collect()
    }

    #[test]
    fn spectrum_has_half_plus_one_bins() {
        assert_eq!(SpectrumAnalyzer::new(160).spectrum_len(), 81);
        assert_eq!(SpectrumAnalyzer::new(5).spectrum_len(), 3);
    }

    #[test]
    fn pure_tone_peaks_at_its_bin() {
        let analyzer = SpectrumAnalyzer::new(160);
        let magnitudes = analyzer.magnitudes(&sine(500.0, 16_000, 160, 1000.0));
        let peak = magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, hz_to_bin(500.0, 160, 16_000));
        assert_eq!(bin_to_hz(peak, 160, 16_000), 500.0);
    }

    #[test]
    fn silence_has_flat_zero_spectrum() {
        let analyzer = SpectrumAnalyzer::new(80);
        assert!(analyzer.magnitudes(&[0.0; 80]).iter().all(|&m| m == 0.0));
    }

    #[test]
    fn hz_to_bin_rounds() {
        assert_eq!(hz_to_bin(300.0, 160, 16_000), 3);
        assert_eq!(hz_to_bin(1000.0, 160, 16_000), 10);
        assert_eq!(hz_to_bin(1250.0, 441, 44_100), 13);
    }
}
