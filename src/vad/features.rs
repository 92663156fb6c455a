use std::collections::VecDeque;

use crate::pipeline::traits::FeatureExtractor;
use crate::vad::frames::Frames;
use crate::vad::spectrum::{bin_to_hz, hz_to_bin};

/// Spectral energy inside the band where voiced speech harmonics concentrate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceBandEnergy {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl Default for VoiceBandEnergy {
    fn default() -> Self {
        Self {
            low_hz: 300.0,
            high_hz: 1000.0,
        }
    }
}

impl FeatureExtractor for VoiceBandEnergy {
    fn name(&self) -> &'static str {
        "voice_band_energy"
    }

    fn extract(&self, frames: &Frames<'_>) -> Vec<f64> {
        let frame_len = frames.frame_len();
        let rate = frames.sample_rate_hz();
        let (low, high) = (
            hz_to_bin(self.low_hz, frame_len, rate),
            hz_to_bin(self.high_hz, frame_len, rate),
        );
        frames.map_spectra(|_, spectrum| band_energy(spectrum, low, high))
    }
}

/// Σ |X_k|² for k in `[low, high]`, both clamped to the spectrum.
pub fn band_energy(spectrum: &[f64], low: usize, high: usize) -> f64 {
    let Some(last) = spectrum.len().checked_sub(1) else {
        return 0.0;
    };
    let (low, high) = (low.min(last), high.min(last));
    if low > high {
        return 0.0;
    }
    spectrum[low..=high].iter().map(|m| m * m).sum()
}

/// Σ sample² over the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShortTimeEnergy;

impl FeatureExtractor for ShortTimeEnergy {
    fn name(&self) -> &'static str {
        "short_time_energy"
    }

    fn extract(&self, frames: &Frames<'_>) -> Vec<f64> {
        frames.map(|frame| frame.iter().map(|x| x * x).sum())
    }
}

/// Frequency of the strongest spectral bin, in Hz.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DominantFrequency;

impl FeatureExtractor for DominantFrequency {
    fn name(&self) -> &'static str {
        "dominant_frequency"
    }

    fn extract(&self, frames: &Frames<'_>) -> Vec<f64> {
        let frame_len = frames.frame_len();
        let rate = frames.sample_rate_hz();
        frames.map_spectra(|_, spectrum| {
            // First maximum wins on ties.
            let mut best = 0usize;
            for (i, &m) in spectrum.iter().enumerate() {
                if m > spectrum[best] {
                    best = i;
                }
            }
            bin_to_hz(best, frame_len, rate)
        })
    }
}

/// `10 log10(geometric mean / arithmetic mean)` of the power spectrum, in dB.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpectralFlatness;

impl FeatureExtractor for SpectralFlatness {
    fn name(&self) -> &'static str {
        "spectral_flatness"
    }

    fn extract(&self, frames: &Frames<'_>) -> Vec<f64> {
        frames.map_spectra(|_, spectrum| spectral_flatness(spectrum))
    }
}

/// Zero-power bins are left out of the log sum; silence yields 0.
pub fn spectral_flatness(spectrum: &[f64]) -> f64 {
    if spectrum.is_empty() {
        return 0.0;
    }
    let mut arithmetic = 0.0;
    let mut log_sum = 0.0;
    for m in spectrum {
        let power = m * m;
        if power != 0.0 {
            arithmetic += power;
            log_sum += power.ln();
        }
    }
    let len = spectrum.len() as f64;
    let arithmetic = arithmetic / len;
    if arithmetic == 0.0 {
        return 0.0;
    }
    let geometric = (log_sum / len).exp();
    10.0 * (geometric / arithmetic).log10()
}

/// Long-term spectral flatness measure.
///
/// For every frame `i` and every bin in `[low_hz, high_hz]`, the short-time
/// spectrum `S(j, k)` is the mean magnitude of bin `k` over the
/// `short_window` frames preceding `j`. The measure sums, over bins,
/// `log10(GM / AM)` of `S(j, k)` for the `long_window` most recent `j`.
/// A single pass keeps only the trailing spectra it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongTermFlatness {
    pub low_hz: f64,
    pub high_hz: f64,
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for LongTermFlatness {
    fn default() -> Self {
        Self {
            low_hz: 500.0,
            high_hz: 4000.0,
            short_window: 10,
            long_window: 5,
        }
    }
}

impl FeatureExtractor for LongTermFlatness {
    fn name(&self) -> &'static str {
        "lsfm"
    }

    fn extract(&self, frames: &Frames<'_>) -> Vec<f64> {
        let frame_len = frames.frame_len();
        let rate = frames.sample_rate_hz();
        let spectrum_last = frame_len / 2;
        let low = hz_to_bin(self.low_hz, frame_len, rate).min(spectrum_last);
        let high = hz_to_bin(self.high_hz, frame_len, rate).min(spectrum_last);
        let bins = if low <= high { high - low + 1 } else { 0 };

        let short_window = self.short_window.max(1);
        let long_window = self.long_window.max(1);
        let mut recent_bands: VecDeque<Vec<f64>> = VecDeque::with_capacity(short_window + 1);
        let mut short_time: VecDeque<Vec<f64>> = VecDeque::with_capacity(long_window + 1);

        frames.map_spectra(|_, spectrum| {
            // S(j, ·) averages the frames before j, not j itself.
            let mut sts = vec![0.0; bins];
            if !recent_bands.is_empty() {
                for band in &recent_bands {
                    for (acc, m) in sts.iter_mut().zip(band) {
                        *acc += m;
                    }
                }
                let n = recent_bands.len() as f64;
                sts.iter_mut().for_each(|v| *v /= n);
            }

            recent_bands.push_back(if bins == 0 {
                Vec::new()
            } else {
                spectrum[low..=high].to_vec()
            });
            if recent_bands.len() > short_window {
                recent_bands.pop_front();
            }
            short_time.push_back(sts);
            if short_time.len() > long_window {
                short_time.pop_front();
            }

            flatness_over_window(&short_time, bins)
        })
    }
}

fn flatness_over_window(short_time: &VecDeque<Vec<f64>>, bins: usize) -> f64 {
    let count = short_time.len() as f64;
    let mut total = 0.0;
    for k in 0..bins {
        let mut log_sum = 0.0;
        let mut sum = 0.0;
        let mut has_zero = false;
        for sts in short_time {
            let value = sts[k];
            if value == 0.0 {
                has_zero = true;
                break;
            }
            log_sum += value.ln();
            sum += value;
        }
        if has_zero {
            continue;
        }
        let geometric = (log_sum / count).exp();
        let arithmetic = sum / count;
        total += (geometric / arithmetic).log10();
    }
    total
}
