use crate::error::AlignmentError;
use crate::pipeline::traits::{FeatureExtractor, ThresholdDecider};
use crate::vad::features::{
    DominantFrequency, LongTermFlatness, ShortTimeEnergy, SpectralFlatness, VoiceBandEnergy,
};
use crate::vad::frames::Frames;

fn require_frames(frames: &Frames<'_>, needed: usize, detector: &str) -> Result<(), AlignmentError> {
    if frames.len() < needed {
        let step_ms = frames.timing().start_ms(1);
        return Err(AlignmentError::malformed_audio(format!(
            "{detector} needs at least {needed} frames (~{} ms) of audio, got {}",
            needed as u64 * step_ms,
            frames.len()
        )));
    }
    Ok(())
}

/// Speech iff `feature / baseline > threshold_ratio`, where the baseline is
/// the mean feature over the leading calibration frames (assumed ambient).
///
/// A zero baseline (digital silence) switches to "speech iff feature != 0".
pub struct CalibratedRatioDecider {
    extractor: Box<dyn FeatureExtractor>,
    calibration_frames: usize,
    threshold_ratio: f64,
}

impl CalibratedRatioDecider {
    pub fn new(
        extractor: Box<dyn FeatureExtractor>,
        calibration_frames: usize,
        threshold_ratio: f64,
    ) -> Self {
        Self {
            extractor,
            calibration_frames,
            threshold_ratio,
        }
    }

    pub fn voice_band(low_hz: f64, high_hz: f64, calibration_frames: usize, threshold_ratio: f64) -> Self {
        Self::new(
            Box::new(VoiceBandEnergy { low_hz, high_hz }),
            calibration_frames,
            threshold_ratio,
        )
    }

    pub fn decide_features(&self, features: &[f64]) -> Vec<bool> {
        let calibration = self.calibration_frames.min(features.len());
        if calibration == 0 {
            return vec![false; features.len()];
        }
        let baseline = features[..calibration].iter().sum::<f64>() / calibration as f64;
        tracing::debug!(
            feature = self.extractor.name(),
            baseline,
            calibration_frames = calibration,
            "vad: calibrated ambient baseline"
        );
        features
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                if i < calibration {
                    false
                } else if baseline == 0.0 {
                    value != 0.0
                } else {
                    value / baseline > self.threshold_ratio
                }
            })
            .collect()
    }
}

impl ThresholdDecider for CalibratedRatioDecider {
    fn name(&self) -> &'static str {
        "calibrated_ratio"
    }

    fn decide(&self, frames: &Frames<'_>) -> Result<Vec<bool>, AlignmentError> {
        require_frames(frames, self.calibration_frames, self.name())?;
        let features = self.extractor.extract(frames);
        Ok(self.decide_features(&features))
    }
}

/// Two-of-three vote over short-time energy, dominant frequency and
/// spectral flatness, each compared against its calibration minimum.
pub struct ConsensusDecider {
    pub calibration_frames: usize,
    pub energy_margin_scale: f64,
    pub frequency_margin_hz: f64,
    pub flatness_margin_db: f64,
}

/// Per-frame inputs of the consensus vote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsensusFeatures {
    pub energy: f64,
    pub frequency_hz: f64,
    pub flatness_db: f64,
}

impl ConsensusDecider {
    pub fn decide_features(&self, features: &[ConsensusFeatures]) -> Vec<bool> {
        let calibration = self.calibration_frames.min(features.len());
        let mut decisions = vec![false; features.len()];
        let Some(first) = features.first() else {
            return decisions;
        };

        let mut min_energy = first.energy;
        let mut min_frequency = first.frequency_hz;
        let mut min_flatness = first.flatness_db;
        for f in &features[..calibration] {
            min_energy = min_energy.min(f.energy);
            min_frequency = min_frequency.min(f.frequency_hz);
            min_flatness = min_flatness.min(f.flatness_db);
        }

        let mut silence_count = 0usize;
        for (i, f) in features.iter().enumerate().skip(calibration) {
            // ln(0) is -inf, which makes the energy vote fire on any frame.
            let energy_margin = self.energy_margin_scale * min_energy.ln();
            let votes = [
                f.energy - min_energy >= energy_margin,
                f.frequency_hz - min_frequency >= self.frequency_margin_hz,
                f.flatness_db - min_flatness >= self.flatness_margin_db,
            ]
            .into_iter()
            .filter(|&vote| vote)
            .count();

            if votes >= 2 {
                decisions[i] = true;
            } else {
                min_energy =
                    (silence_count as f64 * min_energy + f.energy) / (silence_count as f64 + 1.0);
                silence_count += 1;
            }
        }
        tracing::debug!(
            min_energy,
            min_frequency,
            min_flatness,
            silence_count,
            "vad: consensus baselines after tracking"
        );
        decisions
    }
}

impl ThresholdDecider for ConsensusDecider {
    fn name(&self) -> &'static str {
        "consensus"
    }

    fn decide(&self, frames: &Frames<'_>) -> Result<Vec<bool>, AlignmentError> {
        require_frames(frames, self.calibration_frames, self.name())?;
        let energy = ShortTimeEnergy.extract(frames);
        let frequency = DominantFrequency.extract(frames);
        let flatness = SpectralFlatness.extract(frames);
        let features = energy
            .into_iter()
            .zip(frequency)
            .zip(flatness)
            .map(|((energy, frequency_hz), flatness_db)| ConsensusFeatures {
                energy,
                frequency_hz,
                flatness_db,
            })
            .collect::<Vec<_>>();
        Ok(self.decide_features(&features))
    }
}

/// Adaptive threshold over the long-term spectral flatness measure,
/// followed by a forward density filter.
pub struct LsfmDecider {
    pub extractor: LongTermFlatness,
    pub lambda: f64,
    /// Frames the min/max anchors look back over.
    pub threshold_window: usize,
    /// Share of speech decisions a forward window needs to confirm a frame.
    pub density_ratio: f64,
}

impl LsfmDecider {
    fn warmup_frames(&self) -> usize {
        self.extractor.short_window + self.extractor.long_window
    }

    fn calibration_frames(&self) -> usize {
        self.warmup_frames() + self.threshold_window
    }

    pub fn decide_features(&self, lsfm: &[f64]) -> Vec<bool> {
        let warmup = self.warmup_frames();
        let eval_start = self.calibration_frames();
        let n = lsfm.len();
        let mut raw = vec![false; n];
        if n <= eval_start {
            return raw;
        }

        let window_extreme = |anchor: Option<usize>, pick_max: bool| -> f64 {
            let Some(anchor) = anchor else {
                return 0.0;
            };
            let start = (anchor + 1).saturating_sub(self.threshold_window).max(warmup);
            let values = lsfm[start..=anchor].iter().copied();
            if pick_max {
                values.fold(f64::NEG_INFINITY, f64::max)
            } else {
                values.fold(f64::INFINITY, f64::min)
            }
        };

        let mut last_speech: Option<usize> = None;
        // Calibration frames are silence.
        let mut last_silence: Option<usize> = Some(eval_start - 1);
        for i in eval_start..n {
            let threshold = self.lambda * window_extreme(last_speech, false)
                + (1.0 - self.lambda) * window_extreme(last_silence, true);
            if lsfm[i] > threshold {
                raw[i] = true;
                last_speech = Some(i);
            } else {
                last_silence = Some(i);
            }
        }

        let span = warmup.max(1);
        let mut confirmed = raw.clone();
        for i in warmup..n {
            let end = (i + span).min(n);
            let speech = raw[i..end].iter().filter(|&&d| d).count();
            confirmed[i] = speech as f64 / (end - i) as f64 >= self.density_ratio;
        }
        confirmed
    }
}

impl ThresholdDecider for LsfmDecider {
    fn name(&self) -> &'static str {
        "lsfm"
    }

    fn decide(&self, frames: &Frames<'_>) -> Result<Vec<bool>, AlignmentError> {
        require_frames(frames, self.calibration_frames(), self.name())?;
        let lsfm = self.extractor.extract(frames);
        Ok(self.decide_features(&lsfm))
    }
}
