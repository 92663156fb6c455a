use crate::alignment::boundaries::AdaptiveBoundaryAligner;
use crate::alignment::longest::LongestIntervalsAligner;
use crate::config::{AlignerConfig, BoundaryStrategy, VadConfig, VadMode};
use crate::pipeline::traits::{BoundaryAligner, ThresholdDecider};
use crate::vad::decision::{CalibratedRatioDecider, ConsensusDecider, LsfmDecider};
use crate::vad::features::LongTermFlatness;

pub use crate::alignment::sentences::TerminatorSplitter;
pub use crate::alignment::weighting::CharacterWeigher;

pub fn default_threshold_decider(config: &VadConfig) -> Box<dyn ThresholdDecider> {
    match config.mode {
        VadMode::VoiceBand => Box::new(CalibratedRatioDecider::voice_band(
            config.voice_band_low_hz,
            config.voice_band_high_hz,
            config.calibration_frames,
            config.threshold_ratio,
        )),
        VadMode::Consensus => Box::new(ConsensusDecider {
            calibration_frames: config.calibration_frames,
            energy_margin_scale: config.energy_margin_scale,
            frequency_margin_hz: config.frequency_margin_hz,
            flatness_margin_db: config.flatness_margin_db,
        }),
        VadMode::Lsfm => Box::new(LsfmDecider {
            extractor: LongTermFlatness {
                low_hz: config.lsfm_low_hz,
                high_hz: config.lsfm_high_hz,
                short_window: config.lsfm_short_window,
                long_window: config.lsfm_long_window,
            },
            lambda: config.lsfm_lambda,
            threshold_window: config.lsfm_threshold_window,
            density_ratio: config.lsfm_density_ratio,
        }),
    }
}

pub fn default_boundary_aligner(config: &AlignerConfig) -> Box<dyn BoundaryAligner> {
    match config.strategy {
        BoundaryStrategy::Adaptive => Box::new(AdaptiveBoundaryAligner::from_config(config)),
        BoundaryStrategy::LongestIntervals => Box::new(LongestIntervalsAligner),
    }
}
