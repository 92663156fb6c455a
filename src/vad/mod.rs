pub mod decision;
pub mod features;
pub mod frames;
pub mod intervals;
pub mod smoothing;
pub mod spectrum;


use crate::audio::SampleSource;
use crate::config::VadConfig;
use crate::error::AlignmentError;
use crate::pipeline::traits::ThresholdDecider;
use crate::types::SilenceIntervals;

use self::frames::FrameSegmenter;
use self::intervals::IntervalBuilder;
use self::smoothing::IntervalSmoother;

/// Read, frame, decide, smooth and collect silence for one recording.
pub struct SilenceDetector {
    segmenter: FrameSegmenter,
    decider: Box<dyn ThresholdDecider>,
    smoother: IntervalSmoother,
}

impl SilenceDetector {
    pub fn new(config: &VadConfig, decider: Box<dyn ThresholdDecider>) -> Self {
        Self {
            segmenter: FrameSegmenter::new(config),
            decider,
            smoother: IntervalSmoother::new(config.min_speech_frames, config.min_silence_frames),
        }
    }

    pub fn decider_name(&self) -> &'static str {
        self.decider.name()
    }

    pub fn detect(&self, source: &mut dyn SampleSource) -> Result<SilenceIntervals, AlignmentError> {
        let signal = self.segmenter.read_mono(source)?;
        let frames = self.segmenter.segment(&signal)?;
        let raw = self.decider.decide(&frames)?;
        let speech_frames = raw.iter().filter(|&&d| d).count();
        let smoothed = self.smoother.smooth(raw);
        tracing::debug!(
            decider = self.decider.name(),
            frames = frames.len(),
            speech_frames,
            smoothed_speech_frames = smoothed.iter().filter(|&&d| d).count(),
            "vad: frame decisions"
        );
        IntervalBuilder::new(frames.timing()).build(&smoothed, signal.duration_ms())
    }
}
